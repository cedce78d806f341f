pub mod enhancer;

pub use enhancer::{Enhanced, PromptEnhancer, TextGenerator};
