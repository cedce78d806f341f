pub mod client;

pub use client::{GeneratedImage, HfParameters, HuggingFaceClient, FLUX_DEV_MODEL};
