pub mod client;
pub mod error;
pub mod types;

pub use client::{OllamaClient, TextGenerator};
pub use error::OllamaError;
pub use types::{GenerateOptions, GenerateRequest, GenerateResponse};
