//! Clients for the text generation and speech synthesis services.
//!
//! Both services are black boxes behind narrow capability traits:
//! - `TextGenerator`: prompt in, text out (OpenAI chat completions)
//! - `SpeechSynthesizer`: text in, compressed audio out (Amazon Polly)

pub mod client;
pub mod error;
pub mod speech;
pub mod types;

pub use client::{OpenAiClient, OpenAiConfig, TextGenerator};
pub use error::{MlError, MlResult};
pub use speech::{synthesize_to_file, PollyClient, SpeechSynthesizer};
pub use types::{GenerationRequest, SpeechRequest};
