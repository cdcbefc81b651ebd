pub mod audio;
pub mod dataset;
pub mod tts;

pub use dataset::{DatasetGenerator, SampleSpec, SPELLS};
pub use tts::{GoogleTranslateTts, SpeechSynthesizer};

/// Languages accepted by the speech-synthesis backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Latin,
    English,
    French,
    Spanish,
}

impl Language {
    /// Language code passed to the synthesis backend
    pub fn code(&self) -> &'static str {
        match self {
            Language::Latin => "la",
            Language::English => "en",
            Language::French => "fr",
            Language::Spanish => "es",
        }
    }
}

/// Error types for the dataset generator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Speech synthesis unavailable: {0}")]
    SynthesisUnavailable(String),
    #[error("Unsupported voice: {0}")]
    UnsupportedVoice(String),
    #[error("Audio decode error: {0}")]
    DecodeFailure(String),
    #[error("Filesystem error: {0}")]
    Filesystem(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for the dataset generator
pub type Result<T> = std::result::Result<T, Error>;
