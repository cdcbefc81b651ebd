//! Speech synthesis backends
//!
//! This module defines the capability interface the dataset generator uses to
//! turn phrase text into audio files, plus the production backend that fetches
//! MP3 audio from the public Google Translate TTS endpoint.

use crate::{Error, Language, Result};
use log::debug;
use std::fs;
use std::io::Read;
use std::path::Path;

const TTS_ENDPOINT: &str = "https://translate.google.com/translate_tts";

/// Capability interface for text-to-speech synthesis
///
/// Implementations persist the synthesized audio at the destination path in
/// whatever compressed container they produce; `file_extension` names that
/// container so callers can build matching temporary file names.
pub trait SpeechSynthesizer {
    /// Synthesize `text` and write the resulting audio file to `dest`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The synthesis backend is unreachable
    /// * The backend rejects the configured voice or language
    /// * The audio cannot be written to `dest`
    fn synthesize_to_file(&self, text: &str, dest: &Path) -> Result<()>;

    /// Extension (without dot) of the container written by `synthesize_to_file`
    fn file_extension(&self) -> &str;
}

/// Speech synthesizer backed by the public Google Translate TTS endpoint
///
/// Sends one GET request per phrase and stores the returned MP3 bytes. The
/// endpoint needs no credentials but answers HTTP 404 for language codes it
/// does not serve.
pub struct GoogleTranslateTts {
    language: Language,
    agent: ureq::Agent,
}

impl GoogleTranslateTts {
    /// Create a synthesizer speaking the given language
    pub fn new(language: Language) -> Self {
        Self {
            language,
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl SpeechSynthesizer for GoogleTranslateTts {
    fn synthesize_to_file(&self, text: &str, dest: &Path) -> Result<()> {
        if text.is_empty() {
            return Err(Error::InvalidInput(
                "Synthesis text must not be empty".into(),
            ));
        }

        debug!(
            "Requesting synthesis for {:?} (lang={})",
            text,
            self.language.code()
        );

        let response = self
            .agent
            .get(TTS_ENDPOINT)
            .query("ie", "UTF-8")
            .query("q", text)
            .query("tl", self.language.code())
            .query("client", "tw-ob")
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(404, _) | ureq::Error::Status(400, _) => {
                    Error::UnsupportedVoice(format!(
                        "Language {:?} ({}) rejected by the synthesis endpoint",
                        self.language,
                        self.language.code()
                    ))
                }
                other => Error::SynthesisUnavailable(other.to_string()),
            })?;

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;

        fs::write(dest, &body).map_err(|e| Error::Filesystem(format!("{}: {e}", dest.display())))?;

        debug!("Stored {} synthesized bytes at {}", body.len(), dest.display());
        Ok(())
    }

    fn file_extension(&self) -> &str {
        "mp3"
    }
}
