//! Dataset generation driver
//!
//! This module builds the spoken-spell dataset: one directory per spell,
//! three speed/noise variants per spell, plus a manifest describing every
//! generated file.

use crate::audio;
use crate::tts::SpeechSynthesizer;
use crate::{Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The fixed list of spells the dataset covers
pub const SPELLS: [&str; 10] = [
    "Expelliarmus",
    "Lumos",
    "Nox",
    "Wingardium Leviosa",
    "Expecto Patronum",
    "Accio",
    "Alohomora",
    "Protego",
    "Stupefy",
    "Obliviate",
];

/// Number of variants generated per spell
pub const SAMPLES_PER_SPELL: u32 = 3;

/// Name of the manifest file written at the output root
pub const MANIFEST_NAME: &str = "manifest.json";

/// Derived parameters for one generated sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSpec {
    /// Position of the sample within its spell (0-based)
    pub index: u32,
    /// Playback-speed multiplier applied to the synthesized speech
    pub speed: f32,
    /// Gain in decibels applied to the white-noise overlay
    pub noise_db: f32,
}

impl SampleSpec {
    /// Create a spec with explicit parameters
    pub fn new(index: u32, speed: f32, noise_db: f32) -> Self {
        Self {
            index,
            speed,
            noise_db,
        }
    }

    /// Derive the parameters for sample `index`
    ///
    /// Index 0 plays at natural speed with noise at -35 dB; each further
    /// index adds 0.1 to the speed and 5 dB to the noise floor.
    pub fn for_index(index: u32) -> Self {
        Self::new(
            index,
            1.0 + index as f32 * 0.1,
            -35.0 + 5.0 * index as f32,
        )
    }

    /// File name of the exported waveform
    pub fn file_name(&self) -> String {
        format!(
            "sample_{}_r{:.1}_n{}.wav",
            self.index,
            self.speed,
            self.noise_db.abs() as u32
        )
    }
}

/// One manifest row describing a generated waveform file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Spell text the sample was synthesized from
    pub spell: String,
    /// Path of the waveform file, relative to the output root
    pub path: String,
    #[serde(flatten)]
    pub spec: SampleSpec,
}

/// Drives the full dataset generation run
///
/// Holds the output root explicitly and the synthesis backend as an injected
/// capability, so tests can substitute a stub that never touches the network.
///
/// # Example
///
/// ```no_run
/// use spell_dataset::{DatasetGenerator, GoogleTranslateTts, Language};
///
/// let synthesizer = GoogleTranslateTts::new(Language::Latin);
/// let generator = DatasetGenerator::new("dataset/generated", synthesizer);
/// let root = generator.generate()?;
/// println!("Dataset generated in: {}", root.display());
/// # Ok::<(), spell_dataset::Error>(())
/// ```
pub struct DatasetGenerator<S> {
    output_root: PathBuf,
    synthesizer: S,
}

impl<S: SpeechSynthesizer> DatasetGenerator<S> {
    /// Create a generator writing under `output_root`
    pub fn new(output_root: impl Into<PathBuf>, synthesizer: S) -> Self {
        Self {
            output_root: output_root.into(),
            synthesizer,
        }
    }

    /// Produce one finished waveform file for `spell` with the given parameters
    ///
    /// Synthesizes the spell into a temporary compressed file, decodes it,
    /// applies the speed change, mixes in gain-adjusted white noise of the
    /// same duration, and exports the result as
    /// `<output_root>/<spell_dir>/sample_<index>_r<speed>_n<noise>.wav`.
    /// The temporary file is removed afterwards; its absence is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if synthesis, decoding, or any filesystem step fails.
    /// Re-running with the same parameters overwrites the previous output.
    pub fn synth_sample(&self, spell: &str, spec: &SampleSpec) -> Result<PathBuf> {
        if spell.is_empty() {
            return Err(Error::InvalidInput("Spell text must not be empty".into()));
        }

        let tmp = self.output_root.join(format!(
            "tmp_{}_{}.{}",
            spell,
            spec.index,
            self.synthesizer.file_extension()
        ));
        self.synthesizer.synthesize_to_file(spell, &tmp)?;

        let (base, sample_rate) = audio::decode_audio(&tmp)?;
        let base = audio::change_speed(&base, spec.speed)?;

        let noise = audio::apply_gain_db(&audio::white_noise(base.len()), spec.noise_db);
        let mixed = audio::overlay(&base, &noise);

        let dest_dir = self.output_root.join(spell_dir_name(spell));
        fs::create_dir_all(&dest_dir)
            .map_err(|e| Error::Filesystem(format!("{}: {e}", dest_dir.display())))?;

        let dest = dest_dir.join(spec.file_name());
        audio::save_audio(&dest, &mixed, sample_rate)?;

        remove_temp(&tmp)?;

        debug!("Wrote {}", dest.display());
        Ok(dest)
    }

    /// Generate the complete dataset
    ///
    /// Iterates the fixed spell list strictly in order, three samples per
    /// spell; the first failing sample aborts the run with the failing spell
    /// and index in the error message. On success the manifest is written and
    /// the canonicalized output root is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any sample, or a filesystem error
    /// from creating the output root or writing the manifest.
    pub fn generate(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_root)
            .map_err(|e| Error::Filesystem(format!("{}: {e}", self.output_root.display())))?;

        let mut manifest = Vec::with_capacity(SPELLS.len() * SAMPLES_PER_SPELL as usize);
        for spell in SPELLS {
            info!("Generating {} samples for {:?}", SAMPLES_PER_SPELL, spell);
            for index in 0..SAMPLES_PER_SPELL {
                let spec = SampleSpec::for_index(index);
                self.synth_sample(spell, &spec)
                    .map_err(|e| annotate(e, spell, index))?;
                manifest.push(ManifestEntry {
                    spell: spell.to_string(),
                    path: format!("{}/{}", spell_dir_name(spell), spec.file_name()),
                    spec,
                });
            }
        }

        self.write_manifest(&manifest)?;

        self.output_root
            .canonicalize()
            .map_err(|e| Error::Filesystem(format!("{}: {e}", self.output_root.display())))
    }

    fn write_manifest(&self, entries: &[ManifestEntry]) -> Result<()> {
        let path = self.output_root.join(MANIFEST_NAME);
        let mut json = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::Filesystem(format!("{}: {e}", path.display())))?;
        json.push('\n');
        fs::write(&path, json).map_err(|e| Error::Filesystem(format!("{}: {e}", path.display())))
    }
}

/// Directory name for a spell (spaces replaced with underscores)
fn spell_dir_name(spell: &str) -> String {
    spell.replace(' ', "_")
}

/// Attach the failing spell and sample index to an error message
fn annotate(err: Error, spell: &str, index: u32) -> Error {
    let context = format!("{spell:?} sample {index}");
    match err {
        Error::SynthesisUnavailable(msg) => {
            Error::SynthesisUnavailable(format!("{context}: {msg}"))
        }
        Error::UnsupportedVoice(msg) => Error::UnsupportedVoice(format!("{context}: {msg}")),
        Error::DecodeFailure(msg) => Error::DecodeFailure(format!("{context}: {msg}")),
        Error::Filesystem(msg) => Error::Filesystem(format!("{context}: {msg}")),
        Error::InvalidInput(msg) => Error::InvalidInput(format!("{context}: {msg}")),
    }
}

/// Remove a temporary synthesis file; a file that is already gone is fine
fn remove_temp(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Filesystem(format!("{}: {e}", path.display()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_parameters_are_exact() {
        let spec = SampleSpec::for_index(0);
        assert_eq!(spec.speed, 1.0);
        assert_eq!(spec.noise_db, -35.0);

        let spec = SampleSpec::for_index(1);
        assert!((spec.speed - 1.1).abs() < 1e-6);
        assert_eq!(spec.noise_db, -30.0);

        let spec = SampleSpec::for_index(2);
        assert!((spec.speed - 1.2).abs() < 1e-6);
        assert_eq!(spec.noise_db, -25.0);
    }

    #[test]
    fn file_names_are_deterministic() {
        assert_eq!(SampleSpec::for_index(0).file_name(), "sample_0_r1.0_n35.wav");
        assert_eq!(SampleSpec::for_index(1).file_name(), "sample_1_r1.1_n30.wav");
        assert_eq!(SampleSpec::for_index(2).file_name(), "sample_2_r1.2_n25.wav");
    }

    #[test]
    fn spell_directories_replace_spaces() {
        assert_eq!(spell_dir_name("Wingardium Leviosa"), "Wingardium_Leviosa");
        assert_eq!(spell_dir_name("Lumos"), "Lumos");
    }

    #[test]
    fn spell_list_is_complete() {
        assert_eq!(SPELLS.len(), 10);
        assert!(SPELLS.contains(&"Expelliarmus"));
        assert!(SPELLS.contains(&"Obliviate"));
    }
}
