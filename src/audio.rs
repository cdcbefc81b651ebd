//! Audio utilities for the dataset generator
//!
//! This module provides utility functions for decoding synthesized audio,
//! changing playback speed, generating and mixing white noise, and exporting
//! waveform files.

use crate::{Error, Result};
use ndarray::Array1;
use rand::Rng;
use std::borrow::Cow;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

fn convert<T>(samples: &mut Vec<f32>, data: Cow<AudioBuffer<T>>)
where
    T: symphonia::core::sample::Sample,
    f32: FromSample<T>,
{
    samples.extend(data.chan(0).iter().map(|v| f32::from_sample(*v)))
}

/// Decode a compressed audio file into a mono sample buffer
///
/// Only the first channel is kept; synthesized speech is mono anyway.
///
/// # Arguments
///
/// * `path` - Path to the audio file (any format enabled in symphonia)
///
/// # Returns
///
/// Audio data as a 1D array of f32 samples plus the sampling rate
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be opened
/// * No decodable audio track is found
/// * A packet fails to decode
pub fn decode_audio<P: AsRef<Path>>(path: P) -> Result<(Array1<f32>, u32)> {
    let path = path.as_ref();
    let src =
        File::open(path).map_err(|e| Error::Filesystem(format!("{}: {e}", path.display())))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::DecodeFailure(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::DecodeFailure("No decodable audio track found".into()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::DecodeFailure("Audio track is missing a sampling rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| Error::DecodeFailure(e.to_string()))?;

    let mut samples = Vec::new();
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = decoder
            .decode(&packet)
            .map_err(|e| Error::DecodeFailure(e.to_string()))?;
        match decoded {
            AudioBufferRef::F32(buf) => samples.extend(buf.chan(0)),
            AudioBufferRef::U8(buf) => convert(&mut samples, buf),
            AudioBufferRef::U16(buf) => convert(&mut samples, buf),
            AudioBufferRef::U24(buf) => convert(&mut samples, buf),
            AudioBufferRef::U32(buf) => convert(&mut samples, buf),
            AudioBufferRef::S8(buf) => convert(&mut samples, buf),
            AudioBufferRef::S16(buf) => convert(&mut samples, buf),
            AudioBufferRef::S24(buf) => convert(&mut samples, buf),
            AudioBufferRef::S32(buf) => convert(&mut samples, buf),
            AudioBufferRef::F64(buf) => convert(&mut samples, buf),
        }
    }

    if samples.is_empty() {
        return Err(Error::DecodeFailure(format!(
            "No audio frames decoded from {}",
            path.display()
        )));
    }

    Ok((Array1::from_vec(samples), sample_rate))
}

/// Change the playback speed of an audio buffer
///
/// Resamples by linear interpolation, so pitch shifts together with tempo.
/// A factor above 1.0 shortens the audio, below 1.0 lengthens it.
///
/// # Errors
///
/// Returns an error if `factor` is not a positive finite number
pub fn change_speed(audio: &Array1<f32>, factor: f32) -> Result<Array1<f32>> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "Playback speed must be positive, got {factor}"
        )));
    }
    if audio.is_empty() || (factor - 1.0).abs() < f32::EPSILON {
        return Ok(audio.clone());
    }

    let out_len = ((audio.len() as f32 / factor).round() as usize).max(1);
    let last = audio.len() - 1;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = i as f32 * factor;
        let idx = (pos.floor() as usize).min(last);
        let frac = pos - idx as f32;
        let a = audio[idx];
        let b = audio[(idx + 1).min(last)];
        out.push(a + (b - a) * frac);
    }

    Ok(Array1::from_vec(out))
}

/// Generate a uniform white-noise buffer of `len` samples in [-1, 1]
pub fn white_noise(len: usize) -> Array1<f32> {
    let mut rng = rand::thread_rng();
    Array1::from_shape_fn(len, |_| rng.gen_range(-1.0f32..1.0))
}

/// Apply a gain in decibels to an audio buffer
///
/// Negative values attenuate, positive values amplify.
pub fn apply_gain_db(audio: &Array1<f32>, db: f32) -> Array1<f32> {
    let amplitude = 10f32.powf(db / 20.0);
    audio * amplitude
}

/// Overlay `other` onto `base`, sample for sample, aligned from the start
///
/// The result keeps the length of `base`; trailing samples of a longer
/// `other` are dropped. Clipping is handled at export time.
pub fn overlay(base: &Array1<f32>, other: &Array1<f32>) -> Array1<f32> {
    let mut mixed = base.clone();
    let shared = base.len().min(other.len());
    for i in 0..shared {
        mixed[i] += other[i];
    }
    mixed
}

/// Save audio to a WAV file
///
/// # Arguments
///
/// * `path` - Path to save the WAV file
/// * `audio` - Audio data as a 1D array of f32 samples
/// * `sampling_rate` - Sampling rate of the audio
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be created
/// * The audio data cannot be written
/// * The WAV file cannot be finalized
pub fn save_audio<P: AsRef<Path>>(path: P, audio: &Array1<f32>, sampling_rate: u32) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sampling_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| Error::Filesystem(format!("{}: {e}", path.display())))?;

    for &sample in audio.iter() {
        let sample = (sample * 32768.0).max(-32768.0).min(32767.0) as i16;
        writer
            .write_sample(sample)
            .map_err(|e| Error::Filesystem(format!("{}: {e}", path.display())))?;
    }

    writer
        .finalize()
        .map_err(|e| Error::Filesystem(format!("{}: {e}", path.display())))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn gain_scales_amplitude() {
        let audio = Array1::from_vec(vec![0.5f32, -0.5]);

        let attenuated = apply_gain_db(&audio, -20.0);
        assert!((attenuated[0] - 0.05).abs() < 1e-6);
        assert!((attenuated[1] + 0.05).abs() < 1e-6);

        let unchanged = apply_gain_db(&audio, 0.0);
        assert!((unchanged[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn speed_change_scales_length() {
        let audio = Array1::from_vec((0..1000).map(|i| (i as f32 / 1000.0).sin()).collect());

        let faster = change_speed(&audio, 2.0).unwrap();
        assert_eq!(faster.len(), 500);

        let slower = change_speed(&audio, 0.5).unwrap();
        assert_eq!(slower.len(), 2000);

        let same = change_speed(&audio, 1.0).unwrap();
        assert_eq!(same.len(), 1000);
    }

    #[test]
    fn speed_change_rejects_non_positive_factor() {
        let audio = Array1::from_vec(vec![0.0f32; 10]);
        assert!(matches!(
            change_speed(&audio, 0.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            change_speed(&audio, -1.0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn white_noise_stays_in_range() {
        let noise = white_noise(4096);
        assert_eq!(noise.len(), 4096);
        assert!(noise.iter().all(|s| (-1.0..1.0).contains(s)));
        // A silent buffer would mean the generator is broken
        assert!(noise.iter().any(|s| s.abs() > 1e-4));
    }

    #[test]
    fn overlay_keeps_base_length() {
        let base = Array1::from_vec(vec![0.1f32, 0.2, 0.3]);
        let longer = Array1::from_vec(vec![0.1f32, 0.1, 0.1, 0.1, 0.1]);

        let mixed = overlay(&base, &longer);
        assert_eq!(mixed.len(), 3);
        assert!((mixed[0] - 0.2).abs() < 1e-6);
        assert!((mixed[2] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn wav_export_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let audio = Array1::from_vec((0..2400).map(|i| (i as f32 * 0.01).sin() * 0.8).collect());

        save_audio(&path, &audio, 24000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 24000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.samples::<i16>().count(), 2400);
    }

    #[test]
    fn decode_reads_wav_written_by_hound() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let audio = Array1::from_vec((0..2400).map(|i| (i as f32 * 0.02).sin() * 0.5).collect());
        save_audio(&path, &audio, 16000).unwrap();

        let (decoded, sample_rate) = decode_audio(&path).unwrap();
        assert_eq!(sample_rate, 16000);
        assert_eq!(decoded.len(), 2400);
    }
}
