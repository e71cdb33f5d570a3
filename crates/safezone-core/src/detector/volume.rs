//! Ambient loudness pipeline.
//!
//! Each frame reads the analyser's byte frequency data, averages it, and
//! posts [`LOUD_SOUND_PAYLOAD`] when the mean is above the threshold. Posting
//! never suspends; frames that find the channel full are dropped.

use tokio::time::MissedTickBehavior;

use super::bridge::DetectorSink;
use super::event::LOUD_SOUND_PAYLOAD;
use crate::error::DetectorError;
use crate::storage::DetectorConfig;

/// Source of per-frame frequency magnitudes (0..=255 per bin).
pub trait FrequencyAnalyser: Send {
    fn byte_frequency_data(&mut self, out: &mut [u8]);
}

/// Microphone that yields an analyser once acquired.
pub trait Microphone: Send {
    fn open(&mut self, fft_size: usize) -> Result<Box<dyn FrequencyAnalyser>, String>;
}

pub fn mean_amplitude(data: &[u8]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: u64 = data.iter().map(|&b| u64::from(b)).sum();
    sum as f32 / data.len() as f32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessGate {
    threshold: f32,
}

impl LoudnessGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Strictly above the threshold.
    pub fn is_loud(&self, frame: &[u8]) -> bool {
        mean_amplitude(frame) > self.threshold
    }
}

/// Run the frame loop until the host closes the bridge.
pub async fn run_volume_pipeline(
    mut microphone: Box<dyn Microphone>,
    config: DetectorConfig,
    sink: DetectorSink,
) {
    let mut analyser = match microphone.open(config.fft_size) {
        Ok(analyser) => analyser,
        Err(detail) => {
            tracing::warn!(%detail, "microphone acquisition failed");
            let _ = sink.post_async(format!("mic error: {detail}")).await;
            return;
        }
    };

    let gate = LoudnessGate::new(config.loud_threshold);
    let mut frame = vec![0u8; config.bin_count()];
    let mut frames = tokio::time::interval(config.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        frames.tick().await;
        if sink.is_closed() {
            break;
        }
        analyser.byte_frequency_data(&mut frame);
        if !gate.is_loud(&frame) {
            continue;
        }
        match sink.post(LOUD_SOUND_PAYLOAD) {
            Ok(()) => {}
            Err(DetectorError::Full) => tracing::debug!("loud frame dropped, bridge full"),
            Err(DetectorError::Closed) => break,
        }
    }
    tracing::debug!("volume pipeline stopped");
}
