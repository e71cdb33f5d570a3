//! Distress detector bridge.
//!
//! Speech and loudness sensing run as their own tokio tasks and talk to the
//! host only through a bounded one-way channel of text payloads. The host
//! parses payloads into [`DetectorEvent`]s and decides, with a
//! [`KeywordMatcher`], whether one is distress.

mod bridge;
mod event;
pub mod speech;
pub mod volume;

pub use bridge::{bridge, DetectorBridge, DetectorSink};
pub use event::{DetectorEvent, KeywordMatcher, LOUD_SOUND_PAYLOAD};
pub use speech::{RecognitionResult, SpeechRecognizer};
pub use volume::{FrequencyAnalyser, LoudnessGate, Microphone};

use crate::storage::DetectorConfig;

/// Start both sensing pipelines and return the host end of the bridge.
///
/// Must be called inside a tokio runtime. Closing or dropping the returned
/// bridge aborts both pipelines.
pub fn spawn_detector(
    config: &DetectorConfig,
    recognizer: Box<dyn SpeechRecognizer>,
    microphone: Box<dyn Microphone>,
) -> DetectorBridge {
    let (sink, mut host) = bridge(config.channel_capacity);

    host.attach(tokio::spawn(speech::run_speech_pipeline(
        recognizer,
        sink.clone(),
    )));
    host.attach(tokio::spawn(volume::run_volume_pipeline(
        microphone,
        config.clone(),
        sink,
    )));

    tracing::info!(
        capacity = config.channel_capacity,
        threshold = config.loud_threshold,
        "detector started"
    );
    host
}
