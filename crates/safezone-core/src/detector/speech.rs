//! Continuous speech pipeline: forwards one payload per finalized utterance.

use async_trait::async_trait;

use super::bridge::DetectorSink;

/// One recognizer result. Interim results have `is_final == false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: false,
        }
    }

    pub fn final_result(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            is_final: true,
        }
    }
}

/// Speech-to-text engine running inside the sandbox.
#[async_trait]
pub trait SpeechRecognizer: Send {
    async fn start(&mut self) -> Result<(), String>;

    /// Next result or recognition error; `None` when the engine stops.
    async fn next_result(&mut self) -> Option<Result<RecognitionResult, String>>;
}

/// Run until the recognizer stops or the host closes the bridge.
///
/// Recognition errors are posted as `error: <detail>` and do not stop the
/// pipeline; a failed start posts once and returns.
pub async fn run_speech_pipeline(mut recognizer: Box<dyn SpeechRecognizer>, sink: DetectorSink) {
    if let Err(detail) = recognizer.start().await {
        tracing::warn!(%detail, "speech recognizer failed to start");
        let _ = sink.post_async(format!("error: {detail}")).await;
        return;
    }

    while let Some(item) = recognizer.next_result().await {
        let payload = match item {
            Ok(result) if result.is_final => result.transcript,
            Ok(_) => continue,
            Err(detail) => format!("error: {detail}"),
        };
        if sink.post_async(payload).await.is_err() {
            break;
        }
    }
    tracing::debug!("speech pipeline stopped");
}
