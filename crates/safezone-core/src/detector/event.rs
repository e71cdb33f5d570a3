use serde::{Deserialize, Serialize};

use crate::storage::DetectorConfig;

/// Payload the volume pipeline posts for a loud frame.
pub const LOUD_SOUND_PAYLOAD: &str = "Loud sound detected";

const ERROR_PREFIX: &str = "error:";
const MIC_ERROR_PREFIX: &str = "mic error:";
const LOUD_SOUND_PHRASE: &str = "loud sound";

/// One finding posted by the detector sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum DetectorEvent {
    /// Final speech transcript for one utterance.
    Transcript(String),
    /// Speech recognition failure (informational).
    Error(String),
    LoudSound,
    /// Microphone acquisition failure (informational).
    MicError(String),
}

impl DetectorEvent {
    /// Classify a raw text payload from the sandbox.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_lowercase();

        // "mic error:" must be checked before the shorter "error:".
        if lower.starts_with(MIC_ERROR_PREFIX) {
            return DetectorEvent::MicError(detail(trimmed, MIC_ERROR_PREFIX));
        }
        if lower.starts_with(ERROR_PREFIX) {
            return DetectorEvent::Error(detail(trimmed, ERROR_PREFIX));
        }
        if lower == LOUD_SOUND_PAYLOAD.to_lowercase() {
            return DetectorEvent::LoudSound;
        }
        DetectorEvent::Transcript(trimmed.to_string())
    }

    /// Wire form of this event, as the sandbox would post it.
    pub fn to_payload(&self) -> String {
        match self {
            DetectorEvent::Transcript(text) => text.clone(),
            DetectorEvent::Error(detail) => format!("error: {detail}"),
            DetectorEvent::LoudSound => LOUD_SOUND_PAYLOAD.to_string(),
            DetectorEvent::MicError(detail) => format!("mic error: {detail}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DetectorEvent::Error(_) | DetectorEvent::MicError(_))
    }
}

fn detail(trimmed: &str, prefix: &str) -> String {
    trimmed.get(prefix.len()..).unwrap_or_default().trim().to_string()
}

/// Decides whether a detector event counts as distress.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    match_loud_sound: bool,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I, match_loud_sound: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            keywords,
            match_loud_sound,
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(&config.keywords, config.match_loud_sound)
    }

    /// Failures never match, whatever their detail text says.
    pub fn matches(&self, event: &DetectorEvent) -> bool {
        match event {
            DetectorEvent::LoudSound => self.match_loud_sound,
            DetectorEvent::Transcript(text) => {
                let lower = text.to_lowercase();
                self.keywords.iter().any(|k| lower.contains(k.as_str()))
                    || (self.match_loud_sound && lower.contains(LOUD_SOUND_PHRASE))
            }
            DetectorEvent::Error(_) | DetectorEvent::MicError(_) => false,
        }
    }
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}
