use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the model should do with the audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Transcribe,
    Translate,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Transcribe => "transcribe",
            Task::Translate => "translate",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcribe" => Ok(Task::Transcribe),
            "translate" => Ok(Task::Translate),
            other => Err(format!(
                "invalid task: {}. Expected: transcribe or translate",
                other
            )),
        }
    }
}

/// Per-request inference options. An absent language lets the model
/// auto-detect it.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionOptions {
    pub task: Task,
    pub language: Option<String>,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            task: Task::Transcribe,
            language: None,
        }
    }
}

/// One decoded stretch of audio with its position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub id: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Full decode output: text plus segment/timestamp metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    pub segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}
