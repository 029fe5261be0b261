use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Speed snapshot taken when a word is completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatSample {
    pub timestamp: DateTime<Local>,
    /// Seconds since the session started.
    pub elapsed_secs: f64,
    pub wpm: f64,
}

impl StatSample {
    pub fn new(timestamp: DateTime<Local>, elapsed_secs: f64, wpm: f64) -> Self {
        Self {
            timestamp,
            elapsed_secs,
            wpm,
        }
    }
}

/// (seconds, wpm) pair, the shape chart widgets expect.
impl From<&StatSample> for (f64, f64) {
    fn from(s: &StatSample) -> Self {
        (s.elapsed_secs, s.wpm)
    }
}
