use std::convert::Infallible;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Play modes. Each one maps to a static [`ModeRules`] record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Mode {
    #[default]
    Free,
    TimeAttack,
    Survival,
    SuddenDeath,
    FixedCount,
    Competitive,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Free,
        Mode::TimeAttack,
        Mode::Survival,
        Mode::SuddenDeath,
        Mode::FixedCount,
        Mode::Competitive,
    ];

    /// Resolve a mode name. Unknown names fall back to [`Mode::Free`].
    ///
    /// The labels of the original web trainer (water, onion, carrot, grape,
    /// tomato, pro) are accepted as aliases.
    pub fn from_name(name: &str) -> Mode {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "time-attack" | "timeattack" | "onion" => Mode::TimeAttack,
            "survival" | "carrot" => Mode::Survival,
            "sudden-death" | "suddendeath" | "grape" => Mode::SuddenDeath,
            "fixed-count" | "fixedcount" | "tomato" => Mode::FixedCount,
            "competitive" | "pro" => Mode::Competitive,
            _ => Mode::Free,
        }
    }

    pub fn rules(self) -> &'static ModeRules {
        match self {
            Mode::Free => &FREE,
            Mode::TimeAttack => &TIME_ATTACK,
            Mode::Survival => &SURVIVAL,
            Mode::SuddenDeath => &SUDDEN_DEATH,
            Mode::FixedCount => &FIXED_COUNT,
            Mode::Competitive => &COMPETITIVE,
        }
    }
}

impl FromStr for Mode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Mode::from_name(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockKind {
    None,
    Countdown { initial_secs: f64, cap_secs: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionEffect {
    None,
    /// Add `secs_per_char × canonical romaji length` to the clock.
    Recover { secs_per_char: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    HostExit,
    ClockExpired,
    FirstMismatch,
    WordTarget(u32),
}

/// What a mode does to the clock, on completion, and when it ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeRules {
    pub clock: ClockKind,
    pub on_complete: CompletionEffect,
    pub termination: Termination,
    /// The host should supply a fresh word list before each retry.
    pub refresh_words_on_retry: bool,
    pub summary: &'static str,
}

impl ModeRules {
    pub fn has_clock(&self) -> bool {
        matches!(self.clock, ClockKind::Countdown { .. })
    }

    pub fn initial_clock(&self) -> Option<f64> {
        match self.clock {
            ClockKind::Countdown { initial_secs, .. } => Some(initial_secs),
            ClockKind::None => None,
        }
    }

    pub fn word_target(&self) -> Option<u32> {
        match self.termination {
            Termination::WordTarget(n) => Some(n),
            _ => None,
        }
    }

    /// Clock after completing a word whose canonical romaji is `romaji_len` long.
    pub fn recovered_clock(&self, remaining: f64, romaji_len: usize) -> f64 {
        match (self.on_complete, self.clock) {
            (CompletionEffect::Recover { secs_per_char }, ClockKind::Countdown { cap_secs, .. }) => {
                (remaining + romaji_len as f64 * secs_per_char).min(cap_secs)
            }
            _ => remaining,
        }
    }

    pub fn ends_on_mismatch(&self) -> bool {
        self.termination == Termination::FirstMismatch
    }

    pub fn ends_after(&self, words_completed: u32) -> bool {
        matches!(self.termination, Termination::WordTarget(n) if words_completed >= n)
    }

    /// Denominator for a "n / total" progress readout.
    pub fn progress_target(&self, queue_len: usize) -> usize {
        self.word_target().map_or(queue_len, |n| n as usize)
    }
}

pub const FIXED_COUNT_TARGET: u32 = 30;

static FREE: ModeRules = ModeRules {
    clock: ClockKind::None,
    on_complete: CompletionEffect::None,
    termination: Termination::HostExit,
    refresh_words_on_retry: false,
    summary: "no clock, no limits; leave whenever you like",
};

static TIME_ATTACK: ModeRules = ModeRules {
    clock: ClockKind::Countdown {
        initial_secs: 60.0,
        cap_secs: 60.0,
    },
    on_complete: CompletionEffect::None,
    termination: Termination::ClockExpired,
    refresh_words_on_retry: false,
    summary: "60 seconds, the word list loops",
};

static SURVIVAL: ModeRules = ModeRules {
    clock: ClockKind::Countdown {
        initial_secs: 7.0,
        cap_secs: 999.0,
    },
    on_complete: CompletionEffect::Recover { secs_per_char: 0.1 },
    termination: Termination::ClockExpired,
    refresh_words_on_retry: false,
    summary: "7 seconds to start, each word earns 0.1s per romaji letter",
};

static SUDDEN_DEATH: ModeRules = ModeRules {
    clock: ClockKind::None,
    on_complete: CompletionEffect::None,
    termination: Termination::FirstMismatch,
    refresh_words_on_retry: false,
    summary: "one wrong key ends the run",
};

static FIXED_COUNT: ModeRules = ModeRules {
    clock: ClockKind::None,
    on_complete: CompletionEffect::None,
    termination: Termination::WordTarget(FIXED_COUNT_TARGET),
    refresh_words_on_retry: false,
    summary: "type 30 words as fast as you can",
};

static COMPETITIVE: ModeRules = ModeRules {
    clock: ClockKind::Countdown {
        initial_secs: 60.0,
        cap_secs: 60.0,
    },
    on_complete: CompletionEffect::None,
    termination: Termination::ClockExpired,
    refresh_words_on_retry: true,
    summary: "60 seconds on a fresh word list every retry",
};
