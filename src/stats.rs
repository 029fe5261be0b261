use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::mode::Mode;
use crate::time_series::StatSample;

/// Standard "word" length used for wpm.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Elapsed time is never treated as shorter than this when dividing.
pub const MIN_ELAPSED_MINUTES: f64 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub correct_keystrokes: u64,
    pub incorrect_keystrokes: u64,
}

impl Counters {
    pub fn total(&self) -> u64 {
        self.correct_keystrokes + self.incorrect_keystrokes
    }
}

pub fn wpm(correct_keystrokes: u64, elapsed: Duration) -> f64 {
    let minutes = (elapsed.as_secs_f64() / 60.0).max(MIN_ELAPSED_MINUTES);
    (correct_keystrokes as f64 / CHARS_PER_WORD) / minutes
}

/// Percentage of keystrokes that were correct; 100 when nothing was typed.
pub fn accuracy(counters: Counters) -> f64 {
    match counters.total() {
        0 => 100.0,
        total => counters.correct_keystrokes as f64 / total as f64 * 100.0,
    }
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Final numbers for a finished session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub mode: Mode,
    pub wpm: f64,
    pub accuracy: f64,
    pub correct_keystrokes: u64,
    pub incorrect_keystrokes: u64,
    pub elapsed_secs: f64,
    pub words_completed: u32,
    pub peak_wpm: f64,
    /// Spread of the per-word samples; lower is steadier.
    pub wpm_std_dev: f64,
    pub samples: Vec<StatSample>,
}

impl Summary {
    pub fn compute(
        mode: Mode,
        counters: Counters,
        elapsed: Duration,
        words_completed: u32,
        samples: Vec<StatSample>,
    ) -> Self {
        let sample_wpms: Vec<f64> = samples.iter().map(|s| s.wpm).collect();
        Self {
            mode,
            wpm: wpm(counters.correct_keystrokes, elapsed),
            accuracy: accuracy(counters),
            correct_keystrokes: counters.correct_keystrokes,
            incorrect_keystrokes: counters.incorrect_keystrokes,
            elapsed_secs: elapsed.as_secs_f64(),
            words_completed,
            peak_wpm: sample_wpms.iter().copied().fold(0.0, f64::max),
            wpm_std_dev: std_dev(&sample_wpms),
            samples,
        }
    }
}

/// Running counters and per-word samples for one session.
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    counters: Counters,
    samples: Vec<StatSample>,
    started_at: Option<SystemTime>,
    ended_at: Option<SystemTime>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn start(&mut self, now: SystemTime) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn record_correct(&mut self, keystrokes: usize) {
        self.counters.correct_keystrokes += keystrokes as u64;
    }

    pub fn record_incorrect(&mut self) {
        self.counters.incorrect_keystrokes += 1;
    }

    /// Append a speed sample for a completed word. No-op before start.
    pub fn record_completion(&mut self, now: SystemTime) -> Option<&StatSample> {
        let elapsed = self.elapsed_at(now)?;
        self.samples.push(StatSample::new(
            DateTime::<Local>::from(now),
            elapsed.as_secs_f64(),
            wpm(self.counters.correct_keystrokes, elapsed),
        ));
        self.samples.last()
    }

    pub fn finish(&mut self, now: SystemTime, mode: Mode, words_completed: u32) -> Summary {
        self.ended_at.get_or_insert(now);
        let elapsed = match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.duration_since(start).unwrap_or_default(),
            _ => Duration::ZERO,
        };
        Summary::compute(
            mode,
            self.counters,
            elapsed,
            words_completed,
            self.samples.clone(),
        )
    }

    pub fn elapsed_at(&self, now: SystemTime) -> Option<Duration> {
        self.started_at
            .map(|start| now.duration_since(start).unwrap_or_default())
    }

    /// Live wpm for a HUD readout.
    pub fn current_wpm(&self, now: SystemTime) -> f64 {
        self.elapsed_at(now)
            .map_or(0.0, |e| wpm(self.counters.correct_keystrokes, e))
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn samples(&self) -> &[StatSample] {
        &self.samples
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }
}
