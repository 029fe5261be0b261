use std::fmt;
use std::time::SystemTime;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::matcher::{Matcher, Outcome};
use crate::mode::{Mode, ModeRules};
use crate::normalize::{is_composition_active, normalize};
use crate::stats::{Counters, StatsRecorder, Summary};
use crate::time_series::StatSample;
use crate::timer::{tick_interval, TickHandle, TickScheduler, TICK_STEP_SECS};
use crate::variation::VariationCache;
use crate::word::WordRecord;

// Float residue below this after a tick counts as an empty clock.
const CLOCK_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionState {
    Idle,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub current_word_index: usize,
    pub total_words_completed: u32,
}

/// One play session over a word queue under a single mode.
///
/// Every transition comes from a call on this object: [`Session::submit`]
/// for keystrokes, [`Session::on_tick`] for the countdown, and
/// [`Session::exit`] / [`Session::reinitialize`] from the host.
pub struct Session {
    words: Vec<WordRecord>,
    mode: Mode,
    state: SessionState,
    progress: Progress,
    matcher: Option<Matcher>,
    cache: VariationCache,
    clock: Option<f64>,
    stats: StatsRecorder,
    summary: Option<Summary>,
    mismatch_pulse: bool,
    composition_active: bool,
    generation: u64,
    timer: Option<TickHandle>,
    scheduler: Option<Box<dyn TickScheduler>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("clock", &self.clock)
            .field("counters", &self.stats.counters())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(words: Vec<WordRecord>, mode: Mode) -> Self {
        let mut session = Self {
            words,
            mode,
            state: SessionState::Idle,
            progress: Progress::default(),
            matcher: None,
            cache: VariationCache::new(),
            clock: None,
            stats: StatsRecorder::new(),
            summary: None,
            mismatch_pulse: false,
            composition_active: false,
            generation: 0,
            timer: None,
            scheduler: None,
        };
        session.reinitialize();
        session
    }

    /// Attach a scheduler that delivers countdown ticks. Without one the host
    /// calls [`Session::tick`] itself.
    pub fn with_scheduler(mut self, scheduler: Box<dyn TickScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Back to `Idle` on the same word list: counters, progress, samples and
    /// clock are reset and any running timer is stopped.
    pub fn reinitialize(&mut self) {
        self.stop_timer();
        self.state = SessionState::Idle;
        self.progress = Progress::default();
        self.clock = self.rules().initial_clock();
        self.stats.reset();
        self.summary = None;
        self.mismatch_pulse = false;
        self.composition_active = false;
        self.warm_cache();
        self.load_word(0);
        debug!(mode = %self.mode, words = self.words.len(), "session initialized");
    }

    /// Re-initialize on a new word list (competitive retries).
    pub fn reinitialize_with(&mut self, words: Vec<WordRecord>) {
        self.words = words;
        self.cache.clear();
        self.reinitialize();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reinitialize();
    }

    pub fn submit(&mut self, raw: &str) -> Option<Outcome> {
        self.submit_at(raw, SystemTime::now())
    }

    /// Feed one raw input fragment. Returns `None` when the session is not
    /// accepting input (finished, empty word list, empty fragment).
    pub fn submit_at(&mut self, raw: &str, now: SystemTime) -> Option<Outcome> {
        if raw.is_empty() {
            return None;
        }
        self.composition_active = is_composition_active(raw);

        if self.state == SessionState::Finished {
            return None;
        }

        let normalized = normalize(raw);
        let outcome = self.matcher.as_mut()?.submit(&normalized);
        trace!(raw, %normalized, ?outcome, "fragment");

        if !outcome.is_scoring() {
            return Some(outcome);
        }
        if self.state == SessionState::Idle {
            self.start(now);
        }

        match &outcome {
            Outcome::Empty => {}
            Outcome::Correct { keystrokes } => self.stats.record_correct(*keystrokes),
            Outcome::Incorrect => {
                self.stats.record_incorrect();
                self.mismatch_pulse = true;
                if self.rules().ends_on_mismatch() {
                    debug!("mismatch under sudden death");
                    self.finish(now);
                }
            }
            Outcome::Complete { keystrokes, .. } => {
                self.stats.record_correct(*keystrokes);
                self.complete_word(now);
            }
        }

        Some(outcome)
    }

    /// Apply one countdown tick scheduled under `generation`. Ticks from an
    /// older generation, or outside `Playing`, are ignored. Returns whether
    /// the tick was applied.
    pub fn on_tick(&mut self, generation: u64) -> bool {
        self.on_tick_at(generation, SystemTime::now())
    }

    pub fn on_tick_at(&mut self, generation: u64, now: SystemTime) -> bool {
        if self.state != SessionState::Playing || generation != self.generation {
            return false;
        }
        let Some(remaining) = self.clock else {
            return false;
        };

        let mut next = (remaining - TICK_STEP_SECS).max(0.0);
        if next < CLOCK_EPSILON {
            next = 0.0;
        }
        self.clock = Some(next);

        if next == 0.0 {
            debug!("clock expired");
            self.finish(now);
        }
        true
    }

    /// Tick under the current generation, for hosts driving the clock by hand.
    pub fn tick(&mut self) -> bool {
        self.on_tick(self.generation)
    }

    pub fn exit(&mut self) {
        self.exit_at(SystemTime::now());
    }

    /// Host-initiated end of play. Stops the clock before anything else.
    pub fn exit_at(&mut self, now: SystemTime) {
        self.stop_timer();
        self.finish(now);
    }

    fn start(&mut self, now: SystemTime) {
        self.state = SessionState::Playing;
        self.stats.start(now);
        self.start_timer();
        debug!(mode = %self.mode, "session started");
    }

    fn complete_word(&mut self, now: SystemTime) {
        self.stats.record_completion(now);

        let romaji_len = self
            .current_word()
            .map(WordRecord::romaji_len)
            .unwrap_or_default();
        if let Some(remaining) = self.clock {
            self.clock = Some(self.rules().recovered_clock(remaining, romaji_len));
        }

        self.progress.total_words_completed += 1;
        debug!(
            completed = self.progress.total_words_completed,
            index = self.progress.current_word_index,
            "word complete"
        );

        if self.rules().ends_after(self.progress.total_words_completed) {
            self.finish(now);
            return;
        }

        let next = match self.progress.current_word_index + 1 {
            i if i >= self.words.len() => 0,
            i => i,
        };
        self.load_word(next);
    }

    fn finish(&mut self, now: SystemTime) {
        if self.state == SessionState::Finished {
            return;
        }
        self.stop_timer();
        self.state = SessionState::Finished;
        let summary = self
            .stats
            .finish(now, self.mode, self.progress.total_words_completed);
        info!(
            mode = %self.mode,
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            words = summary.words_completed,
            "session finished"
        );
        self.summary = Some(summary);
    }

    // Expand every queued word up front so `submit` only ever hits the cache.
    fn warm_cache(&mut self) {
        for word in &self.words {
            self.cache.get(&word.romaji);
        }
    }

    fn load_word(&mut self, index: usize) {
        self.progress.current_word_index = index;
        self.matcher = self
            .words
            .get(index)
            .map(|w| Matcher::new(&w.romaji, self.cache.get(&w.romaji)));
    }

    fn start_timer(&mut self) {
        if !self.rules().has_clock() {
            return;
        }
        if let Some(scheduler) = self.scheduler.as_mut() {
            self.timer = Some(scheduler.schedule(self.generation, tick_interval()));
        }
    }

    // Bumping the generation makes every tick already in flight stale.
    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.generation += 1;
    }

    pub fn rules(&self) -> &'static ModeRules {
        self.mode.rules()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// (position, total) for a progress readout. Fixed-count modes count
    /// completions against the target; others show the queue position.
    /// A finished fixed-count run reads `target/target`.
    pub fn progress_readout(&self) -> (usize, usize) {
        let rules = self.rules();
        let total = rules.progress_target(self.words.len());
        let position = match rules.word_target() {
            Some(_) => (self.progress.total_words_completed as usize + 1).min(total),
            None => self.progress.current_word_index + 1,
        };
        (position, total)
    }

    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    pub fn current_word(&self) -> Option<&WordRecord> {
        self.words.get(self.progress.current_word_index)
    }

    pub fn typed_prefix(&self) -> &str {
        self.matcher.as_ref().map_or("", Matcher::typed_prefix)
    }

    /// Untyped rest of the spelling currently being followed.
    pub fn remaining(&self) -> &str {
        self.matcher.as_ref().map_or("", Matcher::remaining)
    }

    pub fn active_variation(&self) -> Option<&str> {
        self.matcher.as_ref().map(Matcher::active_variation)
    }

    pub fn seconds_remaining(&self) -> Option<f64> {
        self.clock
    }

    pub fn counters(&self) -> Counters {
        self.stats.counters()
    }

    pub fn current_wpm(&self) -> f64 {
        self.stats.current_wpm(SystemTime::now())
    }

    /// True once after each mismatch; reading it clears it.
    pub fn take_mismatch_pulse(&mut self) -> bool {
        std::mem::take(&mut self.mismatch_pulse)
    }

    pub fn composition_active(&self) -> bool {
        self.composition_active
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn samples(&self) -> &[StatSample] {
        self.stats.samples()
    }

    /// Generation of the current timer; ticks must carry it to count.
    pub fn timer_generation(&self) -> u64 {
        self.generation
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
