use tracing::{debug, info};

use crate::matcher::{self, KeyInput, MatchOutcome};
use crate::metrics::FinalMetrics;
use crate::timer::{Countdown, TickOutcome};
use crate::word_source::WordBatch;

pub const DEFAULT_DURATION_SECS: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum GamePhase {
    Idle,
    Playing,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum EndReason {
    #[strum(to_string = "time is up")]
    TimeUp,
    #[strum(to_string = "all words typed")]
    AllWordsTyped,
}

/// Read-only view handed to the renderer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub current_word: String,
    pub typed_prefix: String,
    pub correct_count: u32,
    pub miss_count: u32,
    pub remaining_secs: u32,
    pub duration_secs: u32,
    pub final_metrics: Option<FinalMetrics>,
    pub loading: bool,
    pub warning: Option<String>,
    pub end_reason: Option<EndReason>,
}

/// One game from start to finish; restarted in place.
#[derive(Debug)]
pub struct Game {
    phase: GamePhase,
    words: Vec<String>,
    word_index: usize,
    typed: String,
    correct_count: u32,
    miss_count: u32,
    countdown: Countdown,
    final_metrics: Option<FinalMetrics>,
    end_reason: Option<EndReason>,
    loading: bool,
    warning: Option<String>,
    generation: u64,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl Game {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            phase: GamePhase::Idle,
            words: Vec::new(),
            word_index: 0,
            typed: String::new(),
            correct_count: 0,
            miss_count: 0,
            countdown: Countdown::new(duration_secs),
            final_metrics: None,
            end_reason: None,
            loading: false,
            warning: None,
            generation: 0,
        }
    }

    /// Reset everything and enter Playing with the word list still loading.
    ///
    /// Returns the new generation; the fetch and countdown started for this
    /// game must carry it back.
    pub fn start(&mut self) -> u64 {
        self.generation += 1;
        self.phase = GamePhase::Playing;
        self.words.clear();
        self.word_index = 0;
        self.typed.clear();
        self.correct_count = 0;
        self.miss_count = 0;
        self.countdown.reset();
        self.final_metrics = None;
        self.end_reason = None;
        self.warning = None;
        self.loading = true;

        info!(generation = self.generation, "game started");
        self.generation
    }

    /// Install the word list fetched for `generation`.
    pub fn on_words_loaded(&mut self, generation: u64, batch: WordBatch) {
        if generation != self.generation || self.phase != GamePhase::Playing || !self.loading {
            debug!(
                generation,
                current = self.generation,
                "discarding stale word list"
            );
            return;
        }

        if batch.words.is_empty() {
            self.abort_start(crate::error::START_FAILED_MESSAGE);
            return;
        }

        info!(generation, count = batch.words.len(), "word list ready");
        self.words = batch.words;
        self.word_index = 0;
        self.typed.clear();
        self.warning = batch.warning;
        self.loading = false;
    }

    /// Give up on a start that could not get going; back to Idle.
    pub fn abort_start(&mut self, message: &str) {
        // late results for the aborted start must not land
        self.generation += 1;
        self.phase = GamePhase::Idle;
        self.loading = false;
        self.words.clear();
        self.word_index = 0;
        self.typed.clear();
        self.warning = Some(message.to_string());

        info!(generation = self.generation, reason = message, "game start aborted");
    }

    /// One second passed for the countdown started with `generation`.
    pub fn on_tick(&mut self, generation: u64) {
        if generation != self.generation || self.phase != GamePhase::Playing {
            return;
        }

        if let TickOutcome::Expired = self.countdown.tick() {
            self.finish(EndReason::TimeUp);
        }
    }

    pub fn on_key(&mut self, input: KeyInput) -> MatchOutcome {
        if self.phase != GamePhase::Playing {
            return MatchOutcome::Ignored;
        }
        let Some(word) = self.words.get(self.word_index) else {
            // still loading
            return MatchOutcome::Ignored;
        };

        let outcome = matcher::apply_key(word, &mut self.typed, input);
        match outcome {
            MatchOutcome::Advanced => self.correct_count += 1,
            MatchOutcome::WordComplete => {
                self.correct_count += 1;
                self.advance_word();
            }
            MatchOutcome::Miss => self.miss_count += 1,
            MatchOutcome::Deleted | MatchOutcome::Suppressed | MatchOutcome::Ignored => {}
        }

        outcome
    }

    fn advance_word(&mut self) {
        if self.word_index + 1 < self.words.len() {
            self.word_index += 1;
            self.typed.clear();
        } else {
            self.word_index = self.words.len();
            self.finish(EndReason::AllWordsTyped);
        }
    }

    fn finish(&mut self, reason: EndReason) {
        if self.phase != GamePhase::Playing {
            return;
        }

        self.phase = GamePhase::Finished;
        self.typed.clear();
        self.loading = false;
        self.end_reason = Some(reason);

        let metrics = FinalMetrics::compute(
            self.correct_count,
            self.miss_count,
            self.countdown.duration_secs(),
            self.countdown.remaining_secs(),
        );
        self.final_metrics = Some(metrics);

        info!(
            %reason,
            correct = self.correct_count,
            misses = self.miss_count,
            cpm = metrics.cpm,
            wpm = metrics.wpm,
            "game finished"
        );
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    /// Empty outside Playing and while loading.
    pub fn current_word(&self) -> &str {
        match self.phase {
            GamePhase::Playing => self
                .words
                .get(self.word_index)
                .map(String::as_str)
                .unwrap_or(""),
            _ => "",
        }
    }

    pub fn typed_prefix(&self) -> &str {
        &self.typed
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    pub fn duration_secs(&self) -> u32 {
        self.countdown.duration_secs()
    }

    pub fn final_metrics(&self) -> Option<FinalMetrics> {
        self.final_metrics
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            current_word: self.current_word().to_string(),
            typed_prefix: self.typed.clone(),
            correct_count: self.correct_count,
            miss_count: self.miss_count,
            remaining_secs: self.countdown.remaining_secs(),
            duration_secs: self.countdown.duration_secs(),
            final_metrics: self.final_metrics,
            loading: self.loading,
            warning: self.warning.clone(),
            end_reason: self.end_reason,
        }
    }
}
