/// Average word length used to turn characters into words.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Scores frozen at the moment a game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinalMetrics {
    pub cpm: u32,
    pub wpm: u32,
    pub accuracy: u32,
}

impl FinalMetrics {
    /// Derive the final scores from the counters of a finished game.
    ///
    /// Elapsed time is `duration_secs - remaining_secs`, never less than one
    /// second. `f64::round` rounds half away from zero.
    pub fn compute(
        correct_count: u32,
        miss_count: u32,
        duration_secs: u32,
        remaining_secs: u32,
    ) -> Self {
        let elapsed_secs = duration_secs.saturating_sub(remaining_secs).max(1);

        let cpm = (correct_count as f64 / elapsed_secs as f64 * 60.0).round();
        let wpm = (cpm / CHARS_PER_WORD).round();

        Self {
            cpm: cpm as u32,
            wpm: wpm as u32,
            accuracy: accuracy(correct_count, miss_count),
        }
    }
}

fn accuracy(correct_count: u32, miss_count: u32) -> u32 {
    let attempts = correct_count as u64 + miss_count as u64;
    if attempts == 0 {
        return 0;
    }
    ((correct_count as f64 / attempts as f64) * 100.0).round() as u32
}
