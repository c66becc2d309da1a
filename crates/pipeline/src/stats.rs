//! Word-count statistics over clue text.

use crate::tracking::TrackedRun;

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Min / mean / max clue length in words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClueLengthStats {
    pub min: usize,
    pub mean: f64,
    pub max: usize,
}

impl ClueLengthStats {
    /// `None` when there are no clues.
    pub fn from_clues<'a, I>(clues: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let lengths: Vec<usize> = clues.into_iter().map(word_count).collect();
        let min = *lengths.iter().min()?;
        let max = *lengths.iter().max()?;
        let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        Some(Self { min, mean, max })
    }

    /// Record as `avg_clue_length`, `min_clue_length` and `max_clue_length`.
    pub async fn log_to(&self, run: &TrackedRun) {
        run.metric("avg_clue_length", self.mean).await;
        run.metric("min_clue_length", self.min as f64).await;
        run.metric("max_clue_length", self.max as f64).await;
    }
}
