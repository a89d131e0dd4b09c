use std::collections::VecDeque;

/// Maximum number of answers kept in the ledger.
pub const HISTORY_CAPACITY: usize = 10;
/// Display weight of the newest entry.
pub const MAX_WEIGHT: f64 = 1.0;
/// Display weight of the oldest entry.
pub const MIN_WEIGHT: f64 = 0.2;

/// One answered presentation, as shown in the history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
    pub was_correct_on_first_try: bool,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(text: impl Into<String>, was_correct_on_first_try: bool) -> Self {
        Self {
            text: text.into(),
            was_correct_on_first_try,
        }
    }
}

/// Bounded, newest-first list of past answers.
///
/// Weights are a function of rank only and never affect retention.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    weights: Vec<f64>,
}

impl HistoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
        self.reweigh();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.weights.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest first, paired with their display weight.
    pub fn iter(&self) -> impl Iterator<Item = (&HistoryEntry, f64)> {
        self.entries.iter().zip(self.weights.iter().copied())
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn reweigh(&mut self) {
        let n = self.entries.len();
        self.weights.clear();
        self.weights.extend((0..n).map(|rank| weight_for_rank(rank, n)));
    }
}

/// Linear interpolation from `MAX_WEIGHT` (rank 0) to `MIN_WEIGHT` (rank n-1).
#[must_use]
pub fn weight_for_rank(rank: usize, len: usize) -> f64 {
    if len <= 1 {
        return MAX_WEIGHT;
    }
    #[allow(clippy::cast_precision_loss)]
    let t = rank as f64 / (len - 1) as f64;
    MAX_WEIGHT - (MAX_WEIGHT - MIN_WEIGHT) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_entry_has_full_weight() {
        let mut ledger = HistoryLedger::new();
        ledger.push(HistoryEntry::new("1 + 1 = 2", true));
        assert_eq!(ledger.weights(), &[1.0]);
    }

    #[test]
    fn pushing_twelve_keeps_newest_ten() {
        let mut ledger = HistoryLedger::new();
        for i in 0..12 {
            ledger.push(HistoryEntry::new(format!("entry {i}"), i % 2 == 0));
        }

        assert_eq!(ledger.len(), 10);
        let texts: Vec<_> = ledger.iter().map(|(e, _)| e.text.clone()).collect();
        assert_eq!(texts.first().map(String::as_str), Some("entry 11"));
        assert_eq!(texts.last().map(String::as_str), Some("entry 2"));
        assert!(!texts.iter().any(|t| t == "entry 0" || t == "entry 1"));

        let weights = ledger.weights();
        assert!(close(weights[0], 1.0));
        assert!(close(weights[9], 0.2));
        assert!(weights.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn weights_interpolate_for_three() {
        let mut ledger = HistoryLedger::new();
        for i in 0..3 {
            ledger.push(HistoryEntry::new(format!("{i}"), true));
        }
        let w = ledger.weights();
        assert!(close(w[0], 1.0) && close(w[1], 0.6) && close(w[2], 0.2));
    }
}
