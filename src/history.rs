//! Append-only record of dispatched actions and their results.

use chrono::Utc;

use crate::types::{Action, ActionRecord, ActionResult};

/// Ordered history of one task execution, exclusively owned by the
/// orchestrator for the loop's duration.
///
/// Step values are strictly increasing, starting at 1. Gaps correspond to
/// steps that were skipped (invalid action) or failed unexpectedly; those
/// consume budget without leaving a record.
#[derive(Debug, Default)]
pub struct ActionHistory {
    records: Vec<ActionRecord>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record for `step`. Panics in debug builds if `step` does
    /// not advance past the last recorded step; the orchestrator's loop
    /// counter makes that impossible in correct use.
    pub fn record(&mut self, step: u32, action: Action, result: ActionResult) -> &ActionRecord {
        debug_assert!(
            step >= 1 && self.records.last().map_or(true, |last| step > last.step),
            "history steps must be strictly increasing"
        );
        self.records.push(ActionRecord {
            step,
            action,
            result,
            timestamp: Utc::now(),
        });
        self.records.last().expect("just pushed")
    }

    pub fn records(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the history at loop exit.
    pub fn into_records(self) -> Vec<ActionRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionKind, ActionResult};

    #[test]
    fn records_keep_their_step_numbers() {
        let mut history = ActionHistory::new();
        history.record(1, Action::new(ActionKind::Wait), ActionResult::ok("waited"));
        // Step 2 was skipped.
        history.record(3, Action::new(ActionKind::Click), ActionResult::fail("no"));

        let steps: Vec<u32> = history.records().iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![1, 3]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn record_returns_the_appended_entry() {
        let mut history = ActionHistory::new();
        let record = history.record(
            1,
            Action::new(ActionKind::Complete),
            ActionResult::ok("done"),
        );
        assert_eq!(record.step, 1);
        assert!(record.result.success);
    }

    #[test]
    fn into_records_preserves_order() {
        let mut history = ActionHistory::new();
        for step in 1..=3 {
            history.record(step, Action::new(ActionKind::Wait), ActionResult::ok("ok"));
        }
        let records = history.into_records();
        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].step < w[1].step));
    }
}
