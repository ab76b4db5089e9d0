//! Custom test assertions

use mailpurge_rs::{RunReport, WorkItem};
use std::collections::HashSet;

/// Assertions for RunReport
pub trait RunReportAssertions {
    /// Every unique input item is in exactly one bucket
    fn assert_conserves(&self, input: &[WorkItem]);

    /// Nothing left behind and nothing dropped
    fn assert_all_succeeded(&self, count: usize);
}

impl RunReportAssertions for RunReport {
    fn assert_conserves(&self, input: &[WorkItem]) {
        let unique: HashSet<&WorkItem> = input.iter().collect();
        assert_eq!(
            self.total(),
            unique.len(),
            "Expected succeeded + fatal + given_up to equal the unique input count: {:?}",
            self
        );

        let mut seen = HashSet::new();
        for item in self.fatal.iter().chain(self.given_up.iter()) {
            assert!(unique.contains(item), "Unknown item in report: {}", item);
            assert!(seen.insert(item), "Item reported twice: {}", item);
        }
    }

    fn assert_all_succeeded(&self, count: usize) {
        assert_eq!(self.succeeded, count, "report: {:?}", self);
        assert!(self.fatal.is_empty(), "Expected no fatal items: {:?}", self.fatal);
        assert!(
            self.given_up.is_empty(),
            "Expected nothing given up: {:?}",
            self.given_up
        );
    }
}
