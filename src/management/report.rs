use serde::{Deserialize, Serialize};

use crate::{spotify::fetch::FailureReason, success, types::PhaseSummaryRow, warning};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRequest {
    pub url: String,
    pub status: Option<u16>,
    pub reason: FailureReason,
}

/// What happened to the requests of one crawl phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    pub requests: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedRequest>,
}

impl PhaseReport {
    pub fn new(phase: &str) -> Self {
        Self {
            phase: phase.to_string(),
            ..Default::default()
        }
    }

    pub fn record_success(&mut self) {
        self.requests += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, failure: FailedRequest) {
        self.requests += 1;
        self.failed.push(failure);
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn summary_row(&self) -> PhaseSummaryRow {
        PhaseSummaryRow {
            phase: self.phase.clone(),
            requests: self.requests,
            succeeded: self.succeeded,
            failed: self.failed_count(),
        }
    }

    /// Prints the failed page count, or a success line when nothing failed.
    pub fn print(&self) {
        if self.has_failures() {
            warning!(
                "Unsuccessful {}: {} / {}",
                self.phase,
                self.failed_count(),
                self.requests
            );
        } else {
            success!("{}: {} pages fetched", self.phase, self.succeeded);
        }
    }
}
