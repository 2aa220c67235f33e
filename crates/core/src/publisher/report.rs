use serde::Serialize;

/// Outcome counts for one kind of catalog call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl CallStats {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    pub(crate) fn record<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

/// What a publish pass did. Failures are counted, never raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub operators: CallStats,
    pub channels: CallStats,
    pub edges: CallStats,
    /// Channels held back by restricted mode.
    pub skipped_channels: usize,
}

impl PublishReport {
    pub fn total_calls(&self) -> usize {
        self.operators.attempted() + self.channels.attempted() + self.edges.attempted()
    }

    pub fn total_failures(&self) -> usize {
        self.operators.failed + self.channels.failed + self.edges.failed
    }

    pub fn merge(&mut self, other: &PublishReport) {
        for (mine, theirs) in [
            (&mut self.operators, &other.operators),
            (&mut self.channels, &other.channels),
            (&mut self.edges, &other.edges),
        ] {
            mine.succeeded += theirs.succeeded;
            mine.failed += theirs.failed;
        }
        self.skipped_channels += other.skipped_channels;
    }
}
