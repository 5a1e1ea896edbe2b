//! Per-run counters
//!
//! Each pipeline run fills one [`RunStats`] and reports it when it finishes.

/// Outcome counts for a single pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Detail links or posts discovered
    pub items_found: u64,

    /// Markdown files written
    pub items_written: u64,

    /// Items skipped because their fetch failed
    pub fetch_failures: u64,

    /// Items whose Markdown could not be written
    pub write_failures: u64,

    /// Images stored locally
    pub images_localized: u64,

    /// Images kept remote after a failed download
    pub image_failures: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items that did not produce a file
    pub fn items_lost(&self) -> u64 {
        self.fetch_failures + self.write_failures
    }

    /// Share of discovered items written, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.items_found == 0 {
            return 0.0;
        }
        (self.items_written as f64 / self.items_found as f64) * 100.0
    }

    /// Logs the final tally
    pub fn log_summary(&self, pipeline: &str) {
        tracing::info!(
            "{} run finished: {} found, {} written ({:.1}%), {} fetch failures, {} write failures",
            pipeline,
            self.items_found,
            self.items_written,
            self.success_rate(),
            self.fetch_failures,
            self.write_failures
        );
        if self.items_lost() > 0 {
            tracing::warn!(
                "{} items produced no Markdown file; see the warnings above",
                self.items_lost()
            );
        }
        if self.images_localized > 0 || self.image_failures > 0 {
            tracing::info!(
                "Images: {} localized, {} kept remote",
                self.images_localized,
                self.image_failures
            );
        }
    }
}
