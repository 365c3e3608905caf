// ABOUTME: The one-line summary every stage prints when it finishes.
// ABOUTME: Renders as "<stage>: processed N, imported N, skipped N".

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: &'static str,
    pub processed: usize,
    pub imported: usize,
    pub skipped: usize,
}

impl StageSummary {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            processed: 0,
            imported: 0,
            skipped: 0,
        }
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: processed {}, imported {}, skipped {}",
            self.stage, self.processed, self.imported, self.skipped
        )
    }
}
