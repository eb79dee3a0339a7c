//! Source tree scanning
//!
//! Walks include roots, reads every file the active strategy handles and turns
//! its tags into declarations, in lexical file order.

mod scanner;

pub use scanner::{ScanConfig, ScanError, ScanOutcome, SourceScanner};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked by the scanner between files
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
