//! Remote resources allocated by one orchestration run.
//!
//! Upload tasks record into the ledger concurrently while the orchestrator
//! reads and rewrites the index handle, so every access goes through one
//! reader/writer lock. Accessors return copies; the lock is never held
//! across an `.await`.

use hange_core::{IndexHandle, UploadedResource};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct LedgerState {
    uploaded: Vec<UploadedResource>,
    index: Option<IndexHandle>,
}

/// Thread-safe record of uploaded files and the index built over them.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    state: RwLock<LedgerState>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_upload(&self, resource: UploadedResource) {
        self.write().uploaded.push(resource);
    }

    /// Replace the index handle with its latest known state.
    pub fn set_index(&self, index: IndexHandle) {
        self.write().index = Some(index);
    }

    pub fn upload_count(&self) -> usize {
        self.read().uploaded.len()
    }

    pub fn file_ids(&self) -> Vec<String> {
        self.read().uploaded.iter().map(|r| r.id.clone()).collect()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.read().uploaded.iter().map(|r| r.filename.clone()).collect()
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> (Vec<UploadedResource>, Option<IndexHandle>) {
        let mut state = self.write();
        (std::mem::take(&mut state.uploaded), state.index.take())
    }

    pub fn is_empty(&self) -> bool {
        let state = self.read();
        state.uploaded.is_empty() && state.index.is_none()
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
