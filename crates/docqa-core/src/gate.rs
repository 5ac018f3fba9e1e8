//! Exclusive operation gate.
//!
//! Uploads, queries and clears all mutate session-derived state (the
//! uploaded-file list, the displayed answer, the stats they trigger). The
//! gate admits at most one of them at a time. Holding the returned
//! [`OperationGuard`] is holding the gate; dropping it releases the gate on
//! every exit path, including early returns and cancelled futures.

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;

/// The class of operation currently holding the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Upload,
    Query,
    Clear,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Upload => "upload",
            OperationKind::Query => "query",
            OperationKind::Clear => "clear",
        })
    }
}

#[derive(Debug, Default)]
pub struct OperationGate {
    active: Mutex<Option<OperationKind>>,
}

impl OperationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the gate for `kind`. Fails with the kind of the operation
    /// already holding it.
    pub fn try_begin(&self, kind: OperationKind) -> Result<OperationGuard<'_>, OperationKind> {
        let mut active = self.active.lock();
        if let Some(holder) = *active {
            return Err(holder);
        }
        *active = Some(kind);
        Ok(OperationGuard { gate: self })
    }

    /// The operation holding the gate, if any.
    pub fn current(&self) -> Option<OperationKind> {
        *self.active.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.current().is_some()
    }
}

/// Proof of holding the [`OperationGate`]. Releases it on drop.
#[derive(Debug)]
pub struct OperationGuard<'a> {
    gate: &'a OperationGate,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        *self.gate.active.lock() = None;
    }
}
