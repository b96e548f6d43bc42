#![forbid(unsafe_code)]

//! Linear history engine for undo/redo.
//!
//! This module provides [`History`], which owns an ordered record of executed
//! operations and a cursor into that record:
//!
//! - **Linearity**: executing mid-history discards the redo-available tail
//! - **Bounded capacity**: the oldest applied operation is evicted when the
//!   record grows past `max_history`
//! - **Failure atomicity**: a failing apply/revert leaves record and cursor
//!   untouched
//!
//! # Invariants
//!
//! 1. Entries `0..applied` are applied to the target; entries
//!    `applied..len` are redo-available and not applied
//! 2. `applied <= record.len() <= config.capacity()` (after any operation)
//! 3. `applied == record.len()` right after a successful `execute`
//!
//! The cursor `index` of the last applied operation is `applied - 1`, with
//! `None` standing for "nothing applied".
//!
//! # Record Model
//!
//! Operations are stored in a `VecDeque` for O(1) eviction from the front.
//!
//! ```text
//! execute(A, B, C)
//! ┌───────────────────────────────────────────────┐
//! │ Record: [A, B, C]          index: 2            │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Record: [A, B, C]          index: 0            │
//! │          ^ applied  ^^^^ redo-available        │
//! └───────────────────────────────────────────────┘
//!
//! execute(D)  <-- truncates B, C before appending
//! ┌───────────────────────────────────────────────┐
//! │ Record: [A, D]             index: 1            │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use crate::config::HistoryConfig;
use crate::operation::{Operation, OperationError, OperationResult};
use crate::target::TargetHandle;

/// Errors from moving the history cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Nothing is applied, so there is nothing to undo.
    NothingToUndo,
    /// The cursor is at the end of the record, so there is nothing to redo.
    NothingToRedo,
    /// The operation under the cursor failed to revert or re-apply.
    Operation(OperationError),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToUndo => write!(f, "nothing to undo"),
            Self::NothingToRedo => write!(f, "nothing to redo"),
            Self::Operation(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Operation(e) => Some(e),
            Self::NothingToUndo | Self::NothingToRedo => None,
        }
    }
}

impl From<OperationError> for HistoryError {
    fn from(error: OperationError) -> Self {
        Self::Operation(error)
    }
}

/// Bounded, linear undo/redo history over a host-owned target.
pub struct History<T> {
    /// Handle to the target the operations act upon.
    target: TargetHandle<T>,
    /// Executed operations in chronological order.
    record: VecDeque<Box<dyn Operation<T>>>,
    /// Number of applied entries at the front of `record`.
    applied: usize,
    /// Eviction bound.
    config: HistoryConfig,
}

impl<T> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("index", &self.index())
            .field("len", &self.record.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<T> History<T> {
    /// Create a new history bound to `target`.
    #[must_use]
    pub fn new(target: TargetHandle<T>, config: HistoryConfig) -> Self {
        Self {
            target,
            record: VecDeque::new(),
            applied: 0,
            config,
        }
    }

    /// Create a new history with no eviction bound.
    #[must_use]
    pub fn unbounded(target: TargetHandle<T>) -> Self {
        Self::new(target, HistoryConfig::unlimited())
    }

    // ========================================================================
    // Core Operations
    // ========================================================================

    /// Apply an operation and record it.
    ///
    /// On failure the operation is dropped and the history is unchanged.
    /// On success the redo-available tail is discarded, the operation is
    /// appended, and the oldest entry is evicted if the bound is exceeded.
    pub fn execute(&mut self, op: impl Operation<T> + 'static) -> OperationResult {
        self.execute_boxed(Box::new(op))
    }

    /// Apply an already boxed operation and record it.
    pub fn execute_boxed(&mut self, op: Box<dyn Operation<T>>) -> OperationResult {
        let result = {
            let mut target = self.target.lock();
            op.apply(&mut target)
        };
        if let Err(e) = result {
            tracing::warn!(
                operation = op.description(),
                error = %e,
                "history execute failed"
            );
            return Err(e);
        }

        self.truncate_redo();
        self.record.push_back(op);
        self.applied += 1;
        self.enforce_capacity();

        tracing::debug!(
            index = self.applied - 1,
            len = self.record.len(),
            "history execute"
        );
        Ok(())
    }

    /// Revert the operation under the cursor and step the cursor back.
    ///
    /// If the revert fails the cursor does not move.
    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let Some(index) = self.index() else {
            return Err(HistoryError::NothingToUndo);
        };

        let op = &self.record[index];
        let result = {
            let mut target = self.target.lock();
            op.revert(&mut target)
        };
        if let Err(e) = result {
            tracing::warn!(
                index,
                operation = op.description(),
                error = %e,
                "history undo failed"
            );
            return Err(e.into());
        }

        self.applied -= 1;
        tracing::debug!(
            index = ?self.index(),
            len = self.record.len(),
            "history undo"
        );
        Ok(())
    }

    /// Step the cursor forward and re-apply the operation there.
    ///
    /// If the apply fails the cursor stays where it was.
    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let Some(op) = self.record.get(self.applied) else {
            return Err(HistoryError::NothingToRedo);
        };

        let result = {
            let mut target = self.target.lock();
            op.apply(&mut target)
        };
        if let Err(e) = result {
            tracing::warn!(
                index = self.applied,
                operation = op.description(),
                error = %e,
                "history redo failed"
            );
            return Err(e.into());
        }

        self.applied += 1;
        tracing::debug!(
            index = self.applied - 1,
            len = self.record.len(),
            "history redo"
        );
        Ok(())
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.applied < self.record.len()
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of operations in the record, applied or redo-available.
    #[must_use]
    pub fn current_length(&self) -> usize {
        self.record.len()
    }

    /// Position of the last applied operation (`None` when nothing is applied).
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Number of operations available for undo.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.applied
    }

    /// Number of operations available for redo.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.record.len() - self.applied
    }

    /// Descriptions on the undo side (most recent first).
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.record
            .range(..self.applied)
            .rev()
            .take(limit)
            .map(|op| op.description())
            .collect()
    }

    /// Descriptions on the redo side (next to redo first).
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.record
            .range(self.applied..)
            .take(limit)
            .map(|op| op.description())
            .collect()
    }

    /// Description of the operation the next `undo` would revert.
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.index()
            .and_then(|i| self.record.get(i))
            .map(|op| op.description())
    }

    /// Description of the operation the next `redo` would apply.
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.record.get(self.applied).map(|op| op.description())
    }

    /// Read-only view of the record in chronological order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &(dyn Operation<T> + 'static)> + '_ {
        self.record.iter().map(|op| &**op)
    }

    /// Get the current configuration.
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Get the target handle.
    #[must_use]
    pub fn target(&self) -> &TargetHandle<T> {
        &self.target
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Drop every recorded operation without touching the target.
    pub fn clear(&mut self) {
        let dropped = self.record.len();
        self.record.clear();
        self.applied = 0;
        tracing::trace!(dropped, "history cleared");
    }

    /// Discard the redo-available tail.
    fn truncate_redo(&mut self) {
        let dropped = self.redo_depth();
        if dropped > 0 {
            self.record.truncate(self.applied);
            tracing::trace!(dropped, "history truncated redo tail");
        }
    }

    /// Evict the oldest applied operations until the bound holds.
    fn enforce_capacity(&mut self) {
        let capacity = self.config.capacity();
        let mut evicted = 0usize;
        while self.record.len() > capacity {
            if self.record.pop_front().is_none() {
                break;
            }
            self.applied = self.applied.saturating_sub(1);
            evicted += 1;
        }
        if evicted > 0 {
            tracing::trace!(evicted, capacity, "history evicted oldest");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
