#![forbid(unsafe_code)]

//! Reversible operations for the history engine.
//!
//! This module provides the [`Operation`] trait for reversible units of work
//! and the [`OperationBatch`] composite that applies several operations as a
//! single history entry.
//!
//! # Invariants
//!
//! - `apply()` followed by `revert()` restores the target's prior state exactly
//! - `revert()` followed by `apply()` reproduces the identical forward effect
//! - Operations are immutable once constructed (`apply`/`revert` take `&self`)
//!
//! # Failure Modes
//!
//! - **State drift**: the target was mutated out-of-band so the span an
//!   operation expects is no longer there
//!   - Reported as [`OperationError::Inapplicable`], never silently ignored

use std::fmt;

/// Source of an operation - who/what triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationSource {
    /// Direct user action (keyboard, mouse).
    #[default]
    User,
    /// Triggered programmatically by application code.
    Programmatic,
    /// Replayed from a recorded macro.
    Macro,
    /// Triggered by an external system/API.
    External,
}

/// Metadata attached to an operation for logging and UI display.
#[derive(Debug, Clone)]
pub struct OperationMetadata {
    /// Human-readable description for UI (e.g., "Insert text").
    pub description: String,
    /// Who/what triggered the operation.
    pub source: OperationSource,
}

impl OperationMetadata {
    /// Create new metadata with the given description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            source: OperationSource::User,
        }
    }

    /// Set the operation source.
    #[must_use]
    pub fn with_source(mut self, source: OperationSource) -> Self {
        self.source = source;
        self
    }
}

impl Default for OperationMetadata {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

/// Result of applying or reverting an operation.
pub type OperationResult = Result<(), OperationError>;

/// Errors raised by an operation against its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The target's current state makes the forward or reverse effect
    /// impossible.
    Inapplicable(String),
}

impl OperationError {
    /// Build an [`OperationError::Inapplicable`] from any message.
    #[must_use]
    pub fn inapplicable(reason: impl Into<String>) -> Self {
        Self::Inapplicable(reason.into())
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inapplicable(reason) => write!(f, "operation inapplicable: {reason}"),
        }
    }
}

impl std::error::Error for OperationError {}

/// A reversible unit of work against a target of type `T`.
///
/// Implementations carry whatever state they need to both apply and exactly
/// revert their effect. Side effects must stay confined to the supplied
/// target.
pub trait Operation<T>: Send + Sync {
    /// Perform the forward effect.
    fn apply(&self, target: &mut T) -> OperationResult;

    /// Perform the exact inverse of the most recent [`apply`](Self::apply).
    fn revert(&self, target: &mut T) -> OperationResult;

    /// Human-readable description for UI display.
    fn description(&self) -> &str {
        match self.metadata() {
            Some(metadata) => &metadata.description,
            None => self.debug_name(),
        }
    }

    /// Metadata attached to this operation, if any.
    fn metadata(&self) -> Option<&OperationMetadata> {
        None
    }

    /// Debug name of the operation type.
    fn debug_name(&self) -> &'static str {
        "Operation"
    }
}

impl<T> fmt::Debug for dyn Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.debug_name())
            .field("description", &self.description())
            .finish()
    }
}

/// A group of operations that apply and revert together.
///
/// Useful for host actions that span several steps but should appear as a
/// single history entry. A batch is either fully applied or fully reverted:
/// a failing member rolls back the members already processed. If that
/// rollback fails too, the returned error names the stuck members and says
/// the target is inconsistent.
pub struct OperationBatch<T> {
    /// Operations in application order.
    operations: Vec<Box<dyn Operation<T>>>,
    /// Batch metadata.
    metadata: OperationMetadata,
}

impl<T> fmt::Debug for OperationBatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationBatch")
            .field("operations_count", &self.operations.len())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl<T> OperationBatch<T> {
    /// Create a new, empty batch.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            operations: Vec::new(),
            metadata: OperationMetadata::new(description),
        }
    }

    /// Add an operation to the batch.
    pub fn push(&mut self, op: impl Operation<T> + 'static) {
        self.operations.push(Box::new(op));
    }

    /// Add an already boxed operation to the batch.
    pub fn push_boxed(&mut self, op: Box<dyn Operation<T>>) {
        self.operations.push(op);
    }

    /// Add an operation, builder style.
    #[must_use]
    pub fn with(mut self, op: impl Operation<T> + 'static) -> Self {
        self.push(op);
        self
    }

    /// Set the batch source.
    #[must_use]
    pub fn with_source(mut self, source: OperationSource) -> Self {
        self.metadata.source = source;
        self
    }

    /// Number of operations in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Error for member `failed` of a batch, noting any members whose rollback
/// also failed. With a failed rollback the target is left partially changed.
fn rollback_error(error: &OperationError, failed: usize, stuck: &[usize]) -> OperationError {
    if stuck.is_empty() {
        return error.clone();
    }
    OperationError::inapplicable(format!(
        "batch member {failed} failed ({error}); rollback of members {stuck:?} also failed, \
         target is inconsistent"
    ))
}

impl<T> Operation<T> for OperationBatch<T> {
    fn apply(&self, target: &mut T) -> OperationResult {
        for (i, op) in self.operations.iter().enumerate() {
            if let Err(e) = op.apply(target) {
                // Roll back the applied prefix so the target is untouched.
                let mut stuck = Vec::new();
                for (j, done) in self.operations[..i].iter().enumerate().rev() {
                    if let Err(rollback) = done.revert(target) {
                        tracing::warn!(member = j, error = %rollback, "batch rollback failed");
                        stuck.push(j);
                    }
                }
                return Err(rollback_error(&e, i, &stuck));
            }
        }
        Ok(())
    }

    fn revert(&self, target: &mut T) -> OperationResult {
        for (i, op) in self.operations.iter().enumerate().rev() {
            if let Err(e) = op.revert(target) {
                // Re-apply the members already reverted; the batch stays applied.
                let mut stuck = Vec::new();
                for (j, undone) in self.operations.iter().enumerate().skip(i + 1) {
                    if let Err(rollback) = undone.apply(target) {
                        tracing::warn!(member = j, error = %rollback, "batch rollback failed");
                        stuck.push(j);
                    }
                }
                return Err(rollback_error(&e, i, &stuck));
            }
        }
        Ok(())
    }

    fn metadata(&self) -> Option<&OperationMetadata> {
        Some(&self.metadata)
    }

    fn debug_name(&self) -> &'static str {
        "OperationBatch"
    }
}

// ============================================================================
// Tests
// ============================================================================
