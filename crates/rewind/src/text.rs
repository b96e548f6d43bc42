#![forbid(unsafe_code)]

//! Built-in text operations over a `String` buffer.
//!
//! Positions are byte offsets and must fall on `char` boundaries. Every
//! operation checks the span it is about to touch before mutating, so an
//! out-of-band edit to the buffer surfaces as
//! [`OperationError::Inapplicable`] instead of corrupting the text.

use std::fmt;

use crate::operation::{Operation, OperationError, OperationMetadata, OperationResult};

/// Check that `position` is a valid insertion point in `buffer`.
fn check_position(buffer: &str, position: usize) -> OperationResult {
    if position > buffer.len() {
        return Err(OperationError::inapplicable(format!(
            "position {position} out of bounds (length {})",
            buffer.len()
        )));
    }
    if !buffer.is_char_boundary(position) {
        return Err(OperationError::inapplicable(format!(
            "position {position} is not a char boundary"
        )));
    }
    Ok(())
}

/// Check that `buffer` holds exactly `expected` starting at `position`.
fn check_span(buffer: &str, position: usize, expected: &str) -> OperationResult {
    check_position(buffer, position)?;
    let end = position + expected.len();
    match buffer.get(position..end) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(OperationError::inapplicable(format!(
            "state drift at {position}: expected '{expected}', got '{actual}'"
        ))),
        None => Err(OperationError::inapplicable(format!(
            "span {position}..{end} out of bounds (length {})",
            buffer.len()
        ))),
    }
}

/// Insert text at a byte position.
#[derive(Debug, Clone)]
pub struct TextInsert {
    /// Position to insert at (byte offset).
    pub position: usize,
    /// Text to insert.
    pub text: String,
    /// Operation metadata.
    pub metadata: OperationMetadata,
}

impl TextInsert {
    /// Create a new text insert operation.
    #[must_use]
    pub fn new(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            metadata: OperationMetadata::new("Insert text"),
        }
    }

    /// Replace the default metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: OperationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Operation<String> for TextInsert {
    fn apply(&self, target: &mut String) -> OperationResult {
        check_position(target, self.position)?;
        target.insert_str(self.position, &self.text);
        Ok(())
    }

    fn revert(&self, target: &mut String) -> OperationResult {
        check_span(target, self.position, &self.text)?;
        target.drain(self.position..self.position + self.text.len());
        Ok(())
    }

    fn metadata(&self) -> Option<&OperationMetadata> {
        Some(&self.metadata)
    }

    fn debug_name(&self) -> &'static str {
        "TextInsert"
    }
}

/// Delete a known span of text at a byte position.
///
/// The deleted text is captured at construction so revert can restore it;
/// apply refuses to run if the buffer no longer holds that text.
#[derive(Debug, Clone)]
pub struct TextDelete {
    /// Position to delete from (byte offset).
    pub position: usize,
    /// Text expected at `position`, removed by apply.
    pub deleted_text: String,
    /// Operation metadata.
    pub metadata: OperationMetadata,
}

impl TextDelete {
    /// Create a new text delete operation.
    #[must_use]
    pub fn new(position: usize, deleted_text: impl Into<String>) -> Self {
        Self {
            position,
            deleted_text: deleted_text.into(),
            metadata: OperationMetadata::new("Delete text"),
        }
    }

    /// Capture the span `position..position + len` of `buffer` as a delete.
    pub fn from_span(buffer: &str, position: usize, len: usize) -> Result<Self, OperationError> {
        let end = position.saturating_add(len);
        let text = buffer.get(position..end).ok_or_else(|| {
            OperationError::inapplicable(format!(
                "span {position}..{end} is not a valid range (length {})",
                buffer.len()
            ))
        })?;
        Ok(Self::new(position, text))
    }

    /// Replace the default metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: OperationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Operation<String> for TextDelete {
    fn apply(&self, target: &mut String) -> OperationResult {
        check_span(target, self.position, &self.deleted_text)?;
        target.drain(self.position..self.position + self.deleted_text.len());
        Ok(())
    }

    fn revert(&self, target: &mut String) -> OperationResult {
        check_position(target, self.position)?;
        target.insert_str(self.position, &self.deleted_text);
        Ok(())
    }

    fn metadata(&self) -> Option<&OperationMetadata> {
        Some(&self.metadata)
    }

    fn debug_name(&self) -> &'static str {
        "TextDelete"
    }
}

/// Replace a known span of text with new text.
#[derive(Clone)]
pub struct TextReplace {
    /// Position to replace at (byte offset).
    pub position: usize,
    /// Original text that is replaced.
    pub old_text: String,
    /// New text that replaces it.
    pub new_text: String,
    /// Operation metadata.
    pub metadata: OperationMetadata,
}

impl fmt::Debug for TextReplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextReplace")
            .field("position", &self.position)
            .field("old_text", &self.old_text)
            .field("new_text", &self.new_text)
            .finish()
    }
}

impl TextReplace {
    /// Create a new text replace operation.
    #[must_use]
    pub fn new(position: usize, old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self {
            position,
            old_text: old_text.into(),
            new_text: new_text.into(),
            metadata: OperationMetadata::new("Replace text"),
        }
    }

    /// Replace the default metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: OperationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Operation<String> for TextReplace {
    fn apply(&self, target: &mut String) -> OperationResult {
        check_span(target, self.position, &self.old_text)?;
        target.replace_range(
            self.position..self.position + self.old_text.len(),
            &self.new_text,
        );
        Ok(())
    }

    fn revert(&self, target: &mut String) -> OperationResult {
        check_span(target, self.position, &self.new_text)?;
        target.replace_range(
            self.position..self.position + self.new_text.len(),
            &self.old_text,
        );
        Ok(())
    }

    fn metadata(&self) -> Option<&OperationMetadata> {
        Some(&self.metadata)
    }

    fn debug_name(&self) -> &'static str {
        "TextReplace"
    }
}

// ============================================================================
// Tests
// ============================================================================
