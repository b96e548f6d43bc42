#![forbid(unsafe_code)]

//! Bounded, linear undo/redo history.
//!
//! This crate lets a host application execute discrete, reversible
//! operations against a mutable target and move backward and forward
//! through them.
//!
//! # Key Components
//!
//! - [`Operation`] - Trait for a reversible unit of work (`apply`/`revert`)
//! - [`History`] - Ordered record plus cursor; `execute`/`undo`/`redo`
//! - [`TargetHandle`] - Shared handle to the host-owned target
//! - [`HistoryConfig`] - Eviction bound (`max_history`), unbounded by default
//! - [`TextInsert`], [`TextDelete`], [`TextReplace`] - Built-in text operations
//! - [`OperationBatch`] - Several operations recorded as one entry
//!
//! # Quick Start
//!
//! ```
//! use rewind::{History, HistoryConfig, TargetHandle, TextInsert};
//!
//! let buffer = TargetHandle::new(String::new());
//! let mut history = History::new(buffer.clone(), HistoryConfig::default());
//!
//! history.execute(TextInsert::new(0, "Hello")).unwrap();
//! history.execute(TextInsert::new(5, " World!")).unwrap();
//! assert_eq!(buffer.snapshot(), "Hello World!");
//!
//! history.undo().unwrap();
//! assert_eq!(buffer.snapshot(), "Hello");
//!
//! history.redo().unwrap();
//! assert_eq!(buffer.snapshot(), "Hello World!");
//! ```
//!
//! # Concurrency
//!
//! `execute`, `undo` and `redo` take `&mut self`: one engine has one writer.
//! Hosts with concurrent callers put the engine behind a mutex or route
//! requests through a single owning task.

pub mod config;
pub mod history;
pub mod operation;
pub mod target;
pub mod text;

pub use config::{HistoryConfig, HistoryConfigError};
pub use history::{History, HistoryError};
pub use operation::{
    Operation, OperationBatch, OperationError, OperationMetadata, OperationResult,
    OperationSource,
};
pub use target::TargetHandle;
pub use text::{TextDelete, TextInsert, TextReplace};
