//! # Cadence Core Library
//!
//! The recurrence engine behind Cadence: given a task with a recurrence
//! rule, it computes the next occurrence date and builds the next task
//! instance when the current one is completed.
//!
//! ## Features
//!
//! - **RRULE Subset**: `FREQ`, `INTERVAL`, `COUNT`, `UNTIL`, `BYDAY`,
//!   `BYMONTHDAY`, `BYMONTH` over daily/weekly/monthly/yearly frequencies
//! - **UTC-Stable Arithmetic**: all advancement on calendar components,
//!   with month-end clamping and leap-year handling
//! - **Completion Modes**: advance from the due date or from the actual
//!   completion time, with an anti-regression guarantee for early
//!   completions
//! - **Pure Values**: no I/O, no shared state; the wall clock and id
//!   source are injected collaborators
//!
//! ## Core Modules
//!
//! - [`models`]: task records and the parsed recurrence rule
//! - [`rule`]: rule parsing and canonical serialization
//! - [`matcher`]: same-day pattern inclusion predicate
//! - [`calculator`]: next-occurrence calculation
//! - [`generator`]: next-instance materialization
//! - [`completion`]: the completion-workflow entry point
//! - [`clock`]: injected clock and id-generator capabilities
//!
//! ## Example Usage
//!
//! ```rust
//! use cadence_core::completion::CompletionProcessor;
//! use cadence_core::models::Task;
//! use chrono::{TimeZone, Utc};
//!
//! let completed = Task {
//!     title: "Water the plants".to_string(),
//!     recurring: Some("RRULE:FREQ=DAILY".to_string()),
//!     due_date: Some(Utc.with_ymd_and_hms(2024, 8, 23, 9, 0, 0).unwrap()),
//!     ..Task::default()
//! };
//!
//! let processor = CompletionProcessor::new();
//! if let Some(next) = processor.process_completion(&completed) {
//!     // Hand the new instance to the task store.
//!     assert!(next.due_date > completed.due_date);
//! }
//! ```

pub mod calculator;
pub mod clock;
pub mod completion;
pub mod generator;
pub mod matcher;
pub mod models;
pub mod rule;
