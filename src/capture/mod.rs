//! The capture form: who is logging, which system, what was done, and the
//! hand-off to the log service.

pub mod client;
pub mod form;
pub mod identity;
pub mod terminal;

pub use client::{LogClient, LogSink, SubmitOutcome};
pub use form::{CaptureForm, Field, Key, KeyOutcome, Notice};
