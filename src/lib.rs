//! timerlog - named start/end timers with a compact binary event log
//!
//! Timers can live in an in-process table ([`memory_store`]), as one file
//! per timestamp on disk ([`file_store`]), or in an append-only binary event
//! log that is either buffered in memory ([`buffered_log`]) or streamed to a
//! file ([`log_file`]). Logs are decoded with [`decoder`] and paired into
//! durations by [`deltas`].

pub mod buffered_log;
pub mod cli;
pub mod clock;
pub mod config;
pub mod decoder;
pub mod deltas;
pub mod error;
pub mod event;
pub mod file_store;
pub mod log_file;
pub mod memory_store;
pub mod report;
pub mod summary;

pub use error::{Result, TimerError};
