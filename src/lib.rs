//! Tab-delimited two-column record files.
//!
//! Invariant: a [`Session`] owns at most one stream, opened once for reading
//! or for appending, and releases it on close or drop.
//!
//! # Public API Overview
//! - Open a [`Session`] with a [`Direction`], then [`Session::write`] or
//!   [`Session::read`] lines of [`Record`]s.
//! - Scope a session with [`with_session`] so it is closed on every exit path.
//! - Configure strict column checks with [`StoreConfig`].
//!
//! Writes accept any number of fields; reads always yield the first two
//! columns. Fields are not escaped, so a tab inside a field moves the column
//! boundary.

pub mod config;
pub mod logging;

mod direction;
mod error;
mod record;
mod session;

pub use crate::config::StoreConfig;
pub use crate::direction::Direction;
pub use crate::error::{PreconditionReason, StoreError};
pub use crate::record::{format_line, parse_line, LineParse, Record, COLUMNS, FIELD_SEPARATOR};
pub use crate::session::{
    append_records, read_all, with_session, with_session_config, Records, Session,
};
