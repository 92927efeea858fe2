//! Request middleware.
//!
//! Purpose: request lifecycle concerns shared by every route, currently
//! trace correlation and per-request logging.

pub mod trace;

pub use trace::Trace;
