//! Common types and utilities for the lty inference engine.
//!
//! This crate provides foundational types used across all lty crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Source spans (`Span`) and file identifiers (`FileId`)
//! - Member visibility (`Visibility`)
//! - Inference limits and thresholds
//! - Cooperative cancellation (`CancellationToken`)

pub mod interner;
pub use interner::{Atom, ShardedInterner};

pub mod span;
pub use span::{FileId, Span};

pub mod visibility;
pub use visibility::Visibility;

pub mod limits;

pub mod cancel;
pub use cancel::CancellationToken;
