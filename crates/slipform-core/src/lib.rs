//! Core infrastructure for slipform.
//!
//! This crate provides language-agnostic infrastructure:
//! - Byte spans over source text
//! - Error types and error codes
//! - JSON output types for CLI responses
//! - Text position utilities and diff generation

pub mod diff;
pub mod error;
pub mod output;
pub mod span;
pub mod text;
