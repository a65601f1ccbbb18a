//! Idempotent Markdown injection between marker comments
//!
//! The injector owns the one correctness property the whole tool hangs on:
//! running build-then-write twice over unchanged input produces byte-identical
//! output the second time. Everything outside the marker span is preserved
//! byte-for-byte, including the presence or absence of a trailing newline.

mod diff;
mod injector;

pub use diff::unified_diff;
pub use injector::{MarkerError, MarkerPair, build_document};
