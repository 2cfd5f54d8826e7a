//! Cross-component integration tests for the jay compiler workspace.
//!
//! The actual suites live under `tests/`; this crate body is intentionally
//! empty.
