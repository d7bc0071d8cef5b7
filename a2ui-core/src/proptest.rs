//! Property-based tests for path handling and tree building using proptest.
//!
//! These tests verify the structural invariants the renderer relies on:
//!
//! - Dotted, bracketed and slashed paths normalize identically
//! - A write followed by a read at the same path returns the written value
//! - Templates expand to exactly one node per element, in order, for
//!   sequences and for keyed structures sent over the wire
//! - Reference cycles of any length terminate with the back-edge dropped
