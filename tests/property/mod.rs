//! Property-based tests for patience.
//!
//! Run with: cargo test --test property_tests
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold across both patterns.

pub mod deadline;
pub mod retry;
