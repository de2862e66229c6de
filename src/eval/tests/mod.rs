//! Evaluation state tests.
//!
//! - `state.rs` - Phase switching, stale accumulators and the modifier hookup
//! - `proptest.rs` - Property-based tests over random move sequences

mod state;
