//! Property-based tests for wire types.
