//! Functional units shared by the execution engines.
//!
//! 1. **ALU:** Pure arithmetic/logic evaluation with signed-overflow traps.
//! 2. **Cache:** The set-associative L1 model with replacement and write
//!    policies and access statistics.

/// Arithmetic/logic unit.
pub mod alu;

/// Set-associative cache model.
pub mod cache;
