//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm. Every stochastic decision in the kernel
//! (binding waiting times, which transcript binds, terminator read-through)
//! draws from an `RngManager` owned by the process instance and passed down
//! explicitly. There is no global generator.

mod xorshift;

pub use xorshift::RngManager;
