/// Benchmarking utilities for comparing kernel paths.
pub mod benchmark;
