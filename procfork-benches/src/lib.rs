//! Benchmarks for the `procfork` crate live in `benches/`.
