//! Storage layer for comparison records.

pub mod jsonl;

pub use jsonl::JsonlWriter;
