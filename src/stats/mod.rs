//! Progress statistics for kelime.
//!
//! Counts of words, learned words and lists, plus the average quiz score,
//! computed from the user's raw collections.

pub mod tracker;

pub use tracker::{compute_stats, load_stats, Stats};
