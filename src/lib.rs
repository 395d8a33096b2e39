//! FitTrack core library
//!
//! Domain rules engine for personal fitness and nutrition tracking:
//! content moderation, nutrition goal computation, the exercise taxonomy,
//! and daily nutrition aggregation.

pub mod aggregate;
pub mod db;
pub mod goals;
pub mod models;
pub mod moderation;
pub mod taxonomy;
