pub mod constants;
pub mod engine;
pub mod error;
pub mod high_score_store;
pub mod level;
pub mod maze;
pub mod placement;
pub mod rng;
pub mod types;
