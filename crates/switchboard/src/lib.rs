pub mod classifier;
pub mod errors;
pub mod generation;
pub mod models;
pub mod providers;
