// Crate root library declaration and module exports.
pub mod cli;
pub mod config;
pub mod context;
pub mod export;
pub mod future_log;
pub mod markdown;
pub mod model;
pub mod planner;
pub mod storage;
