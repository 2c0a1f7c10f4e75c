pub mod assess;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod judge;
pub mod log;
pub mod model;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod retry;
