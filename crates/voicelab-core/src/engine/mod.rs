pub mod runner;

pub use runner::{RunPolicy, RunReport, Runner};
