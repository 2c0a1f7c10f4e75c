pub mod console;

pub use console::{print_completion, print_summary, summarize, Summary};
