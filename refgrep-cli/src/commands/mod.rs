//! CLI command implementations

pub mod console;
pub mod csv;
mod narrate;
mod usage;

pub use console::ConsoleArgs;
pub use csv::CsvArgs;

/// Process exit status on success (including "nothing to do")
pub const EXIT_OK: u8 = 0;

/// Process exit status when an input list file is missing
pub const EXIT_USAGE: u8 = 2;
