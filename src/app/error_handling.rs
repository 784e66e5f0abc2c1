//! Error handling utilities

use crate::error::Error;
use tracing::error;

const GENERAL_ERROR: i32 = 1;
const CONFIG_ERROR: i32 = 2;

/// Exit status for an error: 2 for configuration problems, 1 otherwise.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<Error>() {
        Some(Error::Config(_)) => CONFIG_ERROR,
        _ => GENERAL_ERROR,
    }
}

/// Print the error (with its chain when verbose) and exit.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    eprintln!("Error: {error}");
    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {i}: {cause}");
        }
    }

    std::process::exit(exit_code(&error))
}
