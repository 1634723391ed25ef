//! CLI Exit Code Registry
//!
//! Single source of truth for `portavoz` exit codes. Scripts that run the
//! tool in a pipeline branch on these, so treat them as a contract.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success (unresolved names alone are not a failure)        |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage error (bad arguments, unsupported file type)        |
//! | 3    | IO error (cannot read or write a table or report)         |
//! | 4    | Configuration error (no identifier or name column)        |
//! | 5    | Config file invalid (TOML syntax or out-of-range values)  |
//! | 6    | Unresolved names found and `--strict` was given           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant here
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Map it in `CliError::from_resolve` or the command that raises it

use portavoz_resolve::ResolveError;

/// Success - command completed.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unsupported extension.
pub const EXIT_USAGE: u8 = 2;

/// Input, reference or output file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Reference table lacks a usable identifier column, or no name column
/// could be selected in the input table.
pub const EXIT_CONFIGURATION: u8 = 4;

/// Config file could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// `--strict`: at least one name was not found or was ambiguous.
pub const EXIT_UNRESOLVED: u8 = 6;

/// Map an engine/IO error to its exit code.
pub fn resolve_exit_code(err: &ResolveError) -> u8 {
    match err {
        ResolveError::ConfigParse(_) | ResolveError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ResolveError::Configuration { .. } => EXIT_CONFIGURATION,
        ResolveError::Io(_) => EXIT_IO,
    }
}
