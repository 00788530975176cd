//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: batch scripts that map a
//! folder of saved selections rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain     | Description                                      |
//! |------|------------|--------------------------------------------------|
//! | 0    | Universal  | Success                                          |
//! | 1    | Universal  | General error (unspecified)                      |
//! | 2    | Universal  | CLI usage error (bad args, missing workbook)     |
//! | 3    | selection  | Workbook not a recognized saved selection        |
//! | 4    | config     | Settings file, environment or pattern invalid    |
//! | 5    | inventory  | Inventory database connection or query failed    |
//! | 6    | parcels    | Parcel basemap or county layer unusable          |
//! | 7    | output     | Output container or feature class write failed   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - every identifier processed. Skipped records are not failures.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, workbook file missing.
/// clap exits with this code on its own parse errors.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Mapping run (3-7)
// =============================================================================

/// No `tblInvSelect`/`tblResSelect` sheet, wrong header cells, or a cell
/// that is not an identifier.
pub const EXIT_SELECTION: u8 = 3;

/// Settings file unreadable or invalid, `ICDB_*` variables missing or
/// malformed, override pattern does not compile, no basemap configured.
pub const EXIT_CONFIG: u8 = 4;

/// Inventory unreachable or a query failed.
pub const EXIT_INVENTORY: u8 = 5;

/// Basemap missing or not a GeoPackage, county layer missing, search failed.
pub const EXIT_PARCELS: u8 = 6;

/// Output container or feature class could not be created or written.
pub const EXIT_OUTPUT: u8 = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_SELECTION,
            EXIT_CONFIG,
            EXIT_INVENTORY,
            EXIT_PARCELS,
            EXIT_OUTPUT,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
