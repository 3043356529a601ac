//! School-year calculation
//!
//! The audit log is partitioned per school year. The boundary falls on
//! July 15: timestamps strictly after July 15 of year Y belong to `Y/Y+1`,
//! timestamps on or before July 15 belong to `Y-1/Y`.

use chrono::{DateTime, Datelike, Utc};

/// School year containing `timestamp`, rendered with `delimiter`
/// (e.g. `2025/2026` or `2025_2026`).
pub fn school_year_for(timestamp: DateTime<Utc>, delimiter: &str) -> String {
    let year = timestamp.year();
    let after_boundary = (timestamp.month(), timestamp.day()) > (7, 15);
    if after_boundary {
        format!("{}{}{}", year, delimiter, year + 1)
    } else {
        format!("{}{}{}", year - 1, delimiter, year)
    }
}

/// School year containing the current instant
pub fn current_school_year(delimiter: &str) -> String {
    school_year_for(Utc::now(), delimiter)
}
