//! Text rendering of verification results.

use crate::reconcile::{Outcome, Reconciliation};
use std::io::{self, Write};

pub const CLEAN_LINE: &str = "Validation complete, no errors.";
pub const FAILED_LINE: &str = "Validation failed.";

/// Prefix character used for an outcome, `None` for matches.
pub fn marker(outcome: Outcome) -> Option<char> {
    match outcome {
        Outcome::Match => None,
        Outcome::MissingFromDisk => Some('-'),
        Outcome::Mismatch => Some('!'),
        Outcome::ExtraOnDisk => Some('+'),
    }
}

/// One `<marker>  <path>` line per discrepancy.
pub fn write_discrepancies<W: Write>(rec: &Reconciliation, mut w: W) -> io::Result<()> {
    for entry in rec.entries() {
        if let Some(m) = marker(entry.outcome) {
            writeln!(w, "{m}  {}", entry.path)?;
        }
    }
    Ok(())
}

pub fn verdict_line(clean: bool) -> &'static str {
    if clean {
        CLEAN_LINE
    } else {
        FAILED_LINE
    }
}
