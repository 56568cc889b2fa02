// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Parser for the table printed by `esrally list tracks`.
//!
//! The banner and footer sizes are fixed by the tool's current output
//! format and are not derived from the content. A change in the tool's
//! banner breaks this parser.

use serde::Serialize;

/// Lines of banner and table heading before the first track row.
pub const BANNER_LINES: usize = 12;

/// Blank and informational lines after the last track row.
///
/// Counted on captured lines, which carry no empty entry for the final
/// newline. Output ending in a single newline loses one extra line
/// compared to splitting the raw text on `\n`; the two counts agree only
/// when the output ends with a blank line.
pub const FOOTER_LINES: usize = 5;

/// A track and the challenges it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackInfo {
    pub name: String,
    pub challenges: Vec<String>,
}

impl TrackInfo {
    /// Parse one table row: first column is the name, last column is the
    /// comma-separated challenge list.
    pub fn parse_row(row: &str) -> Option<Self> {
        let mut columns = row.split_whitespace();
        let name = columns.next()?;
        let challenges = columns.last()?;

        Some(Self {
            name: name.to_string(),
            challenges: challenges
                .split(',')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

/// Extract every track row from the raw output lines.
///
/// Rows with fewer than two columns are skipped.
pub fn parse_track_table<S: AsRef<str>>(lines: &[S]) -> Vec<TrackInfo> {
    if lines.len() <= BANNER_LINES + FOOTER_LINES {
        return Vec::new();
    }

    lines[BANNER_LINES..lines.len() - FOOTER_LINES]
        .iter()
        .filter_map(|line| {
            let row: &str = line.as_ref();
            let parsed = TrackInfo::parse_row(row);
            if parsed.is_none() {
                tracing::debug!(row = %row, "Skipping unparsable track row");
            }
            parsed
        })
        .collect()
}
