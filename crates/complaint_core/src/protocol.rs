//! Year-scoped protocol numbering.
//!
//! The serial is derived from a full scan of the stored records rather than a
//! dedicated counter. Two submitters that scan the same snapshot will allocate
//! the same protocol; callers must serialize submissions.

use crate::schema::Complaint;
use tracing::debug;

/// Returns the next protocol for `year`: the year followed by
/// `count(protocols starting with the year) + 1`, unpadded.
pub fn next_protocol<'a, I>(year: i32, stored: I) -> String
where
    I: IntoIterator<Item = &'a Complaint>,
{
    let prefix = year.to_string();
    let taken = stored
        .into_iter()
        .filter(|complaint| complaint.protocol.starts_with(&prefix))
        .count();
    let protocol = format_protocol(year, taken + 1);
    debug!(year, taken, %protocol, "Allocated protocol");
    protocol
}

pub fn format_protocol(year: i32, serial: usize) -> String {
    format!("{year}{serial}")
}
