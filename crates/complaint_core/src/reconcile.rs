//! Reconciliation of an edited complaints table back into the store.
//!
//! Rows are matched to stored records by protocol, never by storage key: the
//! edited table does not carry keys. Planning is pure; applying issues one
//! partial update per planned row, in row order, and is not transactional.

use crate::error::Result;
use crate::schema::{EditedRow, Snapshot, StaffUpdate};
use crate::store::ComplaintStore;
use std::collections::HashMap;
use time::macros::format_description;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    pub key: String,
    pub protocol: String,
    pub fields: StaffUpdate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub updates: Vec<PlannedUpdate>,
    pub rows_seen: usize,
    pub skipped_blank: usize,
    pub skipped_unmatched: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub rows_seen: usize,
    pub updated: usize,
    pub skipped_blank: usize,
    pub skipped_unmatched: usize,
}

/// Matches each edited row to a stored record and computes its staff-field update.
///
/// Rows with a blank protocol, or a protocol no stored record carries, are
/// skipped and counted. When several stored records share a protocol the first
/// in key order is the match. Duplicate rows each yield an update; the later
/// one is applied last.
pub fn plan(rows: &[EditedRow], snapshot: &Snapshot) -> ReconcilePlan {
    let mut by_protocol: HashMap<&str, &str> = HashMap::new();
    for (key, complaint) in snapshot {
        by_protocol
            .entry(complaint.protocol.as_str())
            .or_insert(key.as_str());
    }

    let mut plan = ReconcilePlan {
        rows_seen: rows.len(),
        ..ReconcilePlan::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let protocol = row.protocol.trim();
        if protocol.is_empty() {
            debug!(row = index, "Skipping row without protocol");
            plan.skipped_blank += 1;
            continue;
        }

        let Some(key) = by_protocol.get(protocol) else {
            warn!(row = index, protocol, "No stored complaint carries this protocol");
            plan.skipped_unmatched += 1;
            continue;
        };

        plan.updates.push(PlannedUpdate {
            key: (*key).to_string(),
            protocol: protocol.to_string(),
            fields: staff_update(row),
        });
    }

    plan
}

/// The staff-owned fields carried by `row`, with nulls written as empty.
pub fn staff_update(row: &EditedRow) -> StaffUpdate {
    let attended_at = row
        .attended_at
        .and_then(|date| date.format(format_description!("[year]-[month]-[day]")).ok())
        .unwrap_or_default();
    StaffUpdate {
        attended_at,
        status: row.status.clone().unwrap_or_default(),
        report: row.report.clone().unwrap_or_default(),
    }
}

/// Issues the planned updates in order. Stops at the first store failure;
/// updates issued before it stay applied.
pub fn apply<S: ComplaintStore>(store: &mut S, plan: &ReconcilePlan) -> Result<ReconcileSummary> {
    for (applied, update) in plan.updates.iter().enumerate() {
        if let Err(err) = store.update_fields(&update.key, &update.fields) {
            warn!(
                applied,
                pending = plan.updates.len() - applied,
                protocol = %update.protocol,
                error = %err,
                "Reconciliation stopped with updates partially applied"
            );
            return Err(err);
        }
        debug!(key = %update.key, protocol = %update.protocol, "Applied staff update");
    }

    let summary = ReconcileSummary {
        rows_seen: plan.rows_seen,
        updated: plan.updates.len(),
        skipped_blank: plan.skipped_blank,
        skipped_unmatched: plan.skipped_unmatched,
    };
    info!(
        rows = summary.rows_seen,
        updated = summary.updated,
        skipped_blank = summary.skipped_blank,
        skipped_unmatched = summary.skipped_unmatched,
        "Reconciled edited table"
    );
    Ok(summary)
}
