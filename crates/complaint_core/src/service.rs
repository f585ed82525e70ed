//! The two staff interactions, submission and bulk save, plus table listing.
//!
//! Each call runs to completion against the store before returning. Nothing
//! here serializes concurrent submitters.

use crate::error::{ComplaintError, Result};
use crate::protocol::next_protocol;
use crate::reconcile::{self, ReconcileSummary};
use crate::schema::{Complaint, EditedRow, NewComplaint, Status};
use crate::store::ComplaintStore;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub key: String,
    pub protocol: String,
}

/// Allocates a protocol for `now`'s year and appends the new complaint with
/// empty staff fields.
pub fn submit<S: ComplaintStore>(
    store: &mut S,
    new: NewComplaint,
    now: OffsetDateTime,
) -> Result<Receipt> {
    let existing = store.get_all()?;
    let protocol = next_protocol(now.year(), existing.values());

    let created_at = now
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .map_err(|err| ComplaintError::InvalidValue(err.to_string()))?;

    let record = Complaint {
        protocol: protocol.clone(),
        created_at,
        neighborhood: new.neighborhood,
        street: new.street,
        house_number: new.house_number,
        postal_code: new.postal_code,
        category: new.category,
        description: new.description,
        attended_at: String::new(),
        status: Status::Unset,
        report: String::new(),
    };

    let key = store.append(&record)?;
    info!(%protocol, %key, category = %record.category, "Registered complaint");
    Ok(Receipt { key, protocol })
}

/// Re-reads the store and writes the staff fields of every matching row.
///
/// A failed read aborts before any update is issued.
pub fn save<S: ComplaintStore>(store: &mut S, rows: &[EditedRow]) -> Result<ReconcileSummary> {
    let snapshot = store.get_all()?;
    let plan = reconcile::plan(rows, &snapshot);
    reconcile::apply(store, &plan)
}

/// All stored complaints in store key order.
pub fn list<S: ComplaintStore>(store: &S) -> Result<Vec<Complaint>> {
    Ok(store.get_all()?.into_values().collect())
}

/// Complaints whose protocol contains `term`, ignoring case. A blank term
/// matches everything.
pub fn search<S: ComplaintStore>(store: &S, term: &str) -> Result<Vec<Complaint>> {
    let term = term.trim().to_lowercase();
    Ok(list(store)?
        .into_iter()
        .filter(|complaint| term.is_empty() || complaint.protocol.to_lowercase().contains(&term))
        .collect())
}
