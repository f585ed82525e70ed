pub mod config;
pub mod db;
pub mod error;
pub mod protocol;
pub mod reconcile;
pub mod schema;
pub mod service;
pub mod store;

pub use error::{ComplaintError, Result};
pub use schema::{Category, Complaint, EditedRow, NewComplaint, Snapshot, StaffUpdate, Status};
pub use store::{ComplaintStore, MemoryStore};

#[cfg(test)]
mod tests;
