//! The editable complaints table as a CSV sheet.
//!
//! `export` writes every column staff see; `import` reads an edited sheet back
//! into reconciliation rows and ignores the display-only columns.

use anyhow::{Context, Result, bail};
use complaint_core::schema::TABLE_COLUMNS;
use complaint_core::{Complaint, EditedRow, Status};
use csv::StringRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use time::Date;
use time::macros::format_description;
use tracing::{debug, info};

pub fn export<W: Write>(records: &[Complaint], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(TABLE_COLUMNS)?;
    for complaint in records {
        wtr.write_record(complaint.table_cells())?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_to_path(records: &[Complaint], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    export(records, file)?;
    info!(rows = records.len(), path = %path.display(), "Exported complaints sheet");
    Ok(())
}

/// Reads an edited sheet. The header must name every column reconciliation
/// writes from, and every row must have as many cells as the header.
pub fn import<R: Read>(reader: R) -> Result<Vec<EditedRow>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns = Columns::locate(rdr.headers()?)?;

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        // 1-based, header excluded
        let row_number = index + 1;
        let record = record.with_context(|| format!("row {row_number}"))?;
        rows.push(columns.edited_row(&record, row_number)?);
    }
    Ok(rows)
}

pub fn import_from_path(path: &Path) -> Result<Vec<EditedRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let rows = import(file).with_context(|| format!("reading sheet {}", path.display()))?;
    info!(rows = rows.len(), path = %path.display(), "Imported edited sheet");
    Ok(rows)
}

/// Positions of the columns reconciliation reads.
struct Columns {
    protocol: usize,
    attended_at: usize,
    status: usize,
    report: usize,
}

impl Columns {
    /// A sheet without one of these columns would blank that field on every
    /// matched record, so it is refused outright.
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .with_context(|| format!("sheet has no {name:?} column"))
        };
        Ok(Self {
            protocol: find("protocol")?,
            attended_at: find("attended_at")?,
            status: find("status")?,
            report: find("report")?,
        })
    }

    fn edited_row(&self, record: &StringRecord, row_number: usize) -> Result<EditedRow> {
        let cell = |column: usize| record.get(column).unwrap_or_default();
        let non_blank = |column: usize| Some(cell(column)).filter(|value| !value.trim().is_empty());

        let status = match non_blank(self.status) {
            Some(label) => match label.parse::<Status>() {
                Ok(status) => Some(status),
                Err(_) => bail!("row {row_number}: unknown status {label:?}"),
            },
            None => None,
        };

        Ok(EditedRow {
            protocol: cell(self.protocol).to_string(),
            attended_at: non_blank(self.attended_at).and_then(|value| parse_date(value, row_number)),
            status,
            report: non_blank(self.report).map(str::to_string),
        })
    }
}

/// Reads `YYYY-MM-DD`, dropping any trailing time. Anything else reads as null.
fn parse_date(value: &str, row_number: usize) -> Option<Date> {
    let day = value
        .trim()
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or_default();
    match Date::parse(day, format_description!("[year]-[month]-[day]")) {
        Ok(date) => Some(date),
        Err(err) => {
            debug!(row = row_number, value, error = %err, "Unreadable attendance date treated as empty");
            None
        }
    }
}
