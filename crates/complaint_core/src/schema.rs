use crate::error::ComplaintError;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Every stored record keyed by the store's opaque key, in key order.
pub type Snapshot = BTreeMap<String, Complaint>;

/// Column order of the complaints table, as shown to staff and written to sheets.
pub const TABLE_COLUMNS: [&str; 11] = [
    "protocol",
    "created_at",
    "neighborhood",
    "street",
    "house_number",
    "postal_code",
    "category",
    "description",
    "attended_at",
    "status",
    "report",
];

/// Complaint category. Labels outside the fixed set, which only older or
/// hand-edited documents carry, are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Arboviroses,
    Scorpion,
    Rats,
    Snails,
    UnsanitaryConditions,
    TallGrass,
    Other(String),
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Arboviroses,
        Category::Scorpion,
        Category::Rats,
        Category::Snails,
        Category::UnsanitaryConditions,
        Category::TallGrass,
    ];

    pub fn label(&self) -> &str {
        match self {
            Category::Arboviroses => "Arboviroses",
            Category::Scorpion => "Scorpion",
            Category::Rats => "Rats",
            Category::Snails => "Snails",
            Category::UnsanitaryConditions => "Unsanitary Conditions",
            Category::TallGrass => "Tall Grass",
            Category::Other(label) => label,
        }
    }
}

/// A document without a category reads as an empty label.
impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ComplaintError;

    /// Accepts the display label ("Tall Grass") or its kebab form ("tall-grass").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', " ");
        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ComplaintError::InvalidValue(format!("unknown category: {s}")))
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        label.parse().unwrap_or(Category::Other(label))
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl JsonSchema for Category {
    fn schema_name() -> String {
        "Category".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        labelled_string(generator, Category::ALL.iter().map(Category::label))
    }
}

/// Outcome recorded by staff. `Unset` is stored as the empty string; labels
/// outside the fixed set are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Unset,
    Archived,
    InfractionNotice,
    PenaltyNotice,
    Other(String),
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Unset,
        Status::Archived,
        Status::InfractionNotice,
        Status::PenaltyNotice,
    ];

    pub fn label(&self) -> &str {
        match self {
            Status::Unset => "",
            Status::Archived => "Archived",
            Status::InfractionNotice => "Infraction Notice",
            Status::PenaltyNotice => "Penalty Notice",
            Status::Other(label) => label,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = ComplaintError;

    /// Strict: only the fixed labels, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Status::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ComplaintError::InvalidValue(format!("unknown status: {s}")))
    }
}

impl From<String> for Status {
    fn from(label: String) -> Self {
        label.parse().unwrap_or(Status::Other(label))
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        match status {
            Status::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl JsonSchema for Status {
    fn schema_name() -> String {
        "Status".to_string()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        labelled_string(generator, Status::ALL.iter().map(Status::label))
    }
}

/// A string schema listing the known labels as examples; other labels still load.
fn labelled_string<'a>(
    generator: &mut SchemaGenerator,
    labels: impl Iterator<Item = &'a str>,
) -> Schema {
    let mut schema = String::json_schema(generator).into_object();
    schema.metadata().examples = labels.map(serde_json::Value::from).collect();
    Schema::Object(schema)
}

/// A persisted complaint, exactly as stored per record.
///
/// Every field reads leniently: absent or null reads as empty, numbers and
/// booleans read as their text, so one odd document never blocks a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Complaint {
    #[serde(default, deserialize_with = "lenient")]
    pub protocol: String,      // "<year><serial>", e.g. "20243"
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: String,    // "YYYY-MM-DD HH:MM:SS", local time
    #[serde(default, deserialize_with = "lenient")]
    pub neighborhood: String,
    #[serde(default, deserialize_with = "lenient")]
    pub street: String,
    #[serde(default, deserialize_with = "lenient")]
    pub house_number: String,
    #[serde(default, deserialize_with = "lenient")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Category,
    #[serde(default, deserialize_with = "lenient")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub attended_at: String,   // "YYYY-MM-DD" or empty
    #[serde(default, deserialize_with = "lenient")]
    pub status: Status,
    #[serde(default, deserialize_with = "lenient")]
    pub report: String,
}

/// A submission from the complaint form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewComplaint {
    pub neighborhood: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub category: Category,
    pub description: String,
}

/// One row of the edited table handed back for reconciliation.
///
/// Display-only columns are not carried; reconciliation never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EditedRow {
    #[serde(default)]
    pub protocol: String,
    #[serde(default, with = "iso_date::option")]
    #[schemars(with = "Option<String>")]
    pub attended_at: Option<Date>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub report: Option<String>,
}

/// The staff-owned fields. This is the only partial write the core ever issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUpdate {
    pub attended_at: String,
    pub status: Status,
    pub report: String,
}

/// Reads any scalar as text and null as empty, then converts.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let text = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a scalar, got {other}"
            )));
        }
    };
    Ok(T::from(text))
}
