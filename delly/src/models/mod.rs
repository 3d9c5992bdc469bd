//! Domain models for warranty lookups.
//!
//! - [`ServiceTag`] - Dell device identifier, the join key between rows and API results
//! - [`AssetHeader`] - Per-device record returned by the asset header endpoint
//! - [`AssetWarranty`] / [`Entitlement`] - Entitlement records for extended lookups
//! - [`WarrantyInfo`] - Field/value table shown by the `info` command

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written when a value is missing.
pub const UNKNOWN: &str = "Unknown";

// =============================================================================
// Service Tag
// =============================================================================

/// A Dell service tag.
///
/// The raw value is kept verbatim so it can be written back untouched;
/// comparisons go through [`ServiceTag::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceTag(String);

impl ServiceTag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The value as it appeared in the input.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed, upper-cased form used for lookups and joins.
    pub fn normalized(&self) -> String {
        self.0.trim().to_uppercase()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// =============================================================================
// API Records
// =============================================================================

/// Asset header as returned by the `assets` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHeader {
    #[serde(default)]
    pub id: Option<i64>,
    pub service_tag: String,
    #[serde(default)]
    pub order_buid: Option<i64>,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    #[serde(default)]
    pub ship_date: Option<String>,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub local_channel: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    /// Model name, e.g. "Latitude 5420"
    #[serde(default)]
    pub product_line_description: Option<String>,
    #[serde(default)]
    pub product_family: Option<String>,
    #[serde(default)]
    pub system_description: Option<String>,
    #[serde(default)]
    pub product_lob_description: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub duplicated: Option<bool>,
    #[serde(default)]
    pub invalid: Option<bool>,
}

/// One warranty or service contract line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    #[serde(default)]
    pub item_number: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub entitlement_type: Option<String>,
    #[serde(default)]
    pub service_level_code: Option<String>,
    #[serde(default)]
    pub service_level_description: Option<String>,
    #[serde(default)]
    pub service_level_group: Option<i64>,
}

/// Asset record from the `asset-entitlements` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetWarranty {
    #[serde(flatten)]
    pub header: AssetHeader,
    #[serde(default)]
    pub entitlements: Vec<Entitlement>,
}

// =============================================================================
// Display Table
// =============================================================================

/// Two-column (Field, Value) table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarrantyInfo {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl WarrantyInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), rows: Vec::new() }
    }

    pub fn add_row(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.rows.push((field.into(), value.into()));
    }

    /// Value of the first row with the given field name.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for WarrantyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field_width = self
            .rows
            .iter()
            .map(|(field, _)| field.chars().count())
            .chain(std::iter::once("Field".len()))
            .max()
            .unwrap_or(0);
        let value_width = self
            .rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .chain(std::iter::once("Value".len()))
            .max()
            .unwrap_or(0);
        let rule = format!("+-{}-+-{}-+", "-".repeat(field_width), "-".repeat(value_width));

        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "| {:<fw$} | {:<vw$} |", "Field", "Value", fw = field_width, vw = value_width)?;
        writeln!(f, "{}", rule)?;
        for (field, value) in &self.rows {
            writeln!(f, "| {:<fw$} | {:<vw$} |", field, value, fw = field_width, vw = value_width)?;
        }
        write!(f, "{}", rule)
    }
}
