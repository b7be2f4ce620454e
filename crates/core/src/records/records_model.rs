//! Record domain models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header of the column that uniquely identifies a row.
pub const KEY_COLUMN: &str = "TEST POINT";

/// Columns written by the import process and never touched by submissions.
pub const READ_ONLY_COLUMNS: [&str; 6] = [
    KEY_COLUMN,
    "LINE ITEM",
    "TREATMENT TYPE",
    "Chainage",
    "Latitude",
    "Longitude",
];

/// Fields a submission may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutableField {
    TestDate,
    LineItemCompleted,
    PavementThickness,
    CrossfallOutbound,
    CrossfallOutboundPhoto1,
    CrossfallOutboundPhoto2,
    CrossfallInbound,
    CrossfallInboundPhoto1,
    CrossfallInboundPhoto2,
    RoadWidthTotal,
    Comments,
}

impl MutableField {
    pub const ALL: [MutableField; 11] = [
        MutableField::TestDate,
        MutableField::LineItemCompleted,
        MutableField::PavementThickness,
        MutableField::CrossfallOutbound,
        MutableField::CrossfallOutboundPhoto1,
        MutableField::CrossfallOutboundPhoto2,
        MutableField::CrossfallInbound,
        MutableField::CrossfallInboundPhoto1,
        MutableField::CrossfallInboundPhoto2,
        MutableField::RoadWidthTotal,
        MutableField::Comments,
    ];

    /// Header of the column holding this field.
    pub fn column(self) -> &'static str {
        match self {
            MutableField::TestDate => "Test Date",
            MutableField::LineItemCompleted => "Line Item Completed",
            MutableField::PavementThickness => "Pavement Thickness (mm)",
            MutableField::CrossfallOutbound => "Crossfall Outbound (%)",
            MutableField::CrossfallOutboundPhoto1 => "Crossfall Outbound Photo 1",
            MutableField::CrossfallOutboundPhoto2 => "Crossfall Outbound Photo 2",
            MutableField::CrossfallInbound => "Crossfall Inbound (%)",
            MutableField::CrossfallInboundPhoto1 => "Crossfall Inbound Photo 1",
            MutableField::CrossfallInboundPhoto2 => "Crossfall Inbound Photo 2",
            MutableField::RoadWidthTotal => "Road Width Total (m)",
            MutableField::Comments => "Comments",
        }
    }

    /// Measurement fields that must hold a decimal number when supplied.
    pub fn is_measurement(self) -> bool {
        matches!(
            self,
            MutableField::PavementThickness
                | MutableField::CrossfallOutbound
                | MutableField::CrossfallInbound
                | MutableField::RoadWidthTotal
        )
    }
}

/// Mutable-field payload of one submission.
///
/// Serialized as a JSON object keyed by camelCase field name. Values are kept
/// verbatim; a blank value means "keep what the row already has".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordUpdate(BTreeMap<MutableField, String>);

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: MutableField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: MutableField, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: MutableField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MutableField, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Supplied values that will actually overwrite a cell.
    pub fn effective_values(&self) -> impl Iterator<Item = (MutableField, &str)> {
        self.iter().filter(|(_, value)| !value.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.effective_values().next().is_none()
    }
}

/// One row of a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub key: String,
    /// Cell values keyed by column header.
    pub values: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn field(&self, field: MutableField) -> Option<&str> {
        self.get(field.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_uses_camel_case_keys() {
        let update = RecordUpdate::new()
            .with(MutableField::RoadWidthTotal, "6.2")
            .with(MutableField::CrossfallInboundPhoto2, "file:///p2.jpg");
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "crossfallInboundPhoto2": "file:///p2.jpg",
                "roadWidthTotal": "6.2"
            })
        );
    }

    #[test]
    fn update_rejects_read_only_and_unknown_keys() {
        let result = serde_json::from_str::<RecordUpdate>(r#"{"chainage":"120"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_values_are_not_effective() {
        let update = RecordUpdate::new()
            .with(MutableField::Comments, "  ")
            .with(MutableField::PavementThickness, "");
        assert!(update.is_empty());
        assert_eq!(update.iter().count(), 2);
    }

    #[test]
    fn mutable_columns_do_not_overlap_read_only_columns() {
        for field in MutableField::ALL {
            assert!(!READ_ONLY_COLUMNS.contains(&field.column()));
        }
    }
}
