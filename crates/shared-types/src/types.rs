use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation failures for records crossing the service boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("Search item '{id}' has empty text")]
    EmptyText { id: String },

    #[error("Invalid search items JSON: {0}")]
    Json(String),
}

/// Risk level attached to a search item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal string to locate, tagged with review metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub text: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub suggested_fix: Option<String>,
}

impl SearchItem {
    /// Create an item with default (medium) severity and no annotations
    pub fn new(id: impl Into<String>, item_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            text: text.into(),
            severity: Severity::default(),
            reason: None,
            suggested_fix: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Check the invariants serde cannot express
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.text.is_empty() {
            return Err(RecordError::EmptyText {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Parse and validate a JSON array of search items
pub fn parse_search_items(json: &str) -> Result<Vec<SearchItem>, RecordError> {
    let items: Vec<SearchItem> =
        serde_json::from_str(json).map_err(|e| RecordError::Json(e.to_string()))?;
    validate_all(items)
}

/// Same as [`parse_search_items`] for an already-parsed JSON value
pub fn search_items_from_value(value: serde_json::Value) -> Result<Vec<SearchItem>, RecordError> {
    let items: Vec<SearchItem> =
        serde_json::from_value(value).map_err(|e| RecordError::Json(e.to_string()))?;
    validate_all(items)
}

fn validate_all(items: Vec<SearchItem>) -> Result<Vec<SearchItem>, RecordError> {
    for item in &items {
        item.validate()?;
    }
    Ok(items)
}

/// A highlight rectangle, normalized to the page size (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Position {
    /// True when the rectangle is ordered and inside the unit square
    pub fn is_within_page(&self) -> bool {
        let unit = |v: f64| (0.0..=1.0).contains(&v);
        unit(self.x0)
            && unit(self.y0)
            && unit(self.x1)
            && unit(self.y1)
            && self.x0 <= self.x1
            && self.y0 <= self.y1
    }
}

/// A matched search item together with every place it was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub text: String,
    pub severity: Severity,
    pub reason: Option<String>,
    pub suggested_fix: Option<String>,
    pub positions: Vec<Position>,
}

impl Highlight {
    pub fn new(item: &SearchItem, positions: Vec<Position>) -> Self {
        Self {
            id: item.id.clone(),
            item_type: item.item_type.clone(),
            text: item.text.clone(),
            severity: item.severity,
            reason: item.reason.clone(),
            suggested_fix: item.suggested_fix.clone(),
            positions,
        }
    }
}

/// Outcome of one locate request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorResult {
    pub highlights: Vec<Highlight>,
    pub not_found: Vec<String>,
    pub page_count: usize,
    /// Set only when the document could not be opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LocatorResult {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            ..Self::default()
        }
    }

    /// The result returned when the document itself is unusable
    pub fn open_failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn severity() -> impl Strategy<Value = Severity> {
        prop_oneof![
            Just(Severity::Low),
            Just(Severity::Medium),
            Just(Severity::High),
            Just(Severity::Critical),
        ]
    }

    proptest! {
        /// Property: severity names are lowercase on the wire
        #[test]
        fn severity_wire_name_matches_display(s in severity()) {
            let json = serde_json::to_string(&s).unwrap();
            prop_assert_eq!(json, format!("\"{}\"", s));
        }

        /// Property: any non-empty text passes validation
        #[test]
        fn non_empty_text_is_valid(text in ".{1,40}") {
            let item = SearchItem::new("id", "type", text);
            prop_assert!(item.validate().is_ok());
        }
    }
}
