/// Shared data structures for the application state
///
/// These types represent the data model that flows between
/// the REST layer, the page controller and the UI layer.
use chrono::{DateTime, NaiveDate};
use serde_json::{Number, Value};
use std::fmt;
use uuid::Uuid;

/// Attributes of one record: field name to primitive JSON value
pub type Fields = serde_json::Map<String, Value>;

/// Real key of a record the server knows about
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Keys come back as strings (natural keys) or numbers (sequences).
    /// Anything else, or a blank string, is not a usable key.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-side identifier of a row that has not been saved yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempId(Uuid);

impl TempId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// How a row is found again after it has been copied around
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Temp(TempId),
    Key(RecordKey),
}

/// One entity instance
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Inserted locally, not yet accepted by the server
    New { temp_id: TempId, fields: Fields },
    /// Loaded from the server
    Persisted { id: RecordKey, fields: Fields },
}

impl Record {
    /// Wrap a server row. Returns `None` when the key field is missing.
    pub fn persisted(fields: Fields, key_field: &str) -> Option<Self> {
        let id = fields.get(key_field).and_then(RecordKey::from_value)?;
        Some(Record::Persisted { id, fields })
    }

    /// A new row with an empty value for every column
    pub fn blank(temp_id: TempId, columns: &[Column]) -> Self {
        Record::New {
            temp_id,
            fields: blank_fields(columns),
        }
    }

    pub fn identity(&self) -> Identity {
        match self {
            Record::New { temp_id, .. } => Identity::Temp(*temp_id),
            Record::Persisted { id, .. } => Identity::Key(id.clone()),
        }
    }

    /// Temp ids only match new rows, keys only match persisted ones
    pub fn matches(&self, identity: &Identity) -> bool {
        match (self, identity) {
            (Record::New { temp_id, .. }, Identity::Temp(other)) => temp_id == other,
            (Record::Persisted { id, .. }, Identity::Key(other)) => id == other,
            _ => false,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Record::New { .. })
    }

    pub fn key(&self) -> Option<&RecordKey> {
        match self {
            Record::Persisted { id, .. } => Some(id),
            Record::New { .. } => None,
        }
    }

    pub fn fields(&self) -> &Fields {
        match self {
            Record::New { fields, .. } | Record::Persisted { fields, .. } => fields,
        }
    }

    pub fn get(&self, accessor: &str) -> Option<&Value> {
        self.fields().get(accessor)
    }

    pub fn set(&mut self, accessor: &str, value: Value) {
        let fields = match self {
            Record::New { fields, .. } | Record::Persisted { fields, .. } => fields,
        };
        fields.insert(accessor.to_string(), value);
    }

    /// Text shown for a column in grids
    pub fn display(&self, column: &Column) -> String {
        column.format(self.get(column.accessor))
    }
}

/// How a column's values are shown and edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    /// ISO `YYYY-MM-DD`; date-times from the server are cut to the date
    Date,
    /// Enum code picked from a fixed list
    Select(&'static [&'static str]),
}

/// Pairs a display header with a field accessor.
/// Used by grids, detail forms and search bars alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub accessor: &'static str,
    pub kind: ColumnKind,
    pub read_only: bool,
    pub required: bool,
}

impl Column {
    pub const fn new(header: &'static str, accessor: &'static str, kind: ColumnKind) -> Self {
        Self {
            header,
            accessor,
            kind,
            read_only: false,
            required: false,
        }
    }

    pub const fn text(header: &'static str, accessor: &'static str) -> Self {
        Self::new(header, accessor, ColumnKind::Text)
    }

    pub const fn number(header: &'static str, accessor: &'static str) -> Self {
        Self::new(header, accessor, ColumnKind::Number)
    }

    pub const fn date(header: &'static str, accessor: &'static str) -> Self {
        Self::new(header, accessor, ColumnKind::Date)
    }

    pub const fn select(
        header: &'static str,
        accessor: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self::new(header, accessor, ColumnKind::Select(options))
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value a freshly inserted row starts with
    pub fn blank_value(&self) -> Value {
        match self.kind {
            ColumnKind::Select(options) => options
                .first()
                .map(|o| Value::String(o.to_string()))
                .unwrap_or(Value::Null),
            ColumnKind::Number => Value::Null,
            _ => Value::String(String::new()),
        }
    }

    /// Render a cell. Missing values and nulls are empty cells.
    pub fn format(&self, value: Option<&Value>) -> String {
        match (self.kind, value) {
            (_, None | Some(Value::Null)) => String::new(),
            (ColumnKind::Date, Some(Value::String(s))) => date_part(s),
            (_, Some(value)) => plain_text(value),
        }
    }

    /// Raw text for an input box, without display shortening
    pub fn input_text(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(value) => plain_text(value),
        }
    }

    /// Turn typed text into a field value. Number columns keep
    /// half-typed input such as `1.` as text until it parses.
    pub fn parse_input(&self, input: &str) -> Value {
        match self.kind {
            ColumnKind::Number => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    Value::Null
                } else if let Ok(n) = trimmed.parse::<i64>() {
                    Value::Number(n.into())
                } else if let Some(n) = trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .filter(|n| n.to_string() == trimmed)
                {
                    Value::Number(n)
                } else {
                    Value::String(input.to_string())
                }
            }
            _ => Value::String(input.to_string()),
        }
    }

    pub fn is_blank(value: Option<&Value>) -> bool {
        match value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One empty value per column accessor
fn blank_fields(columns: &[Column]) -> Fields {
    columns
        .iter()
        .map(|c| (c.accessor.to_string(), c.blank_value()))
        .collect()
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `2024-03-05T09:00:00` and `2024-03-05T09:00:00+09:00` both show as `2024-03-05`
fn date_part(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    match raw.get(..10).map(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d")) {
        Some(Ok(date)) => date.format("%Y-%m-%d").to_string(),
        _ => raw.to_string(),
    }
}

/// Whether text typed into a date box is a valid calendar date
pub fn is_valid_date(input: &str) -> bool {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_persisted_requires_key() {
        let with_key = Record::persisted(fields(json!({"materialId": 1})), "materialId");
        let without_key = Record::persisted(fields(json!({"materialNm": "Steel"})), "materialId");
        let blank_key = Record::persisted(fields(json!({"customerId": " "})), "customerId");

        assert_eq!(with_key.unwrap().key(), Some(&RecordKey::new("1")));
        assert!(without_key.is_none());
        assert!(blank_key.is_none());
    }

    #[test]
    fn test_identity_matches_only_same_tag() {
        let columns = [Column::text("자재명", "materialNm")];
        let new_row = Record::blank(TempId::generate(), &columns);
        let saved = Record::persisted(fields(json!({"materialId": 7})), "materialId").unwrap();

        assert!(new_row.matches(&new_row.identity()));
        assert!(saved.matches(&Identity::Key(RecordKey::new("7"))));
        assert!(!saved.matches(&new_row.identity()));
        assert!(!new_row.matches(&saved.identity()));
    }

    #[test]
    fn test_blank_row_has_every_accessor() {
        const UNITS: &[&str] = &["EA", "KG"];
        let columns = [
            Column::text("자재명", "materialNm"),
            Column::select("단위", "unit", UNITS),
        ];

        let row = Record::blank(TempId::generate(), &columns);

        assert!(row.is_new());
        assert_eq!(row.get("materialNm"), Some(&json!("")));
        assert_eq!(row.get("unit"), Some(&json!("EA")));
    }

    #[rstest]
    #[case(None, "")]
    #[case(Some(json!(null)), "")]
    #[case(Some(json!("2024-03-05T09:00:00")), "2024-03-05")]
    #[case(Some(json!("2024-03-05T09:00:00+09:00")), "2024-03-05")]
    #[case(Some(json!("2024-03-05")), "2024-03-05")]
    #[case(Some(json!("미정")), "미정")]
    fn test_date_format(#[case] value: Option<Value>, #[case] expected: &str) {
        let column = Column::date("인도일", "deliveryDate");
        assert_eq!(column.format(value.as_ref()), expected);
    }

    #[rstest]
    #[case("42", json!(42))]
    #[case("2.5", json!(2.5))]
    #[case("", json!(null))]
    #[case("1.", json!("1."))]
    #[case("12a", json!("12a"))]
    fn test_number_input(#[case] input: &str, #[case] expected: Value) {
        let column = Column::number("수량", "quantity");
        assert_eq!(column.parse_input(input), expected);
    }

    #[test]
    fn test_blankness() {
        assert!(Column::is_blank(None));
        assert!(Column::is_blank(Some(&json!(null))));
        assert!(Column::is_blank(Some(&json!("  "))));
        assert!(!Column::is_blank(Some(&json!(0))));
        assert!(!Column::is_blank(Some(&json!("x"))));
    }

    #[test]
    fn test_valid_date() {
        assert!(is_valid_date("2025-02-28"));
        assert!(!is_valid_date("2025-02-30"));
        assert!(!is_valid_date("02/28/2025"));
    }
}
