/// Resource definitions
///
/// A `Resource` is everything a page needs to know about one entity type:
/// where it lives on the server, how rows are keyed, and which columns the
/// grid, the detail panel and the search bar show. Pages only differ in
/// their `Resource`; the controller and the views are shared.
use super::data::{Column, Record};

/// Who decides the key of a new record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Entered by the user when the row is created (customer codes, hull numbers)
    Natural,
    /// Allocated by the server; never typed in
    ServerAssigned,
}

/// Suffix of the bulk-create endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStyle {
    /// `POST /api/<resource>/bulk`
    Bulk,
    /// `POST /api/<resource>/saveAll`
    SaveAll,
}

impl BulkStyle {
    pub fn segment(self) -> &'static str {
        match self {
            BulkStyle::Bulk => "bulk",
            BulkStyle::SaveAll => "saveAll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    ReadOnly,
    /// Cells are text inputs
    Editable,
}

/// Where inserted rows go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Top,
    Bottom,
}

/// Read-only child rows of a selected record,
/// e.g. `GET /api/purchaseOrders/{id}/details`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubResource {
    pub title: &'static str,
    pub segment: &'static str,
    pub key_field: &'static str,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub title: &'static str,
    /// Path segment under `/api`, e.g. `purchaseOrders`
    pub path: &'static str,
    pub key_field: &'static str,
    pub key_policy: KeyPolicy,
    pub columns: Vec<Column>,
    pub search: Vec<Column>,
    pub bulk: BulkStyle,
    pub grid: GridMode,
    pub insert_at: InsertPosition,
    /// Field whose value groups rows in tree mode
    pub tree_group: Option<&'static str>,
    pub details: Option<SubResource>,
    /// Field holding the id of the record's image
    pub image_field: Option<&'static str>,
}

impl Resource {
    pub fn new(title: &'static str, path: &'static str, key_field: &'static str) -> Self {
        Self {
            title,
            path,
            key_field,
            key_policy: KeyPolicy::ServerAssigned,
            columns: Vec::new(),
            search: Vec::new(),
            bulk: BulkStyle::Bulk,
            grid: GridMode::ReadOnly,
            insert_at: InsertPosition::Top,
            tree_group: None,
            details: None,
            image_field: None,
        }
    }

    pub fn natural_key(mut self) -> Self {
        self.key_policy = KeyPolicy::Natural;
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn search(mut self, fields: Vec<Column>) -> Self {
        self.search = fields;
        self
    }

    pub fn bulk(mut self, style: BulkStyle) -> Self {
        self.bulk = style;
        self
    }

    pub fn editable_grid(mut self) -> Self {
        self.grid = GridMode::Editable;
        self
    }

    pub fn insert_at(mut self, position: InsertPosition) -> Self {
        self.insert_at = position;
        self
    }

    pub fn tree(mut self, group_field: &'static str) -> Self {
        self.tree_group = Some(group_field);
        self
    }

    pub fn details(mut self, details: SubResource) -> Self {
        self.details = Some(details);
        self
    }

    pub fn image(mut self, field: &'static str) -> Self {
        self.image_field = Some(field);
        self
    }

    pub fn column(&self, accessor: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.accessor == accessor)
    }

    pub fn is_key(&self, accessor: &str) -> bool {
        self.key_field == accessor
    }

    /// The key column is only typed in on new rows with natural keys
    pub fn key_editable(&self, record: &Record) -> bool {
        record.is_new() && self.key_policy == KeyPolicy::Natural
    }

    /// Whether a column accepts input for this record
    pub fn can_edit(&self, record: &Record, column: &Column) -> bool {
        if column.read_only {
            return false;
        }
        if self.is_key(column.accessor) {
            return self.key_editable(record);
        }
        true
    }
}
