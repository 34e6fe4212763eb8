/// Generic list/detail controller
///
/// One instance per page. It owns the row collection, the detail copy of
/// the selected row and the page's phase:
///
/// ```text
/// Idle -> Loading -> Loaded -> Editing(New | Existing) -> Saving -> Loaded
/// ```
///
/// The controller never talks to the network. Methods that need a request
/// return what to send (`SaveAction`, `DeleteAction`, `LoadTicket`) and the
/// page reports back with `finish_load`, `dispatch_succeeded` or
/// `dispatch_failed`.
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use super::data::{Column, Fields, Identity, Record, RecordKey, TempId};
use super::resource::{InsertPosition, KeyPolicy, Resource};
use crate::error::{ControllerError, MissingField, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    New,
    Existing,
}

/// Request in flight while `Saving`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Editing(EditKind),
    Saving(Pending),
}

/// Sequence number of a list request. Only the most recently issued
/// ticket may replace the rows.
///
/// Numbers come from one process-wide counter, so a response addressed to
/// a page that has since been rebuilt never matches the new page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

impl LoadTicket {
    fn next() -> Self {
        LoadTicket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    /// Unsaved new rows would be thrown away; ask first
    NeedsConfirmation,
    NotFound,
    Busy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveAction {
    /// First click on a saved record: fields unlock, nothing is sent
    BeginEdit,
    /// `PUT` each changed record
    Update(Vec<(RecordKey, Fields)>),
    /// Bulk `POST` of every new row
    Create(Vec<Fields>),
    /// Saved rows were edited alongside new ones: `PUT`s first, then the create
    UpdateThenCreate {
        updates: Vec<(RecordKey, Fields)>,
        create: Vec<Fields>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteAction {
    /// The row was never saved; it is gone already
    Discarded,
    Remote(RecordKey),
}

#[derive(Debug)]
pub struct PageController {
    resource: Resource,
    phase: Phase,
    rows: Vec<Record>,
    selected: Option<Record>,
    /// Saved records edited since the last load, in edit order
    dirty: Vec<RecordKey>,
    issued: Option<LoadTicket>,
}

impl PageController {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            phase: Phase::Idle,
            rows: Vec::new(),
            selected: None,
            dirty: Vec::new(),
            issued: None,
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn selected(&self) -> Option<&Record> {
        self.selected.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.phase, Phase::Editing(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Loading | Phase::Saving(_))
    }

    pub fn has_new_rows(&self) -> bool {
        self.rows.iter().any(Record::is_new)
    }

    /// Whether the detail panel should accept input for `column`
    pub fn can_edit(&self, column: &Column) -> bool {
        match (&self.selected, self.phase) {
            (Some(record), Phase::Editing(_)) => self.resource.can_edit(record, column),
            _ => false,
        }
    }

    // ---------- Load ----------

    /// Start a list request. Any earlier ticket becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket::next();
        self.issued = Some(ticket);
        self.phase = Phase::Loading;
        ticket
    }

    /// Replace the rows with a list response. Returns `false` and changes
    /// nothing if a newer request was issued after `ticket`.
    pub fn finish_load(&mut self, ticket: LoadTicket, rows: Vec<Fields>) -> bool {
        if self.issued != Some(ticket) {
            tracing::debug!(resource = self.resource.path, ?ticket, "stale list response dropped");
            return false;
        }

        let key_field = self.resource.key_field;
        let mut records = Vec::with_capacity(rows.len());
        for fields in rows {
            match Record::persisted(fields, key_field) {
                Some(record) => records.push(record),
                None => tracing::warn!(resource = self.resource.path, key_field, "row without key skipped"),
            }
        }

        self.rows = records;
        self.selected = self.rows.first().cloned();
        self.dirty.clear();
        self.phase = Phase::Loaded;
        true
    }

    /// A list request failed; rows stay as they were.
    pub fn load_failed(&mut self, ticket: LoadTicket) -> bool {
        if self.issued != Some(ticket) {
            return false;
        }
        self.phase = Phase::Loaded;
        true
    }

    // ---------- Select ----------

    /// Make `identity` the detail target.
    ///
    /// Moving from unsaved new rows to a saved row discards the new rows,
    /// so that needs `discard_confirmed`. Moving between new rows does not.
    pub fn select(&mut self, identity: &Identity, discard_confirmed: bool) -> SelectOutcome {
        if self.is_busy() {
            return SelectOutcome::Busy;
        }

        let Some(target) = self.rows.iter().find(|r| r.matches(identity)).cloned() else {
            return SelectOutcome::NotFound;
        };

        if !target.is_new() && self.has_new_rows() {
            if !discard_confirmed {
                return SelectOutcome::NeedsConfirmation;
            }
            self.rows.retain(|r| !r.is_new());
        }

        self.phase = if target.is_new() {
            Phase::Editing(EditKind::New)
        } else {
            Phase::Loaded
        };
        self.selected = Some(target);
        SelectOutcome::Selected
    }

    // ---------- Insert / discard ----------

    /// Add a blank new row, select it and start editing it
    pub fn insert(&mut self) -> Result<TempId, ControllerError> {
        if self.is_busy() {
            return Err(ControllerError::Busy);
        }

        let temp_id = TempId::generate();
        let record = Record::blank(temp_id, &self.resource.columns);

        match self.resource.insert_at {
            InsertPosition::Top => self.rows.insert(0, record.clone()),
            InsertPosition::Bottom => self.rows.push(record.clone()),
        }
        self.selected = Some(record);
        self.phase = Phase::Editing(EditKind::New);
        Ok(temp_id)
    }

    /// Drop an unsaved row without a trace
    pub fn discard_new(&mut self, temp_id: TempId) -> bool {
        let identity = Identity::Temp(temp_id);
        let before = self.rows.len();
        self.rows.retain(|r| !r.matches(&identity));
        if self.rows.len() == before {
            return false;
        }

        if self.selected.as_ref().is_some_and(|r| r.matches(&identity)) {
            self.selected = self.rows.first().cloned();
        }
        self.phase = match &self.selected {
            Some(r) if r.is_new() => Phase::Editing(EditKind::New),
            _ => Phase::Loaded,
        };
        true
    }

    // ---------- Edit ----------

    /// Edit a field of the selected record from the detail panel
    pub fn edit_field(&mut self, accessor: &str, input: &str) -> Result<(), ControllerError> {
        if !self.is_editing() {
            return Err(ControllerError::NotEditing);
        }
        let identity = self
            .selected
            .as_ref()
            .map(Record::identity)
            .ok_or(ControllerError::NothingSelected)?;

        self.edit(&identity, accessor, input)
    }

    /// Edit a cell of the inline grid. Saved rows switch the page into
    /// `Editing(Existing)` so the save button commits them.
    pub fn edit_row(&mut self, identity: &Identity, accessor: &str, input: &str) -> Result<(), ControllerError> {
        if self.is_busy() {
            return Err(ControllerError::Busy);
        }

        self.edit(identity, accessor, input)?;

        if self.phase == Phase::Loaded || self.phase == Phase::Idle {
            self.phase = match identity {
                Identity::Temp(_) => Phase::Editing(EditKind::New),
                Identity::Key(_) => Phase::Editing(EditKind::Existing),
            };
        }
        Ok(())
    }

    fn edit(&mut self, identity: &Identity, accessor: &str, input: &str) -> Result<(), ControllerError> {
        let column = self
            .resource
            .column(accessor)
            .ok_or_else(|| ControllerError::UnknownField(accessor.to_string()))?;
        let record = self
            .rows
            .iter()
            .find(|r| r.matches(identity))
            .ok_or(ControllerError::NothingSelected)?;

        if column.read_only {
            return Err(ControllerError::ReadOnlyField(column.header));
        }
        if !self.resource.can_edit(record, column) {
            return Err(ControllerError::KeyLocked);
        }

        let value = column.parse_input(input);
        let accessor = column.accessor;
        self.apply(identity, accessor, value);

        if let Identity::Key(key) = identity {
            if !self.dirty.contains(key) {
                self.dirty.push(key.clone());
            }
        }
        Ok(())
    }

    /// The one place an edit lands: the list entry and, when it is the
    /// same record, the detail copy.
    fn apply(&mut self, identity: &Identity, accessor: &str, value: Value) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.matches(identity)) {
            row.set(accessor, value.clone());
        }
        if let Some(selected) = self.selected.as_mut().filter(|r| r.matches(identity)) {
            selected.set(accessor, value);
        }
    }

    // ---------- Save ----------

    /// What the save button does in the current state.
    ///
    /// - new rows present: validate all of them, then create them together
    ///   with any edits to saved rows
    /// - saved record being edited: update it (and any inline-edited rows)
    /// - saved record selected, not editing: unlock it
    pub fn save(&mut self) -> Result<SaveAction, ControllerError> {
        match self.phase {
            Phase::Loading | Phase::Saving(_) => Err(ControllerError::Busy),
            Phase::Editing(_) => self.prepare_dispatch(),
            Phase::Idle | Phase::Loaded => {
                if self.has_new_rows() {
                    return self.prepare_dispatch();
                }
                match &self.selected {
                    Some(record) if !record.is_new() => {
                        self.phase = Phase::Editing(EditKind::Existing);
                        Ok(SaveAction::BeginEdit)
                    }
                    _ => Err(ControllerError::NothingSelected),
                }
            }
        }
    }

    /// All-or-nothing check of every new row before anything is sent
    pub fn validate_new_rows(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();

        for (index, record) in self.rows.iter().enumerate().filter(|(_, r)| r.is_new()) {
            for column in &self.resource.columns {
                let key_required = self.resource.is_key(column.accessor)
                    && self.resource.key_policy == KeyPolicy::Natural;
                if (column.required || key_required) && Column::is_blank(record.get(column.accessor)) {
                    missing.push(MissingField {
                        row: index + 1,
                        header: column.header,
                    });
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Everything the save button commits: edited saved rows and new rows.
    /// Nothing is sent unless every new row validates.
    fn prepare_dispatch(&mut self) -> Result<SaveAction, ControllerError> {
        self.validate_new_rows()?;

        let create = self.new_batch();
        let updates = self.changed_records();

        let action = match (updates.is_empty(), create.is_empty()) {
            (true, true) => return Err(ControllerError::NothingSelected),
            (false, true) => {
                self.phase = Phase::Saving(Pending::Update);
                SaveAction::Update(updates)
            }
            (true, false) => {
                self.phase = Phase::Saving(Pending::Create);
                SaveAction::Create(create)
            }
            (false, false) => {
                self.phase = Phase::Saving(Pending::Create);
                SaveAction::UpdateThenCreate { updates, create }
            }
        };
        Ok(action)
    }

    fn new_batch(&self) -> Vec<Fields> {
        let server_keyed = self.resource.key_policy == KeyPolicy::ServerAssigned;
        self.rows
            .iter()
            .filter(|r| r.is_new())
            .map(|r| {
                let mut fields = r.fields().clone();
                if server_keyed {
                    fields.remove(self.resource.key_field);
                }
                fields
            })
            .collect()
    }

    /// Saved rows touched since the last load, plus the selected record
    /// when it was unlocked for editing
    fn changed_records(&self) -> Vec<(RecordKey, Fields)> {
        let mut keys = self.dirty.clone();
        if self.phase == Phase::Editing(EditKind::Existing) {
            if let Some(key) = self.selected.as_ref().and_then(Record::key) {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        }

        keys.into_iter()
            .filter_map(|key| {
                let identity = Identity::Key(key.clone());
                self.rows
                    .iter()
                    .find(|r| r.matches(&identity))
                    .map(|r| (key, r.fields().clone()))
            })
            .collect()
    }

    // ---------- Delete ----------

    /// Delete the selected record. The caller has already confirmed.
    pub fn delete(&mut self) -> Result<DeleteAction, ControllerError> {
        if self.is_busy() {
            return Err(ControllerError::Busy);
        }

        match self.selected.clone() {
            None => Err(ControllerError::NothingSelected),
            Some(Record::New { temp_id, .. }) => {
                self.discard_new(temp_id);
                Ok(DeleteAction::Discarded)
            }
            Some(Record::Persisted { id, .. }) => {
                self.phase = Phase::Saving(Pending::Delete);
                Ok(DeleteAction::Remote(id))
            }
        }
    }

    // ---------- Dispatch results ----------

    /// The server accepted the request; the page reloads next.
    pub fn dispatch_succeeded(&mut self) {
        self.dirty.clear();
        self.phase = Phase::Loaded;
    }

    /// The request failed. Rows and selection were never advanced, so only
    /// the phase goes back to where it was.
    pub fn dispatch_failed(&mut self) {
        self.phase = match self.phase {
            Phase::Saving(Pending::Create) => Phase::Editing(EditKind::New),
            Phase::Saving(Pending::Update) => Phase::Editing(EditKind::Existing),
            Phase::Saving(Pending::Delete) => Phase::Loaded,
            other => other,
        };
    }
}
