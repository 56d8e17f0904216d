// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Mediates between the edit form, the record table and the store.
//!
//! Every write is gated by validation, and every successful write is followed
//! by a full reload of the table so the display never drifts from the
//! collection. The presentation layer only calls the operations here and
//! renders [`Controller::form`], [`Controller::rows`] and the returned
//! [`Notice`] or [`CommandError`].

use std::fmt;
use tracing::{debug, info, warn};

use crate::forms::PersonForm;
use crate::ids::RecordId;
use crate::model::{PersonFields, PersonRecord, RecordRow};
use crate::selection::Selection;
use crate::store::{RecordStore, StoreError};
use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    Insert,
    Reload,
    Update,
    Delete,
}

impl StoreAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Reload => "reload",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for StoreAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("select a record first -- choose a row in the table and retry")]
    NoSelection,
    #[error("{action} failed: {source}")]
    Store {
        action: StoreAction,
        #[source]
        source: StoreError,
    },
}

impl CommandError {
    fn store(action: StoreAction, source: StoreError) -> Self {
        Self::Store { action, source }
    }
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// What a successful command did, for the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Inserted(RecordId),
    Updated(RecordId),
    Deleted(RecordId),
    Cleared,
    Selected(RecordId),
    Reloaded(usize),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted(_) => f.write_str("inserted"),
            Self::Updated(_) => f.write_str("updated"),
            Self::Deleted(_) => f.write_str("deleted"),
            Self::Cleared => f.write_str("form cleared"),
            Self::Selected(id) => write!(f, "loaded {id}"),
            Self::Reloaded(1) => f.write_str("1 record"),
            Self::Reloaded(count) => write!(f, "{count} records"),
        }
    }
}

pub struct Controller<S> {
    store: S,
    form: PersonForm,
    selection: Selection,
    rows: Vec<RecordRow>,
}

impl<S: RecordStore> Controller<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            form: PersonForm::default(),
            selection: Selection::Empty,
            rows: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn form(&self) -> &PersonForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PersonForm {
        &mut self.form
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    /// Re-reads the whole collection. On failure the previous rows stay.
    pub fn refresh(&mut self) -> CommandResult<Notice> {
        let count = self
            .reload()
            .map_err(|error| store_failure(StoreAction::Reload, error))?;
        Ok(Notice::Reloaded(count))
    }

    pub fn create(&mut self) -> CommandResult<Notice> {
        let fields = self.validated(StoreAction::Insert)?;
        let id = self
            .store
            .insert(&fields)
            .map_err(|error| store_failure(StoreAction::Insert, error))?;
        info!(id = %id, "record inserted");
        self.finish_write()?;
        Ok(Notice::Inserted(id))
    }

    pub fn update(&mut self) -> CommandResult<Notice> {
        let id = self.bound_id(StoreAction::Update)?;
        let fields = self.validated(StoreAction::Update)?;
        self.store
            .update_by_id(&id, &fields)
            .map_err(|error| store_failure(StoreAction::Update, error))?;
        info!(id = %id, "record updated");
        self.finish_write()?;
        Ok(Notice::Updated(id))
    }

    pub fn delete(&mut self) -> CommandResult<Notice> {
        let id = self.bound_id(StoreAction::Delete)?;
        self.store
            .delete_by_id(&id)
            .map_err(|error| store_failure(StoreAction::Delete, error))?;
        info!(id = %id, "record deleted");
        self.finish_write()?;
        Ok(Notice::Deleted(id))
    }

    pub fn clear(&mut self) -> Notice {
        self.form.clear();
        self.selection.reset();
        Notice::Cleared
    }

    /// Loads the row at `index` into the form. A missing row is a no-op.
    pub fn select_row(&mut self, index: usize) -> Option<Notice> {
        let row = self.rows.get(index)?;
        self.form = PersonForm::from_row(row);
        self.selection.select(row.id.clone());
        debug!(id = %row.id, "record selected");
        Some(Notice::Selected(row.id.clone()))
    }

    fn validated(&self, action: StoreAction) -> CommandResult<PersonFields> {
        self.form.validate().map_err(|error| {
            warn!(action = %action, %error, "form rejected");
            CommandError::Validation(error)
        })
    }

    fn bound_id(&self, action: StoreAction) -> CommandResult<RecordId> {
        match self.selection.bound_id() {
            Some(id) => Ok(id.clone()),
            None => {
                warn!(action = %action, "no record selected");
                Err(CommandError::NoSelection)
            }
        }
    }

    fn finish_write(&mut self) -> CommandResult<()> {
        self.selection.reset();
        self.form.clear();
        self.refresh().map(|_| ())
    }

    fn reload(&mut self) -> Result<usize, StoreError> {
        let records = self.store.list_all()?;
        self.rows = records.iter().map(PersonRecord::to_row).collect();
        debug!(count = self.rows.len(), "records reloaded");
        Ok(self.rows.len())
    }
}

fn store_failure(action: StoreAction, error: StoreError) -> CommandError {
    warn!(action = %action, %error, "store operation failed");
    CommandError::store(action, error)
}

#[cfg(test)]
mod tests {
    use super::{CommandError, Controller, Notice, StoreAction};
    use crate::{
        PersonFields, PersonForm, PersonRecord, RecordId, RecordStore, Selection, StoreError,
        StoreResult, ValidationError,
    };

    #[derive(Debug, Default)]
    struct TestStore {
        records: Vec<PersonRecord>,
        next_id: u64,
        writes: usize,
        fail_list: bool,
    }

    impl RecordStore for TestStore {
        fn insert(&mut self, fields: &PersonFields) -> StoreResult<RecordId> {
            self.writes += 1;
            self.next_id += 1;
            let id = RecordId::new(format!("t{}", self.next_id));
            self.records
                .push(PersonRecord::from_fields(id.clone(), fields));
            Ok(id)
        }

        fn list_all(&mut self) -> StoreResult<Vec<PersonRecord>> {
            if self.fail_list {
                return Err(StoreError::Backend(anyhow::anyhow!("connection refused")));
            }
            Ok(self.records.clone())
        }

        fn update_by_id(&mut self, id: &RecordId, fields: &PersonFields) -> StoreResult<()> {
            self.writes += 1;
            let record = self
                .records
                .iter_mut()
                .find(|record| &record.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            *record = PersonRecord::from_fields(id.clone(), fields);
            Ok(())
        }

        fn delete_by_id(&mut self, id: &RecordId) -> StoreResult<()> {
            self.writes += 1;
            let before = self.records.len();
            self.records.retain(|record| &record.id != id);
            if self.records.len() == before {
                return Err(StoreError::NotFound(id.clone()));
            }
            Ok(())
        }
    }

    fn fill(form: &mut PersonForm, name: &str) {
        *form = PersonForm {
            name: name.to_owned(),
            age: "30".to_owned(),
            national_code: "ABCD12345678EFGH12".to_owned(),
            sex: "f".to_owned(),
            height: "1.65".to_owned(),
            weight: "58.2".to_owned(),
            birthplace: "Lima".to_owned(),
        };
    }

    #[test]
    fn create_resets_form_and_reloads() {
        let mut controller = Controller::new(TestStore::default());
        fill(controller.form_mut(), "Ana Lopez");

        let notice = controller.create().expect("insert succeeds");
        assert!(matches!(notice, Notice::Inserted(_)));
        assert_eq!(notice.to_string(), "inserted");
        assert!(controller.form().is_blank());
        assert_eq!(controller.selection(), &Selection::Empty);
        assert_eq!(controller.rows().len(), 1);
        assert_eq!(controller.rows()[0].cells[3], "F");
    }

    #[test]
    fn rejected_form_is_preserved_and_store_untouched() {
        let mut controller = Controller::new(TestStore::default());
        fill(controller.form_mut(), "Ana3");
        let before = controller.form().clone();

        let error = controller.create().expect_err("invalid name");
        assert!(matches!(
            error,
            CommandError::Validation(ValidationError::NameFormat)
        ));
        assert_eq!(controller.form(), &before);
        assert_eq!(controller.store().writes, 0);
    }

    #[test]
    fn delete_without_selection_skips_store() {
        let mut controller = Controller::new(TestStore::default());
        let error = controller.delete().expect_err("nothing selected");
        assert!(matches!(error, CommandError::NoSelection));
        assert!(error.to_string().contains("select a record first"));
        assert_eq!(controller.store().writes, 0);
    }

    #[test]
    fn reload_failure_keeps_previous_rows() {
        let mut controller = Controller::new(TestStore::default());
        fill(controller.form_mut(), "Ana Lopez");
        controller.create().expect("insert succeeds");

        controller.store_mut().fail_list = true;
        let error = controller.refresh().expect_err("list fails");
        assert!(matches!(
            error,
            CommandError::Store {
                action: StoreAction::Reload,
                ..
            }
        ));
        assert_eq!(error.to_string(), "reload failed: connection refused");
        assert_eq!(controller.rows().len(), 1);
    }

    #[test]
    fn select_out_of_range_is_noop() {
        let mut controller = Controller::new(TestStore::default());
        assert!(controller.select_row(0).is_none());
        assert_eq!(controller.selection(), &Selection::Empty);
    }

    #[test]
    fn reloaded_notice_pluralizes() {
        assert_eq!(Notice::Reloaded(1).to_string(), "1 record");
        assert_eq!(Notice::Reloaded(3).to_string(), "3 records");
    }
}
