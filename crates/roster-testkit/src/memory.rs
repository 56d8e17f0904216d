// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::anyhow;
use roster_app::{
    PersonFields, PersonRecord, RecordId, RecordStore, StoreAction, StoreError, StoreResult,
};

/// How many times each store operation was attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub inserts: usize,
    pub lists: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl CallCounts {
    pub fn writes(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }
}

/// In-process collection with call accounting and scripted failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<PersonRecord>,
    next_id: u64,
    calls: CallCounts,
    fault: Option<(StoreAction, String)>,
}

impl MemoryStore {
    pub fn records(&self) -> &[PersonRecord] {
        &self.records
    }

    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    /// Makes the next `action` fail with a backend error carrying `message`.
    pub fn fail_next(&mut self, action: StoreAction, message: impl Into<String>) {
        self.fault = Some((action, message.into()));
    }

    /// Stores a record as-is, bypassing validation, to stand in for
    /// documents written by older versions.
    pub fn insert_raw(&mut self, record: PersonRecord) {
        self.records.push(record);
    }

    /// Deletes a record behind the caller's back, as another client would.
    pub fn remove_out_of_band(&mut self, id: &RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|record| &record.id != id);
        self.records.len() != before
    }

    fn check_fault(&mut self, action: StoreAction) -> StoreResult<()> {
        match self.fault.take() {
            Some((faulted, message)) if faulted == action => {
                Err(StoreError::Backend(anyhow!(message)))
            }
            other => {
                self.fault = other;
                Ok(())
            }
        }
    }

    fn position(&self, id: &RecordId) -> StoreResult<usize> {
        self.records
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

impl RecordStore for MemoryStore {
    fn insert(&mut self, fields: &PersonFields) -> StoreResult<RecordId> {
        self.calls.inserts += 1;
        self.check_fault(StoreAction::Insert)?;
        self.next_id += 1;
        let id = RecordId::new(format!("mem-{:04}", self.next_id));
        self.records
            .push(PersonRecord::from_fields(id.clone(), fields));
        Ok(id)
    }

    fn list_all(&mut self) -> StoreResult<Vec<PersonRecord>> {
        self.calls.lists += 1;
        self.check_fault(StoreAction::Reload)?;
        Ok(self.records.clone())
    }

    fn update_by_id(&mut self, id: &RecordId, fields: &PersonFields) -> StoreResult<()> {
        self.calls.updates += 1;
        self.check_fault(StoreAction::Update)?;
        let index = self.position(id)?;
        self.records[index] = PersonRecord::from_fields(id.clone(), fields);
        Ok(())
    }

    fn delete_by_id(&mut self, id: &RecordId) -> StoreResult<()> {
        self.calls.deletes += 1;
        self.check_fault(StoreAction::Delete)?;
        let index = self.position(id)?;
        self.records.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::PersonFaker;
    use anyhow::Result;
    use roster_app::{RecordId, RecordStore, StoreAction};

    #[test]
    fn fault_fires_once_for_matching_action() -> Result<()> {
        let mut store = MemoryStore::default();
        let person = PersonFaker::new(1).person();
        store.fail_next(StoreAction::Reload, "connection reset");

        store.insert(&person)?;
        let error = store.list_all().expect_err("scripted failure");
        assert_eq!(error.to_string(), "connection reset");
        assert_eq!(store.list_all()?.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_ids_are_not_found() {
        let mut store = MemoryStore::default();
        let person = PersonFaker::new(2).person();
        let ghost = RecordId::new("ghost");

        assert!(
            store
                .update_by_id(&ghost, &person)
                .expect_err("absent")
                .is_not_found()
        );
        assert!(store.delete_by_id(&ghost).expect_err("absent").is_not_found());
        assert_eq!(store.calls().writes(), 2);
    }

    #[test]
    fn out_of_band_removal() -> Result<()> {
        let mut store = MemoryStore::default();
        let id = store.insert(&PersonFaker::new(3).person())?;
        assert!(store.remove_out_of_band(&id));
        assert!(!store.remove_out_of_band(&id));
        assert!(store.records().is_empty());
        Ok(())
    }
}
