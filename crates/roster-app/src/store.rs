// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RecordId;
use crate::model::{PersonFields, PersonRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} not found -- it may have been deleted elsewhere; reload and retry")]
    NotFound(RecordId),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// The document collection holding person records.
///
/// Writes take [`PersonFields`], so nothing that skipped validation can reach
/// an implementation. `list_all` returns the collection's natural order.
pub trait RecordStore {
    fn insert(&mut self, fields: &PersonFields) -> StoreResult<RecordId>;
    fn list_all(&mut self) -> StoreResult<Vec<PersonRecord>>;
    fn update_by_id(&mut self, id: &RecordId, fields: &PersonFields) -> StoreResult<()>;
    fn delete_by_id(&mut self, id: &RecordId) -> StoreResult<()>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn insert(&mut self, fields: &PersonFields) -> StoreResult<RecordId> {
        (**self).insert(fields)
    }

    fn list_all(&mut self) -> StoreResult<Vec<PersonRecord>> {
        (**self).list_all()
    }

    fn update_by_id(&mut self, id: &RecordId, fields: &PersonFields) -> StoreResult<()> {
        (**self).update_by_id(id, fields)
    }

    fn delete_by_id(&mut self, id: &RecordId) -> StoreResult<()> {
        (**self).delete_by_id(id)
    }
}
