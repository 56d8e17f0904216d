// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RecordId;

/// Which stored record, if any, is loaded into the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Bound(RecordId),
}

impl Selection {
    pub fn bound_id(&self) -> Option<&RecordId> {
        match self {
            Self::Empty => None,
            Self::Bound(id) => Some(id),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Binds to `id`, replacing any previous binding.
    pub fn select(&mut self, id: RecordId) {
        *self = Self::Bound(id);
    }

    pub fn reset(&mut self) {
        *self = Self::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;
    use crate::RecordId;

    #[test]
    fn starts_empty() {
        let selection = Selection::default();
        assert_eq!(selection, Selection::Empty);
        assert!(selection.bound_id().is_none());
    }

    #[test]
    fn select_binds_and_reselect_replaces() {
        let mut selection = Selection::default();
        selection.select(RecordId::new("a"));
        assert_eq!(selection.bound_id(), Some(&RecordId::new("a")));

        selection.select(RecordId::new("b"));
        assert_eq!(selection, Selection::Bound(RecordId::new("b")));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut selection = Selection::Bound(RecordId::new("a"));
        selection.reset();
        assert!(!selection.is_bound());
        selection.reset();
        assert_eq!(selection, Selection::Empty);
    }
}
