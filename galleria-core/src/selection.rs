//! Id-keyed selection set with stable insertion order.

use std::collections::HashSet;

use crate::{Record, RecordId};

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    order: Vec<Record>,
    ids: HashSet<RecordId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was already selected; the stored record is kept.
    pub fn add(&mut self, record: Record) -> bool {
        if !self.ids.insert(record.id) {
            return false;
        }
        self.order.push(record);
        true
    }

    pub fn remove(&mut self, id: RecordId) -> bool {
        if !self.ids.remove(&id) {
            return false;
        }
        self.order.retain(|r| r.id != id);
        true
    }

    /// Flip membership of `record` and report whether it is selected afterwards.
    pub fn toggle(&mut self, record: &Record) -> bool {
        if self.remove(record.id) {
            false
        } else {
            self.add(record.clone())
        }
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    /// Duplicate ids in `records` keep their first occurrence.
    pub fn replace_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        self.clear();
        for record in records {
            self.add(record);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.order.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.iter().map(|r| r.id)
    }

    pub fn to_ordered_vec(&self) -> Vec<Record> {
        self.order.clone()
    }
}
