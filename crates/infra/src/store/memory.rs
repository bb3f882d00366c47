use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use cargodesk_core::{Filter, Record};

use super::{RecordStore, StoreError};

/// In-memory store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<R: Record> {
    inner: RwLock<HashMap<R::Id, R>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

/// Reject `candidate` if another record already holds one of its unique values.
fn check_unique<R: Record>(map: &HashMap<R::Id, R>, candidate: &R) -> Result<(), StoreError> {
    for (column, value) in candidate.unique_fields() {
        let clash = map
            .values()
            .any(|other| other.id() != candidate.id() && other.field(column).as_ref() == Some(&value));
        if clash {
            return Err(StoreError::AlreadyExists(format!("{} with this {column}", R::KIND)));
        }
    }
    Ok(())
}

fn newest_first<R: Record>(mut records: Vec<R>) -> Vec<R> {
    records.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    records
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&record.id()) {
            return Err(StoreError::AlreadyExists(format!("{} {}", R::KIND, record.id())));
        }
        check_unique(&map, &record)?;
        map.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(newest_first(map.values().cloned().collect()))
    }

    async fn find_by(&self, filter: Filter) -> Result<Vec<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(newest_first(
            map.values().filter(|r| filter.matches(*r)).cloned().collect(),
        ))
    }

    async fn update(&self, record: R) -> Result<R, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.contains_key(&record.id()) {
            return Err(StoreError::not_found::<R>(record.id()));
        }
        check_unique(&map, &record)?;
        map.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn delete(&self, id: R::Id) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found::<R>(id)),
        }
    }
}
