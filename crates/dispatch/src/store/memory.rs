use std::collections::HashMap;
use std::sync::RwLock;

use eventcrm_auth::User;
use eventcrm_core::ExpectedVersion;
use eventcrm_domain::{Client, Contract, Event};

use super::{CrmStore, EntityRef, EntityState, StoreError};

/// In-memory entity store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entities: RwLock<HashMap<EntityRef, EntityState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrmStore for InMemoryStore {
    fn load(&self, entity: EntityRef) -> Result<EntityState, StoreError> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .get(&entity)
            .cloned()
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    fn commit(&self, state: EntityState, expected: ExpectedVersion) -> Result<(), StoreError> {
        let key = state.entity_ref();
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());

        let current = entities
            .get(&key)
            .ok_or_else(|| StoreError::UnknownEntity(key.to_string()))?;

        let current_version = current.version();
        if !expected.matches(current_version) {
            return Err(StoreError::Conflict(format!(
                "{key}: expected {expected:?}, found {current_version}"
            )));
        }

        let mut next = state;
        next.set_version(current_version + 1);
        entities.insert(key, next);
        Ok(())
    }

    fn insert(&self, state: EntityState) -> Result<(), StoreError> {
        let key = state.entity_ref();
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());

        if entities.contains_key(&key) {
            return Err(StoreError::Conflict(format!("{key} already exists")));
        }

        entities.insert(key, state);
        Ok(())
    }

    fn remove(&self, entity: EntityRef) -> Result<(), StoreError> {
        let mut entities = self.entities.write().unwrap_or_else(|e| e.into_inner());
        entities
            .remove(&entity)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    fn list_users(&self) -> Vec<User> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .values()
            .filter_map(|state| match state {
                EntityState::User(user) => Some(user.clone()),
                _ => None,
            })
            .collect()
    }

    fn list_clients(&self) -> Vec<Client> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .values()
            .filter_map(|state| match state {
                EntityState::Client(client) => Some(client.clone()),
                _ => None,
            })
            .collect()
    }

    fn list_contracts(&self) -> Vec<Contract> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .values()
            .filter_map(|state| match state {
                EntityState::Contract(contract) => Some(contract.clone()),
                _ => None,
            })
            .collect()
    }

    fn list_events(&self) -> Vec<Event> {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner());
        entities
            .values()
            .filter_map(|state| match state {
                EntityState::Event(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eventcrm_auth::{Department, NewUser};
    use eventcrm_core::UserId;

    fn test_user() -> User {
        User::create(NewUser {
            id: UserId::new(),
            employee_number: "EE-001".to_string(),
            name: "Billie".to_string(),
            email: "billie@example.com".to_string(),
            department: Department::Support,
            created_at: Utc::now(),
        })
        .unwrap()
    }

    #[test]
    fn insert_then_load_round_trips() {
        let store = InMemoryStore::new();
        let user = test_user();
        let key = EntityRef::User(user.id);

        store.insert(EntityState::User(user.clone())).unwrap();
        let loaded = store.load(key).unwrap();
        assert_eq!(loaded, EntityState::User(user));
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let store = InMemoryStore::new();
        let user = test_user();

        store.insert(EntityState::User(user.clone())).unwrap();
        let err = store.insert(EntityState::User(user)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn commit_bumps_the_version() {
        let store = InMemoryStore::new();
        let user = test_user();
        let key = EntityRef::User(user.id);
        store.insert(EntityState::User(user.clone())).unwrap();

        store
            .commit(EntityState::User(user.clone()), ExpectedVersion::Exact(0))
            .unwrap();

        let loaded = store.load(key).unwrap();
        assert_eq!(loaded.version(), 1);
    }

    #[test]
    fn commit_detects_stale_versions() {
        let store = InMemoryStore::new();
        let user = test_user();
        store.insert(EntityState::User(user.clone())).unwrap();

        store
            .commit(EntityState::User(user.clone()), ExpectedVersion::Exact(0))
            .unwrap();

        // A second writer still holding version 0 must conflict.
        let err = store
            .commit(EntityState::User(user), ExpectedVersion::Exact(0))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn load_of_missing_entity_is_unknown() {
        let store = InMemoryStore::new();

        let err = store.load(EntityRef::User(UserId::new())).unwrap_err();
        assert!(matches!(err, StoreError::UnknownEntity(_)));
    }

    #[test]
    fn remove_deletes_the_entity() {
        let store = InMemoryStore::new();
        let user = test_user();
        let key = EntityRef::User(user.id);
        store.insert(EntityState::User(user)).unwrap();

        store.remove(key).unwrap();
        assert!(store.load(key).is_err());
    }
}
