use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use users_shared::{User, UserRecord};

use super::{generate_id, StoreError, StoreResult, UserStore};

/// Process-local store with the same semantics as the database-backed one.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    documents: RwLock<BTreeMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, record: &UserRecord) -> StoreResult<String> {
        let id = generate_id();
        self.documents
            .write()
            .await
            .insert(id.clone(), record.clone());
        Ok(id)
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .map(|(id, record)| record.clone().with_id(id.as_str()))
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let documents = self.documents.read().await;
        Ok(documents.get(id).map(|record| record.clone().with_id(id)))
    }

    async fn update(&self, id: &str, record: &UserRecord) -> StoreResult<()> {
        let mut documents = self.documents.write().await;
        let stored = documents.get_mut(id).ok_or(StoreError::NotFound)?;
        *stored = record.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.documents.write().await.remove(id);
        Ok(())
    }
}
