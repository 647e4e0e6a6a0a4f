use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use users_shared::{api::USER_NOT_FOUND, User, UserRecord};

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Length of generated document identifiers.
pub const ID_LENGTH: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{}", USER_NOT_FOUND)]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored document {id} is malformed: {source}")]
    CorruptDocument {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Access to the `users` collection. Each call is a single round-trip.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new document and return its generated identifier.
    async fn create(&self, record: &UserRecord) -> StoreResult<String>;

    /// Every document, in whatever order the backend yields them.
    async fn list_all(&self) -> StoreResult<Vec<User>>;

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    /// Overwrite the record fields of an existing document.
    ///
    /// There is no read before the write; `NotFound` comes back only when the
    /// backend reports that nothing was touched.
    async fn update(&self, id: &str, record: &UserRecord) -> StoreResult<()>;

    /// Remove a document. Succeeds whether or not it existed.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Random alphanumeric identifier, the same shape document databases hand out.
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LENGTH)
        .map(char::from)
        .collect()
}
