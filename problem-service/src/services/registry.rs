use crate::models::Problem;
use mongodb::{bson::doc, options::IndexOptions, Collection, Database, IndexModel};
use service_core::error::AppError;
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::Mutex;

/// Collection used when a request carries no collection token.
pub const DEFAULT_COLLECTION: &str = "problems";

/// Upper bound on distinct caller-selected collections per process.
pub const MAX_COLLECTIONS: usize = 256;

const MAX_COLLECTION_NAME_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid collection name: {0:?}")]
    InvalidName(String),

    #[error("Too many collections")]
    AtCapacity,

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Database(e) => AppError::from(e),
            other => AppError::BadRequest(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Lookup-or-create cache of Problem collection handles.
///
/// Collection names come straight from the request path, so resolution
/// validates the token and bounds how many distinct collections a process
/// will ever bind. The first resolution of each name ensures the unique
/// index on `name` before any document is written through the handle.
pub struct CollectionRegistry {
    db: Database,
    ready: Mutex<HashSet<String>>,
}

impl CollectionRegistry {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            ready: Mutex::new(HashSet::new()),
        }
    }

    /// Resolve an optional collection token to a typed collection handle.
    ///
    /// `None` selects the fixed default collection. Tokens are restricted to
    /// 1-64 ASCII alphanumerics, `_` and `-`; anything else is rejected
    /// before storage is touched.
    pub async fn resolve(&self, name: Option<&str>) -> Result<Collection<Problem>, RegistryError> {
        let name = match name {
            None => DEFAULT_COLLECTION,
            Some(token) => {
                if !is_valid_collection_name(token) {
                    return Err(RegistryError::InvalidName(token.to_string()));
                }
                token
            }
        };

        let collection = self.db.collection::<Problem>(name);

        // Holding the lock across index creation serializes first-touch
        // setup for a given name; later resolutions only take the lock.
        let mut ready = self.ready.lock().await;
        if !ready.contains(name) {
            if ready.len() >= MAX_COLLECTIONS {
                tracing::warn!(collection = %name, "Collection registry at capacity");
                return Err(RegistryError::AtCapacity);
            }
            ensure_unique_name_index(&collection).await?;
            ready.insert(name.to_string());
            tracing::info!(collection = %name, "Registered problem collection");
        }

        Ok(collection)
    }
}

fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_COLLECTION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Problem names are unique per collection; the index makes the storage
/// layer enforce it so concurrent creates cannot both succeed.
async fn ensure_unique_name_index(
    collection: &Collection<Problem>,
) -> Result<(), mongodb::error::Error> {
    let index = IndexModel::builder()
        .keys(doc! { "name": 1 })
        .options(
            IndexOptions::builder()
                .name("unique_problem_name".to_string())
                .unique(true)
                .build(),
        )
        .build();

    collection.create_index(index, None).await.map_err(|e| {
        tracing::error!(
            "Failed to create unique name index on {}: {}",
            collection.name(),
            e
        );
        e
    })?;

    Ok(())
}
