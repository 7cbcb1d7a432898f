pub mod database;
pub mod metrics;
pub mod registry;

pub use database::MongoDb;
pub use metrics::{get_metrics, init_metrics};
pub use registry::{CollectionRegistry, RegistryError, DEFAULT_COLLECTION, MAX_COLLECTIONS};
