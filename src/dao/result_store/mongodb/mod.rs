mod config;
mod connection;
mod error;
mod models;
pub mod store;

pub use config::MongoConfig;
pub use error::MongoDaoError;
pub use store::MongoResultStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        if err.is_write_rejection() {
            StorageError::rejected(err.to_string())
        } else {
            StorageError::unavailable(err.to_string(), err)
        }
    }
}
