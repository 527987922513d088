/// Persisted entity definitions.
pub mod models;
/// Result persistence and query operations.
pub mod result_store;
/// Storage abstraction layer for database operations.
pub mod storage;
