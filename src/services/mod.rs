// Service exports
pub mod appwrite;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use appwrite::{AppwriteClient, AppwriteCollections, AppwriteError};
pub use memory::{FailureInjection, InMemoryStore};
pub use postgres::{PostgresError, PostgresStore};
pub use traits::{HealthCheck, HistoryStore, JobSource, MatchStore, StoreError, UserSource};
