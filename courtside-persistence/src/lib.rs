pub mod connection;
pub mod entities;
pub mod errors;
pub mod local_storage;
pub mod remote;
pub mod repositories;

pub use errors::{LocalStorageError, RemoteError};
pub use local_storage::LocalStorage;
pub use remote::{BatchOutcome, Collection, RemoteChange, RemoteStore, SqlRemoteStore, WriteBatch};

