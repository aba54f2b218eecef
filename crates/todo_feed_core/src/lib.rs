pub mod domain;
pub mod ports;
pub mod session;
pub mod sync;

pub use domain::{Profile, TodoItem};
pub use ports::{CredentialStore, PortError, PortResult, TodoApi};
pub use session::SessionStore;
pub use sync::{CollectionSnapshot, CollectionSynchronizer, SyncError, SyncResult};
