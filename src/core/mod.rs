//! Core module - the record store, query engine, attachment resolver and codec,
//! plus the seams they are built on

pub mod attachment;
pub mod clock;
pub mod codec;
pub mod config;
pub mod entity;
pub mod identity;
pub mod query;
pub mod session;
pub mod storage;
pub mod store;

pub use attachment::{BlobHandles, DirBlobHandles, MemoryBlobHandles, Resolved, ResourceHandle};
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{CodecError, ImportMode};
pub use config::Config;
pub use entity::Status;
pub use identity::{IdGenerator, RfpId};
pub use query::Tab;
pub use session::{Bootstrap, Session, Shared};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, StorageError};
pub use store::{ImportReport, RfpStore, StoreError};
