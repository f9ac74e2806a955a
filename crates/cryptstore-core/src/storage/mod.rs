//! Persistence for the credential container
//!
//! Backends only need `get` and `compare_and_swap` over opaque bytes:
//! 1. Single JSON file (default for the helper)
//! 2. In-memory map (tests and embedding)

mod container;
mod file;
mod memory;
mod traits;

pub use container::{ContainerStore, StorageContainer, CREDENTIALS_KEY};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use traits::{KvBackend, Version, VersionedValue};
