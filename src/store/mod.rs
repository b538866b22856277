pub mod file;
pub mod memory;
pub mod query;
pub mod trait_def;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use trait_def::RecordStore;
