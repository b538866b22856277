pub mod params;
pub mod record;

pub use params::{ListParams, SortDirection, SortField};
pub use record::{ActiveCounts, ClientPage, ClientRecord, DbFile};
