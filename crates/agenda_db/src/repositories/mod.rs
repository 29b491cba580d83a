//! Scheduling store implementations

pub mod memory;
pub mod scheduling_sql;

pub use memory::InMemorySchedulingStore;
pub use scheduling_sql::SqlSchedulingStore;
