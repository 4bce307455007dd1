// Cache module for gradebook state.
// Keeps the course's column set in memory so repeated reads avoid LTI round-trips.

pub mod store;

pub use store::ColumnCache;
