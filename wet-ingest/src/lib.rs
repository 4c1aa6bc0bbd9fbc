//! wet-ingest: JSON record store, raw tables, and the schema normalizer that
//! turns legacy transaction files into canonical records.

pub mod columns;
pub mod normalize;
pub mod records;
pub mod store;
pub mod table;

pub use normalize::normalize;
pub use records::{load_transactions, to_transactions};
pub use store::{Loaded, StoreWarning};
pub use table::{Table, read_csv_table};
