pub mod ident;
pub mod schema;
pub mod store;

pub use store::{SchemaState, Store, StoreStats};
