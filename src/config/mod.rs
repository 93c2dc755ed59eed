mod store;

pub use store::{CONFIG_FILE, DB_FILE, StoreConfig, validate_identifier};
