pub mod postgres;
mod schema;
mod sqlite;

pub use schema::SCHEMA as SQLITE_SCHEMA;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Analysis operations are evaluated as an [`Identity`] and filtered through
/// the store's [`PolicySet`]. There are deliberately no update or delete
/// operations for analyses.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    fn policies(&self) -> &PolicySet;

    // User operations (identity mirror)
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>>;
    fn delete_user(&self, id: &str) -> Result<bool>;

    // Analysis operations
    fn insert_analysis(&self, identity: &Identity, new: &NewAnalysis) -> Result<AnalysisRecord>;
    fn get_analysis(&self, identity: &Identity, id: &str) -> Result<Option<AnalysisRecord>>;
    fn list_analyses(
        &self,
        identity: &Identity,
        cursor: &str,
        limit: i32,
    ) -> Result<Vec<AnalysisRecord>>;
    fn count_analyses(&self, identity: &Identity) -> Result<i64>;

    fn close(&self) -> Result<()>;
}
