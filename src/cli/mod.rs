mod analysis;
mod commands;
mod info;
mod init;
mod prompt;
mod schema;
mod user;

pub use analysis::{run_analysis_insert, run_analysis_list, run_analysis_show};
pub use commands::{AdminCommands, AnalysisCommands, Dialect, PolicyCommands, UserCommands};
pub use info::run_info;
pub use init::run_init;
pub use schema::{run_policy_list, run_schema};
pub use user::{run_user_add, run_user_list, run_user_remove};

use crate::config::StoreConfig;
use crate::store::SqliteStore;

/// Load config and open the store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<(StoreConfig, SqliteStore)> {
    let config = StoreConfig::load(data_dir)?;
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'analysis-store admin init' first.",
            db_path.display()
        );
    }

    let store = SqliteStore::open(&config)?;
    Ok((config, store))
}
