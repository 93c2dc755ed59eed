use std::fs;
use std::path::PathBuf;

use anyhow::bail;

use crate::config::StoreConfig;
use crate::store::{SqliteStore, Store};

pub fn run_init(data_dir: String, insert_policy: bool) -> anyhow::Result<()> {
    let data_path: PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let mut config = StoreConfig::load(&data_path)?;
    if config.db_path().exists() {
        bail!(
            "Store already initialized. Database exists at: {}",
            config.db_path().display()
        );
    }

    if insert_policy {
        config.insert_policy = true;
    }
    config.save()?;

    let store = SqliteStore::open(&config)?;
    store.initialize()?;

    tracing::info!("Initialized database at {}", config.db_path().display());

    println!();
    println!("Initialized analysis store in {}", data_path.display());
    println!("  Database: {}", config.db_path().display());
    println!("  Config:   {}", config.config_path().display());
    if config.insert_policy {
        println!("  Users may insert their own analyses.");
    } else {
        println!("  Only the service identity may insert analyses.");
    }
    println!();

    Ok(())
}
