use serde::Serialize;

use crate::store::Store;
use crate::types::Identity;

use super::init_store;

#[derive(Serialize)]
struct StoreInfo {
    database: String,
    schema: String,
    auth_schema: String,
    insert_policy: bool,
    policies: Vec<String>,
    users: usize,
    analyses: i64,
}

pub fn run_info(data_dir: String, json: bool) -> anyhow::Result<()> {
    let (config, store) = init_store(&data_dir)?;

    let info = StoreInfo {
        database: config.db_path().display().to_string(),
        schema: config.schema.clone(),
        auth_schema: config.auth_schema.clone(),
        insert_policy: config.insert_policy,
        policies: store
            .policies()
            .policies
            .iter()
            .map(|p| p.name.clone())
            .collect(),
        users: store.list_users("", i32::MAX)?.len(),
        analyses: store.count_analyses(&Identity::Service)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Database:      {}", info.database);
    println!("Schema:        {} (auth: {})", info.schema, info.auth_schema);
    println!("Users:         {}", info.users);
    println!("Analyses:      {}", info.analyses);
    println!("Policies:");
    for name in &info.policies {
        println!("  - {name}");
    }
    if !info.insert_policy {
        println!("Inserts:       service identity only");
    }

    Ok(())
}
