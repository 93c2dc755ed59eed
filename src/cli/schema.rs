use crate::config::{StoreConfig, validate_identifier};
use crate::store::{SQLITE_SCHEMA, postgres};

use super::Dialect;

/// Prints the DDL for `dialect`. Reads schema names and policies from the
/// data directory's config when present, defaults otherwise; explicit schema
/// names win over both.
pub fn run_schema(
    data_dir: String,
    dialect: Dialect,
    schema: Option<String>,
    auth_schema: Option<String>,
) -> anyhow::Result<()> {
    let mut config = StoreConfig::load(&data_dir)?;

    if let Some(schema) = schema {
        validate_identifier(&schema).map_err(anyhow::Error::msg)?;
        config.schema = schema;
    }
    if let Some(auth_schema) = auth_schema {
        validate_identifier(&auth_schema).map_err(anyhow::Error::msg)?;
        config.auth_schema = auth_schema;
    }

    match dialect {
        Dialect::Sqlite => println!("{}", SQLITE_SCHEMA.trim()),
        Dialect::Postgres => print!("{}", postgres::render_migration(&config)),
    }

    Ok(())
}

pub fn run_policy_list(data_dir: String, json: bool) -> anyhow::Result<()> {
    let config = StoreConfig::load(&data_dir)?;
    let policies = config.policies();

    if json {
        println!("{}", serde_json::to_string_pretty(&policies)?);
        return Ok(());
    }

    println!("Row-level security on {}.{}:", config.schema, policies.table);
    for policy in &policies.policies {
        println!("  \"{}\" FOR {}", policy.name, policy.command);
        if let Some(using) = policy.using {
            println!("      USING ({})", using.to_sql(&config.auth_schema));
        }
        if let Some(check) = policy.with_check {
            println!("      WITH CHECK ({})", check.to_sql(&config.auth_schema));
        }
    }
    println!("  (service identity bypasses all policies)");

    Ok(())
}
