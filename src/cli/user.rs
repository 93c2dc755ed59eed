use chrono::Utc;
use uuid::Uuid;

use crate::error::Error;
use crate::store::Store;
use crate::types::{User, normalize_user_id};

use super::init_store;
use super::prompt::confirm_action;

pub fn run_user_add(
    data_dir: String,
    id: Option<String>,
    email: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (_, store) = init_store(&data_dir)?;

    let id = match id {
        Some(raw) => Uuid::parse_str(raw.trim())
            .map_err(|_| anyhow::anyhow!("User id '{raw}' is not a valid UUID"))?,
        None => Uuid::new_v4(),
    };

    let user = User {
        id: id.to_string(),
        email,
        created_at: Utc::now(),
    };

    match store.create_user(&user) {
        Ok(()) => {}
        Err(Error::AlreadyExists) => anyhow::bail!("User '{}' already exists", user.id),
        Err(e) => return Err(e.into()),
    }

    tracing::info!("Registered user {}", user.id);

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        println!("Created user {}", user.id);
    }

    Ok(())
}

pub fn run_user_list(data_dir: String, json: bool) -> anyhow::Result<()> {
    let (_, store) = init_store(&data_dir)?;
    let users = store.list_users("", i32::MAX)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    for user in users {
        match user.email {
            Some(email) => println!("{}  {}", user.id, email),
            None => println!("{}", user.id),
        }
    }

    Ok(())
}

pub fn run_user_remove(
    data_dir: String,
    id: String,
    yes: bool,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let (_, store) = init_store(&data_dir)?;
    let id = normalize_user_id(&id);

    if store.get_user(&id)?.is_none() {
        anyhow::bail!("User '{id}' not found");
    }

    if !confirm_action(&format!("Remove user '{id}'?"), yes, non_interactive)? {
        println!("Cancelled.");
        return Ok(());
    }

    match store.delete_user(&id) {
        Ok(_) => {
            tracing::info!("Removed user {id}");
            println!("Removed user {id}");
            Ok(())
        }
        Err(Error::ForeignKeyViolation) => {
            anyhow::bail!("User '{id}' still owns analyses; analyses are never deleted")
        }
        Err(e) => Err(e.into()),
    }
}
