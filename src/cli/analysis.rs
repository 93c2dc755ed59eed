use std::io::Read;

use uuid::Uuid;

use crate::error::Error;
use crate::store::Store;
use crate::types::{AnalysisRecord, Identity, NewAnalysis};

use super::init_store;

fn parse_identity(raw: &str) -> anyhow::Result<Identity> {
    Ok(raw.parse::<Identity>()?)
}

fn read_text(value: Option<String>) -> anyhow::Result<Option<String>> {
    match value.as_deref() {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(Some(text.trim_end().to_string()))
        }
        _ => Ok(value),
    }
}

fn print_record(record: &AnalysisRecord) {
    println!("{}", record.id);
    println!("  user:       {}", record.user_id);
    println!("  created:    {}", record.created_at.to_rfc3339());
    if let Some(player) = &record.player_number {
        println!("  player:     #{player}");
    }
    if let Some(team) = &record.team {
        println!("  team:       {team}");
    }
    if let Some(color) = &record.jersey_color {
        println!("  jersey:     {color}");
    }
    if let Some(text) = &record.analysis_text {
        println!();
        for line in text.lines() {
            println!("  {line}");
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_analysis_insert(
    data_dir: String,
    identity: String,
    user_id: Option<String>,
    player_number: Option<String>,
    team: Option<String>,
    jersey_color: Option<String>,
    analysis_text: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let identity = parse_identity(&identity)?;
    let (_, store) = init_store(&data_dir)?;

    // Canonical form so it matches the ids stored by `user add`.
    let user_id = user_id.map(|raw| match Uuid::parse_str(raw.trim()) {
        Ok(uid) => uid.to_string(),
        Err(_) => raw,
    });

    let new = NewAnalysis {
        user_id,
        player_number,
        team,
        jersey_color,
        analysis_text: read_text(analysis_text)?,
        created_at: None,
    };

    let record = match store.insert_analysis(&identity, &new) {
        Ok(record) => record,
        Err(Error::ForeignKeyViolation) => anyhow::bail!(
            "User '{}' is not registered; run 'analysis-store admin user add' first",
            new.user_id.as_deref().unwrap_or_default()
        ),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Inserted analysis {} as {}", record.id, identity.role());

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Created analysis {}", record.id);
    }

    Ok(())
}

pub fn run_analysis_list(
    data_dir: String,
    identity: String,
    cursor: String,
    limit: i32,
    json: bool,
) -> anyhow::Result<()> {
    let identity = parse_identity(&identity)?;
    let (_, store) = init_store(&data_dir)?;

    let records = store.list_analyses(&identity, &cursor, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No analyses.");
        return Ok(());
    }

    for record in &records {
        println!(
            "{}  {}  #{} {} ({})",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.player_number.as_deref().unwrap_or("-"),
            record.team.as_deref().unwrap_or("-"),
            record.jersey_color.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}

pub fn run_analysis_show(
    data_dir: String,
    identity: String,
    id: String,
    json: bool,
) -> anyhow::Result<()> {
    let identity = parse_identity(&identity)?;
    let (_, store) = init_store(&data_dir)?;

    // Rows hidden by policy are indistinguishable from missing ones.
    let Some(record) = store.get_analysis(&identity, &id)? else {
        anyhow::bail!("Analysis '{id}' not found");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }

    Ok(())
}
