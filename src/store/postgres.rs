//! Postgres rendering of the analyses table and its row-level security.
//!
//! On a managed Postgres platform the policies run inside the engine; this
//! module produces the DDL that installs them. The SQLite store enforces the
//! same [`PolicySet`] itself.

use crate::config::StoreConfig;
use crate::types::{Command, Policy, PolicySet};

/// Renders the migration for `config`'s schema names and policies.
#[must_use]
pub fn render_migration(config: &StoreConfig) -> String {
    render(&config.schema, &config.auth_schema, &config.policies())
}

/// Renders `CREATE TABLE`, `ENABLE ROW LEVEL SECURITY` and one
/// `CREATE POLICY` per policy. Schema names must already be validated.
#[must_use]
pub fn render(schema: &str, auth_schema: &str, policies: &PolicySet) -> String {
    let table = format!("{schema}.{}", policies.table);
    let mut ddl = String::new();

    ddl.push_str(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
    user_id UUID REFERENCES {auth_schema}.users NOT NULL,
    player_number TEXT,
    team TEXT,
    jersey_color TEXT,
    analysis_text TEXT,
    created_at TIMESTAMP WITH TIME ZONE DEFAULT timezone('utc'::text, now()) NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_analyses_user ON {table} (user_id);

ALTER TABLE {table} ENABLE ROW LEVEL SECURITY;
"
    ));

    for policy in &policies.policies {
        ddl.push('\n');
        ddl.push_str(&render_policy(&table, auth_schema, policy));
    }

    if !policies.has_policy_for(Command::Insert) {
        ddl.push_str(
            "\n-- No INSERT policy: rows are written by the backend with the service role,\n\
             -- which bypasses row-level security.\n",
        );
    }

    ddl
}

fn render_policy(table: &str, auth_schema: &str, policy: &Policy) -> String {
    let mut stmt = format!(
        "CREATE POLICY \"{}\" ON {table}\n    FOR {}",
        policy.name.replace('"', "\"\""),
        policy.command
    );
    if let Some(using) = policy.using {
        stmt.push_str(&format!("\n    USING ({})", using.to_sql(auth_schema)));
    }
    if let Some(check) = policy.with_check {
        stmt.push_str(&format!("\n    WITH CHECK ({})", check.to_sql(auth_schema)));
    }
    stmt.push_str(";\n");
    stmt
}
