use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::PolicySet;

pub const DB_FILE: &str = "analyses.db";
pub const CONFIG_FILE: &str = "config.toml";

const MAX_IDENTIFIER_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Postgres schema the `analyses` table is rendered into.
    pub schema: String,
    /// Postgres schema owning `users` and `uid()`.
    pub auth_schema: String,
    /// Formalize inserts as a policy instead of relying on the service
    /// credential alone.
    pub insert_policy: bool,
}

impl StoreConfig {
    /// Loads `config.toml` from `data_dir`, falling back to defaults when the
    /// file does not exist.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let path = data_dir.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            toml::from_str::<Self>(&content)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        config.data_dir = data_dir;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_identifier(&self.schema).map_err(Error::Config)?;
        validate_identifier(&self.auth_schema).map_err(Error::Config)?;
        Ok(())
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    #[must_use]
    pub fn policies(&self) -> PolicySet {
        PolicySet::analyses(self.insert_policy)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            schema: "public".to_string(),
            auth_schema: "auth".to_string(),
            insert_policy: false,
        }
    }
}

/// Schema names are interpolated into DDL, so only plain lowercase
/// identifiers are accepted.
pub fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("schema name cannot be empty".to_string());
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "schema name cannot exceed {MAX_IDENTIFIER_LEN} characters"
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(format!(
            "schema name '{name}' can only contain lowercase letters, digits, and underscores"
        ));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(format!("schema name '{name}' cannot start with a digit"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.schema, "public");
        assert_eq!(config.auth_schema, "auth");
        assert!(!config.insert_policy);
        assert_eq!(config.db_path(), dir.path().join(DB_FILE));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            data_dir: dir.path().to_path_buf(),
            schema: "scouting".to_string(),
            insert_policy: true,
            ..StoreConfig::default()
        };
        config.save().unwrap();

        let loaded = StoreConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.policies().policies.len(), 2);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "insert_policy = true\n").unwrap();

        let loaded = StoreConfig::load(dir.path()).unwrap();
        assert!(loaded.insert_policy);
        assert_eq!(loaded.schema, "public");
    }

    #[test]
    fn test_rejects_bad_schema_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "schema = \"public; DROP TABLE x\"\n",
        )
        .unwrap();

        assert!(matches!(
            StoreConfig::load(dir.path()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("public").is_ok());
        assert!(validate_identifier("app_2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2fast").is_err());
        assert!(validate_identifier("Public").is_err());
    }
}
