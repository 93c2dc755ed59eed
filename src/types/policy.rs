use std::fmt;

use serde::{Deserialize, Serialize};

use super::Identity;
use crate::error::{Error, Result};

pub const ANALYSES_TABLE: &str = "analyses";
pub const VIEW_OWN_ANALYSES: &str = "Users can view their own analyses";
pub const INSERT_OWN_ANALYSES: &str = "Users can insert their own analyses";

/// The statement kind a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    All,
    Select,
    Insert,
    Update,
    Delete,
}

impl Command {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Returns true if a policy declared for `self` governs `command`.
    #[must_use]
    pub fn covers(self, command: Command) -> bool {
        self == Self::All || self == command
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A boolean condition over one row and the requesting identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// `auth.uid() = user_id`
    OwnerMatches,
}

impl Predicate {
    /// Evaluates the predicate against a row owned by `owner`.
    /// A missing uid or owner compares as SQL NULL and never matches.
    #[must_use]
    pub fn holds(self, identity: &Identity, owner: Option<&str>) -> bool {
        match self {
            Self::OwnerMatches => matches!(
                (identity.uid(), owner),
                (Some(uid), Some(owner)) if uid == owner
            ),
        }
    }

    #[must_use]
    pub fn to_sql(self, auth_schema: &str) -> String {
        match self {
            Self::OwnerMatches => format!("{auth_schema}.uid() = user_id"),
        }
    }
}

/// A permissive row-level policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    pub command: Command,
    /// Decides which existing rows are visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<Predicate>,
    /// Decides which new rows may be written. Falls back to `using`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_check: Option<Predicate>,
}

impl Policy {
    #[must_use]
    pub fn view_own_analyses() -> Self {
        Self {
            name: VIEW_OWN_ANALYSES.to_string(),
            command: Command::Select,
            using: Some(Predicate::OwnerMatches),
            with_check: None,
        }
    }

    #[must_use]
    pub fn insert_own_analyses() -> Self {
        Self {
            name: INSERT_OWN_ANALYSES.to_string(),
            command: Command::Insert,
            using: None,
            with_check: Some(Predicate::OwnerMatches),
        }
    }

    fn visible(&self, identity: &Identity, owner: Option<&str>) -> bool {
        self.using.is_none_or(|p| p.holds(identity, owner))
    }

    fn accepts(&self, identity: &Identity, owner: Option<&str>) -> bool {
        match self.with_check.or(self.using) {
            Some(p) => p.holds(identity, owner),
            None => true,
        }
    }
}

/// How a read must be narrowed for a given identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowFilter {
    All,
    Owner(String),
    Nothing,
}

/// The policies attached to one table, with row-level security enabled.
///
/// Policies are permissive: a row is allowed if any applicable policy allows
/// it, and denied when no policy applies at all. Identities that bypass
/// row-level security are never filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    pub table: String,
    pub policies: Vec<Policy>,
}

impl PolicySet {
    /// Policies for the `analyses` table. The insert policy is opt-in; without
    /// it only the service credential can write.
    #[must_use]
    pub fn analyses(insert_policy: bool) -> Self {
        let mut policies = vec![Policy::view_own_analyses()];
        if insert_policy {
            policies.push(Policy::insert_own_analyses());
        }
        Self {
            table: ANALYSES_TABLE.to_string(),
            policies,
        }
    }

    pub fn applicable(&self, command: Command) -> impl Iterator<Item = &Policy> {
        self.policies
            .iter()
            .filter(move |p| p.command.covers(command))
    }

    #[must_use]
    pub fn has_policy_for(&self, command: Command) -> bool {
        self.applicable(command).next().is_some()
    }

    /// Returns true if `identity` may see (or target) an existing row owned by `owner`.
    #[must_use]
    pub fn permits_row(&self, identity: &Identity, command: Command, owner: Option<&str>) -> bool {
        identity.bypasses_policies()
            || self
                .applicable(command)
                .any(|p| p.visible(identity, owner))
    }

    /// Validates a row about to be written by `identity`.
    pub fn check_new_row(
        &self,
        identity: &Identity,
        command: Command,
        owner: Option<&str>,
    ) -> Result<()> {
        if identity.bypasses_policies()
            || self
                .applicable(command)
                .any(|p| p.accepts(identity, owner))
        {
            return Ok(());
        }
        Err(Error::PolicyViolation {
            table: self.table.clone(),
            command,
        })
    }

    /// Translates the applicable `using` predicates into a filter the store can
    /// push down into its query.
    #[must_use]
    pub fn row_filter(&self, identity: &Identity, command: Command) -> RowFilter {
        if identity.bypasses_policies() {
            return RowFilter::All;
        }

        let mut filter = RowFilter::Nothing;
        for policy in self.applicable(command) {
            match (policy.using, identity.uid()) {
                (None, _) => return RowFilter::All,
                (Some(Predicate::OwnerMatches), Some(uid)) => {
                    filter = RowFilter::Owner(uid.to_string());
                }
                (Some(Predicate::OwnerMatches), None) => {}
            }
        }
        filter
    }
}
