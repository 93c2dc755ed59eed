mod identity;
mod models;
mod policy;

pub use identity::{Identity, normalize_user_id};
pub use models::{AnalysisRecord, NewAnalysis, User};
pub use policy::{
    ANALYSES_TABLE, Command, INSERT_OWN_ANALYSES, Policy, PolicySet, Predicate, RowFilter,
    VIEW_OWN_ANALYSES,
};
