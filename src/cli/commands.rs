use clap::{Subcommand, ValueEnum};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the data directory (database, schema and config file)
    Init {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Install the policy that lets users insert their own analyses
        #[arg(long)]
        insert_policy: bool,
    },

    /// Manage the local mirror of identity-provider users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Show store status information
    Info {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user id issued by the identity provider
    Add {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User UUID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Contact email
        #[arg(long)]
        email: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered users
    List {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a user that owns no analyses
    Remove {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User UUID to remove
        #[arg(long)]
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,

        /// Skip interactive prompts (requires --yes)
        #[arg(long)]
        non_interactive: bool,
    },
}

#[derive(Subcommand)]
pub enum AnalysisCommands {
    /// Insert an analysis
    Insert {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Identity to act as: "service", "anon", or a user UUID
        #[arg(long = "as", default_value = "service")]
        identity: String,

        /// Owning user UUID
        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        player_number: Option<String>,

        #[arg(long)]
        team: Option<String>,

        #[arg(long)]
        jersey_color: Option<String>,

        /// Analysis text (use "-" to read from stdin)
        #[arg(long)]
        analysis_text: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the analyses visible to an identity
    List {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Identity to act as: "service", "anon", or a user UUID
        #[arg(long = "as")]
        identity: String,

        /// Return analyses with ids after this one
        #[arg(long, default_value = "")]
        cursor: String,

        /// Maximum number of analyses to return
        #[arg(long, default_value = "50")]
        limit: i32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one analysis, if visible to the identity
    Show {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Identity to act as: "service", "anon", or a user UUID
        #[arg(long = "as")]
        identity: String,

        /// Analysis id
        #[arg(long)]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// List the row-level policies on the analyses table
    List {
        /// Data directory for the database and config
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dialect {
    Sqlite,
    Postgres,
}
