use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use analysis_store::cli::{
    AdminCommands, AnalysisCommands, Dialect, PolicyCommands, UserCommands, run_analysis_insert,
    run_analysis_list, run_analysis_show, run_info, run_init, run_policy_list, run_schema,
    run_user_add, run_user_list, run_user_remove,
};

#[derive(Parser)]
#[command(name = "analysis-store")]
#[command(about = "Append-only analysis records with row-level access policies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Insert and read analyses as a given identity
    Analysis {
        #[command(subcommand)]
        command: AnalysisCommands,
    },

    /// Inspect row-level policies
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },

    /// Print the table and policy DDL
    Schema {
        /// Data directory whose config supplies schema names and policies
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Target engine
        #[arg(long, value_enum, default_value = "postgres")]
        dialect: Dialect,

        /// Postgres schema for the analyses table (overrides config)
        #[arg(long = "schema")]
        schema_name: Option<String>,

        /// Postgres schema owning users and uid() (overrides config)
        #[arg(long)]
        auth_schema: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("analysis_store=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                insert_policy,
            } => run_init(data_dir, insert_policy)?,
            AdminCommands::Info { data_dir, json } => run_info(data_dir, json)?,
            AdminCommands::User { command } => match command {
                UserCommands::Add {
                    data_dir,
                    id,
                    email,
                    json,
                } => run_user_add(data_dir, id, email, json)?,
                UserCommands::List { data_dir, json } => run_user_list(data_dir, json)?,
                UserCommands::Remove {
                    data_dir,
                    id,
                    yes,
                    non_interactive,
                } => run_user_remove(data_dir, id, yes, non_interactive)?,
            },
        },
        Commands::Analysis { command } => match command {
            AnalysisCommands::Insert {
                data_dir,
                identity,
                user_id,
                player_number,
                team,
                jersey_color,
                analysis_text,
                json,
            } => run_analysis_insert(
                data_dir,
                identity,
                user_id,
                player_number,
                team,
                jersey_color,
                analysis_text,
                json,
            )?,
            AnalysisCommands::List {
                data_dir,
                identity,
                cursor,
                limit,
                json,
            } => run_analysis_list(data_dir, identity, cursor, limit, json)?,
            AnalysisCommands::Show {
                data_dir,
                identity,
                id,
                json,
            } => run_analysis_show(data_dir, identity, id, json)?,
        },
        Commands::Policy { command } => match command {
            PolicyCommands::List { data_dir, json } => run_policy_list(data_dir, json)?,
        },
        Commands::Schema {
            data_dir,
            dialect,
            schema_name,
            auth_schema,
        } => run_schema(data_dir, dialect, schema_name, auth_schema)?,
    }

    Ok(())
}
