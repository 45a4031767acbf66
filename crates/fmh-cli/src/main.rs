mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "fmh",
    version,
    about = "Import FMH/SIWF surgical logbook PDFs into a procedure log"
)]
struct Cli {
    /// SQLite database holding runs, catalog, logs and API tokens
    #[arg(long, global = true, env = "FMH_DATABASE", default_value = "fmh-logbook.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a logbook PDF into procedure records (nothing is stored)
    Parse {
        /// Path to the logbook PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write parsed output to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Parse a logbook PDF and stage its records under a new import run
    Stage {
        input_file: PathBuf,

        #[arg(long, env = "FMH_USER")]
        user: String,
    },
    /// Match a staged run against the catalog and write procedure logs
    Reconcile {
        run_id: Uuid,

        #[arg(long, env = "FMH_USER")]
        user: String,

        #[command(flatten)]
        import: ImportArgs,
    },
    /// Parse, stage and reconcile a logbook PDF in one go
    Import {
        input_file: PathBuf,

        #[arg(long, env = "FMH_USER")]
        user: String,

        #[command(flatten)]
        import: ImportArgs,
    },
    /// Inspect and load the procedure catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage API tokens for the import endpoint
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Serve the HTTP import endpoint
    Serve {
        #[arg(long, env = "FMH_LISTEN", default_value = "127.0.0.1:8787")]
        listen: String,

        /// Hospital recorded on imported logs
        #[arg(long)]
        hospital: Option<String>,
    },
}

#[derive(clap::Args)]
struct ImportArgs {
    /// Date recorded on every imported log (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    date: Option<NaiveDate>,

    /// Hospital recorded on every imported log
    #[arg(long)]
    hospital: Option<String>,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List the stored catalog in catalog order
    List,
    /// Load procedures into the store (builtin catalog unless --file is given)
    Load {
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Issue a bearer token for a user
    Issue {
        #[arg(long, env = "FMH_USER")]
        user: String,

        #[arg(long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let db = cli.db;

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
        } => commands::parse::run(input_file, &output, out),
        Commands::Stage { input_file, user } => commands::stage::run(&db, input_file, &user).await,
        Commands::Reconcile {
            run_id,
            user,
            import,
        } => commands::reconcile::run(&db, run_id, &user, import.into_options()),
        Commands::Import {
            input_file,
            user,
            import,
        } => commands::import::run(&db, input_file, &user, import.into_options()).await,
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(&db),
            CatalogAction::Load { file } => commands::catalog::load(&db, file.as_deref()),
        },
        Commands::Token { action } => match action {
            TokenAction::Issue { user, email } => commands::token::issue(&db, &user, email),
        },
        Commands::Serve { listen, hospital } => commands::serve::run(&db, &listen, hospital).await,
    };

    if let Err(err) = result {
        tracing::error!(error = %err, "command failed");
        std::process::exit(1);
    }
}

impl ImportArgs {
    fn into_options(self) -> fmh_core::model::ImportOptions {
        let mut options = fmh_core::model::ImportOptions {
            hospital: self.hospital,
            ..Default::default()
        };
        if let Some(date) = self.date {
            options.import_date = date;
        }
        options
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
