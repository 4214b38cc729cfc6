use analysis_engine::{run_analysis, AnalysisRequest, AnalysisRun, RunOutcome};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use database::{Database, HistoryEntry, DEFAULT_HISTORY_LIMIT};
use inference_client::GradioConnector;
use mindscan_core::{AppConfig, CoreError, ErrorExt, ErrorReporter, SortMode};
use reddit_client::RedditClient;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod output;

const DEFAULT_CONFIG_FILE: &str = "mindscan.toml";
const DEFAULT_LOG_FILTER: &str =
    "mindscan=info,analysis_engine=info,reddit_client=info,inference_client=info,report_export=info,database=info";

#[derive(Parser)]
#[command(name = "mindscan")]
#[command(about = "Classify the mental-health sentiment of recent Reddit posts")]
struct Cli {
    /// TOML configuration file (defaults to ./mindscan.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch posts from a community and classify each one
    Analyze(AnalyzeArgs),

    /// List previously saved runs, newest first
    History {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },

    /// Delete a saved run
    Forget { id: Uuid },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Community name, with or without the r/ prefix
    community: String,

    /// Listing order: new, hot, top, rising or controversial
    #[arg(long)]
    sort: Option<SortMode>,

    /// Number of posts to fetch (1-100)
    #[arg(long)]
    limit: Option<u32>,

    /// Only list posts whose title or body contains this keyword
    #[arg(long)]
    filter: Option<String>,

    /// Write a PDF report
    #[arg(long)]
    export: bool,

    /// Report path, overriding the configured one
    #[arg(long, requires = "export")]
    output: Option<PathBuf>,

    /// Store the run in the history database
    #[arg(long)]
    save: bool,

    /// Print the run as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<CoreError>() {
            Some(core) => {
                ErrorReporter::new().report_error(core);
                eprintln!("{}", core.user_friendly_message());
            }
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => analyze(&config, args).await,
        Commands::History { limit } => {
            let db = open_database(&config).await?;
            let entries = db.recent_runs(limit).await?;
            output::print_history(&entries);
            db.close().await;
            Ok(())
        }
        Commands::Forget { id } => {
            let db = open_database(&config).await?;
            if db.delete_run(id).await? {
                println!("Deleted {}", id);
            } else {
                println!("No saved run with id {}", id);
            }
            db.close().await;
            Ok(())
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    let path = explicit.or_else(|| default_path.exists().then_some(default_path));

    let config = AppConfig::load(path).map_err(CoreError::from)?;
    if let Some(path) = path {
        tracing::debug!("Loaded configuration from {}", path.display());
    }
    Ok(config)
}

async fn analyze(config: &AppConfig, args: AnalyzeArgs) -> Result<()> {
    let request = AnalysisRequest::new(
        &args.community,
        args.sort.unwrap_or(config.fetch.default_sort),
        args.limit.unwrap_or(config.fetch.default_limit),
    )?;

    let source = RedditClient::new(&config.reddit)?;
    let connector = GradioConnector::new(&config.inference)?;

    let run = match run_analysis(&source, &connector, request).await {
        RunOutcome::NoResults => {
            println!("No posts found.");
            return Ok(());
        }
        RunOutcome::Completed(run) => run,
    };

    let filter = args.filter.as_deref().filter(|keyword| !keyword.trim().is_empty());
    if args.json {
        let json = serde_json::to_string_pretty(&output::JsonRun::new(&run, filter))
            .context("Failed to serialize analysis run")?;
        println!("{}", json);
    } else {
        output::print_run(&run, filter);
    }

    if args.save {
        save_history(config, &run).await;
    }

    if args.export {
        let path = args
            .output
            .unwrap_or_else(|| PathBuf::from(&config.export.output_path));
        report_export::export_to_file(&run.posts, &run.outcomes, &path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

async fn open_database(config: &AppConfig) -> Result<Database, CoreError> {
    let mut db = Database::new(config.database.url.clone());
    db.connect().await?;
    db.run_migrations().await?;
    Ok(db)
}

async fn store_run(config: &AppConfig, run: &AnalysisRun) -> Result<HistoryEntry, CoreError> {
    let db = open_database(config).await?;
    let entry = db
        .save_run(
            &run.request.community,
            run.request.sort,
            run.request.limit,
            &run.report,
        )
        .await;
    db.close().await;
    entry
}

/// History is best effort: a storage failure is reported but leaves the run intact.
async fn save_history(config: &AppConfig, run: &AnalysisRun) {
    match store_run(config, run).await {
        Ok(entry) => println!("Saved run {}", entry.id),
        Err(e) => {
            ErrorReporter::new().report_warning(&e);
            eprintln!("Could not save run: {}", e.user_friendly_message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_defaults() {
        let cli = Cli::try_parse_from(["mindscan", "analyze", "r/Anxiety"]).unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("Expected analyze command");
        };
        assert_eq!(args.community, "r/Anxiety");
        assert!(args.sort.is_none());
        assert!(args.limit.is_none());
        assert!(!args.export && !args.save && !args.json);
    }

    #[test]
    fn test_parse_analyze_options() {
        let cli = Cli::try_parse_from([
            "mindscan", "analyze", "depression", "--sort", "top", "--limit", "25", "--filter",
            "sleep", "--export", "--output", "out.pdf", "--save", "--json",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("Expected analyze command");
        };
        assert_eq!(args.sort, Some(SortMode::Top));
        assert_eq!(args.limit, Some(25));
        assert_eq!(args.filter.as_deref(), Some("sleep"));
        assert_eq!(args.output, Some(PathBuf::from("out.pdf")));
        assert!(args.export && args.save && args.json);
    }

    #[test]
    fn test_rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["mindscan", "analyze", "anxiety", "--sort", "best"]).is_err());
    }

    #[test]
    fn test_output_requires_export() {
        assert!(Cli::try_parse_from(["mindscan", "analyze", "anxiety", "--output", "x.pdf"]).is_err());
    }

    #[test]
    fn test_parse_history_and_forget() {
        let cli = Cli::try_parse_from(["mindscan", "--config", "alt.toml", "history"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::History { limit } if limit == DEFAULT_HISTORY_LIMIT));

        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from(["mindscan", "forget", &id.to_string()]).unwrap();
        assert!(matches!(cli.command, Commands::Forget { id: parsed } if parsed == id));

        assert!(Cli::try_parse_from(["mindscan", "forget", "not-a-uuid"]).is_err());
    }
}
