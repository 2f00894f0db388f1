//! EngageTrack - contributor engagement for GitHub repositories
//!
//! # Usage
//! ```bash
//! engagetrack                          # Start server on port 5000
//! engagetrack add octocat/Hello-World  # Track a repository
//! engagetrack list                     # Show tracked repositories
//! engagetrack remove 3                 # Stop tracking repository 3
//! engagetrack metrics owner/name       # Print top contributors, write an HTML report
//! engagetrack issues owner/name        # Summarize issue response times
//! ```
//!
//! `GH_API_TOKEN` must be set for contributor metrics.

mod config;
mod error;
mod github;
mod models;
mod registry;
mod report;
mod routes;
mod store;
mod views;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Settings;
use github::GithubClient;
use models::{IssueFetch, RepositoryId};
use routes::AppState;
use store::RepoStore;
use views::Views;

/// EngageTrack - Track contributor engagement for GitHub repositories
#[derive(Parser)]
#[command(name = "engagetrack")]
#[command(about = "Track contributor engagement for GitHub repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    settings: Settings,

    /// Port to run the server on
    #[arg(short, long, default_value = "5000")]
    port: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a repository to track
    Add {
        /// GitHub repository (e.g., owner/repo)
        repo: String,
    },
    /// List tracked repositories
    List,
    /// Stop tracking a repository
    Remove {
        /// Id shown by `engagetrack list`
        id: i64,
    },
    /// Fetch engagement metrics for a repository and write an HTML report
    Metrics {
        /// GitHub repository (e.g., owner/repo)
        repo: String,

        /// Directory the report is written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Summarize issue response times for a repository
    Issues {
        /// GitHub repository (e.g., owner/repo)
        repo: String,
    },
}

async fn handle_add(settings: &Settings, raw: &str) -> anyhow::Result<()> {
    let store = RepoStore::connect(&settings.database_url).await?;
    let github = GithubClient::new(settings)?;
    let repo = registry::register(&store, &github, raw).await?;
    println!("✓ Repository {} added successfully (id {}).", repo.name, repo.id);
    Ok(())
}

async fn handle_list(settings: &Settings) -> anyhow::Result<()> {
    let store = RepoStore::connect(&settings.database_url).await?;
    let repos = store.list().await?;
    if repos.is_empty() {
        println!("No repositories tracked yet.");
        return Ok(());
    }

    println!("  {:>4}  {:<40}  {}", "ID", "REPOSITORY", "LAST RETRIEVED");
    for repo in repos {
        let retrieved = repo
            .last_retrieved
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!("  {:>4}  {:<40}  {}", repo.id, repo.full_name, retrieved);
    }
    Ok(())
}

async fn handle_remove(settings: &Settings, id: i64) -> anyhow::Result<()> {
    let store = RepoStore::connect(&settings.database_url).await?;
    if store.delete(id).await? {
        println!("✓ Repository {} deleted.", id);
    } else {
        println!("✗ Repository {} not found.", id);
    }
    Ok(())
}

async fn handle_metrics(settings: &Settings, raw: &str, output_dir: PathBuf) -> anyhow::Result<()> {
    let repo: RepositoryId = raw.parse()?;
    let github = GithubClient::new(settings)?;
    if !github.has_token() {
        eprintln!("  Warning: GH_API_TOKEN is not set; contributor data will be empty.");
    }

    let (metrics, issues) = tokio::join!(
        github.fetch_metrics(std::slice::from_ref(&repo)),
        github.fetch_issues(&repo),
    );
    let issues = issues?;

    let Some(repo_metrics) = metrics.into_iter().next() else {
        println!("No metrics available.");
        return Ok(());
    };

    println!("Top contributors for {} (last 90 days):", repo);
    if repo_metrics.contributors.is_empty() {
        println!("  (no contributor data)");
    }
    for (rank, record) in repo_metrics.contributors.iter().enumerate() {
        println!("  {:>2}. {:<32} {}", rank + 1, record.name, record.contributions);
    }

    let html = report::render_report(&Views::new()?, &repo_metrics, &issues)?;
    let path = output_dir.join(format!("{}_report.html", repo.file_stem()));
    std::fs::write(&path, html)?;
    println!("✓ Report written to {}", path.display());
    Ok(())
}

async fn handle_issues(settings: &Settings, raw: &str) -> anyhow::Result<()> {
    let repo: RepositoryId = raw.parse()?;
    let github = GithubClient::new(settings)?;

    let fetched = github.fetch_issues(&repo).await?;
    if let IssueFetch::Failed(record) = &fetched {
        anyhow::bail!(record.error.clone());
    }
    let issues = fetched.issues();

    let times = report::response_times_hours(issues);
    println!("{} issues fetched for {}", issues.len(), repo);
    if times.is_empty() {
        println!("No response time data available for {}", repo);
        return Ok(());
    }

    let mean = times.iter().sum::<f64>() / times.len() as f64;
    println!("{} with response times, mean {:.1} hours", times.len(), mean);
    for bin in report::histogram(&times, report::HISTOGRAM_BINS) {
        println!(
            "  {:>8.1}h - {:>8.1}h  {}",
            bin.lower_hours,
            bin.upper_hours,
            "#".repeat(bin.count)
        );
    }
    Ok(())
}

async fn serve(settings: &Settings, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    if !state.github.has_token() {
        tracing::warn!("GH_API_TOKEN is not set; contributor metrics will be empty");
    }

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to port {}: {}", port, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    println!();
    println!("  EngageTrack");
    println!();
    println!("  Server:   http://{}", addr);
    println!("  Database: {}", settings.database_url);
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Some(Commands::Add { repo }) => handle_add(&cli.settings, &repo).await,
        Some(Commands::List) => handle_list(&cli.settings).await,
        Some(Commands::Remove { id }) => handle_remove(&cli.settings, id).await,
        Some(Commands::Metrics { repo, output_dir }) => {
            handle_metrics(&cli.settings, &repo, output_dir).await
        }
        Some(Commands::Issues { repo }) => handle_issues(&cli.settings, &repo).await,
        None => serve(&cli.settings, cli.port).await,
    }
}
