use clap::{Parser, Subcommand};
use devcamper::config::{self, AppConfig, CliOverrides};
use devcamper::engine::Engine;
use devcamper::http::AppState;
use devcamper::query_string::QuerySpec;
use devcamper::{logger, resources, seed};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "devcamper", version, about = "Bootcamp directory API", long_about = None)]
struct Cli {
    /// Path to a config file (TOML)
    #[arg(
        long,
        global = true,
        help = "Path to a config file (TOML). Takes precedence over DEVCAMPER_CONFIG and ./devcamper.toml."
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Listen address, e.g. 0.0.0.0:5000. Overrides config and env.")]
        bind: Option<String>,
        #[arg(long, help = "Directory of seed JSON files to load before serving")]
        seed: Option<PathBuf>,
    },
    #[command(about = "Run a list query and print the result envelope")]
    Query {
        #[arg(help = "bootcamps, courses or reviews")]
        collection: String,
        #[arg(help = "Query string, e.g. 'averageCost[lte]=10000&select=name&page=2'")]
        query: Option<String>,
        #[arg(long, help = "Directory of seed JSON files to query against")]
        seed: Option<PathBuf>,
    },
    #[command(about = "Import or delete seed data on a fresh in-memory engine")]
    Seed {
        #[arg(long, help = "Directory of seed JSON files")]
        import: Option<PathBuf>,
        #[arg(long, help = "Delete all documents after any import")]
        delete: bool,
    },
}

fn load(
    cli_config: Option<PathBuf>,
    bind: Option<String>,
    seed_dir: Option<PathBuf>,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(config::load(&CliOverrides {
        config: cli_config,
        bind,
        seed_dir,
    })?)
}

async fn serve(cfg: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = logger::configure_logging(
        cfg.log_dir.as_deref(),
        Some(&cfg.log_level),
        Some(cfg.log_retention),
    ) {
        eprintln!("warning: logging disabled: {e}");
    }
    let engine = Arc::new(Engine::new());
    let app = devcamper::build_app(Arc::clone(&engine), &cfg)?;
    let listener = tokio::net::TcpListener::bind(&cfg.bind).await?;
    log::info!("listening on {}", listener.local_addr()?);
    println!("Server is running on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn query(
    cfg: AppConfig,
    collection: &str,
    raw: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(Engine::new());
    if let Some(dir) = &cfg.seed_dir {
        seed::import_dir(&engine, dir)?;
    }
    let state = AppState::new(engine, cfg.pagination.clone());
    let listing = match collection {
        resources::BOOTCAMPS => &state.bootcamps,
        resources::COURSES => &state.courses,
        resources::REVIEWS => &state.reviews,
        other => return Err(format!("no list endpoint for '{other}'").into()),
    };
    let spec = QuerySpec::parse(raw.as_deref().unwrap_or_default());
    let envelope = listing.results.run(listing.store.as_ref(), &spec).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn seed_cmd(import: Option<PathBuf>, delete: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::new();
    resources::install(&engine);
    if let Some(dir) = import {
        for (name, n) in seed::import_dir(&engine, &dir)? {
            println!("imported {n} {name}");
        }
    }
    if delete {
        for (name, n) in seed::delete_all(&engine) {
            println!("deleted {n} {name}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let r = match cli.command {
        Commands::Serve { bind, seed } => match load(cli.config, bind, seed) {
            Ok(cfg) => serve(cfg).await,
            Err(e) => Err(e),
        },
        Commands::Query { collection, query: q, seed } => match load(cli.config, None, seed) {
            Ok(cfg) => query(cfg, &collection, q).await,
            Err(e) => Err(e),
        },
        Commands::Seed { import, delete } => seed_cmd(import, delete),
    };
    if let Err(e) = r {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
