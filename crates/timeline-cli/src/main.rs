mod config;
mod project_cmds;
mod serve_cmd;
mod timeline_cmds;

#[cfg(test)]
mod test_util;

use clap::{Parser, Subcommand};

use timeline_db::pool;

use config::TimelineConfig;

#[derive(Parser)]
#[command(
    name = "timeline",
    about = "Wedding-day photography timeline generator and sharing backend"
)]
struct Cli {
    /// Database URL (overrides TIMELINE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a timeline config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/timeline")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the timeline database (requires config file or env vars)
    DbInit,
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides TIMELINE_BIND and the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides TIMELINE_PORT and the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Generate (or regenerate) the timeline for a project
    Generate {
        /// Project ID
        project_id: String,
        /// Ceremony start, e.g. "4:30 PM" or "16:30"
        #[arg(long, default_value = "")]
        ceremony_time: String,
        /// Schedule a first look before the ceremony
        #[arg(long)]
        first_look: bool,
        /// Number of family formal groupings
        #[arg(long, default_value_t = 10)]
        group_photo_count: i32,
        /// Minutes of travel between getting-ready and ceremony locations
        #[arg(long, default_value_t = 0)]
        travel_minutes: i32,
    },
    /// Print a shared timeline by its public slug
    Show {
        /// Public slug
        slug: String,
    },
    /// Print a generated schedule without touching the database
    Preview {
        /// Event date (YYYY-MM-DD)
        date: String,
        /// Ceremony start, e.g. "4:30 PM" or "16:30"
        #[arg(long, default_value = "")]
        ceremony_time: String,
        /// Schedule a first look before the ceremony
        #[arg(long)]
        first_look: bool,
        /// Number of family formal groupings
        #[arg(long, default_value_t = 10)]
        group_photo_count: i32,
        /// Minutes of travel between getting-ready and ceremony locations
        #[arg(long, default_value_t = 0)]
        travel_minutes: i32,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project, creating its account if needed
    Create {
        /// Account email
        #[arg(long)]
        email: String,
        /// Project title, e.g. "Avery & Jordan"
        #[arg(long)]
        title: String,
        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        event_date: Option<String>,
        /// Account display name
        #[arg(long)]
        name: Option<String>,
        /// Where the project came from: manual, honeybook, vagaro
        #[arg(long, default_value = "manual")]
        source: String,
    },
    /// List projects, optionally only those of one account
    List {
        /// Only list projects owned by this account email
        #[arg(long)]
        email: Option<String>,
    },
    /// Show one project and its timeline, if any
    Show {
        /// Project ID
        project_id: String,
    },
}

/// Execute the `timeline init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  server.bind  = {}", cfg.server.bind);
    println!("  server.port  = {}", cfg.server.port);
    println!();
    println!("Next: run `timeline db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `timeline db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = TimelineConfig::resolve(cli_db_url)?;

    println!("Initializing timeline database...");

    if pool::ensure_database_exists(&resolved.db_config).await? {
        println!("Created database {}.", resolved.db_config.database_name().unwrap_or_default());
    }

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("timeline db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let mut resolved = TimelineConfig::resolve(cli.database_url.as_deref())?;
            if let Some(bind) = bind {
                resolved.server.bind = bind;
            }
            if let Some(port) = port {
                resolved.server.port = port;
            }
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            pool::run_migrations(&db_pool).await?;
            let result = serve_cmd::run_serve(db_pool.clone(), &resolved.server).await;
            db_pool.close().await;
            result?;
        }
        Commands::Project { command } => {
            let resolved = TimelineConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = project_cmds::run_project_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Generate {
            project_id,
            ceremony_time,
            first_look,
            group_photo_count,
            travel_minutes,
        } => {
            let resolved = TimelineConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let inputs = timeline_cmds::schedule_inputs(
                ceremony_time,
                first_look,
                group_photo_count,
                travel_minutes,
            );
            let result = timeline_cmds::run_generate(&db_pool, &project_id, inputs).await;
            db_pool.close().await;
            result?;
        }
        Commands::Show { slug } => {
            let resolved = TimelineConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = timeline_cmds::run_show(&db_pool, &slug).await;
            db_pool.close().await;
            result?;
        }
        Commands::Preview {
            date,
            ceremony_time,
            first_look,
            group_photo_count,
            travel_minutes,
        } => {
            let inputs = timeline_cmds::schedule_inputs(
                ceremony_time,
                first_look,
                group_photo_count,
                travel_minutes,
            );
            timeline_cmds::run_preview(&date, inputs)?;
        }
    }

    Ok(())
}
