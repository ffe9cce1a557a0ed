mod db_commands;
mod user_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    vermieter_config::VermieterConfig,
};

#[derive(Parser)]
#[command(name = "vermieter", about = "Vermietertools session authentication server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Run with production settings (secure cookies).
    #[arg(long, global = true, default_value_t = false)]
    production: bool,
    /// Custom config directory (searched before `./` and the user config dir).
    #[arg(long, global = true, env = "VERMIETER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
    /// Custom data directory holding `vermieter.db`.
    #[arg(long, global = true, env = "VERMIETER_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default when no subcommand is provided).
    Serve,
    /// User management.
    User {
        #[command(subcommand)]
        action: user_commands::UserAction,
    },
    /// Session maintenance.
    Sessions {
        #[command(subcommand)]
        action: user_commands::SessionAction,
    },
    /// Database management.
    Db {
        #[command(subcommand)]
        action: db_commands::DbAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load config from disk and env, then apply CLI overrides.
fn resolve_config(cli: &Cli) -> VermieterConfig {
    let mut config = vermieter_config::discover_and_load(cli.config_dir.as_deref());
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.production {
        config.server.production = true;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    let config = resolve_config(&cli);
    let db_path = vermieter_config::database_path(&config, cli.data_dir.as_deref());

    match cli.command {
        None | Some(Commands::Serve) => {
            info!(version = env!("CARGO_PKG_VERSION"), "vermieter starting");
            vermieter_gateway::start_server(&config, &db_path).await
        },
        Some(Commands::User { action }) => {
            user_commands::handle_user(action, &config, &db_path).await
        },
        Some(Commands::Sessions { action }) => {
            user_commands::handle_sessions(action, &config, &db_path).await
        },
        Some(Commands::Db { action }) => db_commands::handle_db(action, &db_path).await,
    }
}
