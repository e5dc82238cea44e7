use std::path::PathBuf;

use clap::{Parser, Subcommand};
use npm_watch::config::{Config, DEFAULT_LISTEN_ADDR};
use npm_watch::logging::{self, LogFormat};

#[derive(Parser)]
#[command(name = "npm-watch")]
#[command(version, about = "Watches the npm registry feed and reports newly published versions")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "NPM_WATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scheduler, queue consumer and HTTP endpoint (default)
    Serve {
        #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
        listen: String,
    },
    /// Run a single ingestion pass and exit
    RunOnce,
    /// Print every version of a package ranked by closeness to now
    Query { package: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref(), cli.log_format)?;
    let config = Config::load(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        None => runtime.block_on(npm_watch::app::serve(config, DEFAULT_LISTEN_ADDR)),
        Some(Command::Serve { listen }) => runtime.block_on(npm_watch::app::serve(config, &listen)),
        Some(Command::RunOnce) => {
            let summary = runtime.block_on(npm_watch::app::run_once(config))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Some(Command::Query { package }) => {
            let ranked = runtime.block_on(npm_watch::app::query(&config, &package))?;
            println!("{}", serde_json::to_string_pretty(&ranked)?);
            Ok(())
        }
    }
}
