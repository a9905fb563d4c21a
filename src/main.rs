//! Drum CLI
//!
//! Replays a recorded feed into the client views and prints the result:
//! - Replay a JSONL feed file (or stdin)
//! - Generate the default config file

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use drum::config::{generate_default_config, Config};
use drum::feed::{Dispatcher, EventSource, LineSource, Region, Session};
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "drum")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drum feed client views")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a feed and print the resulting views
    Replay {
        /// JSONL feed, one event per line ("-" for stdin)
        #[arg(default_value = "-")]
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
        /// Empty the views when the feed ends, as a live client would
        #[arg(long)]
        reset_on_close: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing config to {:?}", path))?;
                    println!("Wrote config to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Replay {
            path,
            format,
            reset_on_close,
        } => {
            let mut config = match &cli.config {
                Some(path) => Config::load_with_env(path)?,
                None => Config::load_default(),
            };
            // The end of a recording is not a lost connection
            config.feed.reset_on_disconnect = reset_on_close;
            drum::logging::init(&config.logging).context("initializing logging")?;
            tracing::info!("Drum v{}", env!("CARGO_PKG_VERSION"));

            let max = config.feed.max_frame_bytes;
            let mut source: Box<dyn EventSource> = if path.as_os_str() == "-" {
                Box::new(LineSource::new(BufReader::new(tokio::io::stdin()), max))
            } else {
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("opening feed {:?}", path))?;
                Box::new(LineSource::new(BufReader::new(file), max))
            };

            let mut dispatcher = Dispatcher::new(&config);
            let stats = Session::new()
                .run(source.as_mut(), &mut dispatcher)
                .await;

            match format {
                OutputFormat::Html => {
                    for region in Region::all() {
                        println!("{}", dispatcher.region_html(*region));
                    }
                }
                OutputFormat::Json => {
                    let mut regions = serde_json::Map::new();
                    for region in Region::all() {
                        regions.insert(
                            region.to_string(),
                            serde_json::json!(dispatcher.region_tokens(*region)),
                        );
                    }
                    let body = serde_json::json!({
                        "regions": regions,
                        "session": stats,
                    });
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
            }
        }
    }

    Ok(())
}
