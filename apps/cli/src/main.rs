use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::ProgressBar;
use node_docs_core::{bootstrap, DocLookupService, LookupRequest};
use output::{OutputFormat, Renderer};
use progress::spinner;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "node-docs",
    version,
    about = "Look up Node.js API documentation entries and render chat-ready summaries."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "markdown")]
    format: OutputFormat,
    /// Configuration file layered over the defaults and `./node-docs.*`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Disable ANSI colors in log output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Suppress non-critical CLI output.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators for network-bound tasks.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Find one documentation entry and print the reply.
    Lookup {
        /// Free-text query such as `readFile` or `fs.readFile`.
        query: String,
        /// Documentation version, e.g. `latest-v20.x` or `v18.17.0`.
        #[arg(long = "docs-version")]
        docs_version: Option<String>,
        /// User ID to address the suggestion to.
        #[arg(long)]
        target: Option<String>,
        /// Mark the reply as visible to the requester only.
        #[arg(long)]
        ephemeral: bool,
    },
    /// Answer one query per line from stdin, sharing a single document cache.
    Batch {
        #[arg(long = "docs-version")]
        docs_version: Option<String>,
    },
    /// Download documentation versions ahead of time.
    Warmup {
        /// Versions to fetch (defaults to the configured default version).
        versions: Vec<String>,
    },
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Clone, Debug, Serialize)]
struct WarmupEntry {
    version: String,
    url: String,
    nodes: usize,
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    if let Command::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "node-docs", &mut std::io::stdout());
        return Ok(());
    }

    let config = settings::load(cli.config.as_deref())?;
    let service = bootstrap(config)?;
    let renderer = Renderer::new(cli.format);

    match cli.command.clone() {
        Command::Lookup {
            query,
            docs_version,
            target,
            ephemeral,
        } => {
            let mut request = LookupRequest::new(query).ephemeral(ephemeral);
            request.version = docs_version;
            request.target = target;
            handle_lookup(&request, &cli, &renderer, &service).await
        }
        Command::Batch { docs_version } => {
            handle_batch(docs_version, &cli, &renderer, &service).await
        }
        Command::Warmup { versions } => handle_warmup(versions, &cli, &renderer, &service).await,
        Command::Completions { .. } => Ok(()),
    }
}

async fn handle_lookup(
    request: &LookupRequest,
    cli: &Cli,
    renderer: &Renderer,
    service: &DocLookupService,
) -> Result<()> {
    let spinner = spinner(
        cli.progress_enabled(),
        format!("Looking up `{}`...", request.query.trim()),
    );
    let reply = service.lookup(request).await;
    finish_spinner(spinner, None);

    if !cli.quiet || reply.is_error() {
        renderer.reply(&reply)?;
    }
    Ok(())
}

async fn handle_batch(
    docs_version: Option<String>,
    cli: &Cli,
    renderer: &Renderer,
    service: &DocLookupService,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut answered = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read query from stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        let mut request = LookupRequest::new(line);
        request.version.clone_from(&docs_version);

        let reply = service.lookup(&request).await;
        answered += 1;
        if !cli.quiet || reply.is_error() {
            renderer.reply(&reply)?;
        }
    }

    let stats = service.client().cache_stats();
    info!(
        target: "node_docs_cli",
        answered,
        cached_documents = stats.entry_count,
        cache_hits = stats.hits,
        cache_misses = stats.misses,
        hit_rate = stats.hit_rate(),
        "batch complete"
    );
    Ok(())
}

async fn handle_warmup(
    versions: Vec<String>,
    cli: &Cli,
    renderer: &Renderer,
    service: &DocLookupService,
) -> Result<()> {
    let versions = if versions.is_empty() {
        vec![service.config().default_version.clone()]
    } else {
        versions
    };

    let client = service.client();
    let mut entries = Vec::new();
    for version in versions {
        let spinner = spinner(
            cli.progress_enabled(),
            format!("Fetching documentation `{version}`..."),
        );
        match client.get_tree(&version).await {
            Ok(tree) => {
                finish_spinner(
                    spinner,
                    Some(format!("Cached `{version}` ({} entries)", tree.node_count())),
                );
                entries.push(WarmupEntry {
                    url: client.document_url(&version),
                    nodes: tree.node_count(),
                    version,
                });
            }
            Err(error) => {
                finish_spinner(spinner, None);
                return Err(error.context(format!("failed to warm documentation `{version}`")));
            }
        }
    }

    debug!(target: "node_docs_cli", count = entries.len(), "warmup finished");
    if cli.quiet {
        return Ok(());
    }
    renderer.warmup(&entries)
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,node_docs_cli=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .with_ansi(!cli.no_color)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>, message: Option<String>) {
    if let Some(progress) = spinner {
        if let Some(msg) = message {
            progress.finish_with_message(msg);
        } else {
            progress.finish_and_clear();
        }
    }
}

mod settings {
    use std::path::Path;

    use anyhow::{Context, Result};
    use config::{Config, Environment, File};
    use node_docs_core::LookupConfig;

    const LOCAL_FILE: &str = "node-docs";
    const ENV_PREFIX: &str = "NODE_DOCS";

    /// Defaults, then `./node-docs.*`, then `explicit`, then `NODE_DOCS_*` variables.
    pub fn load(explicit: Option<&Path>) -> Result<LookupConfig> {
        let mut builder = Config::builder().add_source(File::with_name(LOCAL_FILE).required(false));
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

}

mod output {
    use anyhow::Result;
    use clap::ValueEnum;
    use node_docs_core::Reply;

    use crate::WarmupEntry;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Markdown,
        Text,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn reply(&self, reply: &Reply) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string(reply)?);
                }
                OutputFormat::Markdown => {
                    println!("{}", reply.content);
                    println!();
                }
                OutputFormat::Text => {
                    let flags = [
                        reply.is_error().then_some("error"),
                        reply.ephemeral.then_some("ephemeral"),
                    ]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>();
                    if !flags.is_empty() {
                        println!("[{}]", flags.join(", "));
                    }
                    println!("{}", reply.content);
                    if !reply.mentions.is_empty() {
                        println!("mentions: {}", reply.mentions.join(", "));
                    }
                    println!();
                }
            }
            Ok(())
        }

        pub fn warmup(&self, entries: &[WarmupEntry]) -> Result<()> {
            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(entries)?);
                }
                OutputFormat::Markdown => {
                    println!("| Version | Entries | Source |");
                    println!("| --- | ---: | --- |");
                    for entry in entries {
                        println!("| `{}` | {} | {} |", entry.version, entry.nodes, entry.url);
                    }
                }
                OutputFormat::Text => {
                    for entry in entries {
                        println!("• {}: {} entries ({})", entry.version, entry.nodes, entry.url);
                    }
                }
            }
            Ok(())
        }
    }
}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(message_enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !message_enabled {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(80));
        Some(progress)
    }
}
