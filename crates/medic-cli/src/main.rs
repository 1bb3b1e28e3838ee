//! Medic CLI - self-healing element locators
//!
//! Usage:
//!   medic config                         Show the effective model configuration
//!   medic suggest <markup-file> ...      Ask the model backend for one locator
//!   medic resolve <url> <locator> ...    Resolve a locator in a live browser

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use medic_agent::{LocatorSuggester, ModelClient, SharedClientRegistry};
use medic_browser::{
    interaction, ActivityLog, BrowserConfig, BrowserSession, HealingObserver, LocatorResolver,
    TracingObserver, DEFAULT_MAX_ATTEMPTS,
};
use medic_core::{ElementDescription, LayeredSource, Locator, ModelConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "medic")]
#[command(author, version, about = "Self-healing element locators for browser tests")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML or JSON); MEDIC_* variables override it
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective model configuration (API key redacted)
    Config {
        /// Output format
        #[arg(long, value_enum, default_value = "toml")]
        format: OutputFormat,
    },

    /// Request one replacement locator for a saved page
    Suggest {
        /// File holding the page markup
        markup_file: PathBuf,

        /// Locator that no longer matches, e.g. id=searchInput
        #[arg(long)]
        failed: String,

        /// Plain-language description of the element
        #[arg(short, long)]
        description: String,
    },

    /// Open a page and resolve a locator, healing it if needed
    Resolve {
        /// Page to open
        url: String,

        /// Locator, e.g. css=#q, xpath=//input or a bare selector
        locator: String,

        /// Plain-language description of the element
        #[arg(short, long)]
        description: String,

        /// Healing attempts
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        attempts: u32,

        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Attach to a running Chrome on this DevTools port instead of launching one
        #[arg(long, value_name = "PORT")]
        connect: Option<u16>,

        /// Append healing checkpoints to this file
        #[arg(long, value_name = "FILE")]
        activity_log: Option<PathBuf>,

        /// What to do with the element once resolved
        #[arg(long, value_enum, default_value = "none")]
        action: Action,

        /// Text for --action fill
        #[arg(long)]
        text: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Toml,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    None,
    Click,
    Fill,
    Text,
    Visible,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let source = LayeredSource::file_then_env(cli.config);

    match cli.command {
        Commands::Config { format } => cmd_config(&source, format),
        Commands::Suggest {
            markup_file,
            failed,
            description,
        } => cmd_suggest(&source, markup_file, failed, description).await,
        Commands::Resolve {
            url,
            locator,
            description,
            attempts,
            deadline,
            headed,
            connect,
            activity_log,
            action,
            text,
        } => {
            let options = ResolveOptions {
                attempts,
                deadline: deadline.map(Duration::from_secs),
                headed,
                connect,
                activity_log,
                action,
                text,
            };
            cmd_resolve(source, url, locator, description, options).await
        }
    }
}

fn cmd_config(source: &LayeredSource, format: OutputFormat) -> Result<()> {
    let config = ModelConfig::load(source).redacted();

    let rendered = match format {
        OutputFormat::Toml => {
            toml::to_string_pretty(&config).context("Failed to render config as TOML")?
        }
        OutputFormat::Json => {
            serde_json::to_string_pretty(&config).context("Failed to render config as JSON")?
        }
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

async fn cmd_suggest(
    source: &LayeredSource,
    markup_file: PathBuf,
    failed: String,
    description: String,
) -> Result<()> {
    let markup = tokio::fs::read_to_string(&markup_file)
        .await
        .with_context(|| format!("Failed to read markup from {:?}", markup_file))?;
    let failed: Locator = failed.parse().context("Invalid failed locator")?;

    let config = ModelConfig::load(source);
    info!("Asking {} backend ({})", config.provider, config.model);
    let client = ModelClient::new(config);

    let suggestion = client
        .request_locator_suggestion(&markup, &failed.describe(), &description)
        .await;

    if suggestion.trim().is_empty() {
        bail!("Model backend returned no suggestion");
    }
    println!("{}", suggestion.trim());
    Ok(())
}

struct ResolveOptions {
    attempts: u32,
    deadline: Option<Duration>,
    headed: bool,
    connect: Option<u16>,
    activity_log: Option<PathBuf>,
    action: Action,
    text: Option<String>,
}

async fn cmd_resolve(
    source: LayeredSource,
    url: String,
    locator: String,
    description: String,
    options: ResolveOptions,
) -> Result<()> {
    let locator: Locator = locator.parse().context("Invalid locator")?;
    let description = ElementDescription::new(description);

    let fill_text = match (options.action, options.text) {
        (Action::Fill, Some(text)) => Some(text),
        (Action::Fill, None) => bail!("--action fill needs --text"),
        _ => None,
    };

    let session = match options.connect {
        Some(port) => BrowserSession::connect(port).await,
        None => {
            BrowserSession::launch_with_config(BrowserConfig {
                headless: !options.headed,
                ..BrowserConfig::default()
            })
            .await
        }
    }
    .context("Failed to start browser")?;

    session
        .navigate(&url)
        .await
        .with_context(|| format!("Failed to open {}", url))?;

    let registry = Arc::new(SharedClientRegistry::from_source(source));
    let mut observers: Vec<Arc<dyn HealingObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = options.activity_log {
        info!("Recording healing activity to {:?}", path);
        observers.push(Arc::new(ActivityLog::new(path)));
    }

    let resolver = LocatorResolver::new(session, registry)
        .with_observer(Arc::new(observers))
        .with_max_attempts(options.attempts);

    // Resolve up front so the deadline covers healing only
    let element = match options.deadline {
        Some(deadline) => {
            resolver
                .resolve_element_within(&locator, &description, deadline)
                .await
        }
        None => resolver.resolve_element(&locator, &description).await,
    }
    .with_context(|| format!("Could not resolve '{}' ({})", description, locator))?;

    println!("Resolved '{}' via {}", description, element.locator());

    // The element now resolves directly through its healed locator
    let healed = element.locator().clone();
    match options.action {
        Action::None => {}
        Action::Click => {
            interaction::click(&resolver, &healed, &description).await?;
            println!("Clicked");
        }
        Action::Fill => {
            let text = fill_text.unwrap_or_default();
            interaction::set_text(&resolver, &healed, &description, &text).await?;
            println!("Typed {} chars", text.chars().count());
        }
        Action::Text => {
            let text = interaction::read_text(&resolver, &healed, &description).await?;
            println!("{}", text);
        }
        Action::Visible => {
            let visible = interaction::is_visible(&resolver, &healed, &description).await?;
            println!("{}", if visible { "visible" } else { "hidden" });
        }
    }

    Ok(())
}
