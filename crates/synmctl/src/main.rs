//! synmctl - SynM admin console CLI

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Map;
use synm_common::error::EXIT_GENERAL_ERROR;
use synm_common::{
    mask_key, ActionIntent, AuthStatus, ConsoleConfig, EntityDetail, Intent, ServerSettings,
    SynmError, VERSION,
};
use synmctl::{
    bootstrap, render, ApiRequest, BootstrapOutcome, CredentialPrompt, Dispatcher, Gateway,
    SessionContext, SettingsClient, StaticPrompt, Synchronizer, TermPrompt,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "synmctl")]
#[command(about = "SynM admin console", version)]
struct Cli {
    /// Store base URL (overrides config and SYNM_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Use the fixed demo credential, never prompt
    #[arg(long, global = true)]
    demo: bool,

    /// Console config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store initialization and local credential state
    Status,

    /// Initialize the store, or enter the key of an initialized one
    Init {
        /// Key to use instead of prompting
        #[arg(long)]
        key: Option<String>,
    },

    /// List online and offline players
    Players,

    /// Show one player's details
    Player {
        /// UUID or username
        id: String,
    },

    /// Send an intent to a player
    Act {
        /// Intent name (heal, teleport, setgamemode, creative, freeze, ...)
        intent: String,
        /// UUID or username
        target: String,
        /// Intent parameters as key=value
        params: Vec<String>,
    },

    /// Announce a message to everyone
    Broadcast {
        #[arg(required = true)]
        message: Vec<String>,
    },

    /// Read or change server settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },

    /// Follow the roster until interrupted
    Watch {
        /// Also show this player's details
        #[arg(long)]
        select: Option<String>,
        /// Poll interval in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print current settings
    Get,
    /// Partial update, e.g. `motd="Hello" maxPlayers=40`
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Append a custom rule
    AddRule {
        #[arg(required = true)]
        rule: Vec<String>,
    },
    /// Remove custom rule number N (as listed by `settings get`)
    RemoveRule { number: usize },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<SynmError>()
            .map(SynmError::exit_code)
            .unwrap_or(EXIT_GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load_from_path(path)?
            .with_env_overrides(|key| std::env::var(key).ok()),
        None => ConsoleConfig::load(),
    };
    if let Some(base) = &cli.api_base {
        config.api_base = base.trim_end_matches('/').to_string();
    }
    if cli.demo {
        config.demo = true;
    }
    debug!("synmctl v{} against {}", VERSION, config.api_base);

    let ctx = SessionContext::from_config(&config);
    let prompt: Arc<dyn CredentialPrompt> = Arc::new(TermPrompt);

    match cli.command {
        Commands::Status => status(&ctx).await,
        Commands::Init { key } => {
            let outcome = match key {
                Some(key) => bootstrap(&ctx, &StaticPrompt::new(Some(&key))).await,
                None => bootstrap(&ctx, prompt.as_ref()).await,
            };
            report_bootstrap(&outcome)
        }
        command => {
            bootstrap(&ctx, prompt.as_ref()).await;
            let gateway = Arc::new(Gateway::new(ctx)?);
            let sync = Synchronizer::new(gateway, prompt);
            let result = run_session(command, &sync, &config).await;
            for notice in sync.drain_notices().await {
                eprintln!("{}", render::notice(&notice));
            }
            result
        }
    }
}

async fn status(ctx: &SessionContext) -> Result<()> {
    let gateway = Gateway::new(ctx.clone())?;
    let status: AuthStatus = gateway
        .call(ApiRequest::get("/api/auth/status"))
        .await?
        .into_response()
        .into_json("auth status")?;

    println!("Store       {}", ctx.api_base);
    println!(
        "Initialized {}",
        if status.initialized { "yes" } else { "no" }
    );
    println!(
        "Credential  {}",
        ctx.credential()
            .map(|k| mask_key(&k))
            .unwrap_or_else(|| "none".to_string())
    );
    if ctx.demo {
        println!("Mode        demo");
    }
    Ok(())
}

fn report_bootstrap(outcome: &BootstrapOutcome) -> Result<()> {
    match outcome {
        BootstrapOutcome::Demo => println!("Demo mode: using the fixed demo key"),
        BootstrapOutcome::Initialized(key) => {
            println!("Store initialized. API key: {}", key);
            println!("Keep it safe; it is also stored in the console cookie jar.");
        }
        BootstrapOutcome::Prompted => println!("API key stored"),
        BootstrapOutcome::AlreadyHeld => println!("Already holding an API key"),
        BootstrapOutcome::Declined => bail!("No API key entered"),
        BootstrapOutcome::Failed(reason) => bail!("Bootstrap failed: {}", reason),
    }
    Ok(())
}

async fn run_session(command: Commands, sync: &Synchronizer, config: &ConsoleConfig) -> Result<()> {
    match command {
        Commands::Players => {
            if !sync.refresh_roster().await {
                bail!("Roster unavailable");
            }
            print!("{}", render::roster(&sync.snapshot().await.roster));
        }
        Commands::Player { id } => {
            let detail = select(sync, &id).await?;
            print!("{}", render::detail(&detail));
        }
        Commands::Act {
            intent,
            target,
            params,
        } => {
            let intent: Intent = intent.parse()?;
            let target = resolve_target(sync, &target).await?;
            let params = params
                .iter()
                .map(|p| {
                    p.split_once('=')
                        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                        .ok_or_else(|| {
                            SynmError::InvalidInput(format!("expected key=value, got '{}'", p))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            sync.select(target).await;
            let dispatcher = Dispatcher::new(sync.clone());
            if !dispatcher
                .dispatch(ActionIntent::targeted(intent, target).with_params(params))
                .await
            {
                bail!("{} was not applied", intent);
            }
            if let Some(detail) = sync.snapshot().await.detail {
                print!("{}", render::detail(&detail));
            }
        }
        Commands::Broadcast { message } => {
            let dispatcher = Dispatcher::new(sync.clone());
            if !dispatcher.broadcast(&message.join(" ")).await {
                bail!("Broadcast was not sent");
            }
        }
        Commands::Settings { action } => {
            let client = SettingsClient::new(Arc::clone(sync.gateway()), Arc::clone(sync.prompt()));
            settings(&client, action).await?;
        }
        Commands::Watch { select: who, interval } => {
            let interval = interval
                .map(|s| Duration::from_secs(s.max(1)))
                .unwrap_or_else(|| config.poll_interval());
            watch(sync, who, interval).await?;
        }
        Commands::Status | Commands::Init { .. } => {}
    }
    Ok(())
}

async fn settings(client: &SettingsClient, action: SettingsCommand) -> Result<()> {
    match action {
        SettingsCommand::Get => {
            print!("{}", render::settings(&client.load().await?));
        }
        SettingsCommand::Set { pairs } => {
            let mut patch = Map::new();
            for pair in &pairs {
                patch.extend(ServerSettings::patch_from_pair(pair)?);
            }
            client.update(patch).await?;
            print!("{}", render::settings(&client.load().await?));
        }
        SettingsCommand::AddRule { rule } => {
            let rules = client.add_rule(&rule.join(" ")).await?;
            println!("{} custom rules", rules.len());
        }
        SettingsCommand::RemoveRule { number } => {
            let index = number
                .checked_sub(1)
                .ok_or_else(|| SynmError::InvalidInput("rules are numbered from 1".to_string()))?;
            let rules = client.remove_rule(index).await?;
            println!("{} custom rules", rules.len());
        }
    }
    Ok(())
}

async fn watch(sync: &Synchronizer, who: Option<String>, interval: Duration) -> Result<()> {
    let poll = sync.spawn_roster_poll(interval);
    if let Some(who) = who {
        let id = resolve_target(sync, &who).await?;
        sync.select(id).await;
    }

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let view = sync.snapshot().await;
                println!("{}", console::style(chrono::Local::now().format("%H:%M:%S")).dim());
                print!("{}", render::roster(&view.roster));
                if let Some(detail) = &view.detail {
                    print!("{}", render::detail(detail));
                }
                for notice in sync.drain_notices().await {
                    eprintln!("{}", render::notice(&notice));
                }
            }
        }
    }

    poll.stop();
    Ok(())
}

/// Select a player and return the fetched detail
async fn select(sync: &Synchronizer, who: &str) -> Result<EntityDetail> {
    let id = resolve_target(sync, who).await?;
    sync.select(id).await;
    sync.snapshot()
        .await
        .detail
        .filter(|d| d.uuid() == id)
        .ok_or_else(|| SynmError::NotFound(who.to_string()))
        .context("Player details unavailable")
}

/// A UUID, or a username looked up in the roster (case-insensitive)
async fn resolve_target(sync: &Synchronizer, who: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(who.trim()) {
        return Ok(id);
    }
    sync.refresh_roster().await;
    let roster = sync.snapshot().await.roster;
    roster
        .find_by_name(who)
        .map(|s| s.uuid)
        .ok_or_else(|| SynmError::NotFound(who.to_string()).into())
}
