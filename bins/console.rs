use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

use models::notification::{Notification, NotificationInput};
use models::order::{Order, OrderInput};
use models::product::{Product, ProductInput};
use models::user::{UserData, UserInput};
use service::ledger::NotificationLedger;
use service::remote::RestClient;
use service::sync::{ListState, ListSync, LoadOutcome};
use service::{EntityService, ListQuery};

#[derive(Debug, Parser)]
#[command(author, version, about = "Command-line client for the admin API")]
struct Args {
    /// Base URL of the admin API
    #[arg(long, env = "ADMIN_API_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    /// Bearer token; when absent the console logs in with --username/--password
    #[arg(long, env = "ADMIN_API_TOKEN")]
    token: Option<String>,

    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    username: String,

    #[arg(long, env = "ADMIN_PASSWORD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and print the session (token and expiry)
    Login,
    /// Show one page of an entity list
    List {
        #[arg(value_enum)]
        entity: EntityKind,
        #[arg(long)]
        search: Option<String>,
        /// Filter as name=value; repeatable
        #[arg(long = "filter", value_parser = parse_pair)]
        filters: Vec<(String, String)>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// List notifications with the unread counter, optionally acting on them first
    Notifications {
        #[arg(long = "filter", value_parser = parse_pair)]
        filters: Vec<(String, String)>,
        #[arg(long)]
        mark_read: Option<String>,
        #[arg(long)]
        mark_all: bool,
        #[arg(long)]
        delete: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EntityKind {
    Users,
    Products,
    Orders,
    Notifications,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(format!("expected name=value, got `{s}`")),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_failed(outcome: LoadOutcome) -> Result<()> {
    match outcome {
        LoadOutcome::Failed(e) => Err(anyhow!("{} ({}): {}", e.title(), e.code(), e.message())),
        _ => Ok(()),
    }
}

async fn authorized(args: &Args, rest: RestClient) -> Result<RestClient> {
    if let Some(token) = &args.token {
        return Ok(rest.with_token(token.clone()));
    }
    let Some(password) = &args.password else {
        bail!("no token: pass --token, or --password to log in");
    };
    let session = rest.login(&args.username, password).await?;
    tracing::debug!(expires_at = %session.expires_at, "logged in");
    Ok(rest.with_token(session.token))
}

/// Load exactly the requested page: the loop starts from `query` itself, so
/// page numbers survive alongside search and filters.
async fn load_page<S>(svc: Arc<S>, query: ListQuery) -> Result<ListState<S::Record>>
where
    S: EntityService + 'static,
{
    let list = ListSync::for_service(svc, query);
    load_failed(list.reload().await)?;
    Ok(list.state())
}

async fn show_page<S>(svc: S, query: ListQuery) -> Result<()>
where
    S: EntityService + 'static,
    S::Record: Serialize,
{
    let state = load_page(Arc::new(svc), query).await?;
    print_json(&json!({
        "page": state.query.page,
        "page_size": state.query.page_size,
        "total": state.total,
        "items": state.items,
    }))
}

async fn run(args: Args) -> Result<()> {
    let timeout = configs::AppConfig::load_and_validate()
        .map(|cfg| cfg.remote.timeout_secs)
        .unwrap_or_else(|_| configs::AppConfig::default().remote.timeout_secs);
    let rest = RestClient::new(args.base_url.clone(), Duration::from_secs(timeout))?;

    match &args.command {
        Command::Login => {
            let password = args.password.as_deref().ok_or_else(|| anyhow!("--password is required to log in"))?;
            print_json(&rest.login(&args.username, password).await?)
        }
        Command::List { entity, search, filters, page, page_size } => {
            let rest = authorized(&args, rest).await?;
            let mut query = ListQuery::new(page_size.unwrap_or(10)).with_page(*page);
            if let Some(text) = search {
                query = query.with_search(text.clone());
            }
            for (k, v) in filters {
                query = query.with_filter(k.clone(), v.clone());
            }
            match entity {
                EntityKind::Users => show_page(rest.resource::<UserData, UserInput>("users"), query).await,
                EntityKind::Products => show_page(rest.resource::<Product, ProductInput>("products"), query).await,
                EntityKind::Orders => show_page(rest.resource::<Order, OrderInput>("orders"), query).await,
                EntityKind::Notifications => {
                    show_page(rest.resource::<Notification, NotificationInput>("notifications"), query).await
                }
            }
        }
        Command::Notifications { filters, mark_read, mark_all, delete } => {
            let rest = authorized(&args, rest).await?;
            let ledger = NotificationLedger::new(Arc::new(rest.resource::<Notification, NotificationInput>("notifications")), 10);
            load_failed(ledger.load().await)?;
            for (k, v) in filters {
                load_failed(ledger.set_filter(k.clone(), v.clone()).await)?;
            }
            if let Some(id) = mark_read {
                ledger.mark_as_read(id).await?;
            }
            if let Some(id) = delete {
                ledger.delete(id).await?;
            }
            if *mark_all {
                ledger.mark_all_as_read().await?;
            }
            let state = ledger.state();
            print_json(&json!({
                "unread": ledger.unread_count(),
                "total": state.total,
                "items": state.items,
            }))
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_cli();

    match run(Args::parse()).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}
