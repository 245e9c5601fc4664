//! `gigctl`: command-line client for the Gigboard backend.
//!
//! Signs in, refreshes, signs out and makes authorized requests with the
//! same session layout the browser keeps, persisted to a JSON file. `route`
//! answers what the edge server would do with a path given the stored
//! cookies.

mod store;
mod transport;


use std::path::PathBuf;
use std::rc::Rc;

use access::config::CookiePolicy;
use access::routes::{EdgeCookies, RouteDecision, evaluate};
use access::store::{ACCESS_TOKEN_KEY, StoreError, USER_TYPE_KEY};
use access::{AuthClient, AuthError, Role, dashboard_path_for};
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::store::SessionFile;
use crate::transport::ReqwestTransport;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid API URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http client failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("session file: {0}")]
    Store(#[from] StoreError),
    #[error("not signed in; run `gigctl login` first")]
    NotSignedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn parse_role(raw: &str) -> Result<Role, String> {
    Role::parse(raw).ok_or_else(|| format!("unknown role `{raw}`; expected admin, employer or user"))
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".gigctl")
        .join("session.json")
}

#[derive(Parser, Debug)]
#[command(name = "gigctl", about = "Gigboard session and API CLI")]
struct Cli {
    #[arg(long, env = "GIGBOARD_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: String,

    #[arg(long, env = "GIGBOARD_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Log requests and session changes to stderr.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GIGBOARD_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_parser = parse_role, default_value = "user")]
        role: Role,
    },
    /// Exchange the stored refresh token for new tokens.
    Refresh,
    /// Sign out; the local session is cleared even if the backend is down.
    Logout,
    /// Show the backend's view of the signed-in user.
    Me,
    /// Authorized GET against an API path, e.g. `/api/employers/jobs`.
    Get { path: String },
    /// Show the stored session.
    Status,
    /// Evaluate the edge guard for a page path against the stored cookies.
    Route { path: String },
}

struct CliContext {
    file: SessionFile,
    client: AuthClient,
}

impl CliContext {
    fn new(cli: &Cli) -> Result<Self, CliError> {
        let path = cli.session_file.clone().unwrap_or_else(default_session_file);
        let file = SessionFile::open(path);
        let repo = Rc::new(file.repository(CookiePolicy::from_env()));
        let transport = Rc::new(ReqwestTransport::new(&cli.api_url)?);
        Ok(Self { file, client: AuthClient::new(transport, repo) })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let ctx = CliContext::new(&cli)?;
    for line in run(&ctx, cli.command).await? {
        println!("{line}");
    }
    Ok(())
}

/// Execute one command; returns the lines to print.
async fn run(ctx: &CliContext, command: Command) -> Result<Vec<String>, CliError> {
    let repo = ctx.client.repository();
    match command {
        Command::Login { email, password, role } => {
            let session = ctx.client.login(&email, &password, role).await?;
            Ok(vec![
                format!("signed in as {} ({})", session.user.display_name(), session.role.label()),
                format!("dashboard: {}", session.role.dashboard_path()),
            ])
        }
        Command::Refresh => {
            let token = repo.refresh_token().ok_or(CliError::NotSignedIn)?;
            ctx.client.refresh(&token).await?;
            Ok(vec!["tokens refreshed".to_owned()])
        }
        Command::Logout => {
            if let Err(e) = ctx.client.logout(repo.refresh_token().as_deref()).await {
                tracing::warn!(error = %e, "server-side logout failed; clearing local session");
            }
            repo.clear()?;
            Ok(vec!["signed out".to_owned()])
        }
        Command::Me => {
            let token = repo.access_token().ok_or(CliError::NotSignedIn)?;
            let user = ctx.client.current_user(&token).await?;
            Ok(vec![serde_json::to_string_pretty(&user)?])
        }
        Command::Get { path } => {
            let envelope = ctx.client.fetch::<Value>(&normalize_api_path(&path)).await?;
            Ok(vec![serde_json::to_string_pretty(&envelope)?])
        }
        Command::Status => Ok(status_lines(ctx)),
        Command::Route { path } => {
            let access_token = ctx.file.cookie(ACCESS_TOKEN_KEY);
            let user_type = ctx.file.cookie(USER_TYPE_KEY);
            let cookies = EdgeCookies::new(access_token.as_deref(), user_type.as_deref());
            Ok(vec![describe_route(&path, evaluate(&path, cookies))])
        }
    }
}

fn status_lines(ctx: &CliContext) -> Vec<String> {
    match ctx.client.repository().read() {
        Some(session) => vec![
            format!("signed in as {} <{}>", session.user.display_name(), session.user.email),
            format!("role: {} ({})", session.role, session.role.label()),
            format!("dashboard: {}", dashboard_path_for(Some(session.role.as_str()))),
            format!("session file: {}", ctx.file.path().display()),
        ],
        None => vec![
            "not signed in".to_owned(),
            format!("session file: {}", ctx.file.path().display()),
        ],
    }
}

/// Accept `employers/jobs`, `/employers/jobs` or `/api/employers/jobs`.
fn normalize_api_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed == "api" || trimmed.starts_with("api/") {
        format!("/{trimmed}")
    } else {
        format!("/api/{trimmed}")
    }
}

fn describe_route(path: &str, decision: RouteDecision) -> String {
    match decision {
        RouteDecision::Pass => format!("{path}: pass"),
        RouteDecision::Redirect(to) => format!("{path}: redirect -> {to}"),
    }
}
