//! Command-line parsing and command handlers.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use sessionward_core::{
    Config, Credentials, HttpAuthClient, KeyringCredentialStore, LoginOutcome, LogoutOutcome,
    SessionManager, SettingsBundle, SettingsDb,
};
use tracing::{info, warn};

use crate::terminal::{TerminalNavigator, TerminalNotifier, TerminalPrompt};

/// Env var supplying the username non-interactively
const USERNAME_ENV: &str = "SESSIONWARD_USERNAME";

/// Env var supplying the password non-interactively
const PASSWORD_ENV: &str = "SESSIONWARD_PASSWORD";

pub const USAGE: &str = "\
Usage: sessionward <command>

Commands:
  login [username]     Log in and store the session token
  logout [--confirm]   End the session, optionally asking first
  status               Show the current session
  redirect <path>      Remember where to go after the next login
  help                 Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String> },
    Logout { confirm: bool },
    Status,
    Redirect { path: String },
    Help,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut args = args.iter().map(String::as_str);
        let command = match args.next() {
            None | Some("help") | Some("--help") | Some("-h") => Command::Help,
            Some("login") => Command::Login {
                username: args.next().map(str::to_string),
            },
            Some("logout") => match args.next() {
                None => Command::Logout { confirm: false },
                Some("--confirm") | Some("-c") => Command::Logout { confirm: true },
                Some(other) => bail!("Unknown logout option: {}", other),
            },
            Some("status") => Command::Status,
            Some("redirect") => match args.next() {
                Some(path) => Command::Redirect {
                    path: path.to_string(),
                },
                None => bail!("redirect needs a path"),
            },
            Some(other) => bail!("Unknown command: {}\n\n{}", other, USAGE),
        };

        if let Some(extra) = args.next() {
            bail!("Unexpected argument: {}", extra);
        }
        Ok(command)
    }
}

/// A wired session manager and the navigator it reports to
pub struct Wiring {
    pub manager: SessionManager,
    pub navigator: Arc<TerminalNavigator>,
}

pub fn wire(config: &Config) -> Result<Wiring> {
    let auth = HttpAuthClient::from_config(config)?;
    let db = SettingsDb::new(Config::data_dir()?.join("settings"))?;
    let settings = SettingsBundle::new(Arc::new(db));
    let navigator = Arc::new(TerminalNavigator::default());

    let manager = SessionManager::builder()
        .auth(Arc::new(auth))
        .store(Arc::new(KeyringCredentialStore::new()))
        .identity(settings.identity.clone())
        .cascade(settings.cascade())
        .navigator(navigator.clone())
        .notifier(Arc::new(TerminalNotifier))
        .prompt(Arc::new(TerminalPrompt))
        .config(config)
        .build()?;

    Ok(Wiring { manager, navigator })
}

pub async fn run(command: Command, config: &mut Config) -> Result<()> {
    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Login { username } => login(username, config).await,
        Command::Logout { confirm } => logout(confirm, config).await,
        Command::Status => status(config),
        Command::Redirect { path } => {
            let wiring = wire(config)?;
            wiring
                .manager
                .remember_redirect(&path)
                .context("Failed to store redirect marker")?;
            println!("Will return to {} after the next login", path);
            Ok(())
        }
    }
}

async fn login(username: Option<String>, config: &mut Config) -> Result<()> {
    let username = match username
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .or_else(|| config.last_username.clone())
    {
        Some(username) => username,
        None => prompt_username()?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let wiring = wire(config)?;
    eprintln!("Authenticating...");

    match wiring
        .manager
        .login(&Credentials::new(username.clone(), password))
        .await
    {
        LoginOutcome::Authenticated { destination } => {
            config.last_username = Some(username);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Login successful. Continue at {}", destination);
            Ok(())
        }
        LoginOutcome::Rejected { .. } => bail!("Login rejected"),
        LoginOutcome::TransportFailed => {
            bail!("Login failed: could not reach the auth service (see logs)")
        }
        LoginOutcome::AlreadyInFlight => bail!("Another login is already running"),
    }
}

async fn logout(confirm: bool, config: &Config) -> Result<()> {
    let wiring = wire(config)?;
    if !wiring.manager.restore() {
        info!("No stored session, clearing local state anyway");
    }

    match wiring.manager.logout(confirm).await {
        LogoutOutcome::LoggedOut => {
            let destination = wiring
                .navigator
                .last()
                .unwrap_or_else(|| wiring.manager.routes().login.clone());
            println!("Logged out. Continue at {}", destination);
        }
        LogoutOutcome::Abandoned(_) => println!("Still logged in."),
        LogoutOutcome::ConfirmationPending => println!("A logout confirmation is already open."),
    }
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let wiring = wire(config)?;
    wiring.manager.restore();

    let session = wiring.manager.session().current();
    println!("Status: {:?}", session.status());
    if let Some(identity) = session.identity() {
        println!("User:   {}", identity.display_name().unwrap_or("(unnamed)"));
        if !identity.attributes.is_empty() {
            println!("{}", serde_json::to_string_pretty(&identity.attributes)?);
        }
    }
    Ok(())
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&["help"], Command::Help)]
    #[case(&["login"], Command::Login { username: None })]
    #[case(&["login", "alice"], Command::Login { username: Some("alice".to_string()) })]
    #[case(&["logout"], Command::Logout { confirm: false })]
    #[case(&["logout", "--confirm"], Command::Logout { confirm: true })]
    #[case(&["status"], Command::Status)]
    #[case(&["redirect", "/orders"], Command::Redirect { path: "/orders".to_string() })]
    fn test_parse_valid(#[case] input: &[&str], #[case] expected: Command) {
        assert_eq!(Command::parse(&args(input)).unwrap(), expected);
    }

    #[rstest]
    #[case(&["frobnicate"])]
    #[case(&["logout", "--force"])]
    #[case(&["redirect"])]
    #[case(&["status", "extra"])]
    fn test_parse_invalid(#[case] input: &[&str]) {
        assert!(Command::parse(&args(input)).is_err());
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn test_wire_needs_base_url() {
        assert!(wire(&Config::default()).is_err());
    }
}
