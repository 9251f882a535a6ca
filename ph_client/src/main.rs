//! Command-line client for the PortfolioHub API.
//!
//! Each invocation restores the session from the token file, runs one
//! command and exits. Token refresh, impersonation and redirects behave as
//! they do in the browser app.

use anyhow::{Context, Result, bail};
use pico_args::Arguments;
use portfolio_hub::auth::{RegisterRequest, ResetPasswordRequest};
use portfolio_hub::store::FileStorage;
use portfolio_hub::{Access, AuthError, GuardDecision, Hub, TokenStore};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use ph_client::commands::{Command, parse_command};
use ph_client::config::ClientConfig;
use ph_client::logging;
use ph_client::terminal::TerminalNavigator;

const HELP: &str = "\
Manage a PortfolioHub session from the terminal

USAGE:
  ph_client [OPTIONS] <COMMAND>

COMMANDS:
  login [-u NAME] [-p PASS]        Sign in
  register [-u NAME] [--email E] [--name N]
                                   Create an account and sign in
  whoami                           Show the signed-in user
  logout                           Forget the stored session
  forgot-password [--email E]      Request a password reset link
  reset-password                   Set a new password from a reset link
  change-password                  Change the signed-in user's password
  impersonate <ID>                 Act as another user (platform admins)
  stop-impersonation               Return to the admin account
  users                            List all users (platform admins)
  stats                            Show platform statistics (platform admins)
  activate <ID>                    Re-enable a user (platform admins)
  deactivate <ID>                  Disable a user (platform admins)
  delete-user <ID>                 Delete a user and their data (platform admins)
  guard <PATH> [--admin|--guest]   Show where a route would take you

OPTIONS:
  --api URL             API base URL  [default: env PORTFOLIO_API_URL or http://localhost:8001/api]
  --token-file PATH     Session file  [default: env PORTFOLIO_TOKEN_FILE or .portfolio_session.json]
  --timeout SECS        Request timeout  [default: env PORTFOLIO_HTTP_TIMEOUT_SECS or 30]
  --json                Print admin listings as JSON

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  RUST_LOG              Log filter  [default: info,reqwest=warn,hyper=warn]
";

struct Args {
    api_url: Option<String>,
    token_file: Option<PathBuf>,
    timeout: Option<u64>,
    json: bool,
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let api_url = pargs.opt_value_from_str("--api")?;
    let token_file = pargs.opt_value_from_str("--token-file")?;
    let timeout = pargs.opt_value_from_str("--timeout")?;
    let json = pargs.contains("--json");
    let command = parse_command(pargs)?;

    logging::init();

    run(Args {
        api_url,
        token_file,
        timeout,
        json,
        command,
    })
    .await
}

async fn run(args: Args) -> Result<()> {
    let config = ClientConfig::from_env(args.api_url, args.token_file, args.timeout);
    config.validate()?;
    tracing::debug!("Using API at {}", config.api_url);

    let tokens = Arc::new(TokenStore::new(FileStorage::open(&config.token_file)));
    let navigator = Arc::new(TerminalNavigator::new());
    let hub = Hub::new(config.api_config(), tokens, navigator.clone())
        .context("Failed to build HTTP client")?;

    // Every page load starts by resolving the stored session
    hub.session().start().await;
    if let Some(admin_id) = hub.impersonation().original_admin_id() {
        println!("[Impersonating; admin #{} can return with stop-impersonation]", admin_id);
    }

    let command = args.command;
    if command.needs_session() && !hub.guard(Access::Authenticated).follow(navigator.as_ref()) {
        bail!("Not signed in. Run 'ph_client login' first.");
    }

    execute(&hub, command, args.json).await
}

async fn execute(hub: &Hub, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let username = match username {
                Some(u) => u,
                None => prompt("Username: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => prompt("Password: ")?,
            };

            println!("Logging in as {}...", username);
            let user = hub
                .session()
                .login(&username, &password)
                .await
                .map_err(report)?;
            println!("Login successful! Welcome, {}.", display_name(&user.full_name, &user.username));
            land(hub);
        }
        Command::Register {
            username,
            email,
            full_name,
        } => {
            let form = RegisterRequest {
                username: or_prompt(username, "Username: ")?,
                email: or_prompt(email, "Email: ")?,
                full_name: or_prompt(full_name, "Full name: ")?,
                password: prompt("Password: ")?,
                password_confirm: prompt("Confirm password: ")?,
            };
            let user = hub.session().register(&form).await.map_err(report)?;
            println!("Registered successfully! Signed in as {}.", user.username);
            land(hub);
        }
        Command::WhoAmI => {
            let user = hub.session().refresh_user().await.map_err(report)?;
            println!("{} (#{})", user.username, user.id);
            if !user.full_name.is_empty() {
                println!("  Name:  {}", user.full_name);
            }
            if let Some(email) = &user.email {
                println!("  Email: {}", email);
            }
            if user.is_platform_admin() {
                println!("  Role:  platform admin");
            }
        }
        Command::Logout => {
            hub.session().logout();
            println!("Signed out.");
        }
        Command::ForgotPassword { email } => {
            let email = or_prompt(email, "Email: ")?;
            let detail = hub.session().forgot_password(&email).await.map_err(report)?;
            println!("{}", detail);
        }
        Command::ResetPassword => {
            let request = ResetPasswordRequest {
                uid: prompt("Link uid: ")?,
                token: prompt("Link token: ")?,
                new_password: prompt("New password: ")?,
            };
            let confirmation = prompt("Confirm password: ")?;
            let detail = hub
                .session()
                .reset_password(&request, &confirmation)
                .await
                .map_err(report)?;
            println!("{}", detail);
        }
        Command::ChangePassword => {
            let old_password = prompt("Current password: ")?;
            let new_password = prompt("New password: ")?;
            let detail = hub
                .session()
                .change_password(&old_password, &new_password)
                .await
                .map_err(report)?;
            println!("{}", detail);
        }
        Command::Impersonate(user_id) => {
            let target = hub.impersonation().start(user_id).await.map_err(report)?;
            println!(
                "Now acting as {} (#{}).",
                display_name(&target.full_name, &target.username),
                target.id
            );
        }
        Command::StopImpersonation => {
            hub.impersonation().stop().await.map_err(report)?;
            println!("Returned to your admin account.");
        }
        Command::Users => {
            let users = hub.platform().list_users().await.map_err(api_report)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else if users.is_empty() {
                println!("No users.");
            } else {
                for user in &users {
                    println!(
                        "  #{:<5} {:<20} {:<30} {}{}",
                        user.id,
                        user.username,
                        user.email,
                        if user.is_active { "active" } else { "inactive" },
                        if user.is_platform_admin { ", admin" } else { "" }
                    );
                }
            }
        }
        Command::Stats => {
            let stats = hub.platform().stats().await.map_err(api_report)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Users:       {} ({} active)", stats.total_users, stats.active_users);
                println!("Signups:     {} in the last 30 days", stats.recent_signups);
                println!("Projects:    {}", stats.total_projects);
                println!("Skills:      {}", stats.total_skills);
                println!("Categories:  {}", stats.total_categories);
                println!("Experience:  {}", stats.total_experience);
                println!("Messages:    {}", stats.total_messages);
            }
        }
        Command::SetActive { user_id, is_active } => {
            let status = hub
                .platform()
                .set_user_active(user_id, is_active)
                .await
                .map_err(api_report)?;
            println!(
                "User #{} is now {}.",
                status.id,
                if status.is_active { "active" } else { "inactive" }
            );
        }
        Command::DeleteUser(user_id) => {
            let answer = prompt(&format!("Delete user #{} and all their data? [y/N] ", user_id))?;
            if !answer.eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
            let detail = hub
                .platform()
                .delete_user(user_id)
                .await
                .map_err(api_report)?;
            println!("{}", detail);
        }
        Command::Guard { path, access } => match hub.guard(access) {
            GuardDecision::Render => println!("{}: allowed", path),
            GuardDecision::Redirect(target) => println!("{}: redirected to {}", path, target),
            GuardDecision::Loading => println!("{}: still loading", path),
        },
    }

    Ok(())
}

/// Leave the sign-in page the way the guest-only guard directs
fn land(hub: &Hub) {
    hub.guard(Access::GuestOnly)
        .follow(hub.api().navigator().as_ref());
}

fn display_name<'a>(full_name: &'a str, username: &'a str) -> &'a str {
    if full_name.is_empty() { username } else { full_name }
}

fn report(err: AuthError) -> anyhow::Error {
    tracing::debug!("Command failed: {}", err);
    anyhow::anyhow!(err.client_message())
}

fn api_report(err: portfolio_hub::ApiError) -> anyhow::Error {
    report(AuthError::from(err))
}

fn or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;
    Ok(input.trim().to_string())
}
