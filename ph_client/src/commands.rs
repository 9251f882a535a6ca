use pico_args::Arguments;
use portfolio_hub::Access;
use portfolio_hub::auth::UserId;
use std::ffi::OsString;

/// Errors that can occur during command parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No command given. Run with --help to see available commands")]
    MissingCommand,

    #[error("Unrecognized command '{0}'. Run with --help to see available commands")]
    UnrecognizedCommand(String),

    #[error("'{command}' requires {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Invalid user id '{0}'. Must be a number (e.g., 'impersonate 42')")]
    InvalidUserId(String),

    #[error("Unexpected arguments: {0}")]
    UnexpectedArguments(String),

    #[error(transparent)]
    Args(#[from] pico_args::Error),
}

/// A single client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        username: Option<String>,
        password: Option<String>,
    },
    Register {
        username: Option<String>,
        email: Option<String>,
        full_name: Option<String>,
    },
    WhoAmI,
    Logout,
    Impersonate(UserId),
    StopImpersonation,
    Users,
    Stats,
    SetActive {
        user_id: UserId,
        is_active: bool,
    },
    DeleteUser(UserId),
    ForgotPassword {
        email: Option<String>,
    },
    ResetPassword,
    ChangePassword,
    Guard {
        path: String,
        access: Access,
    },
}

impl Command {
    /// Whether the command acts on behalf of a signed-in user
    pub fn needs_session(&self) -> bool {
        !matches!(
            self,
            Self::Login { .. }
                | Self::Register { .. }
                | Self::ForgotPassword { .. }
                | Self::ResetPassword
                | Self::Guard { .. }
                | Self::Logout
        )
    }
}

/// Parse the subcommand and its arguments.
///
/// Global options must already have been taken out of `args`.
///
/// # Examples
///
/// ```
/// use ph_client::commands::{Command, parse_command};
/// use pico_args::Arguments;
///
/// let args = Arguments::from_vec(vec!["impersonate".into(), "42".into()]);
/// assert_eq!(parse_command(args).unwrap(), Command::Impersonate(42));
/// ```
pub fn parse_command(mut args: Arguments) -> Result<Command, ParseError> {
    let Some(name) = args.subcommand()? else {
        return Err(ParseError::MissingCommand);
    };

    let command = match name.as_str() {
        "login" => Command::Login {
            username: args.opt_value_from_str(["-u", "--username"])?,
            password: args.opt_value_from_str(["-p", "--password"])?,
        },
        "register" => Command::Register {
            username: args.opt_value_from_str(["-u", "--username"])?,
            email: args.opt_value_from_str("--email")?,
            full_name: args.opt_value_from_str("--name")?,
        },
        "whoami" => Command::WhoAmI,
        "logout" => Command::Logout,
        "impersonate" => Command::Impersonate(user_id(&mut args, "impersonate")?),
        "stop-impersonation" => Command::StopImpersonation,
        "users" => Command::Users,
        "stats" => Command::Stats,
        "activate" => Command::SetActive {
            user_id: user_id(&mut args, "activate")?,
            is_active: true,
        },
        "deactivate" => Command::SetActive {
            user_id: user_id(&mut args, "deactivate")?,
            is_active: false,
        },
        "delete-user" => Command::DeleteUser(user_id(&mut args, "delete-user")?),
        "forgot-password" => Command::ForgotPassword {
            email: args.opt_value_from_str("--email")?,
        },
        "reset-password" => Command::ResetPassword,
        "change-password" => Command::ChangePassword,
        "guard" => {
            let access = if args.contains("--admin") {
                Access::PlatformAdmin
            } else if args.contains("--guest") {
                Access::GuestOnly
            } else {
                Access::Authenticated
            };
            let path = args
                .opt_free_from_str::<String>()?
                .ok_or(ParseError::MissingArgument {
                    command: "guard",
                    argument: "a route path",
                })?;
            Command::Guard { path, access }
        }
        other => return Err(ParseError::UnrecognizedCommand(other.to_string())),
    };

    let remaining = args.finish();
    if !remaining.is_empty() {
        return Err(ParseError::UnexpectedArguments(join_lossy(&remaining)));
    }

    Ok(command)
}

/// Parse a positional user id
fn user_id(args: &mut Arguments, command: &'static str) -> Result<UserId, ParseError> {
    let raw: String = args
        .opt_free_from_str()?
        .ok_or(ParseError::MissingArgument {
            command,
            argument: "a user id",
        })?;
    raw.parse().map_err(|_| ParseError::InvalidUserId(raw))
}

fn join_lossy(values: &[OsString]) -> String {
    values
        .iter()
        .map(|v| v.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
