use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pizarra: follow and drive shared whiteboard rooms from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pizarra", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Bearer token issued by the authentication service.
    #[arg(long, env = "PIZARRA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Id of the logged-in user.
    #[arg(long, env = "PIZARRA_USER_ID", global = true, default_value = "")]
    pub user_id: String,

    /// Display name of the logged-in user.
    #[arg(long, env = "PIZARRA_USERNAME", global = true, default_value = "")]
    pub username: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the effective configuration as JSON.
    Config,
    /// List rooms visible to the current user.
    Rooms,
    /// Create a room.
    CreateRoom { name: String },
    /// Fetch (or generate) a room's invite code.
    InviteCode { room: String },
    /// Join a room using an invite code.
    JoinInvite { code: String },
    /// Join a room and log every change until Ctrl-C.
    Watch { room: String },
    /// Join a room, request code generation, and print the result.
    Generate {
        room: String,
        /// Seconds to wait for the result.
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_with_global_flags() {
        let args = Args::try_parse_from([
            "pizarra",
            "watch",
            "R1",
            "--token",
            "tok",
            "--user-id",
            "u1",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Watch { room: "R1".into() });
        assert_eq!(args.token.as_deref(), Some("tok"));
        assert_eq!(args.user_id, "u1");
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn generate_timeout_defaults() {
        let args = Args::try_parse_from(["pizarra", "generate", "R1"]).unwrap();
        assert_eq!(
            args.command,
            Command::Generate {
                room: "R1".into(),
                timeout: 120
            }
        );
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Args::try_parse_from(["pizarra"]).is_err());
    }
}
