use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Failures surfaced by the synchronization core and its collaborators.
///
/// Transport drops are not represented here: they are recovered by the
/// reconnect loop and only ever reach callers as lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("not authenticated: no token available")]
    NotAuthenticated,

    #[error("not connected to hub")]
    NotConnected,

    #[error("no active room")]
    NoActiveRoom,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("request rejected by hub: {0}")]
    Rejected(String),

    #[error("directory error (HTTP {status}): {message}")]
    Directory { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),
}

impl SyncError {
    /// Whether the hub or directory refused the request because of the token.
    pub fn is_authorization(&self) -> bool {
        match self {
            SyncError::NotAuthenticated | SyncError::Rejected(_) => true,
            SyncError::Directory { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PizarraError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("hub.url is empty".into());
        assert_eq!(err.to_string(), "config validation error: hub.url is empty");
    }

    #[test]
    fn sync_error_display() {
        assert_eq!(
            SyncError::NotAuthenticated.to_string(),
            "not authenticated: no token available"
        );
        assert_eq!(SyncError::NotConnected.to_string(), "not connected to hub");
        assert_eq!(
            SyncError::Rejected("token expired".into()).to_string(),
            "request rejected by hub: token expired"
        );
        let err = SyncError::Directory {
            status: 404,
            message: "Room not found".into(),
        };
        assert_eq!(err.to_string(), "directory error (HTTP 404): Room not found");
    }

    #[test]
    fn authorization_faults_are_classified() {
        assert!(SyncError::NotAuthenticated.is_authorization());
        assert!(SyncError::Rejected("nope".into()).is_authorization());
        assert!(SyncError::Directory {
            status: 401,
            message: String::new()
        }
        .is_authorization());
        assert!(!SyncError::Directory {
            status: 500,
            message: String::new()
        }
        .is_authorization());
        assert!(!SyncError::NotConnected.is_authorization());
        assert!(!SyncError::Transport("reset".into()).is_authorization());
    }

    #[test]
    fn pizarra_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: PizarraError = config_err.into();
        assert!(matches!(err, PizarraError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn pizarra_error_from_sync() {
        let err: PizarraError = SyncError::NoActiveRoom.into();
        assert!(matches!(err, PizarraError::Sync(SyncError::NoActiveRoom)));
        assert_eq!(err.to_string(), "no active room");
    }

    #[test]
    fn pizarra_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PizarraError = io_err.into();
        assert!(matches!(err, PizarraError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
