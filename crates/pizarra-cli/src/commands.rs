//! Subcommand implementations.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use pizarra_common::{PizarraError, Result, SyncError};
use pizarra_config::PizarraConfig;
use pizarra_sync::{
    AuthProvider, ConnectionConfig, ConnectionStatus, Credentials, DirectoryClient,
    RoomDirectory, RoomSession, SessionOptions, SessionUpdate, User, WsTransport,
};

use crate::cli::{Args, Command};

pub async fn run(args: Args, config: PizarraConfig) -> Result<()> {
    let auth: Arc<dyn AuthProvider> = Arc::new(credentials(&args));
    let directory = DirectoryClient::new(
        config.directory.base_url.clone(),
        config.directory.timeout_secs,
        Arc::clone(&auth),
    )?;

    match args.command {
        Command::Config => println!("{}", pizarra_config::config_to_json(&config)),
        Command::Rooms => {
            for room in directory.list_rooms().await? {
                println!("{}\t{}", room.id, room.name);
            }
        }
        Command::CreateRoom { name } => {
            let room = directory.create_room(&name).await?;
            println!("{}", room.id);
        }
        Command::InviteCode { room } => {
            println!("{}", directory.invite_code(&room).await?);
        }
        Command::JoinInvite { code } => {
            let room = directory.join_by_invite(&code).await?;
            println!("{}\t{}", room.id, room.name);
        }
        Command::Watch { room } => watch(&config, auth, &directory, &room).await?,
        Command::Generate { room, timeout } => {
            let session = new_session(&config, auth);
            let fut = generate(session, &room);
            let code = tokio::time::timeout(Duration::from_secs(timeout), fut)
                .await
                .map_err(|_| PizarraError::Other(format!("no result after {timeout}s")))??;
            let rendered = serde_json::to_string_pretty(&code)
                .map_err(|e| PizarraError::Other(e.to_string()))?;
            println!("{rendered}");
        }
    }
    Ok(())
}

fn credentials(args: &Args) -> Credentials {
    Credentials::new(
        User::new(args.user_id.clone(), args.username.clone()),
        args.token.clone().unwrap_or_default(),
    )
}

pub fn connection_config(config: &PizarraConfig) -> ConnectionConfig {
    ConnectionConfig {
        url: config.hub.url.clone(),
        socket_path: config.hub.socket_path.clone(),
        connect_timeout_secs: config.hub.connect_timeout_secs,
        reconnect_delay_secs: config.hub.reconnect_delay_secs,
        max_reconnect_delay_secs: config.hub.max_reconnect_delay_secs,
    }
}

pub fn session_options(config: &PizarraConfig) -> SessionOptions {
    SessionOptions {
        disconnect_on_leave: config.session.disconnect_on_leave,
        event_capacity: config.session.event_capacity as usize,
    }
}

fn new_session(config: &PizarraConfig, auth: Arc<dyn AuthProvider>) -> RoomSession<WsTransport> {
    RoomSession::new(
        WsTransport::new(connection_config(config)),
        auth,
        session_options(config),
    )
}

async fn watch(
    config: &PizarraConfig,
    auth: Arc<dyn AuthProvider>,
    directory: &DirectoryClient,
    room: &str,
) -> Result<()> {
    let mut session = new_session(config, auth);
    let mut updates = session.subscribe();
    session.join(room)?;

    match directory.room_snapshot(room).await {
        Ok(snapshot) => session.resync_from_room_snapshot(snapshot),
        Err(e) => warn!(room = %room, error = %e, "Could not fetch stored whiteboard"),
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            alive = session.process_next() => {
                if !alive {
                    break;
                }
            }
            update = updates.recv() => match update {
                Ok(update) => report(&update),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Observer fell behind"),
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
        }
    }

    session.cleanup();
    Ok(())
}

async fn generate(
    mut session: RoomSession<WsTransport>,
    room: &str,
) -> Result<pizarra_sync::GeneratedCode> {
    let mut updates = session.subscribe();
    session.join(room)?;
    let mut requested = false;

    loop {
        if !requested && session.connection_status() == ConnectionStatus::Connected {
            session.request_code_generation()?;
            requested = true;
        }
        tokio::select! {
            alive = session.process_next() => {
                if !alive {
                    return Err(SyncError::NotConnected.into());
                }
            }
            update = updates.recv() => match update {
                Ok(SessionUpdate::CodeGenerated(code)) => {
                    session.cleanup();
                    return Ok(code);
                }
                Ok(SessionUpdate::Rejected(reason)) => {
                    session.cleanup();
                    return Err(SyncError::Rejected(reason).into());
                }
                Ok(update) => report(&update),
                Err(RecvError::Lagged(missed)) => warn!(missed, "Observer fell behind"),
                Err(RecvError::Closed) => return Err(SyncError::NotConnected.into()),
            },
        }
    }
}

fn report(update: &SessionUpdate) {
    match update {
        SessionUpdate::Connection(status) => info!(?status, "Connection"),
        SessionUpdate::DocumentChanged(document) => {
            info!(components = document.len(), "Whiteboard updated")
        }
        SessionUpdate::PresenceChanged(users) => {
            let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
            info!(count = users.len(), users = ?names, "Presence changed");
        }
        SessionUpdate::EditorChanged(Some(claim)) => info!(
            user = %claim.username,
            component = ?claim.component_id,
            "Editing"
        ),
        SessionUpdate::EditorChanged(None) => info!("Nobody editing"),
        SessionUpdate::CodeGenerated(code) => {
            info!(artifacts = code.components.len(), "Code generated")
        }
        SessionUpdate::Rejected(reason) => warn!(reason = %reason, "Hub rejected request"),
        SessionUpdate::TransportError(message) => warn!(error = %message, "Connection problem"),
    }
}
