use anyhow::Context;
use jbxconfig::get_config;
use jbxplayer::{NullSink, PlayerConfigExt};
use jbxserver::{CommandDispatcher, Multiplexer, ServerConfigExt, init_logging};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Jukebox stopped on error: {:#}", e);
            eprintln!("Jukebox stopped on error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = get_config();
    let _log_handle = init_logging(&config)?;
    info!(config_dir=%config.directory(), "🎵 Starting Jukebox server");

    // Adresse d'écoute : premier argument `host:port`, sinon la configuration
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.get_listen_address());

    let state = config
        .load_server_state()
        .context("Failed to load server data")?;
    info!(
        songs = state.catalog.len(),
        users = state.users.len(),
        playlists = state.playlists.len(),
        "📚 Data loaded"
    );

    let player = config
        .wav_player(Arc::new(NullSink))
        .context("Failed to initialise the player")?;
    let dispatcher = CommandDispatcher::new(state, Arc::new(player));

    let server = Multiplexer::bind(&address, dispatcher, config.multiplexer_settings()).await?;

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C reçu, arrêt gracieux");
                shutdown.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    server.run().await?;
    Ok(())
}
