use anyhow::Context;
use jbxclient::{ClientSession, WavFileSink, run_interactive};
use jbxconfig::get_config;
use jbxplayer::PlayerConfigExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{BufReader, stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("There is a problem with the network communication: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// Les logs vont sur stderr pour ne pas se mêler au dialogue
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Usage : `jukebox-client [host:port] [output.wav]`
async fn run() -> anyhow::Result<()> {
    let config = get_config();
    let mut args = std::env::args().skip(1);
    let address = args
        .next()
        .unwrap_or_else(|| config.get_client_server_address());
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.get_client_output_file());

    let player = config
        .wav_player(Arc::new(WavFileSink::new(&output)))
        .context("Failed to initialise the player")?;
    let mut session = ClientSession::connect(&address, Arc::new(player)).await?;
    println!("Connected to the server. Songs are written to {}", output.display());

    run_interactive(&mut session, BufReader::new(stdin()), stdout()).await?;
    Ok(())
}
