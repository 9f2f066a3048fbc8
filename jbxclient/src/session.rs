//! Session cliente : une commande, une réponse, et la lecture locale

use crate::reply::ServerReply;
use crate::{Error, Result};
use jbxplayer::{PlaybackOutcome, Player};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

struct ActivePlayback {
    token: CancellationToken,
    handle: JoinHandle<jbxplayer::Result<PlaybackOutcome>>,
}

/// Connexion d'un client au serveur Jukebox
///
/// Quand le serveur répond à `play` par un descripteur, le morceau est joué
/// localement par `player` ; `[ Song stopped successfully ]` et
/// `[ Disconnected from server ]` arrêtent cette lecture.
pub struct ClientSession<R, W> {
    reader: R,
    writer: W,
    player: Arc<dyn Player>,
    playback: Option<ActivePlayback>,
}

impl ClientSession<BufReader<OwnedReadHalf>, OwnedWriteHalf> {
    /// Se connecte à `address` (`host:port`)
    pub async fn connect(address: &str, player: Arc<dyn Player>) -> Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|source| Error::Connect {
                address: address.to_string(),
                source,
            })?;
        info!(address, "Connected to Jukebox server");
        let (reader, writer) = stream.into_split();
        Ok(Self::new(BufReader::new(reader), writer, player))
    }
}

impl<R, W> ClientSession<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, player: Arc<dyn Player>) -> Self {
        Self {
            reader,
            writer,
            player,
            playback: None,
        }
    }

    /// Envoie une commande et attend sa réponse
    pub async fn send(&mut self, command: &str) -> Result<ServerReply> {
        let command = command.trim_end_matches(['\r', '\n']);
        self.writer.write_all(format!("{}\n", command).as_bytes()).await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            self.stop_playback();
            return Err(Error::ServerClosed);
        }

        let reply = ServerReply::parse(&line);
        match &reply {
            ServerReply::Playback(descriptor) => {
                self.stop_playback();
                debug!(song=%descriptor.song, "Starting local playback");
                let token = CancellationToken::new();
                let handle = self.player.spawn(descriptor.clone(), token.clone());
                self.playback = Some(ActivePlayback { token, handle });
            }
            ServerReply::Stopped | ServerReply::Disconnected => self.stop_playback(),
            ServerReply::Message(_) => {}
        }
        Ok(reply)
    }

    /// Vrai tant qu'un morceau est en cours de lecture
    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.token.is_cancelled() && !p.handle.is_finished())
    }

    /// Demande l'arrêt de la lecture en cours, sans l'attendre
    pub fn stop_playback(&mut self) {
        if let Some(playback) = &self.playback {
            playback.token.cancel();
        }
    }

    /// Attend la fin de la dernière lecture lancée
    pub async fn wait_playback(&mut self) -> Result<Option<PlaybackOutcome>> {
        let Some(playback) = self.playback.take() else {
            return Ok(None);
        };
        Ok(Some(playback.handle.await??))
    }
}

impl<R, W> Drop for ClientSession<R, W> {
    fn drop(&mut self) {
        if let Some(playback) = &self.playback {
            playback.token.cancel();
        }
    }
}

/// Boucle interactive : chaque ligne de `input` est envoyée au serveur et la
/// réponse écrite sur `output`
///
/// S'arrête à la fin de `input` ou après `[ Disconnected from server ]`.
pub async fn run_interactive<R, W, I, O>(
    session: &mut ClientSession<R, W>,
    input: I,
    mut output: O,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(b"Enter message: ").await?;
        output.flush().await?;

        let Some(command) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };

        let reply = session.send(&command).await?;
        output.write_all(format!("{}\n", reply).as_bytes()).await?;
        if reply == ServerReply::Disconnected {
            break;
        }
    }
    output.flush().await?;
    Ok(())
}
