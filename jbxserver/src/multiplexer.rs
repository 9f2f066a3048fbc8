//! Multiplexeur de connexions
//!
//! Une seule boucle possède l'écouteur, les tampons de lignes des
//! connexions et le dispatcher : deux commandes ne s'exécutent jamais en
//! même temps. Chaque connexion a une tâche de lecture, qui transmet ses
//! octets à la boucle par un canal borné, et une tâche d'écriture, qui
//! reçoit les réponses dans l'ordre par sa propre file bornée.
//!
//! La boucle n'attend jamais une socket : un client qui ne lit plus ses
//! réponses remplit sa file et sa connexion est fermée, sans ralentir les
//! autres.

use crate::connection::{Connection, Frame};
use crate::dispatcher::CommandDispatcher;
use crate::reply::Reply;
use crate::session::ConnectionId;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Réglages du multiplexeur
#[derive(Debug, Clone)]
pub struct MultiplexerSettings {
    /// Taille des lectures sur chaque connexion
    pub read_buffer_size: usize,
    /// Capacité du canal entre les lecteurs et la boucle
    pub event_capacity: usize,
    /// Réponses en attente d'écriture au-delà desquelles la connexion est fermée
    pub reply_queue: usize,
    /// Longueur maximale d'une commande, terminateur exclu
    pub max_line_length: usize,
}

impl Default for MultiplexerSettings {
    fn default() -> Self {
        Self {
            read_buffer_size: 1024,
            event_capacity: 256,
            reply_queue: 64,
            max_line_length: 8192,
        }
    }
}

#[derive(Debug)]
enum ConnectionEvent {
    Data(ConnectionId, Vec<u8>),
    Closed(ConnectionId),
    Failed(ConnectionId, io::Error),
}

struct OpenConnection {
    connection: Connection,
    replies: mpsc::Sender<String>,
    reader_token: CancellationToken,
    writer_token: CancellationToken,
}

/// Manière de fermer une connexion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    /// Les réponses déjà en file sont écrites avant la fermeture
    Flush,
    /// Les réponses en attente sont abandonnées
    Abort,
}

/// Serveur de protocole sur TCP
pub struct Multiplexer {
    listener: TcpListener,
    dispatcher: CommandDispatcher,
    settings: MultiplexerSettings,
    shutdown: CancellationToken,
    connections: HashMap<ConnectionId, OpenConnection>,
}

impl Multiplexer {
    /// Ouvre l'écouteur sur `address` (`host:port`)
    pub async fn bind(
        address: &str,
        dispatcher: CommandDispatcher,
        settings: MultiplexerSettings,
    ) -> Result<Self> {
        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| Error::Bind {
                address: address.to_string(),
                source,
            })?;
        Ok(Self::from_listener(listener, dispatcher, settings))
    }

    pub fn from_listener(
        listener: TcpListener,
        dispatcher: CommandDispatcher,
        settings: MultiplexerSettings,
    ) -> Self {
        Self {
            listener,
            dispatcher,
            settings,
            shutdown: CancellationToken::new(),
            connections: HashMap::new(),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Jeton qui arrête `run` une fois annulé
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Boucle principale, jusqu'à l'arrêt demandé ou une erreur de stockage
    pub async fn run(mut self) -> Result<()> {
        let (tx, mut rx) = mpsc::channel(self.settings.event_capacity.max(1));
        info!(address=%self.local_addr()?, "Jukebox server listening");

        let result = loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.accept(stream, peer, tx.clone()),
                    Err(e) => warn!("Failed to accept connection: {}", e),
                },
                Some(event) = rx.recv() => {
                    if let Err(e) = self.handle_event(event) {
                        break Err(e);
                    }
                }
            }
        };

        let ids: Vec<ConnectionId> = self.connections.keys().copied().collect();
        for id in ids {
            self.close_connection(id, "server stopping", Closing::Abort);
        }
        self.dispatcher.shutdown();
        info!("Jukebox server stopped");
        result
    }

    fn accept(&mut self, stream: TcpStream, peer: SocketAddr, tx: mpsc::Sender<ConnectionEvent>) {
        let id = ConnectionId::new();
        let (reader, writer) = stream.into_split();
        let reader_token = self.shutdown.child_token();
        let writer_token = self.shutdown.child_token();
        let (replies, queue) = mpsc::channel(self.settings.reply_queue.max(1));

        tokio::spawn(read_loop(
            id,
            reader,
            self.settings.read_buffer_size.max(1),
            tx.clone(),
            reader_token.clone(),
        ));
        tokio::spawn(write_loop(id, writer, queue, tx, writer_token.clone()));

        self.connections.insert(
            id,
            OpenConnection {
                connection: Connection::new(id, peer, self.settings.max_line_length),
                replies,
                reader_token,
                writer_token,
            },
        );
        self.dispatcher.connection_opened(id);
        info!(connection=%id, peer=%peer, "Connection accepted");
    }

    fn handle_event(&mut self, event: ConnectionEvent) -> Result<()> {
        match event {
            ConnectionEvent::Data(id, bytes) => self.handle_data(id, &bytes),
            ConnectionEvent::Closed(id) => {
                self.close_connection(id, "closed by peer", Closing::Flush);
                Ok(())
            }
            ConnectionEvent::Failed(id, e) => {
                warn!(connection=%id, "Network error: {}", e);
                self.close_connection(id, "network error", Closing::Abort);
                Ok(())
            }
        }
    }

    fn handle_data(&mut self, id: ConnectionId, bytes: &[u8]) -> Result<()> {
        let frames = match self.connections.get_mut(&id) {
            Some(open) => open.connection.feed(bytes),
            None => return Ok(()),
        };

        for frame in frames {
            let reply = match frame {
                Frame::Line(line) => self.dispatcher.dispatch(id, &line)?,
                Frame::Oversized => {
                    warn!(
                        connection=%id,
                        limit = self.settings.max_line_length,
                        "Command line too long, discarded"
                    );
                    Reply::unknown_command()
                }
            };

            let Some(open) = self.connections.get(&id) else {
                break;
            };
            trace!(connection=%id, reply=%reply, "Queueing reply");
            match open.replies.try_send(reply.to_line()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(connection=%id, "Client does not read its replies");
                    self.close_connection(id, "reply queue full", Closing::Abort);
                    break;
                }
                Err(TrySendError::Closed(_)) => {
                    self.close_connection(id, "writer stopped", Closing::Abort);
                    break;
                }
            }
            if reply.closes_connection() {
                self.close_connection(id, "disconnect requested", Closing::Flush);
                break;
            }
        }
        Ok(())
    }

    /// Retire la connexion et libère sa session
    ///
    /// Avec [`Closing::Flush`], la tâche d'écriture vide sa file puis ferme
    /// la socket ; sinon elle s'arrête immédiatement.
    fn close_connection(&mut self, id: ConnectionId, reason: &str, closing: Closing) {
        let Some(mut open) = self.connections.remove(&id) else {
            return;
        };
        open.reader_token.cancel();
        if closing == Closing::Abort {
            open.writer_token.cancel();
        }
        open.connection.close();
        self.dispatcher.connection_closed(id);
        info!(connection=%id, peer=%open.connection.peer(), reason, "Connection closed");
    }
}

async fn read_loop(
    id: ConnectionId,
    mut reader: OwnedReadHalf,
    buffer_size: usize,
    tx: mpsc::Sender<ConnectionEvent>,
    token: CancellationToken,
) {
    let mut buffer = vec![0u8; buffer_size];
    loop {
        let read = tokio::select! {
            _ = token.cancelled() => return,
            read = reader.read(&mut buffer) => read,
        };

        let event = match read {
            Ok(0) => ConnectionEvent::Closed(id),
            Ok(n) => ConnectionEvent::Data(id, buffer[..n].to_vec()),
            Err(e) => ConnectionEvent::Failed(id, e),
        };
        let last = !matches!(event, ConnectionEvent::Data(..));

        if tx.send(event).await.is_err() || last {
            debug!(connection=%id, "Reader stopped");
            return;
        }
    }
}

async fn write_loop(
    id: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut queue: mpsc::Receiver<String>,
    events: mpsc::Sender<ConnectionEvent>,
    token: CancellationToken,
) {
    loop {
        let line = tokio::select! {
            _ = token.cancelled() => return,
            line = queue.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };

        let written = tokio::select! {
            _ = token.cancelled() => return,
            written = writer.write_all(line.as_bytes()) => written,
        };
        if let Err(e) = written {
            // La boucle ferme la connexion en recevant l'événement
            if events.send(ConnectionEvent::Failed(id, e)).await.is_err() {
                debug!(connection=%id, "Write failed after server stop");
            }
            return;
        }
    }

    // File fermée par la boucle : toutes les réponses sont écrites
    if let Err(e) = writer.shutdown().await {
        debug!(connection=%id, "Failed to shut down socket: {}", e);
    }
    debug!(connection=%id, "Writer stopped");
}
