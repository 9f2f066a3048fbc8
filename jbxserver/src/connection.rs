//! Machine à états d'une connexion et découpage en lignes

use crate::session::ConnectionId;
use std::net::SocketAddr;

/// État d'une connexion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Acceptée, aucune donnée reçue
    Connected,
    /// Des données ont été reçues, en attente de la prochaine ligne
    AwaitingLine,
    /// Fermée, plus aucune donnée n'est traitée
    Closed,
}

/// Unité extraite du flux d'une connexion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Ligne complète, terminateur retiré
    Line(String),
    /// Ligne plus longue que la limite ; son contenu est abandonné
    Oversized,
}

/// Connexion cliente vue par le multiplexeur
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    state: ConnectionState,
    buffer: Vec<u8>,
    max_line_length: usize,
    // Vrai tant que la fin d'une ligne trop longue n'a pas été reçue
    discarding: bool,
}

impl Connection {
    pub fn new(id: ConnectionId, peer: SocketAddr, max_line_length: usize) -> Self {
        Self {
            id,
            peer,
            state: ConnectionState::Connected,
            buffer: Vec::new(),
            max_line_length: max_line_length.max(1),
            discarding: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Octets reçus qui ne forment pas encore une ligne complète
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Ajoute des octets reçus et retourne les lignes complètes, dans l'ordre
    ///
    /// Le terminateur (`\n` ou `\r\n`) est retiré. Les séquences UTF-8
    /// invalides sont remplacées. Une ligne qui dépasse `max_line_length`
    /// produit un seul [`Frame::Oversized`] et ses octets sont ignorés
    /// jusqu'au prochain `\n` : le tampon ne dépasse jamais la limite
    /// de plus d'une lecture.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Frame> {
        if self.state == ConnectionState::Closed {
            return Vec::new();
        }
        self.state = ConnectionState::AwaitingLine;
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.len() > self.max_line_length {
                frames.push(Frame::Oversized);
            } else {
                frames.push(Frame::Line(String::from_utf8_lossy(&line).into_owned()));
            }
        }

        if self.discarding {
            self.buffer.clear();
        } else if self.buffer.len() > self.max_line_length {
            self.buffer.clear();
            self.discarding = true;
            frames.push(Frame::Oversized);
        }
        frames
    }

    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
        self.buffer.clear();
        self.discarding = false;
    }
}
