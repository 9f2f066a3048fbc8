//! Dispatcher de commandes
//!
//! Transforme une ligne reçue d'une connexion en exactement une réponse.
//! Chaque traitement vérifie, dans l'ordre, l'arité de la commande,
//! l'authentification, puis la validité métier avant d'agir.
//!
//! Le dispatcher ne fait aucune entrée/sortie réseau. Une erreur de
//! stockage est remontée à l'appelant : l'état mémoire et les fichiers ne
//! peuvent plus être supposés cohérents.

use crate::command::Command;
use crate::reply::Reply;
use crate::session::ConnectionId;
use crate::state::ServerState;
use crate::Result;
use jbxplayer::Player;
use jbxstore::{PlaylistCreation, Registration, SongAddition};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub struct CommandDispatcher {
    state: ServerState,
    player: Arc<dyn Player>,
}

impl CommandDispatcher {
    pub fn new(state: ServerState, player: Arc<dyn Player>) -> Self {
        Self { state, player }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    pub fn connection_opened(&mut self, id: ConnectionId) {
        self.state.sessions.open(id);
    }

    /// Libère la session et la lecture en cours de la connexion
    pub fn connection_closed(&mut self, id: ConnectionId) {
        if let Some(song) = self.state.playback.stop(id) {
            debug!(connection=%id, song=%song, "Playback released on close");
        }
        self.state.sessions.close(id);
    }

    /// Arrête toutes les lectures avant l'arrêt du serveur
    pub fn shutdown(&mut self) {
        let stopped = self.state.playback.stop_all();
        if stopped > 0 {
            info!(stopped, "Playback tasks cancelled");
        }
    }

    /// Traite une ligne et retourne la réponse à envoyer
    pub fn dispatch(&mut self, id: ConnectionId, line: &str) -> Result<Reply> {
        let Some(command) = Command::parse(line) else {
            debug!(connection=%id, "Unknown command");
            return Ok(Reply::unknown_command());
        };

        let keyword = command.keyword();
        debug!(connection=%id, command=keyword, "Dispatching command");

        if command.requires_login() && !self.state.sessions.is_logged_in(id) {
            debug!(connection=%id, command=keyword, "Rejected: not logged in");
            return Ok(Reply::not_logged_in());
        }

        self.execute(id, command).inspect_err(|e| {
            error!(connection=%id, command=keyword, "Storage failure: {}", e);
        })
    }

    fn execute(&mut self, id: ConnectionId, command: Command) -> Result<Reply> {
        match command {
            Command::Register { email, password } => self.register(id, &email, &password),
            Command::Login { email, password } => Ok(self.login(id, &email, &password)),
            Command::Search { terms } => Ok(self.search(&terms)),
            Command::Top { count } => Ok(self.top(count)),
            Command::CreatePlaylist { name } => self.create_playlist(&name),
            Command::AddSongTo { playlist, song } => self.add_song_to(&playlist, &song),
            Command::ShowPlaylist { name } => Ok(self.show_playlist(&name)),
            Command::Play { song } => Ok(self.play(id, &song)),
            Command::Stop => Ok(self.stop(id)),
            Command::Logout => Ok(self.logout(id)),
            Command::Disconnect => Ok(self.disconnect(id)),
        }
    }

    fn register(&mut self, id: ConnectionId, email: &str, password: &str) -> Result<Reply> {
        let reply = match self.state.users.register(email, password)? {
            Registration::Created => {
                self.state.sessions.login(id, email);
                info!(connection=%id, email=%email, "User registered");
                Reply::registered(email)
            }
            Registration::InvalidEmail => Reply::invalid_email(email),
            Registration::EmailTaken => Reply::email_taken(email),
        };
        Ok(reply)
    }

    fn login(&mut self, id: ConnectionId, email: &str, password: &str) -> Reply {
        if !self.state.users.verify(email, password) {
            debug!(connection=%id, "Rejected: invalid credentials");
            return Reply::invalid_credentials();
        }
        self.state.sessions.login(id, email);
        info!(connection=%id, email=%email, "User logged in");
        Reply::logged_in(email)
    }

    fn search(&self, terms: &[String]) -> Reply {
        let results = self.state.catalog.search(terms);
        if results.is_empty() {
            Reply::no_results()
        } else {
            Reply::list(results)
        }
    }

    fn top(&self, count: usize) -> Reply {
        if self.state.playback.is_idle() {
            return Reply::nothing_playing();
        }
        Reply::list(
            self.state
                .playback
                .top(count)
                .into_iter()
                .map(|(song, _)| song),
        )
    }

    fn create_playlist(&mut self, name: &str) -> Result<Reply> {
        let reply = match self.state.playlists.create(name)? {
            PlaylistCreation::Created => Reply::playlist_created(name),
            PlaylistCreation::NameTaken => Reply::playlist_taken(name),
            PlaylistCreation::InvalidName => Reply::playlist_name_invalid(name),
        };
        Ok(reply)
    }

    fn add_song_to(&mut self, playlist: &str, song: &str) -> Result<Reply> {
        let Some(song) = self.state.catalog.resolve(song) else {
            return Ok(Reply::no_such_song());
        };

        let reply = match self.state.playlists.add_song(playlist, &song)? {
            SongAddition::Added => Reply::song_added(&song, playlist),
            SongAddition::NoSuchPlaylist => Reply::playlist_missing(playlist),
            SongAddition::AlreadyPresent => Reply::song_already_in_playlist(&song, playlist),
        };
        Ok(reply)
    }

    fn show_playlist(&self, name: &str) -> Reply {
        match self.state.playlists.get(name) {
            None => Reply::no_playlist_named(name),
            Some(playlist) if playlist.is_empty() => Reply::playlist_empty(name),
            Some(playlist) => Reply::playlist_content(name, playlist.songs()),
        }
    }

    fn play(&mut self, id: ConnectionId, song: &str) -> Reply {
        if self.state.playback.is_playing(id) {
            return Reply::already_playing();
        }
        let Some(song) = self.state.catalog.resolve(song) else {
            return Reply::no_such_song();
        };

        let descriptor = match self.player.describe(&song) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!(connection=%id, song=%song, "Cannot describe song: {}", e);
                return Reply::playback_problem(&song);
            }
        };

        let token = CancellationToken::new();
        self.state.playback.start(id, song.clone(), token.clone());
        // La tâche est détachée : seul le jeton la relie au protocole.
        drop(self.player.spawn(descriptor.clone(), token));

        info!(connection=%id, song=%song, "Playback requested");
        Reply::Playback(descriptor)
    }

    fn stop(&mut self, id: ConnectionId) -> Reply {
        if let Some(song) = self.state.playback.stop(id) {
            info!(connection=%id, song=%song, "Playback stopped");
        }
        Reply::stopped()
    }

    fn logout(&mut self, id: ConnectionId) -> Reply {
        self.state.sessions.logout(id);
        Reply::logged_out()
    }

    fn disconnect(&mut self, id: ConnectionId) -> Reply {
        self.state.sessions.logout(id);
        Reply::Farewell
    }
}
