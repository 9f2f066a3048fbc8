//! Réponses du serveur
//!
//! Toute réponse tient sur une ligne. Les messages sont encadrés par
//! `[ ` et ` ]` ; le descripteur de lecture est envoyé brut pour que le
//! client le reconnaisse.

use jbxplayer::PlaybackDescriptor;
use std::fmt::{self, Display};

/// Une réponse à une commande
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Message encadré
    Message(String),
    /// Descripteur renvoyé par `play`
    Playback(PlaybackDescriptor),
    /// Dernière réponse avant la fermeture de la connexion
    Farewell,
}

/// Rendu d'une liste : `[a, b, c]`
pub fn render_list<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    let items: Vec<String> = items.into_iter().map(|item| item.to_string()).collect();
    format!("[{}]", items.join(", "))
}

impl Reply {
    pub fn message(text: impl Into<String>) -> Self {
        Reply::Message(text.into())
    }

    pub fn unknown_command() -> Self {
        Self::message("Unknown command")
    }

    pub fn not_logged_in() -> Self {
        Self::message("You are not logged in")
    }

    pub fn invalid_email(email: &str) -> Self {
        Self::message(format!("Email {} is invalid, select a valid one", email))
    }

    pub fn email_taken(email: &str) -> Self {
        Self::message(format!("Email {} is already taken, select another one", email))
    }

    pub fn registered(email: &str) -> Self {
        Self::message(format!("User with email {} successfully registered", email))
    }

    pub fn logged_in(email: &str) -> Self {
        Self::message(format!("User with email {} successfully logged in", email))
    }

    pub fn invalid_credentials() -> Self {
        Self::message("Invalid email/password combination")
    }

    pub fn no_results() -> Self {
        Self::message("No results found")
    }

    pub fn nothing_playing() -> Self {
        Self::message("No songs currently playing")
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        Reply::Message(render_list(items))
    }

    pub fn playlist_taken(name: &str) -> Self {
        Self::message(format!(
            "Playlist name {} is already taken, select another one",
            name
        ))
    }

    pub fn playlist_name_invalid(name: &str) -> Self {
        Self::message(format!("Playlist name {} is invalid, select another one", name))
    }

    pub fn playlist_created(name: &str) -> Self {
        Self::message(format!("Playlist {} successfully created", name))
    }

    pub fn no_such_song() -> Self {
        Self::message("There is no such song")
    }

    pub fn playlist_missing(name: &str) -> Self {
        Self::message(format!("Playlist with name {} doesn't exist", name))
    }

    pub fn song_already_in_playlist(song: &impl Display, name: &str) -> Self {
        Self::message(format!("Song {} is already in playlist {}", song, name))
    }

    pub fn song_added(song: &impl Display, name: &str) -> Self {
        Self::message(format!("Song {} successfully added to playlist {}", song, name))
    }

    pub fn no_playlist_named(name: &str) -> Self {
        Self::message(format!("There isn't a playlist with name {}", name))
    }

    pub fn playlist_empty(name: &str) -> Self {
        Self::message(format!("Playlist {} is empty", name))
    }

    pub fn playlist_content<I, T>(name: &str, songs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        Self::message(format!("{}: {}", name, render_list(songs)))
    }

    pub fn already_playing() -> Self {
        Self::message("Another song is currently playing")
    }

    pub fn playback_problem(song: &impl Display) -> Self {
        Self::message(format!("There is a problem with playing song {}", song))
    }

    pub fn stopped() -> Self {
        Self::message("Song stopped successfully")
    }

    pub fn logged_out() -> Self {
        Self::message("Successfully logged out")
    }

    /// La connexion doit être fermée après l'envoi de cette réponse
    pub fn closes_connection(&self) -> bool {
        matches!(self, Reply::Farewell)
    }

    /// Trame prête à écrire sur la connexion
    pub fn to_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Message(text) => write!(f, "[ {} ]", text),
            Reply::Playback(descriptor) => write!(f, "{}", descriptor),
            Reply::Farewell => f.write_str("[ Disconnected from server ]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing() {
        assert_eq!(Reply::unknown_command().to_line(), "[ Unknown command ]\n");
        assert_eq!(Reply::Farewell.to_line(), "[ Disconnected from server ]\n");
        assert!(Reply::Farewell.closes_connection());
        assert!(!Reply::stopped().closes_connection());
    }

    #[test]
    fn test_lists() {
        assert_eq!(Reply::list(["a-b", "c-d"]).to_string(), "[ [a-b, c-d] ]");
        assert_eq!(Reply::list(Vec::<String>::new()).to_string(), "[ [] ]");
        assert_eq!(
            Reply::playlist_content("p", ["a-b"]).to_string(),
            "[ p: [a-b] ]"
        );
    }
}
