//! Grammaire des commandes client
//!
//! Une commande est un mot-clé suivi de champs séparés par des espaces.
//! Le nombre de champs est fixé par commande ; le dernier champ de
//! `register`, `login`, `add-song-to` et `play` prend le reste de la ligne.

/// Commande client décodée
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { email: String, password: String },
    Login { email: String, password: String },
    Search { terms: Vec<String> },
    Top { count: usize },
    CreatePlaylist { name: String },
    AddSongTo { playlist: String, song: String },
    ShowPlaylist { name: String },
    Play { song: String },
    Stop,
    Logout,
    Disconnect,
}

/// Sépare le premier mot du reste de la ligne
fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

/// Un seul mot, rien derrière
fn single_token(rest: &str) -> Option<String> {
    let (token, tail) = split_token(rest);
    (!token.is_empty() && tail.is_empty()).then(|| token.to_string())
}

/// Un mot puis un reste non vide
fn token_and_rest(rest: &str) -> Option<(String, String)> {
    let (token, tail) = split_token(rest);
    let tail = tail.trim();
    (!token.is_empty() && !tail.is_empty()).then(|| (token.to_string(), tail.to_string()))
}

fn non_empty(rest: &str) -> Option<String> {
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

impl Command {
    /// Décode une ligne ; `None` pour un mot-clé inconnu ou une arité invalide
    pub fn parse(line: &str) -> Option<Command> {
        let (keyword, rest) = split_token(line.trim_end());

        match keyword {
            "register" => {
                token_and_rest(rest).map(|(email, password)| Command::Register { email, password })
            }
            "login" => {
                token_and_rest(rest).map(|(email, password)| Command::Login { email, password })
            }
            "search" => {
                let terms: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
                (!terms.is_empty()).then_some(Command::Search { terms })
            }
            "top" => single_token(rest)
                .and_then(|n| n.parse().ok())
                .map(|count| Command::Top { count }),
            "create-playlist" => single_token(rest).map(|name| Command::CreatePlaylist { name }),
            "add-song-to" => {
                token_and_rest(rest).map(|(playlist, song)| Command::AddSongTo { playlist, song })
            }
            "show-playlist" => single_token(rest).map(|name| Command::ShowPlaylist { name }),
            "play" => non_empty(rest).map(|song| Command::Play { song }),
            "stop" if rest.is_empty() => Some(Command::Stop),
            "logout" if rest.is_empty() => Some(Command::Logout),
            "disconnect" if rest.is_empty() => Some(Command::Disconnect),
            _ => None,
        }
    }

    /// Mot-clé de la commande, utilisable dans les logs
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Login { .. } => "login",
            Command::Search { .. } => "search",
            Command::Top { .. } => "top",
            Command::CreatePlaylist { .. } => "create-playlist",
            Command::AddSongTo { .. } => "add-song-to",
            Command::ShowPlaylist { .. } => "show-playlist",
            Command::Play { .. } => "play",
            Command::Stop => "stop",
            Command::Logout => "logout",
            Command::Disconnect => "disconnect",
        }
    }

    pub fn requires_login(&self) -> bool {
        !matches!(
            self,
            Command::Register { .. } | Command::Login { .. } | Command::Disconnect
        )
    }
}
