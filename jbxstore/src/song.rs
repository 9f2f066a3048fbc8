//! Identifiant de morceau `(artiste, titre)`

use std::cmp::Ordering;
use std::fmt;
use std::iter;

/// Un morceau du catalogue, identifié par son artiste et son titre.
///
/// Les deux champs sont toujours en minuscules. La forme canonique,
/// utilisée sur le réseau et dans les fichiers, est `artist-title`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongId {
    artist: String,
    title: String,
}

impl SongId {
    pub fn new(artist: impl AsRef<str>, title: impl AsRef<str>) -> Self {
        Self {
            artist: artist.as_ref().trim().to_lowercase(),
            title: title.as_ref().trim().to_lowercase(),
        }
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Toutes les lectures `(artiste, titre)` d'un texte `artist-title`,
    /// une par position de `-`, de gauche à droite.
    pub fn candidates(text: &str) -> impl Iterator<Item = SongId> + '_ {
        text.match_indices('-')
            .map(move |(idx, _)| (&text[..idx], &text[idx + 1..]))
            .filter(|(artist, title)| !artist.trim().is_empty() && !title.trim().is_empty())
            .map(|(artist, title)| SongId::new(artist, title))
    }

    /// Lecture naïve : coupure au premier `-`
    pub fn split_first(text: &str) -> Option<SongId> {
        Self::candidates(text).next()
    }

    fn canonical_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.artist
            .bytes()
            .chain(iter::once(b'-'))
            .chain(self.title.bytes())
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.artist, self.title)
    }
}

// Ordre lexicographique sur la forme canonique
impl Ord for SongId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_bytes()
            .cmp(other.canonical_bytes())
            .then_with(|| self.artist.cmp(&other.artist))
    }
}

impl PartialOrd for SongId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lowercases() {
        let song = SongId::new("Queen", " Bohemian Rhapsody ");
        assert_eq!(song.artist(), "queen");
        assert_eq!(song.title(), "bohemian rhapsody");
        assert_eq!(song.to_string(), "queen-bohemian rhapsody");
    }

    #[test]
    fn test_candidates_cover_every_dash() {
        let all: Vec<SongId> = SongId::candidates("a-ha-take on me").collect();
        assert_eq!(
            all,
            vec![SongId::new("a", "ha-take on me"), SongId::new("a-ha", "take on me")]
        );
        assert!(SongId::split_first("nodash").is_none());
        assert!(SongId::split_first("-title").is_none());
    }

    #[test]
    fn test_order_follows_canonical_text() {
        let mut songs = vec![
            SongId::new("b", "a"),
            SongId::new("a", "z"),
            SongId::new("a b", "c"),
        ];
        songs.sort();
        let texts: Vec<String> = songs.iter().map(ToString::to_string).collect();
        assert_eq!(texts, vec!["a b-c", "a-z", "b-a"]);
    }
}
