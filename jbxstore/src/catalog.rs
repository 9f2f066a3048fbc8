//! Catalogue des morceaux : artiste → titres
//!
//! Chargé une seule fois au démarrage à partir d'un fichier
//! `artist--title` (une ligne par morceau), en lecture seule ensuite.

use crate::persistence::read_lines;
use crate::song::SongId;
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

const SEPARATOR: &str = "--";

/// Catalogue immuable des morceaux connus
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    songs: BTreeMap<String, BTreeSet<String>>,
}

impl Catalog {
    /// Charge le catalogue depuis son fichier de définition
    ///
    /// Les lignes vides sont ignorées. Un fichier absent est une erreur :
    /// un serveur sans catalogue n'a rien à servir.
    pub fn load(path: &Path) -> Result<Self> {
        let lines = read_lines(path)?.ok_or_else(|| {
            Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "catalog file not found"),
            )
        })?;

        let mut catalog = Catalog::default();
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let song = Self::parse_line(line).ok_or_else(|| Error::MalformedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.clone(),
            })?;
            catalog.insert(song);
        }

        info!(path=%path.display(), artists=catalog.songs.len(), songs=catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Construit un catalogue en mémoire
    pub fn from_songs<I>(songs: I) -> Self
    where
        I: IntoIterator<Item = SongId>,
    {
        let mut catalog = Catalog::default();
        for song in songs {
            catalog.insert(song);
        }
        catalog
    }

    /// Décode une ligne `artist--title`
    pub fn parse_line(line: &str) -> Option<SongId> {
        let (artist, title) = line.split_once(SEPARATOR)?;
        if artist.trim().is_empty() || title.trim().is_empty() {
            return None;
        }
        Some(SongId::new(artist, title))
    }

    fn insert(&mut self, song: SongId) {
        self.songs
            .entry(song.artist().to_string())
            .or_default()
            .insert(song.title().to_string());
    }

    pub fn contains(&self, song: &SongId) -> bool {
        self.songs
            .get(song.artist())
            .is_some_and(|titles| titles.contains(song.title()))
    }

    /// Résout un identifiant `artist-title` saisi par un client
    ///
    /// Toutes les positions de `-` sont essayées, ce qui permet d'adresser
    /// les artistes ou titres qui en contiennent.
    pub fn resolve(&self, text: &str) -> Option<SongId> {
        let text = text.trim().to_lowercase();
        let found = SongId::candidates(&text).find(|song| self.contains(song));
        found
    }

    /// Recherche plein texte, insensible à la casse
    ///
    /// Un terme qui apparaît dans le nom d'un artiste retient tous ses
    /// morceaux ; sinon il est comparé à chaque titre. Les résultats de
    /// tous les termes sont réunis.
    pub fn search<S: AsRef<str>>(&self, terms: &[S]) -> BTreeSet<SongId> {
        let mut results = BTreeSet::new();

        for term in terms {
            let term = term.as_ref().to_lowercase();
            if term.is_empty() {
                continue;
            }
            for (artist, titles) in &self.songs {
                let artist_matches = artist.contains(&term);
                for title in titles {
                    if artist_matches || title.contains(&term) {
                        results.insert(SongId::new(artist, title));
                    }
                }
            }
        }

        results
    }

    /// Nombre total de morceaux
    pub fn len(&self) -> usize {
        self.songs.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn artists(&self) -> impl Iterator<Item = &str> {
        self.songs.keys().map(String::as_str)
    }
}
