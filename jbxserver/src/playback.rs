//! Suivi des lectures en cours et compteurs d'écoute
//!
//! Invariant : le compteur d'un morceau est égal au nombre de connexions
//! qui l'écoutent, et un morceau n'a de compteur que s'il est écouté.

use crate::session::ConnectionId;
use jbxstore::SongId;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct NowPlaying {
    song: SongId,
    token: CancellationToken,
}

/// Lecture en cours par connexion, nombre d'auditeurs par morceau
#[derive(Debug, Default)]
pub struct PlaybackTracker {
    now_playing: HashMap<ConnectionId, NowPlaying>,
    play_counts: HashMap<SongId, usize>,
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self, id: ConnectionId) -> bool {
        self.now_playing.contains_key(&id)
    }

    pub fn now_playing(&self, id: ConnectionId) -> Option<&SongId> {
        self.now_playing.get(&id).map(|n| &n.song)
    }

    /// Nombre de connexions qui écoutent `song`
    pub fn listeners(&self, song: &SongId) -> usize {
        self.play_counts.get(song).copied().unwrap_or(0)
    }

    /// Aucun morceau n'est écouté
    pub fn is_idle(&self) -> bool {
        self.play_counts.is_empty()
    }

    /// Enregistre une lecture ; `false` si la connexion écoute déjà un morceau
    pub fn start(&mut self, id: ConnectionId, song: SongId, token: CancellationToken) -> bool {
        if self.is_playing(id) {
            return false;
        }
        *self.play_counts.entry(song.clone()).or_insert(0) += 1;
        self.now_playing.insert(id, NowPlaying { song, token });
        true
    }

    /// Arrête la lecture de la connexion et annule sa tâche
    pub fn stop(&mut self, id: ConnectionId) -> Option<SongId> {
        let NowPlaying { song, token } = self.now_playing.remove(&id)?;
        token.cancel();

        if let Some(count) = self.play_counts.get_mut(&song) {
            *count -= 1;
            if *count == 0 {
                self.play_counts.remove(&song);
            }
        }
        Some(song)
    }

    /// Arrête toutes les lectures ; retourne leur nombre
    pub fn stop_all(&mut self) -> usize {
        let ids: Vec<ConnectionId> = self.now_playing.keys().copied().collect();
        ids.into_iter().filter(|id| self.stop(*id).is_some()).count()
    }

    /// Les `n` morceaux les plus écoutés
    ///
    /// Tri par nombre d'auditeurs décroissant puis par identifiant.
    pub fn top(&self, n: usize) -> Vec<(SongId, usize)> {
        let mut ranked: Vec<(SongId, usize)> = self
            .play_counts
            .iter()
            .map(|(song, count)| (song.clone(), *count))
            .collect();
        ranked.sort_by(|(a_song, a_count), (b_song, b_count)| {
            b_count.cmp(a_count).then_with(|| a_song.cmp(b_song))
        });
        ranked.truncate(n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(text: &str) -> SongId {
        SongId::split_first(text).unwrap()
    }

    #[test]
    fn test_counts_follow_now_playing() {
        let mut tracker = PlaybackTracker::new();
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());

        assert!(tracker.start(a, song("x-one"), CancellationToken::new()));
        assert!(tracker.start(b, song("x-one"), CancellationToken::new()));
        assert!(tracker.start(c, song("y-two"), CancellationToken::new()));
        assert!(!tracker.start(a, song("y-two"), CancellationToken::new()));

        assert_eq!(tracker.listeners(&song("x-one")), 2);
        assert_eq!(tracker.listeners(&song("y-two")), 1);

        assert_eq!(tracker.stop(c), Some(song("y-two")));
        assert_eq!(tracker.listeners(&song("y-two")), 0);
        assert_eq!(tracker.stop(c), None);

        tracker.stop(a);
        tracker.stop(b);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_stop_cancels_token() {
        let mut tracker = PlaybackTracker::new();
        let id = ConnectionId::new();
        let token = CancellationToken::new();

        tracker.start(id, song("x-one"), token.clone());
        assert!(!token.is_cancelled());
        tracker.stop(id);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_top_orders_by_count_then_id() {
        let mut tracker = PlaybackTracker::new();
        for _ in 0..3 {
            tracker.start(ConnectionId::new(), song("b-shared"), CancellationToken::new());
        }
        tracker.start(ConnectionId::new(), song("z-solo"), CancellationToken::new());
        tracker.start(ConnectionId::new(), song("a-solo"), CancellationToken::new());

        let top: Vec<String> = tracker.top(10).into_iter().map(|(s, _)| s.to_string()).collect();
        assert_eq!(top, vec!["b-shared", "a-solo", "z-solo"]);

        assert_eq!(tracker.top(1).len(), 1);
        assert!(tracker.top(0).is_empty());
    }

    #[test]
    fn test_stop_all() {
        let mut tracker = PlaybackTracker::new();
        let token = CancellationToken::new();
        tracker.start(ConnectionId::new(), song("x-one"), token.clone());
        tracker.start(ConnectionId::new(), song("y-two"), CancellationToken::new());

        assert_eq!(tracker.stop_all(), 2);
        assert!(tracker.is_idle());
        assert!(token.is_cancelled());
    }
}
