//! Identité des connexions et sessions d'authentification

use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Identité opaque d'une connexion, stable pendant toute sa durée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Table volatile connexion → email authentifié
///
/// Une entrée existe pour chaque connexion ouverte ; elle disparaît à la
/// fermeture. Rien n'est persisté.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<ConnectionId, Option<String>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, id: ConnectionId) {
        self.sessions.insert(id, None);
    }

    /// Supprime la session ; retourne l'email qui y était connecté
    pub fn close(&mut self, id: ConnectionId) -> Option<String> {
        self.sessions.remove(&id).flatten()
    }

    pub fn login(&mut self, id: ConnectionId, email: impl Into<String>) {
        self.sessions.insert(id, Some(email.into()));
    }

    /// Déconnecte l'utilisateur ; `false` si personne n'était connecté
    pub fn logout(&mut self, id: ConnectionId) -> bool {
        match self.sessions.get_mut(&id) {
            Some(email) => email.take().is_some(),
            None => false,
        }
    }

    pub fn email(&self, id: ConnectionId) -> Option<&str> {
        self.sessions.get(&id).and_then(|e| e.as_deref())
    }

    pub fn is_logged_in(&self, id: ConnectionId) -> bool {
        self.email(id).is_some()
    }

    /// Nombre de connexions ouvertes
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_lifecycle() {
        let mut sessions = SessionRegistry::new();
        let id = ConnectionId::new();

        sessions.open(id);
        assert!(!sessions.is_logged_in(id));

        sessions.login(id, "u@x.com");
        assert_eq!(sessions.email(id), Some("u@x.com"));

        assert!(sessions.logout(id));
        assert!(!sessions.logout(id));
        assert_eq!(sessions.len(), 1);

        sessions.login(id, "u@x.com");
        assert_eq!(sessions.close(id).as_deref(), Some("u@x.com"));
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_identities_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }
}
