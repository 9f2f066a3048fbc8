//! Comptes utilisateurs `email → mot de passe`
//!
//! Chargés entièrement au démarrage, complétés sur disque à chaque
//! inscription. Les mots de passe sont comparés en clair.

use crate::persistence::{append_line, read_lines};
use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[A-Za-z0-9_!#$%&'*+/=?`{|}~^-]+(?:\.[A-Za-z0-9_!#$%&'*+/=?`{|}~^-]+)*@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,6}$"
    )
    .expect("email pattern is valid");
}

/// Vérifie qu'un email a la forme `local@domain.tld`
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Issue d'une inscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    InvalidEmail,
    EmailTaken,
}

/// Table persistante des comptes
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: HashMap<String, String>,
}

impl UserStore {
    /// Charge les comptes ; un fichier absent donne une table vide
    pub fn load(path: &Path) -> Result<Self> {
        let mut users = HashMap::new();

        if let Some(lines) = read_lines(path)? {
            for (idx, line) in lines.iter().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let (email, password) =
                    line.split_once(' ').ok_or_else(|| Error::MalformedLine {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        content: line.clone(),
                    })?;
                users.insert(email.to_string(), password.to_string());
            }
        }

        info!(path=%path.display(), users=users.len(), "User store loaded");
        Ok(Self {
            path: path.to_path_buf(),
            users,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_registered(&self, email: &str) -> bool {
        self.users.contains_key(email)
    }

    /// Vrai si le couple email / mot de passe correspond à un compte
    pub fn verify(&self, email: &str, password: &str) -> bool {
        self.users
            .get(email)
            .is_some_and(|stored| stored == password)
    }

    /// Inscrit un nouvel utilisateur
    ///
    /// La syntaxe de l'email est vérifiée avant son unicité. Le compte est
    /// écrit sur disque avant d'être ajouté en mémoire.
    pub fn register(&mut self, email: &str, password: &str) -> Result<Registration> {
        if !is_valid_email(email) {
            return Ok(Registration::InvalidEmail);
        }
        if self.is_registered(email) {
            return Ok(Registration::EmailTaken);
        }

        append_line(&self.path, &format!("{} {}", email, password))?;
        self.users.insert(email.to_string(), password.to_string());
        debug!(email=%email, "User registered");
        Ok(Registration::Created)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
