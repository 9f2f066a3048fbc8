//! # jbxconfig - Configuration du serveur Jukebox
//!
//! La configuration est un arbre YAML : le fichier `jukebox.yaml` embarqué
//! fournit les valeurs par défaut, `config.yaml` dans le répertoire de
//! configuration les surcharge, puis les variables `JUKEBOX_CONFIG__A__B`
//! surchargent la clé `a.b`. Les clés sont insensibles à la casse.
//!
//! Sections : `host` (écoute, logs), `storage` (fichiers de données),
//! `player` (lecture des fichiers `.wav`), `client` (client interactif).
//!
//! ```no_run
//! use jbxconfig::get_config;
//!
//! let config = get_config();
//! println!("listening on {}", config.get_listen_address());
//! let users = config.get_users_file()?;
//!
//! config.set_port(9000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tracing::info;

const DEFAULT_CONFIG: &str = include_str!("jukebox.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load Jukebox configuration"));
}

const ENV_CONFIG_DIR: &str = "JUKEBOX_CONFIG";
const ENV_PREFIX: &str = "JUKEBOX_CONFIG__";

// Valeurs utilisées quand une clé est absente ou mal typée
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 7777;
const DEFAULT_READ_BUFFER_SIZE: usize = 1024;
const DEFAULT_MAX_LINE_LENGTH: usize = 8192;
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_CONSOLE: bool = true;
const DEFAULT_LOG_FILE: &str = "logger.txt";
const DEFAULT_STORAGE_DIR: &str = "data";
const DEFAULT_USERS_FILE: &str = "users.txt";
const DEFAULT_SONGS_FILE: &str = "songs.txt";
const DEFAULT_PLAYLISTS_FILE: &str = "playlists.txt";
const DEFAULT_SONGS_DIR: &str = "songs";
const DEFAULT_CHUNK_SIZE: usize = 512;
const DEFAULT_POLL_INTERVAL_MS: usize = 50;
const DEFAULT_REALTIME: bool = true;
const DEFAULT_CLIENT_SERVER_ADDRESS: &str = "127.0.0.1:7777";
const DEFAULT_CLIENT_OUTPUT_FILE: &str = "playback.wav";

/// Accesseurs pour une valeur entière positive
macro_rules! impl_usize_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> usize {
            match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_u64().map(|v| v as usize).unwrap_or($default),
                Ok(Value::String(s)) => s.trim().parse().unwrap_or($default),
                _ => $default,
            }
        }

        pub fn $setter(&self, value: usize) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value as u64)))
        }
    };
}

/// Accesseurs pour un booléen
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            self.get_value($path)
                .ok()
                .and_then(|v| v.as_bool())
                .unwrap_or($default)
        }

        pub fn $setter(&self, enabled: bool) -> Result<()> {
            self.set_value($path, Value::Bool(enabled))
        }
    };
}

/// Accesseurs pour une chaîne
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(text)) => text,
                _ => String::from($default),
            }
        }

        pub fn $setter(&self, value: String) -> Result<()> {
            self.set_value($path, Value::String(value))
        }
    };
}

/// Configuration du serveur, partagée entre les crates du workspace
///
/// Chaque modification passe par [`Config::set_value`] et réécrit
/// immédiatement `config.yaml`.
#[derive(Debug)]
pub struct Config {
    directory: String,
    file: String,
    tree: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            file: self.file.clone(),
            tree: Mutex::new(self.lock_data().clone()),
        }
    }
}

impl Config {
    fn locate_directory(directory: &str) -> String {
        if !directory.is_empty() {
            return directory.to_string();
        }

        if let Ok(from_env) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path=%from_env, "Config directory taken from environment");
            return from_env;
        }

        let local = Path::new(".jukebox");
        if local.exists() {
            return local.to_string_lossy().into_owned();
        }

        home_dir()
            .map(|home| home.join(".jukebox"))
            .filter(|candidate| candidate.exists())
            .map(|candidate| candidate.to_string_lossy().into_owned())
            .unwrap_or_else(|| local.to_string_lossy().into_owned())
    }

    /// Le répertoire doit exister (il est créé au besoin) et être accessible
    /// en lecture et en écriture.
    fn prepare_directory(dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        if !dir.is_dir() {
            return Err(anyhow!("{} is not a directory", dir.display()));
        }

        let probe = dir.join(".jukebox_write_probe");
        fs::write(&probe, b"")?;
        fs::remove_file(&probe)?;
        fs::read_dir(dir)?;
        Ok(())
    }

    /// Choisit le répertoire de configuration et le prépare
    ///
    /// Ordre de recherche : `directory` s'il n'est pas vide, la variable
    /// `JUKEBOX_CONFIG`, `./.jukebox`, `~/.jukebox`. À défaut, `./.jukebox`
    /// est créé.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir = Self::locate_directory(directory);
        Self::prepare_directory(Path::new(&dir))?;
        Ok(dir)
    }

    /// Charge la configuration depuis `directory` (vide : recherche
    /// automatique) puis l'enregistre, complétée par les valeurs par défaut.
    pub fn load_config(directory: &str) -> Result<Self> {
        Self::load_config_with_env(directory, env::vars())
    }

    /// Same as [`Config::load_config`] with an explicit set of environment variables
    pub fn load_config_with_env<I>(directory: &str, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let directory = Self::config_dir(directory)?;
        let file = Path::new(&directory)
            .join("config.yaml")
            .to_string_lossy()
            .into_owned();
        info!(config_file=%file, "Loading Jukebox configuration");

        let mut tree = lowercase_keys(serde_yaml::from_str(DEFAULT_CONFIG)?);
        match fs::read(&file) {
            Ok(bytes) => {
                let overrides: Value = serde_yaml::from_slice(&bytes)?;
                overlay(&mut tree, lowercase_keys(overrides));
            }
            Err(_) => info!(config_file=%file, "No config file yet, starting from defaults"),
        }
        Self::apply_env_overrides(&mut tree, vars);

        let config = Config {
            directory,
            file,
            tree: Mutex::new(tree),
        };

        config.save()?;
        Ok(config)
    }

    fn lock_data(&self) -> MutexGuard<'_, Value> {
        // Une valeur YAML reste cohérente même si un thread a paniqué
        self.tree.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Directory holding `config.yaml`; relative paths are resolved against it
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Réécrit `config.yaml`
    pub fn save(&self) -> Result<()> {
        let yaml = serde_yaml::to_string(&*self.lock_data())?;
        fs::write(&self.file, yaml)?;
        Ok(())
    }

    /// Remplace la valeur à `path` (ex. `&["host", "port"]`), en créant les
    /// sections manquantes, puis enregistre le fichier.
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        insert_at(&mut self.lock_data(), path, value)?;
        self.save()
    }

    /// Valeur à `path` ; erreur si une des clés manque
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let tree = self.lock_data();
        let mut node = &*tree;
        for (depth, key) in path.iter().enumerate() {
            let Value::Mapping(section) = node else {
                return Err(anyhow!("{} is not a section", path[..depth].join(".")));
            };
            node = section
                .get(key.to_lowercase().as_str())
                .ok_or_else(|| anyhow!("No configuration value at {}", path[..=depth].join(".")))?;
        }
        Ok(node.clone())
    }

    fn apply_env_overrides<I>(config: &mut Value, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(stripped) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let path: Vec<&str> = stripped.split("__").collect();
            // `8080` devient un nombre, `false` un booléen, le reste une chaîne
            let parsed = serde_yaml::from_str::<Value>(&value)
                .unwrap_or_else(|_| Value::String(value.clone()));
            if let Err(e) = insert_at(config, &path, parsed) {
                tracing::warn!(env_var=%key, "Ignoring configuration override: {}", e);
            }
        }
    }

    /// Résout un chemin relatif au répertoire de configuration
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.directory).join(path)
        }
    }

    /// Récupère un répertoire géré par la configuration
    ///
    /// Le répertoire peut être absolu ou relatif au répertoire de
    /// configuration. Il sera créé s'il n'existe pas.
    ///
    /// # Exemple
    ///
    /// ```no_run
    /// use jbxconfig::get_config;
    ///
    /// let storage = get_config().get_managed_dir(&["storage", "directory"], "data")?;
    /// println!("Storage directory: {}", storage.display());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn get_managed_dir(&self, path: &[&str], default: &str) -> Result<PathBuf> {
        let configured = match self.get_value(path) {
            Ok(Value::String(dir)) if !dir.trim().is_empty() => dir,
            _ => {
                self.set_managed_dir(path, default)?;
                default.to_string()
            }
        };

        let dir = self.resolve_path(configured.trim());
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            info!(directory=%dir.display(), "Created managed directory");
        }
        Ok(dir)
    }

    /// Définit un répertoire géré par la configuration
    pub fn set_managed_dir(&self, path: &[&str], directory: &str) -> Result<()> {
        self.set_value(path, Value::String(directory.to_string()))
    }

    /// Gets the TCP port from configuration
    ///
    /// Returns the configured port, or the default port (7777) if not configured or invalid.
    pub fn get_port(&self) -> u16 {
        match self.get_value(&["host", "port"]) {
            Ok(Value::Number(n)) => match n.as_u64().and_then(|p| u16::try_from(p).ok()) {
                Some(port) => port,
                None => {
                    tracing::warn!("Invalid port {}, using default {}", n, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            Ok(Value::String(s)) => match s.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    tracing::warn!("Invalid port '{}', using default {}", s, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            Ok(_) => {
                tracing::warn!(
                    "Port not a number or string, using default {}",
                    DEFAULT_PORT
                );
                DEFAULT_PORT
            }
            Err(err) => {
                tracing::warn!("Failed to get port: {}, using default {}", err, DEFAULT_PORT);
                DEFAULT_PORT
            }
        }
    }

    /// Sets the TCP port in configuration
    pub fn set_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "port"], Value::Number(Number::from(port)))
    }

    impl_string_config!(
        get_bind_address,
        set_bind_address,
        &["host", "bind_address"],
        DEFAULT_BIND_ADDRESS
    );

    /// `bind_address:port`, ready for `TcpListener::bind`
    pub fn get_listen_address(&self) -> String {
        format!("{}:{}", self.get_bind_address(), self.get_port())
    }

    impl_usize_config!(
        get_read_buffer_size,
        set_read_buffer_size,
        &["host", "read_buffer_size"],
        DEFAULT_READ_BUFFER_SIZE
    );

    impl_usize_config!(
        get_max_line_length,
        set_max_line_length,
        &["host", "max_line_length"],
        DEFAULT_MAX_LINE_LENGTH
    );

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_CONSOLE
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["host", "logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );

    /// Fichier de log, relatif au répertoire de configuration.
    ///
    /// Une chaîne vide désactive l'écriture dans un fichier.
    pub fn get_log_file(&self) -> Option<PathBuf> {
        let file = match self.get_value(&["host", "logger", "file"]) {
            Ok(Value::String(file)) => file,
            Ok(Value::Null) => return None,
            _ => DEFAULT_LOG_FILE.to_string(),
        };
        if file.trim().is_empty() {
            None
        } else {
            Some(self.resolve_path(file.trim()))
        }
    }

    /// Répertoire des fichiers de données (utilisateurs, catalogue, playlists)
    pub fn get_storage_dir(&self) -> Result<PathBuf> {
        self.get_managed_dir(&["storage", "directory"], DEFAULT_STORAGE_DIR)
    }

    impl_string_config!(
        get_users_file_name,
        set_users_file_name,
        &["storage", "users_file"],
        DEFAULT_USERS_FILE
    );

    impl_string_config!(
        get_songs_file_name,
        set_songs_file_name,
        &["storage", "songs_file"],
        DEFAULT_SONGS_FILE
    );

    impl_string_config!(
        get_playlists_file_name,
        set_playlists_file_name,
        &["storage", "playlists_file"],
        DEFAULT_PLAYLISTS_FILE
    );

    /// Chemin complet du fichier des utilisateurs
    pub fn get_users_file(&self) -> Result<PathBuf> {
        Ok(self.get_storage_dir()?.join(self.get_users_file_name()))
    }

    /// Chemin complet du catalogue (`artist--title`)
    pub fn get_songs_file(&self) -> Result<PathBuf> {
        Ok(self.get_storage_dir()?.join(self.get_songs_file_name()))
    }

    /// Chemin complet du fichier des playlists
    pub fn get_playlists_file(&self) -> Result<PathBuf> {
        Ok(self.get_storage_dir()?.join(self.get_playlists_file_name()))
    }

    /// Répertoire contenant les fichiers `.wav`
    pub fn get_songs_dir(&self) -> Result<PathBuf> {
        self.get_managed_dir(&["player", "songs_directory"], DEFAULT_SONGS_DIR)
    }

    impl_usize_config!(
        get_player_chunk_size,
        set_player_chunk_size,
        &["player", "chunk_size"],
        DEFAULT_CHUNK_SIZE
    );

    impl_usize_config!(
        get_player_poll_interval_ms,
        set_player_poll_interval_ms,
        &["player", "poll_interval_ms"],
        DEFAULT_POLL_INTERVAL_MS
    );

    /// Intervalle maximal entre deux vérifications du signal d'arrêt
    pub fn get_player_poll_interval(&self) -> Duration {
        Duration::from_millis(self.get_player_poll_interval_ms().max(1) as u64)
    }

    impl_bool_config!(
        get_player_realtime,
        set_player_realtime,
        &["player", "realtime"],
        DEFAULT_REALTIME
    );

    impl_string_config!(
        get_client_server_address,
        set_client_server_address,
        &["client", "server_address"],
        DEFAULT_CLIENT_SERVER_ADDRESS
    );

    /// Fichier WAV où le client écrit le morceau en cours de lecture
    pub fn get_client_output_file(&self) -> PathBuf {
        match self.get_value(&["client", "output_file"]) {
            Ok(Value::String(file)) if !file.trim().is_empty() => self.resolve_path(file.trim()),
            _ => self.resolve_path(DEFAULT_CLIENT_OUTPUT_FILE),
        }
    }
}

/// Configuration globale, chargée au premier appel
///
/// Panique si le répertoire de configuration est inutilisable.
pub fn get_config() -> Arc<Config> {
    Arc::clone(&CONFIG)
}

/// Applique `layer` sur `base` : les sections sont fusionnées clé par clé,
/// les autres valeurs sont remplacées.
fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Mapping(base), Value::Mapping(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(section) => Value::Mapping(
            section
                .into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(name) => Value::String(name.to_lowercase()),
                        other => other,
                    };
                    (key, lowercase_keys(value))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Écrit `value` à `path` dans l'arbre, en créant les sections manquantes
fn insert_at(tree: &mut Value, path: &[&str], value: Value) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        *tree = value;
        return Ok(());
    };
    let Value::Mapping(section) = tree else {
        return Err(anyhow!("Cannot set {}: parent is not a section", path.join(".")));
    };

    let key = Value::String(first.to_lowercase());
    if rest.is_empty() {
        section.insert(key, value);
        Ok(())
    } else {
        let child = section
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        insert_at(child, rest, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(dir: &Path, vars: Vec<(&str, &str)>) -> Config {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()));
        Config::load_config_with_env(dir.to_str().unwrap(), vars).unwrap()
    }

    #[test]
    fn test_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(temp_dir.path(), vec![]);

        assert_eq!(config.get_port(), 7777);
        assert_eq!(config.get_bind_address(), "127.0.0.1");
        assert_eq!(config.get_listen_address(), "127.0.0.1:7777");
        assert_eq!(config.get_read_buffer_size(), 1024);
        assert_eq!(config.get_max_line_length(), 8192);
        assert_eq!(config.get_client_server_address(), "127.0.0.1:7777");
        assert_eq!(
            config.get_client_output_file(),
            temp_dir.path().join("playback.wav")
        );
        assert_eq!(config.get_player_chunk_size(), 512);
        assert_eq!(config.get_player_poll_interval(), Duration::from_millis(50));
        assert!(config.get_log_enable_console());
        assert_eq!(config.get_log_min_level(), "INFO");
        assert!(temp_dir.path().join("config.yaml").exists());
    }

    #[test]
    fn test_external_file_is_merged() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("config.yaml"),
            "host:\n  Port: 9000\nstorage:\n  users_file: accounts.txt\n",
        )
        .unwrap();

        let config = load(temp_dir.path(), vec![]);
        assert_eq!(config.get_port(), 9000);
        // La valeur par défaut voisine est conservée
        assert_eq!(config.get_bind_address(), "127.0.0.1");
        assert!(config
            .get_users_file()
            .unwrap()
            .ends_with("data/accounts.txt"));
    }

    #[test]
    fn test_env_overrides() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(
            temp_dir.path(),
            vec![
                ("JUKEBOX_CONFIG__HOST__PORT", "8123"),
                ("JUKEBOX_CONFIG__PLAYER__REALTIME", "false"),
                ("UNRELATED__HOST__PORT", "1"),
            ],
        );
        assert_eq!(config.get_port(), 8123);
        assert!(!config.get_player_realtime());
    }

    #[test]
    fn test_set_value_is_persisted() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(temp_dir.path(), vec![]);
        config.set_port(4242).unwrap();

        let reloaded = load(temp_dir.path(), vec![]);
        assert_eq!(reloaded.get_port(), 4242);
    }

    #[test]
    fn test_managed_dirs_are_created() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(temp_dir.path(), vec![]);

        let storage = config.get_storage_dir().unwrap();
        assert!(storage.is_dir());
        assert_eq!(storage, temp_dir.path().join("data"));

        let songs = config.get_songs_dir().unwrap();
        assert!(songs.is_dir());
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let config = load(temp_dir.path(), vec![]);

        config
            .set_value(&["storage", "directory"], Value::String("var/jukebox".into()))
            .unwrap();
        assert_eq!(
            config.get_songs_file().unwrap(),
            temp_dir.path().join("var/jukebox").join("songs.txt")
        );

        let absolute = elsewhere.path().to_string_lossy().into_owned();
        config
            .set_value(&["storage", "directory"], Value::String(absolute))
            .unwrap();
        assert_eq!(config.get_storage_dir().unwrap(), elsewhere.path());
    }

    #[test]
    fn test_empty_log_file_disables_file_logging() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(temp_dir.path(), vec![]);
        assert_eq!(
            config.get_log_file(),
            Some(temp_dir.path().join("logger.txt"))
        );

        config
            .set_value(&["host", "logger", "file"], Value::String(String::new()))
            .unwrap();
        assert_eq!(config.get_log_file(), None);
    }

    #[test]
    fn test_invalid_port_falls_back_to_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = load(temp_dir.path(), vec![("JUKEBOX_CONFIG__HOST__PORT", "99999")]);
        assert_eq!(config.get_port(), 7777);
    }
}
