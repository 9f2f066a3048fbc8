//! Persistance ligne à ligne des fichiers texte
//!
//! Un enregistrement par ligne. Les fichiers appartiennent au serveur
//! une fois chargés : ils ne sont jamais relus pendant l'exécution.

use crate::{Error, Result};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Lit toutes les lignes d'un fichier, `None` s'il n'existe pas
pub(crate) fn read_lines(path: &Path) -> Result<Option<Vec<String>>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content.lines().map(str::to_string).collect())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

/// Ajoute une ligne en fin de fichier (créé si nécessaire)
pub(crate) fn append_line(path: &Path, line: &str) -> Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    writeln!(file, "{}", line).map_err(|e| Error::io(path, e))?;
    file.sync_data().map_err(|e| Error::io(path, e))
}

/// Réécrit entièrement le fichier
///
/// Le contenu est d'abord écrit dans un fichier voisin puis renommé, de
/// sorte qu'un lecteur ne voit jamais un fichier à moitié écrit.
pub(crate) fn rewrite_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    ensure_parent(path)?;
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| Error::Persistence(format!("{} is not a file path", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    fs::write(&tmp_path, content).map_err(|e| Error::io(&tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| Error::io(path, e))
}
