use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{RED_COUNT, Ticket, now_ts, validate_ticket};

pub const HISTORY_FILE: &str = "history.json";
pub const FAVORITES_FILE: &str = "favorites.json";
pub const LATEST_DRAW_FILE: &str = "latest_draw.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("accès impossible à {path:?} : {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("sérialisation impossible pour {path:?} : {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("fichier corrompu {path:?}, réécriture refusée : {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{expected} rouges attendus, {found} fournis", expected = RED_COUNT)]
    InvalidRedCount { found: usize },

    #[error("tirage invalide : {0}")]
    InvalidTicket(String),
}

pub fn default_data_dir() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path
}

/// Persistance JSON des trois enregistrements : historique, favoris et
/// dernier tirage.
///
/// Chaque opération relit puis réécrit le fichier entier. Pas de verrou :
/// le dernier écrivain gagne. Toute lecture d'un fichier absent ou corrompu
/// rend la valeur par défaut (liste vide, ou `None` pour le dernier tirage).
/// Une écriture qui doit relire un fichier illisible ou corrompu échoue
/// sans toucher au fichier.
#[derive(Debug, Clone)]
pub struct Store {
    history_path: PathBuf,
    favorites_path: PathBuf,
    latest_path: PathBuf,
}

impl Store {
    pub fn open(dir: &Path) -> Self {
        Self::with_paths(
            dir.join(HISTORY_FILE),
            dir.join(FAVORITES_FILE),
            dir.join(LATEST_DRAW_FILE),
        )
    }

    pub fn with_paths(history: PathBuf, favorites: PathBuf, latest: PathBuf) -> Self {
        Self {
            history_path: history,
            favorites_path: favorites,
            latest_path: latest,
        }
    }

    pub fn history_path(&self) -> &Path {
        &self.history_path
    }

    pub fn favorites_path(&self) -> &Path {
        &self.favorites_path
    }

    pub fn latest_path(&self) -> &Path {
        &self.latest_path
    }

    /// Les `limit` entrées les plus récentes, la plus récente en premier.
    pub fn load_history(&self, limit: usize) -> Vec<Ticket> {
        let data: Vec<Ticket> = load_or_default(&self.history_path);
        data.into_iter().rev().take(limit).collect()
    }

    pub fn history_len(&self) -> usize {
        load_or_default::<Vec<Ticket>>(&self.history_path).len()
    }

    pub fn append_history(&self, tickets: &[Ticket]) -> Result<(), StoreError> {
        let mut data: Vec<Ticket> = load_for_update(&self.history_path)?;
        data.extend_from_slice(tickets);
        save(&self.history_path, &data)?;
        debug!(added = tickets.len(), total = data.len(), "historique mis à jour");
        Ok(())
    }

    pub fn delete_history_entry(&self, key: &str) -> Result<bool, StoreError> {
        remove_first(&self.history_path, key)
    }

    pub fn load_favorites(&self) -> Vec<Ticket> {
        load_or_default(&self.favorites_path)
    }

    /// Ajoute aux favoris. Renvoie `false` si la clé canonique y est déjà.
    pub fn save_favorite(&self, ticket: &Ticket) -> Result<bool, StoreError> {
        let mut data: Vec<Ticket> = load_for_update(&self.favorites_path)?;
        let key = ticket.format();
        if data.iter().any(|t| t.format() == key) {
            return Ok(false);
        }
        data.push(*ticket);
        save(&self.favorites_path, &data)?;
        Ok(true)
    }

    pub fn delete_favorite(&self, key: &str) -> Result<bool, StoreError> {
        remove_first(&self.favorites_path, key)
    }

    /// Remplace le dernier tirage. Les rouges sont triés avant validation.
    pub fn set_latest_draw(&self, reds: &[u8], blue: u8) -> Result<Ticket, StoreError> {
        if reds.len() != RED_COUNT {
            return Err(StoreError::InvalidRedCount { found: reds.len() });
        }
        let mut arr = [0u8; RED_COUNT];
        arr.copy_from_slice(reds);
        arr.sort();
        validate_ticket(&arr, blue).map_err(|e| StoreError::InvalidTicket(e.to_string()))?;

        let ticket = Ticket::new(arr, blue, now_ts());
        save(&self.latest_path, &ticket)?;
        Ok(ticket)
    }

    pub fn latest_draw(&self) -> Option<Ticket> {
        load_or_default(&self.latest_path)
    }
}

/// `Ok(None)` si le fichier est absent.
fn try_load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Lecture tolérante : absent → défaut (debug), illisible ou corrompu →
/// défaut (warn). Ne remonte jamais d'erreur.
fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match try_load(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            debug!(?path, "fichier absent, valeur par défaut");
            T::default()
        }
        Err(e) => {
            warn!(error = %e, "valeur par défaut");
            T::default()
        }
    }
}

/// Relecture avant réécriture : seul un fichier absent vaut défaut.
fn load_for_update<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    Ok(try_load(path)?.unwrap_or_default())
}

fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Supprime la première entrée dont la forme canonique vaut `key`.
fn remove_first(path: &Path, key: &str) -> Result<bool, StoreError> {
    let mut data: Vec<Ticket> = load_for_update(path)?;
    let Some(idx) = data.iter().position(|t| t.format() == key) else {
        return Ok(false);
    };
    data.remove(idx);
    save(path, &data)?;
    Ok(true)
}
