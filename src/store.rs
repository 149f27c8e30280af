use crate::error::{ConnectError, Result};
use crate::model::RepoType;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DATAVERSE_TOKEN_KEY: &str = "dataverseToken";
pub const GITHUB_TOKEN_KEY: &str = "ghToken";
pub const GITLAB_TOKEN_KEY: &str = "glToken";

/// Persistent string slots. Reads never fail: an unreadable store is empty.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat TOML table on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "token store unreadable, starting empty");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.entries)
            .map_err(|e| ConnectError::Store(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = open_private(&self.path)?;
        file.write_all(content.as_bytes())?;
        // mode() only applies on creation; tighten files left by older runs
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

fn repo_token_key(repo_type: RepoType) -> &'static str {
    match repo_type {
        RepoType::GitHub => GITHUB_TOKEN_KEY,
        RepoType::GitLab => GITLAB_TOKEN_KEY,
    }
}

/// Provider tokens remembered between runs.
pub struct TokenCache<S> {
    store: S,
}

impl<S: KeyValueStore> TokenCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn repo_token(&self, repo_type: RepoType) -> Option<String> {
        self.store.get(repo_token_key(repo_type))
    }

    pub fn dataverse_token(&self) -> Option<String> {
        self.store.get(DATAVERSE_TOKEN_KEY)
    }

    pub fn save_repo_token(&mut self, repo_type: RepoType, token: &str) -> Result<()> {
        debug!(repo_type = %repo_type, "caching repository token");
        self.store.set(repo_token_key(repo_type), token)
    }

    pub fn save_dataverse_token(&mut self, token: &str) -> Result<()> {
        debug!("caching dataverse token");
        self.store.set(DATAVERSE_TOKEN_KEY, token)
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}
