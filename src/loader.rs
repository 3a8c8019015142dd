use std::path::{Path, PathBuf};

use crate::env::{EnvLookup, HostEnv};
use crate::error::Error;
use crate::model::{Binding, LoadedEnv};
use crate::parser::parse_bytes_with_env;

const DEFAULT_DIR: &str = ".";
const DEFAULT_NAME: &str = ".env";

/// Parse the dotenv file at `path`.
///
/// `None` means discovery found nothing and fails with [`Error::NoFile`]
/// without touching the filesystem.
pub fn parse_path(path: Option<&Path>, env: &dyn EnvLookup) -> Result<Vec<Binding>, Error> {
    let Some(path) = path else {
        return Err(Error::NoFile);
    };
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bytes_with_env(&bytes, env)
}

/// Locate `.env` in the current directory and parse it.
pub fn dotenv() -> Result<LoadedEnv, Error> {
    EnvLoader::new().load()
}

/// Builder-style dotenv file locator and loader.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    dirs: Vec<PathBuf>,
    names: Vec<String>,
    recursive: bool,
    verbose: bool,
    env: HostEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dirs.push(dir.as_ref().to_path_buf());
        self
    }

    pub fn dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.dirs
            .extend(dirs.into_iter().map(|dir| dir.as_ref().to_path_buf()));
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Also search subdirectories, depth-first.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Report unreadable directories on stderr.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Environment consulted when a `${NAME}` reference has no binding.
    pub fn env(mut self, env: HostEnv) -> Self {
        self.env = env;
        self
    }

    /// Returns the first matching file. Directories are tried in order, and
    /// within a directory names are tried in order.
    pub fn find(&self) -> Option<PathBuf> {
        let dirs = self.effective_dirs();
        let names = self.effective_names();

        for dir in &dirs {
            let Some(entries) = self.read_dir(dir) else {
                continue;
            };
            if let Some(found) = find_in(&entries, &names) {
                return Some(found);
            }
            if self.recursive
                && let Some(found) = self.find_in_subdirs(&entries, &names)
            {
                return Some(found);
            }
        }
        None
    }

    /// Locate the dotenv file and parse it.
    pub fn load(&self) -> Result<LoadedEnv, Error> {
        let path = self.find().ok_or(Error::NoFile)?;
        let bindings = parse_path(Some(path.as_path()), &self.env)?;
        Ok(LoadedEnv { path, bindings })
    }

    fn find_in_subdirs(&self, entries: &[DirEntry], names: &[String]) -> Option<PathBuf> {
        for subdir in entries.iter().filter(|entry| entry.is_dir) {
            let Some(sub_entries) = self.read_dir(&subdir.path) else {
                continue;
            };
            if let Some(found) = find_in(&sub_entries, names) {
                return Some(found);
            }
            if let Some(found) = self.find_in_subdirs(&sub_entries, names) {
                return Some(found);
            }
        }
        None
    }

    /// Lists `dir` sorted by file name so the search order is stable.
    fn read_dir(&self, dir: &Path) -> Option<Vec<DirEntry>> {
        let iter = match std::fs::read_dir(dir) {
            Ok(iter) => iter,
            Err(err) => {
                if self.verbose {
                    eprintln!("dotenvsh: cannot read directory {}: {err}", dir.display());
                }
                return None;
            }
        };

        let mut entries: Vec<DirEntry> = iter
            .filter_map(Result::ok)
            .map(|entry| {
                // Symlinks are never descended into, so link cycles cannot loop.
                let is_dir = entry
                    .file_type()
                    .map(|file_type| file_type.is_dir())
                    .unwrap_or(false);
                DirEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                    is_dir,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Some(entries)
    }

    fn effective_dirs(&self) -> Vec<PathBuf> {
        if self.dirs.is_empty() {
            vec![PathBuf::from(DEFAULT_DIR)]
        } else {
            self.dirs.clone()
        }
    }

    fn effective_names(&self) -> Vec<String> {
        if self.names.is_empty() {
            vec![DEFAULT_NAME.to_owned()]
        } else {
            self.names.clone()
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            names: Vec::new(),
            recursive: false,
            verbose: false,
            env: HostEnv::process(),
        }
    }
}

struct DirEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn find_in(entries: &[DirEntry], names: &[String]) -> Option<PathBuf> {
    names.iter().find_map(|name| {
        entries
            .iter()
            .find(|entry| !entry.is_dir && entry.name == *name)
            .map(|entry| entry.path.clone())
    })
}
