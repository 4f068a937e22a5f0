// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use fs_err as fs;
use log::{trace, warn};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

const EXTENSION: &str = "yaml";

pub trait Config: DeserializeOwned {
    fn domain() -> String;

    fn merge(self, other: Self) -> Self;
}

#[derive(Debug, Clone)]
pub struct Manager {
    scope: Scope,
}

impl Manager {
    /// Config is loaded / merged from `usr/share` & `etc` relative to `root`
    /// and saved to `etc/{program}/{domain}.d/{name}.yaml`
    pub fn system(root: impl Into<PathBuf>, program: impl ToString) -> Self {
        Self {
            scope: Scope::System {
                root: root.into(),
                program: program.to_string(),
            },
        }
    }

    /// Config is loaded from $XDG_CONFIG_HOME and saved to
    /// $XDG_CONFIG_HOME/{program}/{domain}.d/{name}.yaml
    pub fn user(program: impl ToString) -> Result<Self, CreateUserError> {
        Ok(Self {
            scope: Scope::User {
                config: dirs::config_dir().ok_or(CreateUserError)?,
                program: program.to_string(),
            },
        })
    }

    /// Config is loaded from `path` and saved to
    /// `path`/{domain}.d/{name}.yaml
    pub fn custom(path: impl Into<PathBuf>) -> Self {
        Self {
            scope: Scope::Custom(path.into()),
        }
    }

    /// Load and merge every config file of `T`'s domain, lowest priority first
    ///
    /// Unreadable or malformed files are skipped with a warning.
    pub fn load<T: Config>(&self) -> Option<T> {
        let domain = T::domain();

        self.scope
            .search_dirs()
            .iter()
            .flat_map(|dir| enumerate_paths(dir, &domain))
            .filter_map(|path| read_config(&path))
            .reduce(T::merge)
    }

    pub fn save<T: Config + Serialize>(&self, name: impl fmt::Display, config: &T) -> Result<(), SaveError> {
        let dir = self.scope.save_dir().join(format!("{}.d", T::domain()));

        fs::create_dir_all(&dir).map_err(|io| SaveError::CreateDir(dir.clone(), io))?;

        let path = dir.join(format!("{name}.{EXTENSION}"));
        let serialized = serde_yaml::to_string(config)?;

        fs::write(&path, serialized).map_err(|io| SaveError::Write(path, io))?;

        Ok(())
    }

    pub fn delete<T: Config>(&self, name: impl fmt::Display) -> Result<(), io::Error> {
        let path = self
            .scope
            .save_dir()
            .join(format!("{}.d", T::domain()))
            .join(format!("{name}.{EXTENSION}"));

        fs::remove_file(path)
    }
}

#[derive(Debug, Error)]
#[error("$HOME or $XDG_CONFIG_HOME env not set")]
pub struct CreateUserError;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("create config dir {0:?}")]
    CreateDir(PathBuf, #[source] io::Error),
    #[error("serialize config")]
    Yaml(#[from] serde_yaml::Error),
    #[error("write config file {0:?}")]
    Write(PathBuf, #[source] io::Error),
}

/// `{domain}.yaml` followed by the sorted contents of `{domain}.d/`
fn enumerate_paths(dir: &Path, domain: &str) -> Vec<PathBuf> {
    let file = dir.join(format!("{domain}.{EXTENSION}"));
    let mut paths = if file.exists() { vec![file] } else { vec![] };

    if let Ok(read_dir) = fs::read_dir(dir.join(format!("{domain}.d"))) {
        let mut drop_ins = read_dir
            .filter_map(|entry| Some(entry.ok()?.path()))
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION))
            .collect::<Vec<_>>();
        drop_ins.sort();
        paths.extend(drop_ins);
    }

    paths
}

fn read_config<T: Config>(path: &Path) -> Option<T> {
    trace!("Reading config {path:?}");

    let bytes = fs::read(path).ok()?;
    serde_yaml::from_slice(&bytes)
        .inspect_err(|error| warn!("Ignoring malformed config {path:?}: {error}"))
        .ok()
}

#[derive(Debug, Clone)]
enum Scope {
    System { program: String, root: PathBuf },
    User { program: String, config: PathBuf },
    Custom(PathBuf),
}

impl Scope {
    /// Directories searched on load, lowest priority first
    fn search_dirs(&self) -> Vec<PathBuf> {
        match self {
            // Vendor defaults, then admin overrides
            Scope::System { root, program } => vec![
                root.join("usr/share").join(program),
                root.join("etc").join(program),
            ],
            Scope::User { config, program } => vec![config.join(program)],
            Scope::Custom(dir) => vec![dir.clone()],
        }
    }

    fn save_dir(&self) -> PathBuf {
        match self {
            Scope::System { root, program } => root.join("etc").join(program),
            Scope::User { config, program } => config.join(program),
            Scope::Custom(dir) => dir.clone(),
        }
    }
}
