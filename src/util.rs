// relay-diversity: Diversity Charts for the Relay Network by Family, AS, Country, and Operator
// Copyright (C) 2024-2025 The relay-diversity developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Utility module collection of functions

use std::{
    env,
    path::{Path, PathBuf},
};

/// Environment variable naming the directory that holds the census tool and
/// its snapshot file.
pub const CENSUS_DIR_ENV: &str = "CENSUS_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {CENSUS_DIR_ENV} is not set: {0}")]
    CensusDirMissing(#[from] env::VarError),
}

pub fn init_logging() {
    pretty_env_logger::init();
}

/// Directory holding the census executable and the relay snapshot.
pub fn census_dir() -> Result<PathBuf, ConfigError> {
    Ok(PathBuf::from(env::var(CENSUS_DIR_ENV)?))
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }
}
