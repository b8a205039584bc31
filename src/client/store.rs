// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! File-system key-value store backing the credential and crypto key stores.
//!
//! Each key is a file named after the key inside the store directory.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::errors::ListenerError;

#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open the store, creating its directory when missing.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ListenerError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            ListenerError::StoreError(format!("cannot create {}: {}", dir.display(), e))
        })?;
        debug!("Opened key-value store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn get_value(&self, name: &str) -> Result<Option<String>, ListenerError> {
        let path = self.entry(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ListenerError::StoreError(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub async fn set_value(&self, name: &str, value: &str) -> Result<(), ListenerError> {
        let path = self.entry(name)?;
        tokio::fs::write(&path, value).await.map_err(|e| {
            ListenerError::StoreError(format!("cannot write {}: {}", path.display(), e))
        })
    }

    fn entry(&self, name: &str) -> Result<PathBuf, ListenerError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(ListenerError::StoreError(format!(
                "invalid store key '{}'",
                name
            )));
        }
        Ok(self.dir.join(name))
    }
}
