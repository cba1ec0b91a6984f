// Copyright 2025 eraflo
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

//! Defines the error taxonomy shared by every layer of the override engine.
//!
//! None of these errors is fatal to the host: callers at the interception
//! boundary log them and fall back to the original, unoverridden asset.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results carrying a [`ReduxError`].
pub type ReduxResult<T> = Result<T, ReduxError>;

/// Every failure the override engine can report.
#[derive(Debug, Error)]
pub enum ReduxError {
    /// A file or directory could not be read.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bytes of an image file could not be decoded.
    #[error("Failed to decode '{}': {message}", path.display())]
    Decode {
        /// The path of the file that failed to decode.
        path: PathBuf,
        /// The decoder's error message.
        message: String,
    },

    /// A configuration file was malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A plugin manifest or module declaration file was malformed.
    #[error("Invalid manifest '{}': {message}", path.display())]
    Manifest {
        /// The manifest or module file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The same module identity was registered twice within one epoch.
    #[error("Module identity '{0}' is already registered in this epoch")]
    DuplicateModule(String),

    /// A registration call carried no module.
    #[error("No module supplied by '{0}'")]
    MissingModule(String),
}

impl ReduxError {
    /// Wraps an [`std::io::Error`] together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
