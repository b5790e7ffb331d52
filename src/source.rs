// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `shader-pulse`.
//
// `shader-pulse` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `shader-pulse` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `shader-pulse`. If not, see <https://www.gnu.org/licenses/>.

//! Loading shader source text from disk.

use crate::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The text of a shader, along with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    path: PathBuf,
    text: String,
}

impl ShaderSource {
    /// Read a shader source file.
    ///
    /// The file must exist, be readable and hold UTF-8 text. Nothing else is checked; the
    /// driver is the judge of whether the text is a valid shader.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|source| Error::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|err| Error::FileAccess {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, err),
        })?;

        tracing::debug!("read {} bytes of shader source from {}", text.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Wrap source text that did not come from a file.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// The path this source was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The source text.
    pub fn text(&self) -> &str {
        &self.text
    }
}
