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

//! The error type for initialization.

use crate::ShaderStage;

use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error that occurred while bringing up the renderer.
///
/// Every variant is fatal; there is no partially initialized state to recover into.
#[derive(Debug)]
pub enum Error {
    /// A shader source file could not be read.
    FileAccess {
        /// The path that was being read.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// A shader stage kind that is not vertex, geometry or fragment was requested.
    UnsupportedStage(String),

    /// A shader failed to compile.
    Compile {
        /// The stage the shader was compiled for.
        stage: ShaderStage,

        /// The diagnostic log reported by the driver.
        log: String,
    },

    /// The program failed to link.
    Link {
        /// The diagnostic log reported by the driver.
        log: String,
    },

    /// The graphics binding layer could not be initialized.
    ContextInit(String),

    /// The backend failed to allocate an object.
    Backend(Box<dyn StdError + 'static>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FileAccess { path, source } => {
                write!(f, "failed to read shader source {}: {source}", path.display())
            }
            Error::UnsupportedStage(kind) => write!(f, "unrecognized shader type: {kind}"),
            Error::Compile { stage, log } => {
                write!(f, "compile failure in {stage} shader:\n{log}")
            }
            Error::Link { log } => write!(f, "linker failure: {log}"),
            Error::ContextInit(reason) => {
                write!(f, "failed to initialize the graphics context: {reason}")
            }
            Error::Backend(err) => write!(f, "backend error: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::FileAccess { source, .. } => Some(source),
            Error::Backend(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<Infallible> for Error {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_keeps_log_verbatim() {
        let err = Error::Compile {
            stage: ShaderStage::Fragment,
            log: "0:3(1): error: syntax error\n".into(),
        };

        assert_eq!(
            err.to_string(),
            "compile failure in fragment shader:\n0:3(1): error: syntax error\n"
        );
    }

    #[test]
    fn file_access_exposes_io_source() {
        let err = Error::FileAccess {
            path: "missing.vs".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };

        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.vs"));
    }
}
