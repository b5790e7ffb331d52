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

//! Runtime configuration.
//!
//! Every field has a default, so an empty TOML document is a complete configuration.

use crate::gpu_backend::ShaderStage;

use arrayvec::ArrayVec;
use serde::Deserialize;

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The window to open.
    pub window: WindowConfig,

    /// Where the shader sources live.
    pub shaders: ShaderPaths,

    /// The uniforms that are written once.
    pub uniforms: UniformConfig,

    /// The RGBA color the frame is cleared to.
    pub clear_color: [f32; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shaders: ShaderPaths::default(),
            uniforms: UniformConfig::default(),
            clear_color: [0.0, 0.0, 1.0, 0.0],
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!("loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }
}

/// Window geometry and title.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x: i32,
    pub y: i32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "My second window".into(),
            width: 300,
            height: 200,
            x: 100,
            y: 100,
        }
    }
}

/// Paths to the shader sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,

    /// Not loaded unless set.
    pub geometry: Option<PathBuf>,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: "shaders/shader.vs".into(),
            fragment: "shaders/shader.fs".into(),
            geometry: None,
        }
    }
}

impl ShaderPaths {
    /// Each configured stage and its path, in attach order.
    pub fn stages(&self) -> ArrayVec<(ShaderStage, &Path), 3> {
        let mut stages = ArrayVec::new();

        stages.push((ShaderStage::Vertex, self.vertex.as_path()));
        if let Some(geometry) = &self.geometry {
            stages.push((ShaderStage::Geometry, geometry.as_path()));
        }
        stages.push((ShaderStage::Fragment, self.fragment.as_path()));

        stages
    }
}

/// Values for the uniforms that never change.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UniformConfig {
    pub loop_duration: f32,
    pub loop_duration_frag: f32,
}

impl Default for UniformConfig {
    fn default() -> Self {
        Self {
            loop_duration: 5.0,
            loop_duration_frag: 2.5,
        }
    }
}

/// An error that occurred while loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io { path: PathBuf, source: io::Error },

    /// The file is not valid configuration TOML.
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read configuration {}: {source}", path.display())
            }
            ConfigError::Parse(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
        }
    }
}
