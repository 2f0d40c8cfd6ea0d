/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the Threadbus framework.
///
/// Loaded from `threadbus/config.toml` in the XDG config directories, with
/// compiled defaults for anything absent. [`crate::common::Registry::new`]
/// reads the ambient configuration;
/// [`crate::common::Registry::with_config`] bypasses it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Dispatch loop configuration.
    pub dispatch: DispatchConfig,
    /// Close/drain configuration.
    pub close: CloseConfig,
}

/// Dispatch loop configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Sleep between dispatch passes, in milliseconds. Bounds CPU usage
    /// while keeping routing responsive.
    pub tick_ms: u64,
    /// OS thread name for the dispatch thread.
    pub thread_name: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1,
            thread_name: "threadbus-dispatch".to_owned(),
        }
    }
}

/// Configuration for the drain performed by a closing handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseConfig {
    /// Granularity at which a draining close re-checks registry liveness,
    /// in milliseconds.
    pub drain_poll_ms: u64,
}

impl Default for CloseConfig {
    fn default() -> Self {
        Self { drain_poll_ms: 5 }
    }
}

impl BusConfig {
    /// Loads the configuration from the XDG config directories.
    ///
    /// A missing file yields the defaults; a malformed file is reported and
    /// also yields the defaults, so a bad config never takes the bus down.
    pub fn load() -> Self {
        let Some(path) = xdg::BaseDirectories::with_prefix("threadbus")
            .ok()
            .and_then(|dirs| dirs.find_config_file("config.toml"))
        else {
            return Self::default();
        };

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(path = %path.display(), %error, "could not read config file, using defaults");
                return Self::default();
            }
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), %error, "could not parse config file, using defaults");
                Self::default()
            }
        }
    }
}

lazy_static! {
    static ref AMBIENT: BusConfig = BusConfig::load();
}

/// Returns the process-wide ambient configuration, loaded once.
pub(crate) fn ambient_config() -> &'static BusConfig {
    &AMBIENT
}
