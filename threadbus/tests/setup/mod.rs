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
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

// Ensures tracing initialization happens only once across all tests.
static INIT: Once = Once::new();

/// Initializes the global tracing subscriber for tests.
///
/// Sets up a `tracing_subscriber::FmtSubscriber` with an `EnvFilter` that
/// keeps the bus crates at trace level while everything else stays at info.
/// Uses `std::sync::Once` so the initialization runs only once even when
/// called from several tests.
pub fn initialize_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::new("info")
            .add_directive("threadbus_core=trace".parse().unwrap())
            .add_directive("threadbus=trace".parse().unwrap());

        let subscriber = FmtSubscriber::builder()
            .compact()
            .with_line_number(true)
            .without_time()
            .with_target(true)
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

/// Gives the dispatch thread ample passes to route (or drop) everything
/// already queued. Used before asserting that something was NOT delivered.
pub fn settle() {
    std::thread::sleep(Duration::from_millis(50));
}
