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

#![forbid(unsafe_code)]
//! Threadbus Core Library
//!
//! This library provides the routing engine for the Threadbus message bus:
//! the registry that owns every mailbox and runs the dispatch thread, the
//! mailbox queue pair, the typed message envelope, and the channel handle
//! facade that threads use to publish and receive.

/// Runtime objects: registry, mailboxes, and the channel handle facade.
pub(crate) mod common;

/// Bus-wide configuration loading.
pub(crate) mod config;
pub(crate) mod message;
/// Trait definitions used at the send/receive seam.
pub(crate) mod traits;

/// Prelude module for convenient imports.
///
/// Re-exports the public surface of the bus: the registry, the channel
/// handle, the envelope and error types, and the payload trait.
pub mod prelude {
    pub use crate::common::{ChannelHandle, ChannelId, Mailbox, MailboxRef, Registry};
    pub use crate::config::{BusConfig, CloseConfig, DispatchConfig};
    pub use crate::message::{BusError, Envelope};
    pub use crate::traits::Payload;
}
