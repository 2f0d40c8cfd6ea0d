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

//! # Threadbus
//!
//! An in-process publish/subscribe message bus for multi-threaded
//! applications. Independent threads obtain a [`prelude::ChannelHandle`]
//! bound to an integer channel, send typed payloads optionally tagged with a
//! topic signature, and receive payloads delivered by a background dispatch
//! thread according to channel membership and subscription filters.
//!
//! ## Key Concepts
//!
//! - **Registry (`Registry`)**: Owns every live mailbox and runs the one
//!   dispatch thread that routes envelopes between them.
//! - **Handles (`ChannelHandle`)**: The user-facing facade: open, close,
//!   send, receive, poll, subscribe.
//! - **Envelopes (`Envelope`)**: One routed unit — an owned, type-tagged
//!   payload plus an optional topic signature.
//! - **Channels**: Integer groupings; only handles on the same channel
//!   exchange messages.
//! - **Signatures**: Topic strings. An untagged send is a broadcast to the
//!   whole channel; a tagged send reaches only subscribed handles.
//!
//! ## Quick Start
//!
//! ```rust
//! use threadbus::prelude::*;
//!
//! let registry = Registry::new();
//! let producer = registry.open(5);
//! let consumer = registry.open(5);
//!
//! consumer.subscribe("greetings")?;
//! producer.send_tagged(String::from("hello"), "greetings")?;
//!
//! let greeting: String = consumer.receive()?;
//! assert_eq!(greeting, "hello");
//! # Ok::<(), threadbus::prelude::BusError>(())
//! ```

pub use threadbus_core::prelude;
