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

//! Defines common type aliases used within `threadbus-core`.
//!
//! This module centralizes the semantic aliases for channel identifiers and
//! shared mailbox references so the rest of the crate reads in domain terms.

use std::sync::Arc;

use crate::common::Mailbox;

/// The integer identifier grouping mailboxes into a channel.
///
/// Only mailboxes sharing a channel id may exchange messages.
pub type ChannelId = u32;

/// A shared reference to a [`Mailbox`].
///
/// The registry holds one strong reference per live mailbox in its
/// collection; the owning handle holds another. Either side dropping its
/// reference leaves the other intact, which is what lets
/// [`crate::common::Registry::destroy_pipe`] decide removal by looking at
/// the remaining strong holders.
pub type MailboxRef = Arc<Mailbox>;
