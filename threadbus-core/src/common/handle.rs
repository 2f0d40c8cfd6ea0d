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

use std::sync::Arc;

use tracing::{instrument, trace};

use crate::common::{ChannelId, MailboxRef, RegistryInner};
use crate::message::{BusError, Envelope};
use crate::traits::Payload;

/// The user-facing facade over one mailbox.
///
/// A `ChannelHandle` is bound to at most one mailbox at a time: opening a
/// new channel on an already-bound handle closes the previous mailbox
/// first. Handles are created from a [`crate::common::Registry`] via
/// [`crate::common::Registry::handle`] (unbound) or
/// [`crate::common::Registry::open`] (bound).
///
/// Dropping a bound handle closes it, which blocks until the outbound
/// queue drains, exactly as an explicit [`ChannelHandle::close`] does.
#[derive(Debug)]
pub struct ChannelHandle {
    registry: Arc<RegistryInner>,
    mailbox: Option<MailboxRef>,
}

impl ChannelHandle {
    pub(crate) fn new(registry: Arc<RegistryInner>) -> Self {
        Self {
            registry,
            mailbox: None,
        }
    }

    /// Binds this handle to `channel`, closing any current binding first.
    #[instrument(skip(self))]
    pub fn open(&mut self, channel: ChannelId) {
        if self.mailbox.is_some() {
            self.close();
        }
        self.mailbox = Some(self.registry.create_pipe(channel));
    }

    /// Drains pending sends, then detaches from the mailbox.
    ///
    /// Blocks until the dispatch loop has picked up every queued outbound
    /// envelope. There is no timeout: a close on a live registry waits as
    /// long as the drain takes. If the registry has been shut down the
    /// queue can never drain, so the handle detaches without waiting
    /// further. Idempotent when not bound.
    #[instrument(skip(self))]
    pub fn close(&mut self) {
        if let Some(mailbox) = self.mailbox.take() {
            let drain_poll = self.registry.drain_poll();
            while !mailbox.is_outbound_empty() && self.registry.is_running() {
                mailbox.wait_outbound_drained(drain_poll);
            }
            self.registry.destroy_pipe(mailbox);
            trace!("handle closed");
        }
    }

    /// Sends `value` as a broadcast to every other handle on the channel.
    ///
    /// Ownership of `value` moves into the bus; clone at the call site to
    /// keep a copy.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotOpen`] when the handle is unbound.
    pub fn send<T: Payload>(&self, value: T) -> Result<(), BusError> {
        self.send_tagged(value, "")
    }

    /// Sends `value` tagged with a topic signature.
    ///
    /// Tagged envelopes are delivered only to handles subscribed to the
    /// signature; an empty signature routes as a broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotOpen`] when the handle is unbound.
    #[instrument(skip(self, value))]
    pub fn send_tagged<T: Payload>(&self, value: T, signature: &str) -> Result<(), BusError> {
        let mailbox = self.mailbox.as_ref().ok_or(BusError::NotOpen)?;
        let envelope = Envelope::pack(value, Some(signature.to_owned()));
        trace!(
            channel = mailbox.channel(),
            type_name = envelope.type_name(),
            "queueing outbound envelope"
        );
        mailbox.enqueue_outbound(envelope);
        Ok(())
    }

    /// Blocks until a delivery arrives and extracts it as `T`.
    ///
    /// Blocks indefinitely when nothing is ever delivered; there is no
    /// timeout and no cancellation. A type mismatch consumes the offending
    /// envelope but leaves the mailbox otherwise intact, so the next
    /// `receive` sees the next pending delivery.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotOpen`] when the handle is unbound, or
    /// [`BusError::TypeMismatch`] when the delivered payload is not a `T`.
    pub fn receive<T: Payload + Clone>(&self) -> Result<T, BusError> {
        let mailbox = self.mailbox.as_ref().ok_or(BusError::NotOpen)?;
        mailbox.wait_inbound().unpack()
    }

    /// Non-blocking receive: `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotOpen`] when the handle is unbound, or
    /// [`BusError::TypeMismatch`] when the pending payload is not a `T`.
    pub fn try_receive<T: Payload + Clone>(&self) -> Result<Option<T>, BusError> {
        let mailbox = self.mailbox.as_ref().ok_or(BusError::NotOpen)?;
        mailbox.dequeue_inbound().map(Envelope::unpack).transpose()
    }

    /// Returns `true` iff a delivery is currently pending.
    ///
    /// Never blocks. An unbound handle has nothing pending.
    pub fn poll(&self) -> bool {
        self.mailbox
            .as_ref()
            .is_some_and(|mailbox| mailbox.has_inbound())
    }

    /// Registers interest in a topic signature.
    ///
    /// Subscribing twice to the same signature keeps both entries; a
    /// matching envelope is still delivered exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotOpen`] when the handle is unbound.
    #[instrument(skip(self))]
    pub fn subscribe(&self, signature: &str) -> Result<(), BusError> {
        let mailbox = self.mailbox.as_ref().ok_or(BusError::NotOpen)?;
        mailbox.subscribe(signature);
        Ok(())
    }

    /// Removes one matching subscription entry, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotOpen`] when the handle is unbound.
    #[instrument(skip(self))]
    pub fn unsubscribe(&self, signature: &str) -> Result<(), BusError> {
        let mailbox = self.mailbox.as_ref().ok_or(BusError::NotOpen)?;
        mailbox.unsubscribe(signature);
        Ok(())
    }

    /// Returns `true` while the handle is bound to a mailbox.
    pub fn is_open(&self) -> bool {
        self.mailbox.is_some()
    }

    /// Returns the bound channel, if any.
    pub fn channel(&self) -> Option<ChannelId> {
        self.mailbox.as_ref().map(|mailbox| mailbox.channel())
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.close();
    }
}
