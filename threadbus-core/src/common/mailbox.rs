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

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::common::ChannelId;
use crate::message::Envelope;

/// A per-handle pair of FIFO queues plus the handle's subscriptions.
///
/// The outbound queue holds envelopes the owning handle has sent but the
/// dispatch loop has not yet routed; the inbound queue holds envelopes the
/// dispatch loop has delivered but the handle has not yet consumed. One lock
/// guards both queues and the subscription list; one condvar is signaled on
/// inbound growth and outbound shrinkage, which is what `receive` and a
/// draining `close` block on.
///
/// Queue roles are single-writer: only the owning handle appends outbound
/// and pops inbound, and only the dispatch loop pops outbound and appends
/// inbound.
pub struct Mailbox {
    /// The channel this mailbox belongs to.
    channel: ChannelId,
    state: Mutex<MailboxState>,
    signal: Condvar,
}

#[derive(Default)]
struct MailboxState {
    inbound: VecDeque<Envelope>,
    outbound: VecDeque<Envelope>,
    /// Ordered signature list. Duplicates are permitted; this is not a set.
    subscriptions: Vec<String>,
}

impl Mailbox {
    pub(crate) fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            state: Mutex::new(MailboxState::default()),
            signal: Condvar::new(),
        }
    }

    /// Returns the channel this mailbox is bound to.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Appends an envelope to the outbound queue.
    ///
    /// Never blocks the caller beyond the lock's critical section; the
    /// dispatch loop picks the envelope up on a later pass.
    pub(crate) fn enqueue_outbound(&self, envelope: Envelope) {
        let mut state = self.state.lock();
        state.outbound.push_back(envelope);
    }

    /// Pops the oldest pending send, FIFO. Dispatch-only.
    ///
    /// Wakes any thread blocked in a draining `close` once the queue runs
    /// empty.
    pub(crate) fn dequeue_outbound(&self) -> Option<Envelope> {
        let mut state = self.state.lock();
        let envelope = state.outbound.pop_front();
        if envelope.is_some() && state.outbound.is_empty() {
            self.signal.notify_all();
        }
        envelope
    }

    /// Appends a delivered envelope to the inbound queue. Dispatch-only.
    ///
    /// Wakes any thread blocked in `receive`.
    pub(crate) fn enqueue_inbound(&self, envelope: Envelope) {
        let mut state = self.state.lock();
        state.inbound.push_back(envelope);
        self.signal.notify_all();
    }

    /// Pops the oldest delivered envelope, FIFO. Handle-only.
    pub(crate) fn dequeue_inbound(&self) -> Option<Envelope> {
        let mut state = self.state.lock();
        state.inbound.pop_front()
    }

    /// Blocks until a delivery arrives, then pops it. Handle-only.
    ///
    /// There is no timeout and no cancellation: if nothing is ever
    /// delivered, this blocks indefinitely.
    pub(crate) fn wait_inbound(&self) -> Envelope {
        let mut state = self.state.lock();
        loop {
            if let Some(envelope) = state.inbound.pop_front() {
                return envelope;
            }
            self.signal.wait(&mut state);
        }
    }

    /// Waits up to `timeout` for outbound shrinkage.
    ///
    /// Callers loop on [`Mailbox::is_outbound_empty`] around this; the
    /// bounded wait lets them also watch an external condition (registry
    /// liveness) between naps.
    pub(crate) fn wait_outbound_drained(&self, timeout: Duration) {
        let mut state = self.state.lock();
        if !state.outbound.is_empty() {
            let _ = self.signal.wait_for(&mut state, timeout);
        }
    }

    /// Registers interest in a signature. Duplicates are kept as-is.
    pub(crate) fn subscribe(&self, signature: &str) {
        let mut state = self.state.lock();
        state.subscriptions.push(signature.to_owned());
    }

    /// Removes the first subscription equal to `signature`, if any.
    ///
    /// One call removes one entry; a signature subscribed twice must be
    /// unsubscribed twice.
    pub(crate) fn unsubscribe(&self, signature: &str) {
        let mut state = self.state.lock();
        if let Some(position) = state.subscriptions.iter().position(|entry| entry == signature) {
            state.subscriptions.remove(position);
        }
    }

    /// Decides whether a signed envelope should be delivered here.
    ///
    /// An empty subscription list matches nothing; otherwise the first
    /// entry equal to `signature` decides, so duplicate subscriptions still
    /// produce at most one delivery per envelope.
    pub(crate) fn matches(&self, signature: &str) -> bool {
        let state = self.state.lock();
        state.subscriptions.iter().any(|entry| entry == signature)
    }

    /// Non-blocking check for pending deliveries.
    pub(crate) fn has_inbound(&self) -> bool {
        !self.state.lock().inbound.is_empty()
    }

    /// Non-blocking check for unsent envelopes.
    pub(crate) fn is_outbound_empty(&self) -> bool {
        self.state.lock().outbound.is_empty()
    }
}

impl fmt::Debug for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
