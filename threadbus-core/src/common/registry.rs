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

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{instrument, trace};

use crate::common::{ChannelHandle, ChannelId, Mailbox, MailboxRef};
use crate::config::{ambient_config, BusConfig};

/// Owns every live mailbox and runs the dispatch loop that routes envelopes
/// between them.
///
/// Constructing a `Registry` spawns exactly one background OS thread which
/// periodically moves envelopes from each mailbox's outbound queue into the
/// inbound queues of every other mailbox on the same channel whose
/// subscriptions accept them. The thread observes a cancellation flag at the
/// top of each pass and is joined by [`Registry::shutdown`] or on drop; by
/// default nothing stops it for the registry's entire lifetime.
#[derive(Debug)]
pub struct Registry {
    inner: Arc<RegistryInner>,
    dispatcher: Option<JoinHandle<()>>,
}

pub(crate) struct RegistryInner {
    /// Ordered collection of live mailboxes. Recipient visitation order is
    /// collection order.
    mailboxes: Mutex<Vec<MailboxRef>>,
    /// Cancellation flag observed at the top of each dispatch pass.
    running: AtomicBool,
    /// Sleep between dispatch passes.
    tick: Duration,
    /// Granularity at which a draining close re-checks liveness.
    drain_poll: Duration,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Constructs a registry with the ambient [`BusConfig`] and starts its
    /// dispatch thread.
    pub fn new() -> Self {
        Self::with_config(ambient_config().clone())
    }

    /// Constructs a registry with an explicit configuration and starts its
    /// dispatch thread.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to spawn the dispatch thread; the bus cannot
    /// function without it.
    pub fn with_config(config: BusConfig) -> Self {
        let inner = Arc::new(RegistryInner {
            mailboxes: Mutex::new(Vec::new()),
            running: AtomicBool::new(true),
            tick: Duration::from_millis(config.dispatch.tick_ms),
            drain_poll: Duration::from_millis(config.close.drain_poll_ms),
        });

        let dispatcher = {
            let inner = Arc::clone(&inner);
            thread::Builder::new()
                .name(config.dispatch.thread_name.clone())
                .spawn(move || inner.dispatch_loop())
                .expect("failed to spawn the dispatch thread")
        };

        Self {
            inner,
            dispatcher: Some(dispatcher),
        }
    }

    /// Creates a new unbound [`ChannelHandle`] on this registry.
    pub fn handle(&self) -> ChannelHandle {
        ChannelHandle::new(Arc::clone(&self.inner))
    }

    /// Creates a [`ChannelHandle`] already bound to `channel`.
    pub fn open(&self, channel: ChannelId) -> ChannelHandle {
        let mut handle = self.handle();
        handle.open(channel);
        handle
    }

    /// Constructs a new mailbox for `channel`, appends it to the collection,
    /// and returns a shared reference to it.
    ///
    /// The mailbox is visible to the dispatch loop from the moment this
    /// returns. Amortized O(1) excluding collection growth.
    pub fn create_pipe(&self, channel: ChannelId) -> MailboxRef {
        self.inner.create_pipe(channel)
    }

    /// Detaches the caller's reference to a mailbox and removes the mailbox
    /// from the collection when no other holder remains.
    ///
    /// The caller's strong reference is always consumed. The collection
    /// entry is removed only when it is the last remaining strong holder;
    /// a mailbox still shared elsewhere stays routable.
    pub fn destroy_pipe(&self, mailbox: MailboxRef) {
        self.inner.destroy_pipe(mailbox);
    }

    /// Returns the number of mailboxes currently in the collection.
    pub fn mailbox_count(&self) -> usize {
        self.inner.mailboxes.lock().len()
    }

    /// Returns `true` while the dispatch thread is live.
    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }

    /// Stops the dispatch loop and joins its thread.
    ///
    /// The cancellation flag is observed at the top of the next dispatch
    /// pass. Idempotent. Envelopes still queued after shutdown are never
    /// routed.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch thread panicked.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) -> anyhow::Result<()> {
        self.inner.running.store(false, Ordering::Release);
        if let Some(dispatcher) = self.dispatcher.take() {
            trace!("joining the dispatch thread");
            dispatcher
                .join()
                .map_err(|_| anyhow::anyhow!("dispatch thread panicked"))?;
        }
        Ok(())
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl RegistryInner {
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn drain_poll(&self) -> Duration {
        self.drain_poll
    }

    #[instrument(skip(self))]
    pub(crate) fn create_pipe(&self, channel: ChannelId) -> MailboxRef {
        let mailbox = Arc::new(Mailbox::new(channel));
        let mut mailboxes = self.mailboxes.lock();
        mailboxes.push(Arc::clone(&mailbox));
        trace!(channel, total = mailboxes.len(), "mailbox created");
        mailbox
    }

    #[instrument(skip_all)]
    pub(crate) fn destroy_pipe(&self, mailbox: MailboxRef) {
        let mut mailboxes = self.mailboxes.lock();
        let position = mailboxes
            .iter()
            .position(|entry| Arc::ptr_eq(entry, &mailbox));
        // The caller's reference is consumed either way.
        drop(mailbox);
        if let Some(position) = position {
            // The dispatch loop iterates under this same lock and never
            // clones entries out of the collection, so the count is exact:
            // 1 means the collection entry is the last strong holder.
            if Arc::strong_count(&mailboxes[position]) == 1 {
                let removed = mailboxes.remove(position);
                trace!(
                    channel = removed.channel(),
                    total = mailboxes.len(),
                    "mailbox removed"
                );
            } else {
                trace!(
                    channel = mailboxes[position].channel(),
                    "mailbox still shared, left routable"
                );
            }
        }
    }

    fn dispatch_loop(&self) {
        trace!("dispatch thread started");
        while self.is_running() {
            self.dispatch_pass();
            thread::sleep(self.tick);
        }
        trace!("dispatch thread stopped");
    }

    /// One full routing pass over the collection.
    ///
    /// At most one envelope is popped per mailbox per pass, which keeps a
    /// flooded sender from starving service to the others. An envelope with
    /// no matching recipient is dropped silently.
    fn dispatch_pass(&self) {
        let mailboxes = self.mailboxes.lock();
        for sender_index in 0..mailboxes.len() {
            let Some(envelope) = mailboxes[sender_index].dequeue_outbound() else {
                continue;
            };
            let channel = mailboxes[sender_index].channel();
            for (recipient_index, recipient) in mailboxes.iter().enumerate() {
                if recipient_index == sender_index || recipient.channel() != channel {
                    continue;
                }
                let deliver = match envelope.signature() {
                    None => true,
                    Some(signature) => recipient.matches(signature),
                };
                if deliver {
                    recipient.enqueue_inbound(envelope.clone());
                }
            }
        }
    }
}

impl fmt::Debug for RegistryInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryInner")
            .field("running", &self.is_running())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}
