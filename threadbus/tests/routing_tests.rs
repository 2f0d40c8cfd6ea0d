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
use threadbus::prelude::*;

use crate::setup::*;

mod setup;

#[test]
fn broadcast_reaches_every_other_handle_on_the_channel() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(7);
    let first = registry.open(7);
    let second = registry.open(7);

    sender.send(String::from("to everyone"))?;

    // Both recipients get an equal value out of the one shared payload.
    assert_eq!(first.receive::<String>()?, "to everyone");
    assert_eq!(second.receive::<String>()?, "to everyone");

    // The sender never hears its own envelope back.
    settle();
    assert!(!sender.poll());

    Ok(())
}

#[test]
fn channels_are_isolated() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(1);
    let bystander = registry.open(2);

    sender.send(5_i32)?;

    settle();
    assert!(!bystander.poll());

    Ok(())
}

#[test]
fn unroutable_envelope_is_dropped_and_close_still_drains() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let mut lonely = registry.open(9);

    // Nobody else is on channel 9; the dispatch loop pops the envelope and
    // drops it without a recipient.
    lonely.send(1_i32)?;

    // close() returning proves the outbound queue drained anyway.
    lonely.close();
    assert_eq!(registry.mailbox_count(), 0);

    Ok(())
}

// The walk-through from the routing design: two handles on channel 5, one
// subscription, three sends, exactly two arrivals.
#[test]
fn tagged_broadcast_and_unmatched_sends_deliver_exactly_two() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(5);
    let receiver = registry.open(5);

    receiver.subscribe("topic1")?;

    sender.send_tagged(1_i32, "topic1")?;
    sender.send(2_i32)?;
    sender.send_tagged(3_i32, "topic2")?;

    assert_eq!(receiver.receive::<i32>()?, 1);
    assert_eq!(receiver.receive::<i32>()?, 2);

    settle();
    assert!(!receiver.poll(), "the topic2 envelope must have been dropped");

    Ok(())
}
