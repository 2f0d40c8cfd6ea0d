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
fn tagged_delivery_requires_matching_subscription() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(3);
    let receiver = registry.open(3);

    receiver.subscribe("price")?;

    sender.send_tagged(150_i32, "price")?;
    assert_eq!(receiver.receive::<i32>()?, 150);

    sender.send_tagged(9000_i32, "volume")?;
    settle();
    assert!(!receiver.poll());

    Ok(())
}

#[test]
fn empty_subscription_list_skips_tagged_envelopes() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(3);
    let receiver = registry.open(3);

    sender.send_tagged(1_i32, "price")?;

    settle();
    assert!(!receiver.poll());

    Ok(())
}

#[test]
fn broadcast_ignores_subscription_filters() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(3);
    let receiver = registry.open(3);

    receiver.subscribe("something_else")?;

    sender.send(11_i32)?;
    assert_eq!(receiver.receive::<i32>()?, 11);

    Ok(())
}

#[test]
fn duplicate_subscription_still_delivers_once() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(4);
    let receiver = registry.open(4);

    receiver.subscribe("alerts")?;
    receiver.subscribe("alerts")?;

    sender.send_tagged(String::from("fire"), "alerts")?;
    assert_eq!(receiver.receive::<String>()?, "fire");

    settle();
    assert!(!receiver.poll(), "a duplicate subscription must not duplicate delivery");

    Ok(())
}

#[test]
fn unsubscribe_removes_one_entry_at_a_time() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(4);
    let receiver = registry.open(4);

    receiver.subscribe("alerts")?;
    receiver.subscribe("alerts")?;

    // One unsubscribe leaves one live entry, so delivery continues.
    receiver.unsubscribe("alerts")?;
    sender.send_tagged(1_i32, "alerts")?;
    assert_eq!(receiver.receive::<i32>()?, 1);

    // The second unsubscribe clears the last entry.
    receiver.unsubscribe("alerts")?;
    sender.send_tagged(2_i32, "alerts")?;
    settle();
    assert!(!receiver.poll());

    Ok(())
}
