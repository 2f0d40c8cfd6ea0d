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

// A fixed-size aggregate for the round-trip coverage.
#[derive(Debug, Clone, PartialEq)]
struct SensorReading {
    id: u32,
    celsius: f64,
    flags: [u8; 4],
}

#[test]
fn fifo_is_preserved_per_sender() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(6);
    let receiver = registry.open(6);

    for value in 1..=5_i32 {
        sender.send(value)?;
    }
    for expected in 1..=5_i32 {
        assert_eq!(receiver.receive::<i32>()?, expected);
    }

    Ok(())
}

#[test]
fn scalar_round_trips_preserve_value_equality() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(6);
    let receiver = registry.open(6);

    sender.send(true)?;
    sender.send(-40_i64)?;
    sender.send(2.5_f64)?;
    sender.send(String::from("payload"))?;

    assert!(receiver.receive::<bool>()?);
    assert_eq!(receiver.receive::<i64>()?, -40);
    assert_eq!(receiver.receive::<f64>()?, 2.5);
    assert_eq!(receiver.receive::<String>()?, "payload");

    Ok(())
}

#[test]
fn aggregate_round_trip_preserves_value_equality() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(6);
    let receiver = registry.open(6);

    let reading = SensorReading {
        id: 42,
        celsius: 21.5,
        flags: [1, 0, 0, 1],
    };

    sender.send(reading.clone())?;
    assert_eq!(receiver.receive::<SensorReading>()?, reading);

    Ok(())
}

#[test]
fn type_mismatch_consumes_only_the_offending_envelope() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(6);
    let receiver = registry.open(6);

    sender.send(42_i32)?;
    sender.send(7_i32)?;

    let error = receiver
        .receive::<String>()
        .expect_err("an i32 envelope must not unpack as String");
    assert!(matches!(error, BusError::TypeMismatch { .. }));

    // The mailbox is otherwise unaffected: the next pending message is intact.
    assert_eq!(receiver.receive::<i32>()?, 7);

    Ok(())
}

#[test]
fn operations_on_an_unbound_handle_report_not_open() {
    initialize_tracing();
    let registry = Registry::new();
    let unbound = registry.handle();

    assert!(matches!(unbound.send(1_i32), Err(BusError::NotOpen)));
    assert!(matches!(unbound.receive::<i32>(), Err(BusError::NotOpen)));
    assert!(matches!(
        unbound.try_receive::<i32>(),
        Err(BusError::NotOpen)
    ));
    assert!(matches!(unbound.subscribe("topic"), Err(BusError::NotOpen)));
    assert!(matches!(
        unbound.unsubscribe("topic"),
        Err(BusError::NotOpen)
    ));
    assert!(!unbound.poll());
}

#[test]
fn try_receive_returns_none_until_a_delivery_lands() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(8);
    let receiver = registry.open(8);

    assert!(receiver.try_receive::<i32>()?.is_none());
    assert!(!receiver.poll());

    sender.send(99_i32)?;
    settle();
    assert!(receiver.poll());
    assert_eq!(receiver.try_receive::<i32>()?, Some(99));

    Ok(())
}

#[test]
fn receive_blocks_across_threads_until_delivery() -> anyhow::Result<()> {
    initialize_tracing();
    let registry = Registry::new();
    let sender = registry.open(2);
    let receiver = registry.open(2);

    let consumer = std::thread::spawn(move || receiver.receive::<String>());

    // The consumer thread is parked on its mailbox until this arrives.
    sender.send(String::from("wake up"))?;

    let received = consumer.join().expect("consumer thread panicked")?;
    assert_eq!(received, "wake up");

    Ok(())
}
