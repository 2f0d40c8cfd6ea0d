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

use std::thread;

use rand::Rng;
use threadbus::prelude::*;

const MARKET_CHANNEL: ChannelId = 42;
const UPDATES_PER_TOPIC: usize = 5;

// Price updates in cents, tagged by fruit.
const PRICE_MIN: i32 = 100;
const PRICE_MAX: i32 = 250;

fn consumer(registry: &Registry, topic: &'static str) -> thread::JoinHandle<anyhow::Result<()>> {
    let handle = registry.open(MARKET_CHANNEL);
    thread::spawn(move || {
        handle.subscribe(topic)?;
        for _ in 0..UPDATES_PER_TOPIC {
            let cents: i32 = handle.receive()?;
            println!("{topic}: ${}.{:02}", cents / 100, cents % 100);
        }
        Ok(())
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let registry = Registry::new();
    let apples = consumer(&registry, "apples");
    let oranges = consumer(&registry, "oranges");

    // Give both consumers a moment to register their subscriptions before
    // anything is published, so no update routes past an empty list.
    thread::sleep(std::time::Duration::from_millis(50));

    let publisher = registry.open(MARKET_CHANNEL);
    let mut rng = rand::rng();
    for _ in 0..UPDATES_PER_TOPIC {
        publisher.send_tagged(rng.random_range(PRICE_MIN..=PRICE_MAX), "apples")?;
        publisher.send_tagged(rng.random_range(PRICE_MIN..=PRICE_MAX), "oranges")?;
    }

    apples.join().expect("apples consumer panicked")?;
    oranges.join().expect("oranges consumer panicked")?;
    Ok(())
}
