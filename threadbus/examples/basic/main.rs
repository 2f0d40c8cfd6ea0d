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

use threadbus::prelude::*;

// messages only need to be Clone to ride the bus and come back out
#[derive(Debug, Clone)]
struct Job {
    id: u32,
    task: String,
}

#[derive(Debug, Clone)]
struct Completed {
    id: u32,
}

const WORK_CHANNEL: ChannelId = 1;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let registry = Registry::new();
    let requester = registry.open(WORK_CHANNEL);
    let worker_handle = registry.open(WORK_CHANNEL);

    // The worker lives on its own OS thread; the handle moves in with it.
    let worker = thread::spawn(move || -> anyhow::Result<()> {
        let job: Job = worker_handle.receive()?;
        println!("worker: picked up job #{} ({})", job.id, job.task);
        worker_handle.send(Completed { id: job.id })?;
        Ok(())
    });

    requester.send(Job {
        id: 7,
        task: String::from("reticulate splines"),
    })?;

    let done: Completed = requester.receive()?;
    println!("requester: job #{} confirmed done", done.id);

    worker.join().expect("worker thread panicked")?;
    Ok(())
}
