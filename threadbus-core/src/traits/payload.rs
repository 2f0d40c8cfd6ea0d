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

use std::any::Any;

/// Marker trait for values that can travel through the bus.
///
/// Any `'static` type that is safe to hand to another thread qualifies; the
/// blanket implementation below means user code never implements this trait
/// by hand. The `Any` supertrait is what allows an [`crate::message::Envelope`]
/// to recover the concrete type on the receiving side.
pub trait Payload: Any + Send + Sync {}

/// Blanket implementation of `Payload` for all eligible types.
impl<T> Payload for T where T: Any + Send + Sync {}
