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
use std::mem::size_of;
use std::sync::Arc;

use static_assertions::assert_impl_all;

use crate::message::BusError;
use crate::traits::Payload;

/// Represents one routed unit travelling through the bus.
///
/// An `Envelope` owns a type-tagged payload and an optional topic signature.
/// The payload is shared behind an `Arc` so that the dispatch loop can hand
/// the same allocation to several recipients; the last consumer moves the
/// value out, earlier consumers receive a clone.
#[derive(Clone)]
pub struct Envelope {
    /// The topic signature; `None` routes as a broadcast.
    signature: Option<String>,
    /// The payload, type-erased for transport.
    payload: Arc<dyn Any + Send + Sync>,
    /// The payload's type name, kept for diagnostics and mismatch errors.
    type_name: &'static str,
    /// The payload's size in bytes, captured at pack time.
    byte_len: usize,
    /// Reserved multipart flag. Carried verbatim, unused by routing.
    more: bool,
}

impl Envelope {
    /// Packs a value into an envelope, capturing its type tag and byte length.
    ///
    /// Ownership of `value` moves into the envelope. An empty signature is
    /// normalized to `None` and routes as a broadcast.
    ///
    /// # Arguments
    ///
    /// * `value`: The payload to carry.
    /// * `signature`: The topic signature, or `None` for a broadcast.
    ///
    /// # Returns
    ///
    /// A new `Envelope` ready for enqueueing.
    pub fn pack<T: Payload>(value: T, signature: Option<String>) -> Self {
        let signature = signature.filter(|sig| !sig.is_empty());
        Self {
            signature,
            payload: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            byte_len: size_of::<T>(),
            more: false,
        }
    }

    /// Extracts the payload as `T`, consuming the envelope.
    ///
    /// Ownership of the payload moves back out to the caller. When the
    /// payload is still shared with another recipient the value is cloned
    /// instead of moved.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::TypeMismatch`] when the stored type tag or byte
    /// length does not match `T`.
    pub fn unpack<T: Payload + Clone>(self) -> Result<T, BusError> {
        if self.byte_len != size_of::<T>() {
            return Err(self.mismatch::<T>());
        }
        let type_name = self.type_name;
        let shared: Arc<T> = self
            .payload
            .downcast()
            .map_err(|_| BusError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                found: type_name,
            })?;
        Ok(Arc::try_unwrap(shared).unwrap_or_else(|still_shared| (*still_shared).clone()))
    }

    /// Returns the topic signature, if any.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Returns `true` when the envelope routes as a broadcast.
    pub fn is_broadcast(&self) -> bool {
        self.signature.is_none()
    }

    /// Returns the payload's type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the payload's size in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Returns the reserved multipart flag.
    pub fn more(&self) -> bool {
        self.more
    }

    fn mismatch<T>(&self) -> BusError {
        BusError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: self.type_name,
        }
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("signature", &self.signature)
            .field("type_name", &self.type_name)
            .field("byte_len", &self.byte_len)
            .field("more", &self.more)
            .finish_non_exhaustive()
    }
}

// Ensures that Envelope can cross thread boundaries in both directions.
assert_impl_all!(Envelope: Send, Sync);
