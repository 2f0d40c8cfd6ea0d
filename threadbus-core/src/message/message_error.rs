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

/// Represents errors that can occur on the typed send and receive paths.
///
/// Every error is raised synchronously at the call that detected it; the bus
/// never retries on the caller's behalf. The one deliberate exception to
/// error reporting is the dispatch loop, which drops unroutable envelopes
/// silently.
#[derive(Debug)]
pub enum BusError {
    /// The stored payload's type tag or byte length disagrees with the
    /// requested type.
    TypeMismatch {
        /// The type the receiver asked for.
        expected: &'static str,
        /// The type the envelope actually carries.
        found: &'static str,
    },
    /// The handle has no bound mailbox.
    NotOpen,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BusError::TypeMismatch { expected, found } => {
                write!(
                    f,
                    "message payload is not of the requested type: expected {expected}, found {found}"
                )
            }
            BusError::NotOpen => write!(f, "handle is not bound to a channel"),
        }
    }
}

impl std::error::Error for BusError {}
