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

//! C-linkage boundary for the Threadbus message bus.
//!
//! This shim exposes the bus to other languages inside one process through
//! opaque `TbContext`/`TbChannel` handles and a deliberately untyped
//! byte-and-length payload handoff. There is no structured wire format:
//! the pointers are only valid within the embedding process.
//!
//! Payload bytes enter the bus as an owned `Vec<u8>` (copied from the
//! caller's buffer during `tb_channel_send`; the caller's buffer is not
//! retained). Buffers handed out by `tb_channel_receive` are bus-allocated
//! and must be returned through [`tb_buffer_free`].
//!
//! This boundary carries no error channel; failures are reported through
//! return values (`false` / `0`) and logged via `tracing`.

use std::ffi::{c_char, CStr};

use tracing::error;

use threadbus::prelude::*;

/// Opaque messaging context: one registry plus its dispatch thread.
pub struct TbContext {
    registry: Registry,
}

/// Opaque channel handle bound to a context.
pub struct TbChannel {
    handle: ChannelHandle,
}

/// Reads a C string into `&str`, rejecting null and invalid UTF-8.
///
/// # Safety
///
/// `signature` must be null or a valid NUL-terminated C string.
unsafe fn read_signature<'a>(signature: *const c_char) -> Option<&'a str> {
    if signature.is_null() {
        return Some("");
    }
    match CStr::from_ptr(signature).to_str() {
        Ok(signature) => Some(signature),
        Err(_) => {
            error!("signature is not valid UTF-8");
            None
        }
    }
}

/// Creates a messaging context and starts its dispatch thread.
#[no_mangle]
pub extern "C" fn tb_context_new() -> *mut TbContext {
    Box::into_raw(Box::new(TbContext {
        registry: Registry::new(),
    }))
}

/// Destroys a context: stops the dispatch thread and joins it.
///
/// Channels created from the context must be freed separately; a channel
/// outliving its context can still be freed safely but is no longer routed.
///
/// # Safety
///
/// `context` must be null or a pointer obtained from [`tb_context_new`]
/// that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn tb_context_free(context: *mut TbContext) {
    if context.is_null() {
        return;
    }
    drop(Box::from_raw(context));
}

/// Creates an unbound channel handle on `context`.
///
/// Returns null when `context` is null.
///
/// # Safety
///
/// `context` must be null or a live pointer from [`tb_context_new`].
#[no_mangle]
pub unsafe extern "C" fn tb_channel_new(context: *const TbContext) -> *mut TbChannel {
    let Some(context) = context.as_ref() else {
        error!("tb_channel_new called with a null context");
        return std::ptr::null_mut();
    };
    Box::into_raw(Box::new(TbChannel {
        handle: context.registry.handle(),
    }))
}

/// Destroys a channel handle, closing it first (which drains pending sends).
///
/// # Safety
///
/// `channel` must be null or a pointer obtained from [`tb_channel_new`]
/// that has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn tb_channel_free(channel: *mut TbChannel) {
    if channel.is_null() {
        return;
    }
    drop(Box::from_raw(channel));
}

/// Binds the channel handle to `number`, closing any previous binding.
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`].
#[no_mangle]
pub unsafe extern "C" fn tb_channel_open(channel: *mut TbChannel, number: u32) {
    let Some(channel) = channel.as_mut() else {
        error!("tb_channel_open called with a null channel");
        return;
    };
    channel.handle.open(number);
}

/// Drains pending sends, then detaches the handle from its mailbox.
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`].
#[no_mangle]
pub unsafe extern "C" fn tb_channel_close(channel: *mut TbChannel) {
    let Some(channel) = channel.as_mut() else {
        error!("tb_channel_close called with a null channel");
        return;
    };
    channel.handle.close();
}

/// Sends `len` bytes, tagged with `signature` (null or empty = broadcast).
///
/// The bytes are copied into the bus; the caller keeps ownership of its own
/// buffer. Returns `false` when the channel is unbound or an argument is
/// invalid.
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`]; `data` must
/// point to `len` readable bytes when `len > 0`; `signature` must be null
/// or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tb_channel_send(
    channel: *const TbChannel,
    data: *const u8,
    signature: *const c_char,
    len: u64,
) -> bool {
    let Some(channel) = channel.as_ref() else {
        error!("tb_channel_send called with a null channel");
        return false;
    };
    if data.is_null() && len > 0 {
        error!("tb_channel_send called with a null payload");
        return false;
    }
    let Some(signature) = read_signature(signature) else {
        return false;
    };

    let bytes = if len == 0 {
        Vec::new()
    } else {
        std::slice::from_raw_parts(data, len as usize).to_vec()
    };

    match channel.handle.send_tagged(bytes, signature) {
        Ok(()) => true,
        Err(err) => {
            error!(%err, "send failed");
            false
        }
    }
}

/// Non-blocking receive of one pending byte payload.
///
/// Returns the payload length and stores a bus-allocated buffer in `*out`;
/// the buffer must be released with [`tb_buffer_free`]. Returns `0` with
/// `*out` set to null when nothing is pending (or when the pending payload
/// was not sent through this byte boundary, which is logged).
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`]; `out` must be
/// a valid pointer to pointer-sized writable storage.
#[no_mangle]
pub unsafe extern "C" fn tb_channel_receive(channel: *const TbChannel, out: *mut *mut u8) -> u64 {
    if out.is_null() {
        error!("tb_channel_receive called with a null out pointer");
        return 0;
    }
    *out = std::ptr::null_mut();

    let Some(channel) = channel.as_ref() else {
        error!("tb_channel_receive called with a null channel");
        return 0;
    };

    match channel.handle.try_receive::<Vec<u8>>() {
        Ok(Some(bytes)) => {
            let len = bytes.len() as u64;
            if len == 0 {
                return 0;
            }
            *out = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
            len
        }
        Ok(None) => 0,
        Err(err) => {
            error!(%err, "receive failed");
            0
        }
    }
}

/// Releases a buffer previously returned by [`tb_channel_receive`].
///
/// # Safety
///
/// `data` must be null or a pointer returned by [`tb_channel_receive`]
/// together with the exact `len` it reported, and must not have been freed
/// already.
#[no_mangle]
pub unsafe extern "C" fn tb_buffer_free(data: *mut u8, len: u64) {
    if data.is_null() || len == 0 {
        return;
    }
    drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
        data,
        len as usize,
    )));
}

/// Returns `true` iff a delivery is currently pending on the channel.
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`].
#[no_mangle]
pub unsafe extern "C" fn tb_channel_poll(channel: *const TbChannel) -> bool {
    let Some(channel) = channel.as_ref() else {
        error!("tb_channel_poll called with a null channel");
        return false;
    };
    channel.handle.poll()
}

/// Registers interest in a topic signature on the channel.
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`]; `signature`
/// must be a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tb_channel_subscribe(
    channel: *const TbChannel,
    signature: *const c_char,
) {
    let Some(channel) = channel.as_ref() else {
        error!("tb_channel_subscribe called with a null channel");
        return;
    };
    let Some(signature) = read_signature(signature) else {
        return;
    };
    if let Err(err) = channel.handle.subscribe(signature) {
        error!(%err, "subscribe failed");
    }
}

/// Removes one matching subscription entry from the channel.
///
/// # Safety
///
/// `channel` must be a live pointer from [`tb_channel_new`]; `signature`
/// must be a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn tb_channel_unsubscribe(
    channel: *const TbChannel,
    signature: *const c_char,
) {
    let Some(channel) = channel.as_ref() else {
        error!("tb_channel_unsubscribe called with a null channel");
        return;
    };
    let Some(signature) = read_signature(signature) else {
        return;
    };
    if let Err(err) = channel.handle.unsubscribe(signature) {
        error!(%err, "unsubscribe failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn byte_payloads_round_trip_through_the_boundary() {
        let context = tb_context_new();
        unsafe {
            let sender = tb_channel_new(context);
            let receiver = tb_channel_new(context);
            tb_channel_open(sender, 5);
            tb_channel_open(receiver, 5);

            let payload = [1_u8, 2, 3, 4];
            assert!(tb_channel_send(
                sender,
                payload.as_ptr(),
                std::ptr::null(),
                payload.len() as u64,
            ));

            while !tb_channel_poll(receiver) {
                std::thread::yield_now();
            }

            let mut out: *mut u8 = std::ptr::null_mut();
            let len = tb_channel_receive(receiver, &mut out);
            assert_eq!(len, 4);
            assert_eq!(std::slice::from_raw_parts(out, len as usize), &payload);
            tb_buffer_free(out, len);

            tb_channel_free(sender);
            tb_channel_free(receiver);
            tb_context_free(context);
        }
    }

    #[test]
    fn tagged_byte_payloads_respect_subscriptions() {
        let context = tb_context_new();
        unsafe {
            let sender = tb_channel_new(context);
            let receiver = tb_channel_new(context);
            tb_channel_open(sender, 6);
            tb_channel_open(receiver, 6);

            let topic = CString::new("telemetry").unwrap();
            tb_channel_subscribe(receiver, topic.as_ptr());

            let payload = [9_u8];
            assert!(tb_channel_send(
                sender,
                payload.as_ptr(),
                topic.as_ptr(),
                payload.len() as u64,
            ));

            while !tb_channel_poll(receiver) {
                std::thread::yield_now();
            }

            let mut out: *mut u8 = std::ptr::null_mut();
            let len = tb_channel_receive(receiver, &mut out);
            assert_eq!(len, 1);
            tb_buffer_free(out, len);

            tb_channel_free(sender);
            tb_channel_free(receiver);
            tb_context_free(context);
        }
    }

    #[test]
    fn receive_on_an_empty_channel_reports_nothing_pending() {
        let context = tb_context_new();
        unsafe {
            let channel = tb_channel_new(context);
            tb_channel_open(channel, 7);

            let mut out: *mut u8 = std::ptr::null_mut();
            assert_eq!(tb_channel_receive(channel, &mut out), 0);
            assert!(out.is_null());

            tb_channel_free(channel);
            tb_context_free(context);
        }
    }
}
