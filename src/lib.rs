//! photopull — sync a phone's photo library to local storage over its
//! on-device RPC interface, with checksum-proven remote pruning.
//!
//! Downloads are verified byte-for-byte (size + MD5, re-read from disk)
//! before the metadata sidecar commit, and phone-side deletion only happens
//! after the phone replays an independent proof check against its live
//! state. The sidecar is the only state mutation, so runs are idempotent
//! and incremental.

#![warn(clippy::all)]

pub mod archive;
pub mod cli;
pub mod config;
pub mod phone;
pub mod retention;
pub mod sync;
pub mod types;
