//! Peer networking boundary
//!
//! The core talks to peers through the [`ChannelHub`] abstraction; the real
//! transport lives outside this crate. An in-process implementation is
//! provided for tests and same-machine sessions.

mod channel;
mod memory;
mod room_code;

pub use channel::{ChannelError, ChannelEvent, ChannelHub, HOST_CHANNEL_ID};
pub use memory::{MemoryHub, MemoryNet};
pub use room_code::RoomCode;
