//! Band Sync State
//!
//! Wire protocol records and the host-authoritative/replicated room state.

mod protocol;
mod state;

pub use protocol::*;
pub use state::*;
