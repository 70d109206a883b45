//! Mixer controller - the live audio routing of a 4-stem mixer
//!
//! One channel strip per stem, each an exclusively owned node chain:
//!
//! ```text
//! source → low-shelf → peaking → high-shelf → gain ─┐
//! source → low-shelf → peaking → high-shelf → gain ─┼→ output
//! ...                                               ┘
//! ```
//!
//! The topology is built once. After that only node parameters and the
//! sources' bound locators change, driven by the operations on
//! [`MixerController`].

mod chain;
mod command;
mod controller;
mod error;
mod state;

pub use chain::ChannelChain;
pub use command::MixerCommand;
pub use controller::MixerController;
pub use error::{MixerError, MixerResult};
pub use state::{ChannelState, SessionState};
