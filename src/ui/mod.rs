//! Terminal UI - prompts, spinners, streamed text and the banner
//!
//! Flows talk to the user only through [`Prompter`], so they can be driven
//! from tests with a scripted prompter.

mod banner;
mod prompts;
mod spinner;
mod streamer;

pub use banner::{banner, print_banner};
pub use prompts::{Prompter, TerminalPrompter};
pub use spinner::Spinner;
pub use streamer::{text_chunks, TextStreamer};

#[cfg(test)]
pub(crate) use prompts::ScriptedPrompter;
