//! Terminal front-end for the share page.
//!
//! # Modules
//!
//! - [`display`]: The terminal [`PresentationSink`](crate::view::PresentationSink) and gateway table
//! - [`progress`]: Spinner for pending work
//! - [`prompt`]: Passphrase, gateway and menu prompts

pub mod display;
pub mod progress;
pub mod prompt;
