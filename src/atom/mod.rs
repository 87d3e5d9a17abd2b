//! Atom headers, bounded leaf payloads and the atom tree walker.

mod header;
mod payload;
mod dispatch;
mod handlers;

pub use header::AtomHeader;
pub use payload::AtomPayload;
pub(crate) use dispatch::{AtomDispatcher, LeafOutcome, ParseEnv, Scope};
