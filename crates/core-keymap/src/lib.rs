//! core-keymap: key sequences and the command registry.
//!
//! Design principles:
//! - Bindings are identified solely by their [`KeySequence`]; at most one
//!   command per sequence.
//! - Ambiguity detection is a pure query ([`CommandRegistry::prefix_matches`])
//!   evaluated against the registry as it is *now*, so commands may be added or
//!   removed between key presses without invalidating anything.
//! - No side effects beyond TRACE/DEBUG logging on the `input.map` target.

mod registry;
mod sequence;

pub use registry::{Binding, CommandRegistry, RegistryError};
pub use sequence::KeySequence;
