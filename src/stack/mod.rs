//! Stack algorithms: position sequencing, ancestry verification, pairwise
//! comparison commands and ASCII rendering.
//!
//! Everything here is a pure function over in-memory lists.

pub mod compare;
pub mod render;
pub mod sequencer;
pub mod verifier;

pub use compare::{comparison_commands, ComparisonCommand};
pub use render::render_stack;
pub use sequencer::{append_position, compact, is_dense, reorder};
pub use verifier::{generate_verification, Check, StackEntry, StackVerification, NO_BRANCHES};
