//! Domain models for the branch-stack tracker.
//!
//! # Core Concepts
//!
//! - [`Project`]: A repository with a trunk (`master_branch`) that every stack descends from.
//! - [`Feature`]: A unit of work, usually one ticket, implemented as a stack of branches.
//! - [`Branch`]: One entry of a feature's stack, ordered by a dense 1-based `position`.
//! - [`BranchComparison`]: A recorded pairwise ancestry check.

mod branch;
mod comparison;
mod feature;
mod project;

pub use branch::*;
pub use comparison::*;
pub use feature::*;
pub use project::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable field of a partial update.
///
/// Used with `#[serde(default)]`: an absent field stays `None`, an explicit
/// `null` becomes `Some(None)` and clears the stored value.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
