//! Branch-stack tracker.
//!
//! Records projects, features and the stacked branches that implement them,
//! keeps each feature's stack densely ordered, and generates read-only shell
//! snippets that verify the stack's git ancestry.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod stack;
