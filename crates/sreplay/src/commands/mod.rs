//! CLI command implementations

pub mod discover;
pub mod lookup;
pub mod run;
pub mod split;
