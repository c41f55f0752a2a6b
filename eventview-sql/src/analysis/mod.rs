//! Generic passes over the syntax tree.

pub mod rewrite;
