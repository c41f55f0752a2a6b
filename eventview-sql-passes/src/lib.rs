//! Rewrite passes over parsed SQL queries.

pub mod event_views;

pub use crate::event_views::{
    ColumnConstraint, ConstraintKind, ConstraintValue, EventViewRewrite, ScopeContext, ScopeId,
    ViewMapping, ViewSelection, ViewSelectionError, collect_constraints,
};
