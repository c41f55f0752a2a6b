//! Which specialized view serves a reference to the logical events table.

use std::collections::HashSet;

use eventview_sql::ast::{SqlIdentifier, Table};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constraints::{ColumnConstraint, ConstraintKind};

/// A view that is used when any of `columns` is constrained
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewMapping {
    pub columns: Vec<String>,
    pub view: String,
}

impl ViewMapping {
    fn new(columns: &[&str], view: &str) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_owned()).collect(),
            view: view.to_owned(),
        }
    }
}

/// The logical table to watch for, and its specialized views in priority order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewSelection {
    pub logical_table: String,
    pub views: Vec<ViewMapping>,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self {
            logical_table: "events".to_owned(),
            views: vec![
                ViewMapping::new(&["id"], "events_by_id"),
                ViewMapping::new(&["session_id"], "events_by_session_id"),
                ViewMapping::new(&["profile_id", "sid"], "events_by_profile_id"),
                ViewMapping::new(&["type"], "events_by_type"),
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewSelectionError {
    #[error("logical table name must not be empty")]
    EmptyLogicalTable,
    #[error("view mapping {index} has an empty view name")]
    EmptyViewName { index: usize },
    #[error("view `{view}` is not triggered by any column")]
    NoColumns { view: String },
    #[error("view `{view}` lists an empty column name")]
    EmptyColumn { view: String },
    #[error("view `{view}` has the same name as the logical table")]
    ViewIsLogicalTable { view: String },
    #[error("invalid view configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Whether `name` can be written without delimiters and still resolve to itself
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl ViewSelection {
    /// Parse a JSON view configuration and validate it
    pub fn from_json(json: &str) -> Result<Self, ViewSelectionError> {
        let selection: Self = serde_json::from_str(json)?;
        selection.validate()?;
        Ok(selection)
    }

    /// Check the configuration can be applied safely.
    ///
    /// A view named like the logical table would be substituted again on every rewrite, so it is
    /// rejected.
    pub fn validate(&self) -> Result<(), ViewSelectionError> {
        if self.logical_table.is_empty() {
            return Err(ViewSelectionError::EmptyLogicalTable);
        }
        for (index, mapping) in self.views.iter().enumerate() {
            if mapping.view.is_empty() {
                return Err(ViewSelectionError::EmptyViewName { index });
            }
            if mapping.columns.is_empty() {
                return Err(ViewSelectionError::NoColumns {
                    view: mapping.view.clone(),
                });
            }
            if mapping.columns.iter().any(String::is_empty) {
                return Err(ViewSelectionError::EmptyColumn {
                    view: mapping.view.clone(),
                });
            }
            if mapping.view.eq_ignore_ascii_case(&self.logical_table) {
                return Err(ViewSelectionError::ViewIsLogicalTable {
                    view: mapping.view.clone(),
                });
            }
        }
        Ok(())
    }

    /// Whether `table` names the logical table, ignoring any schema or catalog qualifiers
    pub fn watches(&self, table: &Table) -> bool {
        table.name.suffix().matches(&self.logical_table)
    }

    /// The highest priority view with a constrained column, if any.
    ///
    /// Only the presence of an equality or `IN` constraint on a column matters, not its values.
    pub fn choose_view(&self, constraints: &[ColumnConstraint]) -> Option<&str> {
        let constrained: HashSet<&str> = constraints
            .iter()
            .filter(|c| matches!(c.kind, ConstraintKind::Equal | ConstraintKind::In))
            .map(|c| c.column.as_str())
            .collect();
        self.views
            .iter()
            .find(|mapping| {
                mapping
                    .columns
                    .iter()
                    .any(|column| constrained.contains(column.as_str()))
            })
            .map(|mapping| mapping.view.as_str())
    }

    /// Returns the specialized table to read instead of `table`, or `None` when `table` is not
    /// the logical table or no view applies.
    ///
    /// Only the last segment of the name is replaced.
    pub fn select_view(&self, table: &Table, constraints: &[ColumnConstraint]) -> Option<Table> {
        if !self.watches(table) {
            return None;
        }
        let view = self.choose_view(constraints)?;
        let suffix = if is_plain_identifier(view) {
            SqlIdentifier::new(view)
        } else {
            SqlIdentifier::quoted(view)
        };
        Some(Table {
            name: table.name.with_suffix(suffix),
        })
    }
}

#[cfg(test)]
mod tests {
    use eventview_sql::ast::QualifiedName;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event_views::constraints::ConstraintValue;

    fn eq(column: &str) -> ColumnConstraint {
        ColumnConstraint {
            kind: ConstraintKind::Equal,
            column: column.into(),
            value: ConstraintValue::Single("x".into()),
        }
    }

    fn in_list(column: &str) -> ColumnConstraint {
        ColumnConstraint {
            kind: ConstraintKind::In,
            column: column.into(),
            value: ConstraintValue::Set(vec![]),
        }
    }

    #[test]
    fn default_priority() {
        let views = ViewSelection::default();
        assert_eq!(views.choose_view(&[eq("type"), eq("id")]), Some("events_by_id"));
        assert_eq!(
            views.choose_view(&[eq("type"), in_list("session_id")]),
            Some("events_by_session_id")
        );
        assert_eq!(views.choose_view(&[eq("sid")]), Some("events_by_profile_id"));
        assert_eq!(
            views.choose_view(&[eq("type"), eq("profile_id")]),
            Some("events_by_profile_id")
        );
        assert_eq!(views.choose_view(&[in_list("type")]), Some("events_by_type"));
        assert_eq!(views.choose_view(&[eq("created_at")]), None);
        assert_eq!(views.choose_view(&[]), None);
    }

    #[test]
    fn choice_ignores_constraint_order() {
        let views = ViewSelection::default();
        assert_eq!(
            views.choose_view(&[eq("type"), eq("session_id"), eq("id")]),
            views.choose_view(&[eq("id"), eq("session_id"), eq("type")]),
        );
    }

    #[test]
    fn select_view_keeps_qualifiers() {
        let views = ViewSelection::default();
        let table = Table::from("hive.analytics.events");
        assert_eq!(
            views.select_view(&table, &[eq("id")]),
            Some(Table::from("hive.analytics.events_by_id"))
        );
    }

    #[test]
    fn select_view_only_touches_logical_table() {
        let views = ViewSelection::default();
        assert_eq!(views.select_view(&Table::from("not_events"), &[eq("id")]), None);
        assert_eq!(views.select_view(&Table::from("events_by_id"), &[eq("id")]), None);
        assert_eq!(views.select_view(&Table::from("events"), &[eq("other")]), None);
        assert_eq!(
            views.select_view(&Table::from("EVENTS"), &[eq("type")]),
            Some(Table::from("events_by_type"))
        );
        let quoted = Table {
            name: QualifiedName::from(SqlIdentifier::quoted("Events")),
        };
        assert_eq!(views.select_view(&quoted, &[eq("type")]), None);
    }

    #[test]
    fn unusual_view_names_are_quoted() {
        let views = ViewSelection {
            logical_table: "events".into(),
            views: vec![ViewMapping::new(&["id"], "Events By Id")],
        };
        let table = views.select_view(&Table::from("events"), &[eq("id")]).unwrap();
        assert_eq!(table.name.suffix(), &SqlIdentifier::quoted("Events By Id"));
    }

    #[test]
    fn default_configuration_is_valid() {
        ViewSelection::default().validate().unwrap();
    }

    #[test]
    fn load_from_json() {
        let views = ViewSelection::from_json(
            r#"{
                "logical_table": "pageviews",
                "views": [{"columns": ["url"], "view": "pageviews_by_url"}]
            }"#,
        )
        .unwrap();
        assert_eq!(views.views[0], ViewMapping::new(&["url"], "pageviews_by_url"));
    }

    #[test]
    fn reject_invalid_configurations() {
        assert!(matches!(
            ViewSelection::from_json(r#"{"logical_table": "", "views": []}"#),
            Err(ViewSelectionError::EmptyLogicalTable)
        ));
        assert!(matches!(
            ViewSelection::from_json(
                r#"{"logical_table": "events", "views": [{"columns": ["id"], "view": "EVENTS"}]}"#
            ),
            Err(ViewSelectionError::ViewIsLogicalTable { .. })
        ));
        assert!(matches!(
            ViewSelection::from_json(
                r#"{"logical_table": "events", "views": [{"columns": [], "view": "v"}]}"#
            ),
            Err(ViewSelectionError::NoColumns { .. })
        ));
        assert!(matches!(
            ViewSelection::from_json(r#"{"logical_table": "events"}"#),
            Err(ViewSelectionError::Json(_))
        ));
    }
}
