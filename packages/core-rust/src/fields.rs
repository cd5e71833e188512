//! Field registration for a single query.
//!
//! Registering a query collects the field names it references so that a
//! schema generator can skip building resolvers for types nobody asked for.
//! Registration must happen before schema generation; [`QueryFields`] is the
//! value that carries the registration into the generator.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_graphql_parser::types::{ExecutableDocument, Selection, SelectionSet};
use serde_json::Value;
use tracing::debug;

use crate::payload::Variables;

/// Field names and size metrics of a registered query.
#[derive(Debug, Clone, Default)]
pub struct QueryFields {
    query: String,
    variables: Option<Variables>,
    fields: BTreeSet<String>,
    metrics: Option<QueryMetrics>,
}

/// Size of a parsed query, used by query limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryMetrics {
    /// Deepest nesting of field selections. `{ a { b } }` has depth 2.
    pub depth: usize,
    /// Number of selected fields, with fragment spreads expanded. Saturates
    /// at `usize::MAX`.
    pub complexity: usize,
}

impl QueryFields {
    /// Registers a query and its variables.
    ///
    /// A query that does not parse is still registered: it references no
    /// fields and has no metrics, and reporting the syntax error is left to
    /// the executor.
    #[must_use]
    pub fn register(query: &str, variables: Option<&Variables>) -> Self {
        let mut fields = BTreeSet::new();
        let metrics = match async_graphql_parser::parse_query(query) {
            Ok(document) => Some(collect(&document, &mut fields)),
            Err(err) => {
                debug!(error = %err, "query did not parse, no fields registered");
                None
            }
        };

        if let Some(variables) = variables {
            collect_variable_keys(variables, &mut fields);
        }

        Self {
            query: query.to_string(),
            variables: variables.cloned(),
            fields,
            metrics,
        }
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn variables(&self) -> Option<&Variables> {
        self.variables.as_ref()
    }

    /// Names of all fields referenced by the query and its input variables.
    #[must_use]
    pub fn field_names(&self) -> &BTreeSet<String> {
        &self.fields
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Size metrics, or `None` if the query did not parse.
    #[must_use]
    pub fn metrics(&self) -> Option<QueryMetrics> {
        self.metrics
    }
}

fn collect(document: &ExecutableDocument, fields: &mut BTreeSet<String>) -> QueryMetrics {
    let mut walker = Walker {
        document,
        fields,
        fragments: HashMap::new(),
        visiting: HashSet::new(),
    };
    let mut metrics = QueryMetrics::default();

    for (_, operation) in document.operations.iter() {
        let op = walker.selection_set(&operation.node.selection_set.node);
        metrics.depth = metrics.depth.max(op.depth);
        metrics.complexity = metrics.complexity.max(op.complexity);
    }

    metrics
}

/// Walks selection sets, measuring each named fragment once per document.
///
/// Metrics are relative to the selection set being walked, so a fragment's
/// result is the same wherever it is spread and can be reused.
struct Walker<'a, 'f> {
    document: &'a ExecutableDocument,
    fields: &'f mut BTreeSet<String>,
    fragments: HashMap<&'a str, QueryMetrics>,
    visiting: HashSet<&'a str>,
}

impl<'a> Walker<'a, '_> {
    fn selection_set(&mut self, selection_set: &'a SelectionSet) -> QueryMetrics {
        let mut metrics = QueryMetrics::default();

        for item in &selection_set.items {
            let nested = match &item.node {
                Selection::Field(field) => {
                    self.fields.insert(field.node.name.node.to_string());
                    let children = self.selection_set(&field.node.selection_set.node);
                    QueryMetrics {
                        depth: children.depth.saturating_add(1),
                        complexity: children.complexity.saturating_add(1),
                    }
                }
                Selection::InlineFragment(fragment) => {
                    self.selection_set(&fragment.node.selection_set.node)
                }
                Selection::FragmentSpread(spread) => {
                    self.fragment(spread.node.fragment_name.node.as_str())
                }
            };
            metrics.depth = metrics.depth.max(nested.depth);
            metrics.complexity = metrics.complexity.saturating_add(nested.complexity);
        }

        metrics
    }

    fn fragment(&mut self, name: &'a str) -> QueryMetrics {
        if let Some(metrics) = self.fragments.get(name) {
            return *metrics;
        }
        let document = self.document;
        let Some(fragment) = document.fragments.get(name) else {
            return QueryMetrics::default();
        };
        // A fragment that spreads itself is invalid; stop instead of looping.
        if !self.visiting.insert(name) {
            return QueryMetrics::default();
        }

        let metrics = self.selection_set(&fragment.node.selection_set.node);
        self.visiting.remove(name);
        self.fragments.insert(name, metrics);
        metrics
    }
}

/// Input objects passed as variables name fields too.
fn collect_variable_keys(variables: &Variables, fields: &mut BTreeSet<String>) {
    for (key, value) in variables {
        fields.insert(key.clone());
        collect_value_keys(value, fields);
    }
}

fn collect_value_keys(value: &Value, fields: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => collect_variable_keys(map, fields),
        Value::Array(items) => {
            for item in items {
                collect_value_keys(item, fields);
            }
        }
        _ => {}
    }
}
