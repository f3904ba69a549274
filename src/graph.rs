//! Computed-field dependency graph.
//!
//! Nodes are field names; an edge `source → computed` exists for every
//! entry of a computed field's sources. The graph is built once per
//! configuration. Construction fails with the full cycle path if the edges
//! are cyclic, so a built graph always has a topological order and
//! propagation over it always terminates.

use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, VecDeque};

use crate::error::ConfigError;
use crate::types::FieldDescriptor;

#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    /// computed field → its sources, in declaration order.
    sources: IndexMap<String, Vec<String>>,
    /// field → computed fields reading it.
    dependents: HashMap<String, Vec<String>>,
    /// All computed fields, sources before dependents.
    order: Vec<String>,
}

impl DependencyGraph {
    /// Builds the graph from the declared fields.
    ///
    /// # Errors
    ///
    /// Every source naming an undeclared field is reported as
    /// [`ConfigError::UnknownDependency`]. If the declared edges are cyclic,
    /// the first cycle found is reported as [`ConfigError::DependencyCycle`]
    /// carrying the ordered path that closes the loop.
    pub fn build(fields: &[&FieldDescriptor]) -> Result<Self, Vec<ConfigError>> {
        let declared: IndexSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        let mut errors = Vec::new();
        let mut sources: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();

        for field in fields {
            let Some(computed) = &field.computed else {
                continue;
            };
            for source in computed.sources() {
                if !declared.contains(source.as_str()) {
                    errors.push(ConfigError::UnknownDependency {
                        field: field.name.clone(),
                        dependency: source.clone(),
                    });
                    continue;
                }
                dependents
                    .entry(source.clone())
                    .or_default()
                    .push(field.name.clone());
            }
            sources.insert(field.name.clone(), computed.sources().to_vec());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        if let Some(path) = find_cycle(&sources) {
            tracing::warn!(cycle = %path.join(" -> "), "computed field dependency cycle");
            return Err(vec![ConfigError::DependencyCycle { path }]);
        }

        let order = topological_order(&sources, &dependents);
        Ok(Self {
            sources,
            dependents,
            order,
        })
    }

    pub fn is_computed(&self, field: &str) -> bool {
        self.sources.contains_key(field)
    }

    pub fn sources_of(&self, field: &str) -> &[String] {
        self.sources.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents_of(&self, field: &str) -> &[String] {
        self.dependents.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every computed field in evaluation order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Computed fields transitively reachable from `changed`, in evaluation
    /// order. Fields in `changed` themselves are not included unless another
    /// changed field feeds them.
    pub fn affected_by<'a, I>(&self, changed: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut reached: IndexSet<&str> = IndexSet::new();
        let mut queue: VecDeque<&str> = changed.into_iter().collect();
        while let Some(field) = queue.pop_front() {
            for dependent in self.dependents_of(field) {
                if reached.insert(dependent.as_str()) {
                    queue.push_back(dependent.as_str());
                }
            }
        }
        self.order
            .iter()
            .filter(|f| reached.contains(f.as_str()))
            .cloned()
            .collect()
    }
}

/// Depth-first search over `computed → source` edges with an explicit stack.
///
/// Returns the first cycle found as `[a, b, ..., a]`.
fn find_cycle(sources: &IndexMap<String, Vec<String>>) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks: HashMap<&str, Mark> = sources
        .keys()
        .map(|k| (k.as_str(), Mark::Unvisited))
        .collect();

    for root in sources.keys() {
        if marks.get(root.as_str()) != Some(&Mark::Unvisited) {
            continue;
        }
        // Each frame is (node, index of the next source to visit).
        let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];
        marks.insert(root.as_str(), Mark::OnStack);

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let node_sources = sources.get(node).map(Vec::as_slice).unwrap_or(&[]);
            if next >= node_sources.len() {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let source = node_sources[next].as_str();
            match marks.get(source).copied() {
                // Plain input fields have no outgoing edges.
                None | Some(Mark::Done) => {}
                Some(Mark::OnStack) => {
                    let start = stack.iter().position(|(n, _)| *n == source).unwrap_or(0);
                    // The stack walks from dependents to sources; report the
                    // path in dependency direction.
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                    path.reverse();
                    path.insert(0, source.to_string());
                    return Some(path);
                }
                Some(Mark::Unvisited) => {
                    marks.insert(source, Mark::OnStack);
                    stack.push((source, 0));
                }
            }
        }
    }
    None
}

/// Kahn's algorithm restricted to computed fields; ties resolve in
/// declaration order so propagation is deterministic.
fn topological_order(
    sources: &IndexMap<String, Vec<String>>,
    dependents: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    let mut pending: IndexMap<&str, usize> = sources
        .iter()
        .map(|(field, srcs)| {
            let computed_inputs = srcs.iter().filter(|s| sources.contains_key(*s)).count();
            (field.as_str(), computed_inputs)
        })
        .collect();

    let mut order = Vec::with_capacity(sources.len());
    while let Some(next) = pending
        .iter()
        .find(|(_, remaining)| **remaining == 0)
        .map(|(field, _)| *field)
    {
        pending.shift_remove(next);
        order.push(next.to_string());
        for dependent in dependents.get(next).map(Vec::as_slice).unwrap_or(&[]) {
            if let Some(remaining) = pending.get_mut(dependent.as_str()) {
                *remaining = remaining.saturating_sub(1);
            }
        }
    }
    order
}
