// src/graph/dependency.rs

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::ValidationError;
use crate::model::{WorkItem, WorkItemId};

/// Immediate predecessors and dependents of one work item.
#[derive(Debug, Clone, Default)]
struct DepNode {
    predecessors: Vec<WorkItemId>,
    dependents: Vec<WorkItemId>,
}

/// In-memory view of the predecessor relation between work items.
///
/// Built from already-validated items; use [`validate_references`] first
/// when the input comes from outside.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashMap<WorkItemId, DepNode>,
}

impl DependencyGraph {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a WorkItem>) -> Self {
        let mut nodes: HashMap<WorkItemId, DepNode> = HashMap::new();

        for item in items {
            nodes.entry(item.id.clone()).or_default().predecessors = item.predecessors.clone();
            for pred in &item.predecessors {
                nodes
                    .entry(pred.clone())
                    .or_default()
                    .dependents
                    .push(item.id.clone());
            }
        }

        for node in nodes.values_mut() {
            node.dependents.sort();
        }

        Self { nodes }
    }

    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn predecessors_of(&self, id: &str) -> &[WorkItemId] {
        self.nodes
            .get(id)
            .map(|n| n.predecessors.as_slice())
            .unwrap_or(&[])
    }

    pub fn dependents_of(&self, id: &str) -> &[WorkItemId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Items ordered so that every predecessor comes before its dependents.
    pub fn topological_order(&self) -> Result<Vec<WorkItemId>, ValidationError> {
        // Edge direction: predecessor -> dependent.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        let mut ids: Vec<&str> = self.items().collect();
        ids.sort();
        for id in ids.iter().copied() {
            graph.add_node(id);
        }
        for id in ids.iter().copied() {
            for pred in self.predecessors_of(id) {
                graph.add_edge(pred.as_str(), id, ());
            }
        }

        toposort(&graph, None)
            .map(|order| order.into_iter().map(str::to_string).collect())
            .map_err(|cycle| ValidationError::DependencyCycle {
                item: cycle.node_id().to_string(),
            })
    }
}

/// Check that every predecessor and parent reference resolves, that no item
/// depends on itself or lists a predecessor twice, and that neither relation
/// contains a cycle.
pub fn validate_references(items: &[WorkItem]) -> Result<(), ValidationError> {
    let known: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();

    for item in items {
        let mut listed: HashSet<&str> = HashSet::new();
        for pred in &item.predecessors {
            if !listed.insert(pred.as_str()) {
                return Err(ValidationError::DuplicatePredecessor {
                    item: item.id.clone(),
                    predecessor: pred.clone(),
                });
            }
            if pred == &item.id {
                return Err(ValidationError::SelfDependency {
                    item: item.id.clone(),
                });
            }
            if !known.contains(pred.as_str()) {
                return Err(ValidationError::DanglingPredecessor {
                    item: item.id.clone(),
                    predecessor: pred.clone(),
                });
            }
        }
        if let Some(parent) = &item.parent {
            if !known.contains(parent.as_str()) {
                return Err(ValidationError::DanglingParent {
                    item: item.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    DependencyGraph::from_items(items).topological_order()?;
    validate_parent_chains(items)
}

/// Parent links must form a forest.
fn validate_parent_chains(items: &[WorkItem]) -> Result<(), ValidationError> {
    let parents: HashMap<&str, &str> = items
        .iter()
        .filter_map(|i| i.parent.as_deref().map(|p| (i.id.as_str(), p)))
        .collect();

    for item in items {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = item.id.as_str();
        seen.insert(current);
        while let Some(&parent) = parents.get(current) {
            if !seen.insert(parent) {
                return Err(ValidationError::ParentCycle {
                    item: item.id.clone(),
                });
            }
            current = parent;
        }
    }

    Ok(())
}
