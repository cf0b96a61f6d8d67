use crate::error::PlanError;
use crate::plan::Plan;
use std::collections::{BTreeMap, BTreeSet};

/// Dependency graph over a plan's steps.
///
/// Nodes are step ids; edges point from a dependency to each of its
/// dependents. Built once per run, validated eagerly, then consumed as a
/// *level order*: a sequence of step-id sets where level `k` depends only on
/// levels `< k`. Steps within a level carry no mutual ordering and may run
/// concurrently.
#[derive(Debug)]
pub struct DependencyGraph {
    /// dependency -> dependents
    adjacency: BTreeMap<String, Vec<String>>,
    /// step id -> number of unmet dependencies
    in_degree: BTreeMap<String, usize>,
}

impl DependencyGraph {
    /// Build and validate the graph for a plan.
    ///
    /// Fails before any step executes on duplicate/empty step ids, on a
    /// `depends_on` id absent from the plan, or on any cycle.
    pub fn build(plan: &Plan) -> Result<Self, PlanError> {
        let mut node_ids = BTreeSet::new();
        for step in &plan.steps {
            if step.id.trim().is_empty() {
                return Err(PlanError::EmptyStepId);
            }
            if !node_ids.insert(step.id.clone()) {
                return Err(PlanError::DuplicateStep(step.id.clone()));
            }
        }

        let mut adjacency: BTreeMap<String, Vec<String>> = node_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut in_degree: BTreeMap<String, usize> =
            node_ids.iter().map(|id| (id.clone(), 0)).collect();

        for step in &plan.steps {
            let mut seen = BTreeSet::new();
            for dependency in &step.depends_on {
                if !node_ids.contains(dependency) {
                    return Err(PlanError::UnknownDependency {
                        step_id: step.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
                // A repeated depends_on entry is harmless; count it once.
                if !seen.insert(dependency.clone()) {
                    continue;
                }
                adjacency
                    .get_mut(dependency)
                    .expect("dependency validated above")
                    .push(step.id.clone());
                *in_degree
                    .get_mut(&step.id)
                    .expect("step id inserted above") += 1;
            }
        }

        for dependents in adjacency.values_mut() {
            dependents.sort_unstable();
        }

        let graph = Self {
            adjacency,
            in_degree,
        };
        graph.validate_cycle_free()?;
        Ok(graph)
    }

    /// Kahn's algorithm, grouped by distance from the roots.
    ///
    /// Deterministic: steps within a level come out in lexicographic order.
    pub fn level_order(&self) -> Vec<Vec<String>> {
        let mut in_degree = self.in_degree.clone();
        let mut current: Vec<String> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| id.clone())
            .collect();

        let mut levels = Vec::new();
        while !current.is_empty() {
            let mut next = BTreeSet::new();
            for node_id in &current {
                if let Some(dependents) = self.adjacency.get(node_id) {
                    for dependent in dependents {
                        let degree = in_degree
                            .get_mut(dependent)
                            .expect("dependent is a known node");
                        *degree -= 1;
                        if *degree == 0 {
                            next.insert(dependent.clone());
                        }
                    }
                }
            }
            levels.push(std::mem::replace(
                &mut current,
                next.into_iter().collect(),
            ));
        }
        levels
    }

    fn validate_cycle_free(&self) -> Result<(), PlanError> {
        let mut states = BTreeMap::new();
        let mut stack = Vec::new();

        for node_id in self.adjacency.keys() {
            if states.contains_key(node_id.as_str()) {
                continue;
            }
            if let Some(path) = self.detect_cycle(node_id, &mut states, &mut stack) {
                return Err(PlanError::Cycle(path.join(" -> ")));
            }
        }
        Ok(())
    }

    fn detect_cycle(
        &self,
        node_id: &str,
        states: &mut BTreeMap<String, NodeState>,
        stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        states.insert(node_id.to_string(), NodeState::Visiting);
        stack.push(node_id.to_string());

        if let Some(neighbors) = self.adjacency.get(node_id) {
            for neighbor in neighbors {
                match states.get(neighbor.as_str()) {
                    Some(NodeState::Visiting) => {
                        let index = stack
                            .iter()
                            .position(|entry| entry == neighbor)
                            .unwrap_or(0);
                        let mut cycle = stack[index..].to_vec();
                        cycle.push(neighbor.clone());
                        return Some(cycle);
                    }
                    Some(NodeState::Visited) => {}
                    None => {
                        if let Some(path) = self.detect_cycle(neighbor, states, stack) {
                            return Some(path);
                        }
                    }
                }
            }
        }

        stack.pop();
        states.insert(node_id.to_string(), NodeState::Visited);
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Visiting,
    Visited,
}
