//! Action dependency DAG: cycle detection and deterministic ordering

use crate::error::{CoreError, CoreResult};
use crate::target::Target;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

/// A directed graph of action dependencies keyed by canonical target
#[derive(Debug)]
pub struct ActionDag {
    /// Edges go from dependency to dependent
    graph: DiGraph<Target, ()>,

    /// Map from canonical target to node index
    node_map: HashMap<Target, NodeIndex>,
}

impl ActionDag {
    /// Create a new empty DAG
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add an action to the DAG
    pub fn add_action(&mut self, target: &Target) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(target) {
            return idx;
        }
        let idx = self.graph.add_node(target.clone());
        self.node_map.insert(target.clone(), idx);
        idx
    }

    /// Add a dependency edge (`dependent` depends on `dependency`)
    pub fn add_dependency(&mut self, dependent: &Target, dependency: &Target) {
        let from = self.add_action(dependent);
        let to = self.add_action(dependency);
        // Dependency first, so a topological walk yields dependencies first
        if self.graph.find_edge(to, from).is_none() {
            self.graph.add_edge(to, from, ());
        }
    }

    /// Build the DAG from a map of action -> dependencies.
    ///
    /// Dependencies that are not themselves keys are skipped; reporting them
    /// is the caller's job. Cycles are allowed here; see [`Self::cycles`].
    pub fn build(dependencies: &BTreeMap<Target, Vec<Target>>) -> Self {
        let mut dag = Self::new();

        for target in dependencies.keys() {
            dag.add_action(target);
        }

        for (target, deps) in dependencies {
            for dep in deps {
                if dependencies.contains_key(dep) {
                    dag.add_dependency(target, dep);
                }
            }
        }

        dag
    }

    /// Every dependency cycle, each as a path `a -> b -> ... -> a` where
    /// each step means "depends on". Sorted for stable output.
    pub fn cycles(&self) -> Vec<Vec<Target>> {
        let mut cycles: Vec<Vec<Target>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&n| self.graph.find_edge(n, n).is_some())
            })
            .map(|scc| self.cycle_path(&scc))
            .collect();
        cycles.sort();
        cycles
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        match self.cycles().into_iter().next() {
            None => Ok(()),
            Some(cycle) => Err(CoreError::CircularDependency {
                cycle: format_cycle(&cycle),
            }),
        }
    }

    /// Find a closed path through a strongly connected component, starting
    /// at its lexically smallest member
    fn cycle_path(&self, scc: &[NodeIndex]) -> Vec<Target> {
        let members: HashSet<NodeIndex> = scc.iter().copied().collect();
        let Some(&start) = scc.iter().min_by_key(|&&n| &self.graph[n]) else {
            return Vec::new();
        };

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut closing = None;

        'search: while let Some(current) = queue.pop_front() {
            let mut next: Vec<NodeIndex> = self
                .graph
                .edges_directed(current, Direction::Incoming)
                .map(|e| e.source())
                .filter(|n| members.contains(n))
                .collect();
            next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            for n in next {
                if n == start {
                    closing = Some(current);
                    break 'search;
                }
                if !parent.contains_key(&n) {
                    parent.insert(n, current);
                    queue.push_back(n);
                }
            }
        }

        let mut path = vec![self.graph[start].clone()];
        let mut backwards = Vec::new();
        let mut cursor = closing;
        while let Some(node) = cursor {
            if node == start {
                break;
            }
            backwards.push(self.graph[node].clone());
            cursor = parent.get(&node).copied();
        }
        backwards.reverse();
        path.extend(backwards);
        path.push(self.graph[start].clone());
        path
    }

    /// Order a subset of actions.
    ///
    /// `a` precedes `b` when `b` transitively depends on `a` in the full
    /// graph, even if the path runs through unselected actions. Ties are
    /// broken by canonical name.
    pub fn order_subset(&self, selected: &BTreeSet<Target>) -> CoreResult<Vec<Target>> {
        let nodes: Vec<Target> = selected
            .iter()
            .filter(|t| self.node_map.contains_key(*t))
            .cloned()
            .collect();

        let mut in_degree: BTreeMap<&Target, usize> = nodes.iter().map(|t| (t, 0)).collect();
        let mut dependents: BTreeMap<&Target, Vec<&Target>> = BTreeMap::new();
        for target in &nodes {
            let reachable = self.descendants(target);
            for other in &nodes {
                if other != target && reachable.contains(other) {
                    dependents.entry(target).or_default().push(other);
                    if let Some(d) = in_degree.get_mut(other) {
                        *d += 1;
                    }
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<(String, &Target)>> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(t, _)| Reverse((t.to_string(), *t)))
            .collect();

        let mut order = Vec::with_capacity(nodes.len());
        while let Some(Reverse((_, target))) = ready.pop() {
            order.push(target.clone());
            for dependent in dependents.get(target).into_iter().flatten() {
                if let Some(d) = in_degree.get_mut(*dependent) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push(Reverse((dependent.to_string(), *dependent)));
                    }
                }
            }
        }

        if order.len() != nodes.len() {
            self.validate()?;
        }
        Ok(order)
    }

    /// All transitive dependencies of an action
    pub fn ancestors(&self, target: &Target) -> BTreeSet<Target> {
        self.collect_reachable(target, Direction::Incoming)
    }

    /// All transitive dependents of an action
    pub fn descendants(&self, target: &Target) -> BTreeSet<Target> {
        self.collect_reachable(target, Direction::Outgoing)
    }

    /// Collect all nodes reachable from `target` by following edges in `direction`
    fn collect_reachable(&self, target: &Target, direction: Direction) -> BTreeSet<Target> {
        let Some(&start) = self.node_map.get(target) else {
            return BTreeSet::new();
        };
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        let mut result = BTreeSet::new();
        while let Some(idx) = stack.pop() {
            for neighbor in self.graph.neighbors_directed(idx, direction) {
                if visited.insert(neighbor) {
                    result.insert(self.graph[neighbor].clone());
                    stack.push(neighbor);
                }
            }
        }
        result
    }
}

impl Default for ActionDag {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a cycle path as `a -> b -> a`
pub fn format_cycle(cycle: &[Target]) -> String {
    cycle
        .iter()
        .map(Target::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
