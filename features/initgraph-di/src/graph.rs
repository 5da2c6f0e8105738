//! Minimal directed graph used to order providers.
//!
//! Nodes carry an arbitrary value and an ordered list of outgoing edges, where an
//! edge `a -> b` means "a depends on b". [`Graph::resolve`] sorts the nodes depth
//! first so that every dependency precedes its dependents. Ties are broken by
//! insertion order followed by edge order, so the result is deterministic.

use thiserror::Error;

/// Handle of a node inside one [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);
impl NodeId {
    /// Position of the node in insertion order
    pub fn index(self) -> usize {
        self.0
    }
}

struct Node<V> {
    value: V,
    edges: Vec<NodeId>,
    /// Currently being visited
    on_stack: bool,
    /// Fully resolved
    done: bool,
}

/// Directed graph which can be sorted into dependency first order
pub struct Graph<V> {
    nodes: Vec<Node<V>>,
    /// Dependency first order, set by a successful resolve
    order: Option<Vec<NodeId>>,
}
impl<V> Default for Graph<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Graph<V> {
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            order: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Graph {
            nodes: Vec::with_capacity(capacity),
            order: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(&mut self, value: V) -> NodeId {
        self.order = None;
        self.nodes.push(Node {
            value,
            edges: Vec::new(),
            on_stack: false,
            done: false,
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Adds an edge meaning `from` depends on `to`
    ///
    /// Edges keep their insertion order. A node may depend on itself, which
    /// [`Graph::resolve`] reports as a cycle.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.order = None;
        self.nodes[from.0].edges.push(to);
    }

    pub fn value(&self, id: NodeId) -> &V {
        &self.nodes[id.0].value
    }

    /// Outgoing edges of a node, in insertion order
    pub fn edges(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].edges
    }

    pub fn is_resolved(&self) -> bool {
        self.order.is_some()
    }

    /// Iterates the nodes in dependency first order once resolved, in insertion order otherwise
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &V)> + '_ {
        let ids: Box<dyn Iterator<Item = NodeId> + '_> = match &self.order {
            Some(order) => Box::new(order.iter().copied()),
            None => Box::new((0..self.nodes.len()).map(NodeId)),
        };
        ids.map(|id| (id, &self.nodes[id.0].value))
    }

    /// Sorts the graph using depth first search
    pub fn resolve(&mut self) -> Result<(), GraphError> {
        self.order = None;
        for node in &mut self.nodes {
            node.on_stack = false;
            node.done = false;
        }

        let mut unresolved: Vec<NodeId> = (0..self.nodes.len()).map(NodeId).collect();
        let mut resolved = Vec::with_capacity(unresolved.len());

        let mut previous = unresolved.len();
        while let Some(&next) = unresolved.first() {
            visit(&mut self.nodes, next, &mut unresolved, &mut resolved)?;

            if unresolved.len() == previous {
                return Err(GraphError::Stalled { node: next });
            }
            previous = unresolved.len();
        }

        self.order = Some(resolved);
        Ok(())
    }
}

/// Visits everything reachable from `root`, appending finished nodes to `resolved`
fn visit<V>(
    nodes: &mut [Node<V>],
    root: NodeId,
    unresolved: &mut Vec<NodeId>,
    resolved: &mut Vec<NodeId>,
) -> Result<(), GraphError> {
    if nodes[root.0].done {
        return Ok(());
    }

    // The chain currently being visited, each node with the next edge to follow
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    nodes[root.0].on_stack = true;

    while let Some(frame) = stack.last_mut() {
        let (id, edge) = *frame;
        let Some(dependency) = nodes[id.0].edges.get(edge).copied() else {
            stack.pop();
            let node = &mut nodes[id.0];
            node.on_stack = false;
            node.done = true;

            // Deeper nodes finish first and sit towards the end of the list
            if let Some(position) = unresolved.iter().rposition(|entry| *entry == id) {
                unresolved.remove(position);
            }
            resolved.push(id);
            continue;
        };
        frame.1 += 1;

        let next = &mut nodes[dependency.0];
        if next.done {
            continue;
        }
        if next.on_stack {
            // The dependency is on the chain, the cycle is the tail starting at it
            let start = stack
                .iter()
                .position(|(entry, _)| *entry == dependency)
                .unwrap_or(0);
            let mut chain: Vec<NodeId> = stack[start..].iter().map(|(entry, _)| *entry).collect();
            chain.push(dependency);
            return Err(GraphError::Cycle {
                node: dependency,
                chain,
            });
        }

        next.on_stack = true;
        stack.push((dependency, 0));
    }

    Ok(())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `chain` starts and ends with `node`
    #[error("Cycle detected on node {node:?} through {chain:?}")]
    Cycle { node: NodeId, chain: Vec<NodeId> },
    /// A top level visit made no progress
    #[error("Invalid graph, visiting {node:?} resolved nothing")]
    Stalled { node: NodeId },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(graph: &Graph<&'static str>) -> Vec<&'static str> {
        graph.iter().map(|(_, value)| *value).collect()
    }

    #[test]
    fn dependencies_come_first() {
        let mut graph = Graph::new();
        let service = graph.add_node("service");
        let sentence = graph.add_node("sentence");
        let int = graph.add_node("int");
        let mult = graph.add_node("mult");
        graph.add_edge(service, sentence);
        graph.add_edge(sentence, int);
        graph.add_edge(sentence, mult);
        graph.add_edge(service, mult);

        graph.resolve().unwrap();

        assert_eq!(order(&graph), vec!["int", "mult", "sentence", "service"]);
        for (id, _) in graph.iter() {
            let position = |target: NodeId| graph.iter().position(|(n, _)| n == target);
            for dependency in graph.edges(id) {
                assert!(position(*dependency) < position(id));
            }
        }
    }

    #[test]
    fn ties_follow_insertion_order() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        graph.add_node("b");
        let c = graph.add_node("c");
        graph.add_edge(a, c);

        graph.resolve().unwrap();

        assert_eq!(order(&graph), vec!["c", "a", "b"]);
    }

    #[test]
    fn unresolved_graph_iterates_in_insertion_order() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        graph.add_edge(a, b);

        assert!(!graph.is_resolved());
        assert_eq!(order(&graph), vec!["a", "b"]);
    }

    #[test]
    fn two_node_cycle_is_reported_with_its_chain() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        graph.add_edge(a, b);
        graph.add_edge(b, a);

        let err = graph.resolve().unwrap_err();

        assert_eq!(
            err,
            GraphError::Cycle {
                node: a,
                chain: vec![a, b, a]
            }
        );
        assert!(!graph.is_resolved());
    }

    #[test]
    fn self_edge_is_a_cycle() {
        let mut graph = Graph::new();
        graph.add_node("root");
        let looped = graph.add_node("looped");
        graph.add_edge(looped, looped);

        let err = graph.resolve().unwrap_err();

        assert_eq!(
            err,
            GraphError::Cycle {
                node: looped,
                chain: vec![looped, looped]
            }
        );
    }

    #[test]
    fn cycle_below_an_acyclic_prefix() {
        let mut graph = Graph::new();
        let top = graph.add_node("top");
        let x = graph.add_node("x");
        let y = graph.add_node("y");
        let z = graph.add_node("z");
        graph.add_edge(top, x);
        graph.add_edge(x, y);
        graph.add_edge(y, z);
        graph.add_edge(z, x);

        let err = graph.resolve().unwrap_err();

        assert_eq!(
            err,
            GraphError::Cycle {
                node: x,
                chain: vec![x, y, z, x]
            }
        );
    }

    #[test]
    fn empty_graph_resolves_to_nothing() {
        let mut graph: Graph<()> = Graph::new();
        graph.resolve().unwrap();
        assert!(graph.is_resolved());
        assert_eq!(graph.iter().count(), 0);
    }

    #[test]
    fn long_chains_resolve_without_recursion() {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..100_000).map(|value| graph.add_node(value)).collect();
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }

        graph.resolve().unwrap();

        let order: Vec<i32> = graph.iter().map(|(_, value)| *value).collect();
        assert_eq!(order.first(), Some(&99_999));
        assert_eq!(order.last(), Some(&0));
        assert_eq!(order.len(), 100_000);
    }

    #[test]
    fn resolving_again_gives_the_same_order() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        let c = graph.add_node("c");
        graph.add_edge(a, b);
        graph.add_edge(b, c);

        graph.resolve().unwrap();
        let first = order(&graph);
        graph.resolve().unwrap();

        assert_eq!(order(&graph), first);
        assert_eq!(first, vec!["c", "b", "a"]);
    }
}
