use std::collections::{HashMap, HashSet};

use crate::Node;

/// Graph structure for traversal and analysis.
///
/// Edges are the logical successors of each node, so a condition contributes
/// an edge to each of its two branch targets. Edges to ids that are not in
/// the node set are left out.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Adjacency list: node_id -> list of downstream node_ids.
  adjacency: HashMap<String, Vec<String>>,
}

impl Graph {
  /// Build a graph from loaded nodes.
  pub fn new(nodes: &[Node]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = nodes
      .iter()
      .map(|node| (node.node_id.clone(), Vec::new()))
      .collect();

    for node in nodes {
      for to in node.logical_successors() {
        if !adjacency.contains_key(to) {
          continue;
        }
        adjacency
          .entry(node.node_id.clone())
          .or_default()
          .push(to.to_string());
      }
    }

    Self { adjacency }
  }

  /// Get downstream nodes for a given node.
  pub fn downstream(&self, node_id: &str) -> &[String] {
    self
      .adjacency
      .get(node_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// All nodes reachable from `start`, including `start` itself.
  pub fn reachable_from(&self, start: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut stack = vec![start.to_string()];

    while let Some(node_id) = stack.pop() {
      if !seen.insert(node_id.clone()) {
        continue;
      }
      for next in self.downstream(&node_id) {
        if !seen.contains(next) {
          stack.push(next.clone());
        }
      }
    }

    seen
  }

  /// Find a node that lies on a cycle, if any.
  ///
  /// Depth-first with an explicit stack of `(node, next neighbor index)`
  /// frames, so long chains do not grow the call stack.
  pub fn find_cycle(&self) -> Option<String> {
    // 0 = unvisited, 1 = in progress, 2 = done
    let mut color: HashMap<&str, u8> = self.adjacency.keys().map(|id| (id.as_str(), 0u8)).collect();

    let mut ids: Vec<&str> = self.adjacency.keys().map(String::as_str).collect();
    ids.sort_unstable();

    for root in ids {
      if color.get(root) != Some(&0) {
        continue;
      }
      color.insert(root, 1);
      let mut stack: Vec<(&str, usize)> = vec![(root, 0)];

      while let Some(frame) = stack.last_mut() {
        let (node_id, next) = *frame;
        frame.1 += 1;

        let Some(neighbor) = self.downstream(node_id).get(next) else {
          color.insert(node_id, 2);
          stack.pop();
          continue;
        };
        match color.get(neighbor.as_str()) {
          Some(1) => return Some(neighbor.clone()),
          Some(0) => {
            color.insert(neighbor.as_str(), 1);
            stack.push((neighbor.as_str(), 0));
          }
          _ => {}
        }
      }
    }

    None
  }
}
