//! Textual description of whiteboard sequence diagrams.
//!
//! A whiteboard is a flat list of nodes. Lifelines with a label are the
//! participants; connectors are the messages, read top to bottom. A
//! connector's sender is found by walking from the node it is attached
//! to up to the owning lifeline, its receiver by horizontal proximity.

use crate::model::{BoardNode, Connector, LifeLine};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

const UNKNOWN_PARTICIPANT: &str = "Unknown";

/// Describes a whiteboard's raw node list as text.
///
/// Never fails: an empty board, an unreadable node or a board with
/// nothing recognisable each yield a bracketed placeholder.
pub fn describe_board(raw_nodes: &[Value]) -> String {
    if raw_nodes.is_empty() {
        return "[BOARD: Empty]".to_string();
    }

    let nodes = match raw_nodes
        .iter()
        .map(BoardNode::from_value)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(nodes) => nodes,
        Err(e) => {
            log::warn!("Error parsing board nodes: {}", e);
            return format!("[BOARD: Parse error - {}]", e);
        }
    };

    SequenceDiagram::new(&nodes).describe()
}

struct SequenceDiagram<'a> {
    by_id: HashMap<&'a str, &'a BoardNode>,
    lifelines: IndexMap<&'a str, &'a LifeLine>,
    connectors: Vec<&'a Connector>,
}

impl<'a> SequenceDiagram<'a> {
    fn new(nodes: &'a [BoardNode]) -> Self {
        let mut by_id = HashMap::new();
        let mut lifelines = IndexMap::new();
        let mut connectors = Vec::new();

        for node in nodes {
            if !node.id().is_empty() {
                by_id.insert(node.id(), node);
            }
            match node {
                BoardNode::LifeLine(lifeline) => {
                    lifelines.insert(node.id(), lifeline);
                }
                BoardNode::Connector(connector) => connectors.push(connector),
                BoardNode::Other(_) => {}
            }
        }
        connectors.sort_by(|a, b| a.y.total_cmp(&b.y));

        Self {
            by_id,
            lifelines,
            connectors,
        }
    }

    fn label(&self, lifeline_id: Option<&str>) -> &'a str {
        lifeline_id
            .and_then(|id| self.lifelines.get(id).copied())
            .and_then(|l| l.label.as_deref())
            .unwrap_or(UNKNOWN_PARTICIPANT)
    }

    /// Finds the lifeline that owns `node_id`.
    fn owning_lifeline(&self, node_id: &str, visited: &mut HashSet<String>) -> Option<&'a str> {
        if node_id.is_empty() || !visited.insert(node_id.to_string()) {
            return None;
        }
        if let Some((id, _)) = self.lifelines.get_key_value(node_id) {
            return Some(*id);
        }

        let prefix = id_prefix(node_id);
        for (id, lifeline) in &self.lifelines {
            let children = &lifeline.links.children;
            if children.iter().any(|c| c == node_id || id_prefix(c) == prefix) {
                return Some(*id);
            }
        }

        let parent = self.by_id.get(node_id)?.links().parent_id.as_deref()?;
        self.owning_lifeline(parent, visited)
    }

    /// The labelled lifeline horizontally closest to `x`; the earliest wins ties.
    fn nearest_lifeline(&self, x: f64) -> Option<&'a str> {
        let mut best: Option<(&'a str, f64)> = None;
        for (id, lifeline) in &self.lifelines {
            if lifeline.label.is_none() {
                continue;
            }
            let distance = (x - lifeline.x).abs();
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((*id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn message_line(&self, connector: &Connector) -> String {
        let start = connector
            .start_object_id
            .as_deref()
            .and_then(|id| self.owning_lifeline(id, &mut HashSet::new()));
        let end = self.nearest_lifeline(connector.end_x);
        let arrow = if connector.points_backwards() { '←' } else { '→' };

        let mut line = format!("- {} {} {}", self.label(start), arrow, self.label(end));
        if let Some(caption) = &connector.caption {
            line.push_str(": ");
            line.push_str(caption);
        }
        line
    }

    fn describe(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.connectors.is_empty() {
            parts.push("**Sequence Flow:**\n".to_string());
            parts.extend(self.connectors.iter().map(|c| self.message_line(c)));
            parts.push(String::new());
        }

        let mut labels: Vec<&str> = self
            .lifelines
            .values()
            .filter_map(|l| l.label.as_deref())
            .collect();
        if !labels.is_empty() {
            labels.sort_unstable();
            parts.push("**Participants:**\n".to_string());
            parts.extend(labels.iter().map(|l| format!("- {}", l)));
            parts.push(String::new());
        }

        if parts.is_empty() {
            "[BOARD: Unable to parse]".to_string()
        } else {
            parts.join("\n")
        }
    }
}

fn id_prefix(id: &str) -> &str {
    id.split_once(':').map_or(id, |(prefix, _)| prefix)
}
