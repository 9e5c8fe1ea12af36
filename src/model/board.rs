//! Whiteboard node graph.
//!
//! Nodes reference each other by id only (`parent_id`, `children`); the
//! graph is navigated through an id lookup table, never through pointers.

use serde::Deserialize;
use serde_json::Value;

/// Containment links shared by every node kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeLinks {
    pub id: String,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
}

/// A participant track in a sequence diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeLine {
    pub links: NodeLinks,
    pub label: Option<String>,
    pub x: f64,
}

/// A directed message between lifelines.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub links: NodeLinks,
    pub y: f64,
    pub start_object_id: Option<String>,
    pub end_x: f64,
    pub caption: Option<String>,
    pub end_arrow_style: Option<String>,
}

impl Connector {
    /// Messages without an end arrow read right-to-left.
    pub fn points_backwards(&self) -> bool {
        self.end_arrow_style.as_deref().unwrap_or("none") == "none"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardNode {
    LifeLine(LifeLine),
    Connector(Connector),
    /// Activations, composite shapes and anything else
    Other(NodeLinks),
}

impl BoardNode {
    /// Decodes one entry of the `nodes` array.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let raw = RawBoardNode::deserialize(value)?;
        let links = NodeLinks {
            id: raw.id.unwrap_or_default(),
            parent_id: raw.parent_id.filter(|p| !p.is_empty()),
            children: raw.children.unwrap_or_default(),
        };

        let node = match raw.node_type.as_deref() {
            Some("life_line") => BoardNode::LifeLine(LifeLine {
                links,
                label: raw
                    .text
                    .as_ref()
                    .and_then(|t| t.get("text"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                x: raw.x.unwrap_or(0.0),
            }),
            Some("connector") => {
                let connector = raw.connector.unwrap_or_default();
                let start = connector.start.unwrap_or_default();
                let end = connector.end.unwrap_or_default();
                let start_object_id = start
                    .attached_object
                    .and_then(|o| o.id)
                    .filter(|id| !id.is_empty())
                    .or_else(|| start.start_object.and_then(|o| o.id))
                    .filter(|id| !id.is_empty());
                BoardNode::Connector(Connector {
                    links,
                    y: raw.y.unwrap_or(0.0),
                    start_object_id,
                    end_x: end.position.and_then(|p| p.x).unwrap_or(0.0),
                    caption: connector
                        .captions
                        .and_then(|c| c.data.into_iter().next())
                        .and_then(|c| c.text)
                        .filter(|t| !t.is_empty()),
                    end_arrow_style: end.arrow_style,
                })
            }
            _ => BoardNode::Other(links),
        };
        Ok(node)
    }

    pub fn links(&self) -> &NodeLinks {
        match self {
            BoardNode::LifeLine(l) => &l.links,
            BoardNode::Connector(c) => &c.links,
            BoardNode::Other(links) => links,
        }
    }

    pub fn id(&self) -> &str {
        &self.links().id
    }
}

#[derive(Debug, Deserialize)]
struct RawBoardNode {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    children: Option<Vec<String>>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    text: Option<Value>,
    #[serde(default)]
    connector: Option<RawConnector>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConnector {
    #[serde(default)]
    start: Option<RawEndpoint>,
    #[serde(default)]
    end: Option<RawEndpoint>,
    #[serde(default)]
    captions: Option<RawCaptions>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEndpoint {
    #[serde(default)]
    attached_object: Option<RawObjectRef>,
    #[serde(default)]
    start_object: Option<RawObjectRef>,
    #[serde(default)]
    position: Option<RawPosition>,
    #[serde(default)]
    arrow_style: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObjectRef {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPosition {
    #[serde(default)]
    x: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCaptions {
    #[serde(default)]
    data: Vec<RawCaption>,
}

#[derive(Debug, Deserialize)]
struct RawCaption {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connector_fields() {
        let node = BoardNode::from_value(&json!({
            "id": "c1",
            "type": "connector",
            "y": 120.5,
            "connector": {
                "start": {"attached_object": {"id": "s5:1"}},
                "end": {"position": {"x": 300.0}, "arrow_style": "triangle_arrow"},
                "captions": {"data": [{"text": "login()"}]}
            }
        }))
        .unwrap();

        match node {
            BoardNode::Connector(c) => {
                assert_eq!(c.start_object_id.as_deref(), Some("s5:1"));
                assert_eq!(c.end_x, 300.0);
                assert_eq!(c.caption.as_deref(), Some("login()"));
                assert!(!c.points_backwards());
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_start_object_fallback() {
        let node = BoardNode::from_value(&json!({
            "id": "c2",
            "type": "connector",
            "connector": {"start": {"attached_object": {"id": ""}, "start_object": {"id": "l1"}}}
        }))
        .unwrap();
        match node {
            BoardNode::Connector(c) => {
                assert_eq!(c.start_object_id.as_deref(), Some("l1"));
                assert!(c.points_backwards());
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        assert!(BoardNode::from_value(&json!({"id": "n", "type": "life_line", "x": "far"})).is_err());
    }
}
