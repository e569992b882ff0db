use serde_json::{Map, Value};

use crate::ClientError;

/// Structural kind of a documentation entry.
///
/// `all.json` uses the `type` key for both entry kinds and value types
/// (`"string"`, `"Function"`, ...); only the values below are entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class,
    ClassMethod,
    Event,
    Global,
    Method,
    Misc,
    Module,
}

impl NodeKind {
    /// Order in which categories are searched; the first one with a match wins.
    pub const SEARCH_ORDER: [NodeKind; 7] = [
        NodeKind::Class,
        NodeKind::ClassMethod,
        NodeKind::Method,
        NodeKind::Event,
        NodeKind::Module,
        NodeKind::Global,
        NodeKind::Misc,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "class" => Some(Self::Class),
            "classMethod" => Some(Self::ClassMethod),
            "event" => Some(Self::Event),
            "global" => Some(Self::Global),
            "method" => Some(Self::Method),
            "misc" => Some(Self::Misc),
            "module" => Some(Self::Module),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::ClassMethod => "classMethod",
            Self::Event => "event",
            Self::Global => "global",
            Self::Method => "method",
            Self::Misc => "misc",
            Self::Module => "module",
        }
    }

    /// Module and misc entries own a whole page, so links to them carry no anchor.
    pub fn is_page(self) -> bool {
        matches!(self, Self::Module | Self::Misc)
    }
}

/// One entry of the documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocNode {
    pub name: Option<String>,
    pub kind: Option<NodeKind>,
    pub text_raw: Option<String>,
    pub desc: Option<String>,
    pub source: Option<String>,
    /// Objects found in every array-valued property, in document order.
    pub children: Vec<DocNode>,
}

impl DocNode {
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        let children = object
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(Value::as_object)
            .map(DocNode::from_object)
            .collect();

        Self {
            name: text("name"),
            kind: object
                .get("type")
                .and_then(Value::as_str)
                .and_then(NodeKind::parse),
            text_raw: text("textRaw"),
            desc: text("desc"),
            source: text("source"),
            children,
        }
    }

    /// Case-insensitive name comparison against an already lowercased query.
    pub fn name_matches(&self, lowered_query: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase() == lowered_query)
    }

    /// Display title, falling back to the bare name.
    pub fn title(&self) -> &str {
        self.text_raw
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or_default()
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(DocNode::count).sum::<usize>()
    }
}

/// A fully decoded `all.json` document. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTree {
    root: DocNode,
    node_count: usize,
}

impl DocumentTree {
    pub fn new(root: DocNode) -> Self {
        let node_count = root.count();
        Self { root, node_count }
    }

    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        let object = value.as_object().ok_or_else(|| {
            ClientError::InvalidDocument("documentation root is not a JSON object".to_string())
        })?;
        Ok(Self::new(DocNode::from_object(object)))
    }

    pub fn root(&self) -> &DocNode {
        &self.root
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
}
