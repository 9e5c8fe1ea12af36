use crate::types::ResourceToken;
use serde::Deserialize;
use serde_json::Value;

/// Text content block: an ordered sequence of inline elements.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextBlockContent {
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

impl TextBlockContent {
    /// Concatenates every text run in order.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|e| e.text_run.as_ref())
            .map(|run| run.content.as_str())
            .collect()
    }
}

/// One inline element. Only text runs carry renderable text; mentions,
/// equations and other element kinds are ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextElement {
    #[serde(default)]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub content: String,
}

/// Code block
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CodeBlockContent {
    #[serde(default)]
    pub elements: Vec<TextElement>,
    #[serde(default)]
    pub style: CodeStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CodeStyle {
    /// Declared language, an enum number in the docx API.
    #[serde(default)]
    pub language: Option<Value>,
}

impl CodeBlockContent {
    pub fn plain_text(&self) -> String {
        TextBlockContent {
            elements: self.elements.clone(),
        }
        .plain_text()
    }

    /// The declared language tag, verbatim.
    pub fn language_tag(&self) -> String {
        match &self.style.language {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Image block
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ImageBlockContent {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl ImageBlockContent {
    pub fn token(&self) -> Option<ResourceToken> {
        self.token.clone().and_then(ResourceToken::new)
    }
}

/// Embedded sheet or whiteboard: a single resource token.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EmbedBlockContent {
    #[serde(default)]
    pub token: Option<String>,
}

impl EmbedBlockContent {
    pub fn token(&self) -> Option<ResourceToken> {
        self.token.clone().and_then(ResourceToken::new)
    }
}

/// Native table block. Only its dimensions are used; cell blocks are not rendered.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TableBlockContent {
    #[serde(default)]
    pub property: TableProperty,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TableProperty {
    #[serde(default)]
    pub row_size: u32,
    #[serde(default)]
    pub column_size: u32,
}
