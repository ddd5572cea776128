use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)")
        .expect("valid frontmatter pattern")
});
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link pattern"));

const ITEM_MARKER: &str = "- [ ]";
const SUB_ITEM_MARKER: &str = "  -";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No frontmatter found in markdown file")]
    MissingFrontmatter,
}

/// Key/value header of a checklist document, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: IndexMap<String, String>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Missing keys read as the empty string.
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Rendered HTML fragment
    pub text: String,
    pub sub_items: Vec<String>,
}

impl ChecklistItem {
    fn new(text: String) -> Self {
        Self {
            text,
            sub_items: Vec::new(),
        }
    }
}

/// Split a document into its frontmatter and the trimmed body that follows.
pub fn parse_document(content: &str) -> Result<(Frontmatter, &str), ParseError> {
    let captures = FRONTMATTER
        .captures(content)
        .ok_or(ParseError::MissingFrontmatter)?;
    let block = captures.get(1).map_or("", |m| m.as_str());
    let body_start = captures.get(0).map_or(0, |m| m.end());

    let mut frontmatter = Frontmatter::default();
    for line in block.trim().lines() {
        if let Some((key, value)) = line.split_once(':') {
            frontmatter.insert(key.trim(), value.trim().trim_matches('"'));
        }
    }

    Ok((frontmatter, content[body_start..].trim()))
}

/// Bold first, then links. Single pass each, nothing nested.
pub fn render_inline(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>${1}</strong>");
    LINK.replace_all(&text, r#"<a href="${2}" target="_blank">${1}</a>"#).into_owned()
}

pub fn parse_checklist(body: &str) -> Vec<ChecklistItem> {
    let mut items = Vec::new();
    let mut current: Option<ChecklistItem> = None;

    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(ITEM_MARKER) {
            if let Some(done) = current.take() {
                items.push(done);
            }
            current = Some(ChecklistItem::new(render_inline(rest.trim())));
        } else if let Some(rest) = line.strip_prefix(SUB_ITEM_MARKER) {
            // Sub-items with nothing to attach to are dropped.
            if let Some(item) = current.as_mut() {
                item.sub_items.push(render_inline(rest.trim()));
            }
        }
    }

    if let Some(done) = current {
        items.push(done);
    }

    items
}
