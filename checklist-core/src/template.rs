use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::markdown::Frontmatter;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder pattern"));

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Values injected into the page template. Nothing here is escaped.
#[derive(Debug, Clone, Default)]
pub struct PageValues {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub logo: String,
    pub content: String,
    pub manifest: String,
}

impl PageValues {
    pub fn from_frontmatter(frontmatter: &Frontmatter) -> Self {
        Self {
            title: frontmatter.get_or_empty("title").to_string(),
            subtitle: frontmatter.get_or_empty("subtitle").to_string(),
            description: frontmatter.get_or_empty("description").to_string(),
            ..Self::default()
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "subtitle" => Some(&self.subtitle),
            "description" => Some(&self.description),
            "logo" => Some(&self.logo),
            "content" => Some(&self.content),
            "manifest" => Some(&self.manifest),
            _ => None,
        }
    }
}

pub struct TemplateFiller {
    template: String,
}

impl TemplateFiller {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let template = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(template))
    }

    /// Substitute every known `{{name}}` token in one scan. Injected values
    /// are never rescanned and unknown tokens stay as they are.
    pub fn fill(&self, values: &PageValues) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| {
                let token = &caps[0];
                values.lookup(&caps[1]).unwrap_or(token).to_string()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> PageValues {
        PageValues {
            title: "Staff".to_string(),
            subtitle: "Day one".to_string(),
            description: "Everything you need".to_string(),
            logo: "../assets/logo.png".to_string(),
            content: "<div>steps</div>".to_string(),
            manifest: "manifest.json".to_string(),
        }
    }

    #[test]
    fn test_fill_all_placeholders() {
        let filler = TemplateFiller::new(
            "<title>{{title}}</title><h2>{{subtitle}}</h2><p>{{description}}</p>\
             <img src=\"{{logo}}\"><link rel=\"manifest\" href=\"{{manifest}}\">{{content}}",
        );
        assert_eq!(
            filler.fill(&values()),
            "<title>Staff</title><h2>Day one</h2><p>Everything you need</p>\
             <img src=\"../assets/logo.png\"><link rel=\"manifest\" href=\"manifest.json\"><div>steps</div>"
        );
    }

    #[test]
    fn test_injected_values_are_not_rescanned() {
        let mut values = values();
        values.content = "literal {{title}} and <b>html</b>".to_string();

        let filler = TemplateFiller::new("{{content}}|{{title}}");
        assert_eq!(filler.fill(&values), "literal {{title}} and <b>html</b>|Staff");
    }

    #[test]
    fn test_unknown_tokens_and_css_braces_survive() {
        let filler = TemplateFiller::new("body { margin: 0 } {{unknown}} {{ title }} {{title}}");
        assert_eq!(
            filler.fill(&values()),
            "body { margin: 0 } {{unknown}} {{ title }} Staff"
        );
    }

    #[test]
    fn test_missing_frontmatter_keys_default_empty() {
        let mut frontmatter = Frontmatter::default();
        frontmatter.insert("title", "Only title");

        let values = PageValues::from_frontmatter(&frontmatter);
        assert_eq!(values.title, "Only title");
        assert_eq!(values.subtitle, "");
        assert_eq!(values.description, "");
    }
}
