use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::markdown::Frontmatter;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Manifest template must be a JSON object")]
    NotAnObject,
    #[error("Failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// PWA manifest template. Each document fills its own copy.
#[derive(Debug, Clone)]
pub struct Manifest {
    fields: Map<String, Value>,
}

impl Manifest {
    pub fn parse(json: &str) -> Result<Self, ManifestError> {
        match serde_json::from_str(json)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ManifestError::NotAnObject),
        }
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Copy of the template with the per-document keys overwritten.
    pub fn fill(&self, frontmatter: &Frontmatter, version: &str) -> Manifest {
        let title = frontmatter.get_or_empty("title");
        let short_name = frontmatter
            .get("short_name")
            .filter(|name| !name.is_empty())
            .unwrap_or(title);

        let mut fields = self.fields.clone();
        fields.insert("name".to_string(), Value::from(title));
        fields.insert("short_name".to_string(), Value::from(short_name));
        fields.insert("start_url".to_string(), Value::from("./"));
        fields.insert("scope".to_string(), Value::from("./"));
        fields.insert("version".to_string(), Value::from(version));

        Manifest { fields }
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut json = serde_json::to_string_pretty(&self.fields)?;
        json.push('\n');
        Ok(json)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r##"{
        "name": "placeholder",
        "display": "standalone",
        "theme_color": "#004b87",
        "icons": [{ "src": "../assets/logo-192x192.png", "sizes": "192x192" }]
    }"##;

    fn frontmatter(title: &str) -> Frontmatter {
        let mut frontmatter = Frontmatter::default();
        frontmatter.insert("title", title);
        frontmatter
    }

    #[test]
    fn test_fill_overwrites_fixed_keys() {
        let manifest = Manifest::parse(TEMPLATE).unwrap();
        let filled = manifest.fill(&frontmatter("Staff Onboarding"), "2026-10-15-abc1234");

        assert_eq!(filled.get("name"), Some(&Value::from("Staff Onboarding")));
        assert_eq!(filled.get("short_name"), Some(&Value::from("Staff Onboarding")));
        assert_eq!(filled.get("start_url"), Some(&Value::from("./")));
        assert_eq!(filled.get("scope"), Some(&Value::from("./")));
        assert_eq!(filled.get("version"), Some(&Value::from("2026-10-15-abc1234")));
        assert_eq!(filled.get("display"), Some(&Value::from("standalone")));
        assert!(filled.get("icons").is_some());
    }

    #[test]
    fn test_fill_does_not_touch_template() {
        let manifest = Manifest::parse(TEMPLATE).unwrap();
        let _ = manifest.fill(&frontmatter("Student"), "v");
        assert_eq!(manifest.get("name"), Some(&Value::from("placeholder")));
        assert!(manifest.get("version").is_none());
    }

    #[test]
    fn test_short_name_from_frontmatter() {
        let mut fm = frontmatter("Student Onboarding Checklist");
        fm.insert("short_name", "Students");

        let filled = Manifest::parse("{}").unwrap().fill(&fm, "v");
        assert_eq!(filled.get("short_name"), Some(&Value::from("Students")));
    }

    #[test]
    fn test_template_must_be_object() {
        assert!(matches!(Manifest::parse("[1, 2]"), Err(ManifestError::NotAnObject)));
        assert!(matches!(Manifest::parse("{ nope"), Err(ManifestError::Json(_))));
    }
}
