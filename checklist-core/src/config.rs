use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::site::Document;

/// How the `{{logo}}` placeholder is resolved.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogoMode {
    /// Reference the copied logo in the shared assets directory.
    #[default]
    File,
    /// Inline the source logo as a base64 data URI.
    Embed,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Markdown source, relative to the project root
    pub source: PathBuf,
    /// Output directory name for this document
    pub slug: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct BuildConfig {
    /// Project root every relative path resolves against
    pub root: PathBuf,
    /// Output directory, wiped on every build
    pub output: PathBuf,
    /// HTML template with `{{placeholder}}` tokens
    pub template: PathBuf,
    /// PWA manifest template (JSON object)
    pub manifest_template: PathBuf,
    /// Source logo image
    pub logo: PathBuf,
    pub logo_mode: LogoMode,
    /// Pipe generated HTML through `tidy` when it is installed
    pub lint: bool,
    pub lint_timeout_secs: u64,
    pub documents: Vec<DocumentConfig>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from("dist"),
            template: PathBuf::from("doc/template.html"),
            manifest_template: PathBuf::from("doc/manifest.json"),
            logo: PathBuf::from("doc/logo.png"),
            logo_mode: LogoMode::File,
            lint: true,
            lint_timeout_secs: 30,
            documents: vec![
                DocumentConfig {
                    source: PathBuf::from("staff-onboarding.md"),
                    slug: "staff".to_string(),
                },
                DocumentConfig {
                    source: PathBuf::from("student-onboarding.md"),
                    slug: "student".to_string(),
                },
            ],
        }
    }
}

impl BuildConfig {
    /// Default layout rooted at `root`.
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.output_dir().join("assets")
    }

    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.template)
    }

    pub fn manifest_template_path(&self) -> PathBuf {
        self.resolve(&self.manifest_template)
    }

    pub fn logo_path(&self) -> PathBuf {
        self.resolve(&self.logo)
    }

    pub fn documents(&self) -> Vec<Document> {
        self.documents
            .iter()
            .map(|doc| Document::new(self.resolve(&doc.source), &doc.slug))
            .collect()
    }

    /// Every file that must exist before anything is written.
    pub fn required_inputs(&self) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = self
            .documents
            .iter()
            .map(|doc| self.resolve(&doc.source))
            .collect();
        inputs.push(self.template_path());
        inputs.push(self.manifest_template_path());
        inputs.push(self.logo_path());
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let config = BuildConfig::default();
        assert_eq!(config.output, PathBuf::from("dist"));
        assert_eq!(config.logo_mode, LogoMode::File);
        assert!(config.lint);

        let slugs: Vec<&str> = config.documents.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["staff", "student"]);
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let config = BuildConfig::with_root("/project");
        assert_eq!(config.output_dir(), PathBuf::from("/project/dist"));
        assert_eq!(config.assets_dir(), PathBuf::from("/project/dist/assets"));
        assert_eq!(
            config.template_path(),
            PathBuf::from("/project/doc/template.html")
        );

        let inputs = config.required_inputs();
        assert_eq!(inputs.len(), 5);
        assert_eq!(inputs[0], PathBuf::from("/project/staff-onboarding.md"));
        assert_eq!(inputs[4], PathBuf::from("/project/doc/logo.png"));
    }

    #[test]
    fn test_logo_mode_deserializes_lowercase() {
        let mode: LogoMode = serde_json::from_str("\"embed\"").unwrap();
        assert_eq!(mode, LogoMode::Embed);
    }
}
