use std::path::{Path, PathBuf};

/// Relative path from a document's page to its manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// One checklist source and where its page ends up.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: PathBuf,
    pub slug: String,
}

impl Document {
    pub fn new<P: AsRef<Path>>(source: P, slug: &str) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            slug: slug.to_string(),
        }
    }

    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.slug.clone())
    }

    pub fn out_dir(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.slug)
    }

    pub fn out_path(&self, output_dir: &Path) -> PathBuf {
        self.out_dir(output_dir).join("index.html")
    }

    pub fn manifest_path(&self, output_dir: &Path) -> PathBuf {
        self.out_dir(output_dir).join(MANIFEST_FILE)
    }
}
