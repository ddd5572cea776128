use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::assets::{LogoAsset, copy_logo, generate_logo_assets, logo_reference};
use crate::config::{BuildConfig, LogoMode};
use crate::manifest::{Manifest, ManifestError};
use crate::markdown::{Frontmatter, ParseError, parse_checklist, parse_document};
use crate::renderer::render_checklist;
use crate::site::{Document, MANIFEST_FILE};
use crate::template::{PageValues, TemplateError, TemplateFiller};
use crate::tools::{ToolOutcome, lint_html};
use crate::version::generate_version;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Required file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error(
        "Output directory {} would delete {}",
        .output.display(),
        .input.display()
    )]
    OutputOverlapsInput { output: PathBuf, input: PathBuf },
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What a finished build wrote.
#[derive(Debug)]
pub struct BuildReport {
    pub version: String,
    pub pages: Vec<PageReport>,
    pub logos: Vec<LogoAsset>,
}

#[derive(Debug)]
pub struct PageReport {
    pub slug: String,
    pub html: PathBuf,
    pub manifest: PathBuf,
    pub items: usize,
}

/// A rendered page waiting for its manifest.
struct BuiltPage {
    document: Document,
    frontmatter: Frontmatter,
    html: PathBuf,
    items: usize,
}

pub struct ChecklistBuilder {
    config: BuildConfig,
}

impl ChecklistBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.output = path.as_ref().to_path_buf();
        self
    }

    pub fn logo_mode(mut self, mode: LogoMode) -> Self {
        self.config.logo_mode = mode;
        self
    }

    /// Check every input exists and survives the output wipe. Nothing is
    /// written until this passes.
    pub fn build(self) -> Result<Build, BuildError> {
        let inputs = self.config.required_inputs();
        if let Some(missing) = inputs.iter().find(|path| !path.is_file()) {
            return Err(BuildError::MissingInput(missing.clone()));
        }
        check_output_overlap(&self.config.output_dir(), &self.config.root, &inputs)?;

        let documents = self.config.documents();
        Ok(Build {
            config: self.config,
            documents,
        })
    }
}

pub struct Build {
    config: BuildConfig,
    documents: Vec<Document>,
}

impl Build {
    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir()
    }

    pub fn render_all(&self) -> Result<BuildReport, BuildError> {
        let output_dir = self.config.output_dir();
        let assets_dir = self.config.assets_dir();
        prepare_output(&output_dir, &assets_dir)?;

        let version = generate_version(&self.config.root);
        info!("Build version {version}");

        let logo = self.config.logo_path();
        info!("Generating logo assets...");
        let logos = generate_logo_assets(&logo, &assets_dir);
        if let Err(e) = copy_logo(&logo, &assets_dir) {
            error!("Logo copy failed: {e}");
        }

        let logo_ref = match logo_reference(self.config.logo_mode, &logo) {
            Ok(reference) => reference,
            Err(e) => {
                error!("Logo embedding failed, linking the file instead: {e}");
                logo_reference(LogoMode::File, &logo).unwrap_or_default()
            }
        };

        let template = TemplateFiller::read(self.config.template_path())?;

        let mut built = Vec::with_capacity(self.documents.len());
        for document in &self.documents {
            built.push(self.build_document(document, &template, &logo_ref, &output_dir)?);
        }

        info!("Writing manifests...");
        let manifest = Manifest::read(self.config.manifest_template_path())?;
        let mut pages = Vec::with_capacity(built.len());
        for page in built {
            let manifest_path = page.document.manifest_path(&output_dir);
            manifest
                .fill(&page.frontmatter, &version)
                .write(&manifest_path)?;
            debug!("Wrote {}", manifest_path.display());

            pages.push(PageReport {
                slug: page.document.slug,
                html: page.html,
                manifest: manifest_path,
                items: page.items,
            });
        }

        Ok(BuildReport {
            version,
            pages,
            logos,
        })
    }

    fn build_document(
        &self,
        document: &Document,
        template: &TemplateFiller,
        logo_ref: &str,
        output_dir: &Path,
    ) -> Result<BuiltPage, BuildError> {
        info!("Processing {}...", document.name());

        let content = std::fs::read_to_string(&document.source)
            .map_err(|e| BuildError::io(&document.source, e))?;
        let (frontmatter, body) =
            parse_document(&content).map_err(|source| BuildError::Parse {
                path: document.source.clone(),
                source,
            })?;
        debug!(
            "Found frontmatter: {:?}",
            frontmatter.keys().collect::<Vec<_>>()
        );

        let items = parse_checklist(body);
        info!("Found {} checklist items", items.len());

        let values = PageValues {
            logo: logo_ref.to_string(),
            content: render_checklist(&items),
            manifest: MANIFEST_FILE.to_string(),
            ..PageValues::from_frontmatter(&frontmatter)
        };
        let html = self.lint(template.fill(&values));

        let out_dir = document.out_dir(output_dir);
        std::fs::create_dir_all(&out_dir).map_err(|e| BuildError::io(&out_dir, e))?;
        let out_path = document.out_path(output_dir);
        std::fs::write(&out_path, html).map_err(|e| BuildError::io(&out_path, e))?;
        info!("Wrote {}", out_path.display());

        Ok(BuiltPage {
            document: document.clone(),
            frontmatter,
            html: out_path,
            items: items.len(),
        })
    }

    fn lint(&self, html: String) -> String {
        if !self.config.lint {
            return html;
        }

        let timeout = Duration::from_secs(self.config.lint_timeout_secs);
        match lint_html(&html, timeout) {
            ToolOutcome::Completed(linted) => linted,
            ToolOutcome::Unavailable(reason) => {
                warn!("HTML tidy unavailable ({reason}), skipping linting");
                html
            }
        }
    }
}

/// The output directory is deleted on every build, so it may not be the root,
/// an ancestor of the root, or a directory holding any input.
fn check_output_overlap(
    output: &Path,
    root: &Path,
    inputs: &[PathBuf],
) -> Result<(), BuildError> {
    let overlap = |input: &Path| BuildError::OutputOverlapsInput {
        output: output.to_path_buf(),
        input: input.to_path_buf(),
    };

    let output_abs = absolute(output).map_err(|e| BuildError::io(output, e))?;
    let root_abs = absolute(root).map_err(|e| BuildError::io(root, e))?;
    if root_abs.starts_with(&output_abs) {
        return Err(overlap(root));
    }

    for input in inputs {
        let input_abs = absolute(input).map_err(|e| BuildError::io(input, e))?;
        if input_abs.starts_with(&output_abs) {
            return Err(overlap(input));
        }
    }

    Ok(())
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the rest is applied lexically.
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut rest: Vec<OsString> = Vec::new();

    let mut resolved = loop {
        match existing.canonicalize() {
            Ok(base) => break base,
            Err(e) => {
                let last = match existing.components().next_back() {
                    Some(Component::Prefix(_) | Component::RootDir) | None => return Err(e),
                    Some(last) => last.as_os_str().to_os_string(),
                };
                rest.push(last);
                existing.pop();
                if existing.as_os_str().is_empty() {
                    existing = PathBuf::from(".");
                }
            }
        }
    };

    for part in rest.into_iter().rev() {
        match part.to_str() {
            Some("..") => {
                resolved.pop();
            }
            Some(".") => {}
            _ => resolved.push(part),
        }
    }
    Ok(resolved)
}

/// Full rebuild: wipe the previous output and start from empty directories.
fn prepare_output(output_dir: &Path, assets_dir: &Path) -> Result<(), BuildError> {
    if output_dir.exists() {
        std::fs::remove_dir_all(output_dir).map_err(|e| BuildError::io(output_dir, e))?;
    }
    std::fs::create_dir_all(assets_dir).map_err(|e| BuildError::io(assets_dir, e))?;
    Ok(())
}

/// Every file under `dir`, sorted.
pub fn output_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();
    paths
}

/// Validate, then build every document.
pub fn build_checklists(config: BuildConfig) -> Result<BuildReport, BuildError> {
    ChecklistBuilder::new(config).build()?.render_all()
}
