pub mod assets;
pub mod builder;
pub mod config;
pub mod manifest;
pub mod markdown;
pub mod renderer;
pub mod site;
pub mod template;
pub mod tools;
pub mod version;

// Re-export main types
pub use builder::{Build, BuildError, BuildReport, ChecklistBuilder, build_checklists};
pub use config::{BuildConfig, DocumentConfig, LogoMode};
pub use markdown::{ChecklistItem, Frontmatter, ParseError};
pub use site::Document;
