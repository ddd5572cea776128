use std::path::Path;

use chrono::{DateTime, Local, NaiveDate};
use tracing::warn;

use crate::tools::git_revision;

/// Build version: `YYYY-MM-DD-<revision>`, shared by every manifest of one build.
pub fn generate_version(repo: &Path) -> String {
    let now = Local::now();
    let revision = git_revision(repo).unwrap_or_else(|reason| {
        warn!("Revision lookup unavailable ({reason}), using timestamp fallback");
        fallback_revision(&now)
    });

    format_version(now.date_naive(), &revision)
}

pub fn format_version(date: NaiveDate, revision: &str) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), revision)
}

/// `t` plus the six-digit microsecond fraction of `now`. Git revisions are
/// hexadecimal, so a leading `t` never collides with a real one.
pub fn fallback_revision<Tz: chrono::TimeZone>(now: &DateTime<Tz>) -> String {
    format!("t{:06}", now.timestamp_subsec_micros() % 1_000_000)
}
