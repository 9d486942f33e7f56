//! Report building: sort matched projects and serialize them.

use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Project};

const CSV_HEADER: [&str; 3] = ["last_activity", "project", "url"];

/// One row of the persisted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Raw `last_activity_at` value; empty when GitLab did not report one.
    pub last_activity: String,
    pub project: String,
    pub url: String,
}

impl From<&Project> for ReportEntry {
    fn from(project: &Project) -> Self {
        Self {
            last_activity: project.last_activity_at.clone().unwrap_or_default(),
            project: project.path_with_namespace.clone(),
            url: project.web_url.clone(),
        }
    }
}

/// Orders matched projects by last activity (newest first) and writes them
/// out.
///
/// Projects without a timestamp sort last. Ties keep their incoming order.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    projects: Vec<Project>,
}

impl ReportBuilder {
    #[must_use]
    pub fn new(mut projects: Vec<Project>) -> Self {
        projects.sort_by(|a, b| compare_activity(b, a));
        Self { projects }
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<ReportEntry> {
        self.projects.iter().map(ReportEntry::from).collect()
    }

    /// Write the report as CSV. The header row is always written, even for an
    /// empty report.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if serialization or the underlying writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), CoreError> {
        let mut csv = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv.write_record(CSV_HEADER)?;
        for entry in self.entries() {
            csv.serialize(entry)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the CSV report to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the file cannot be created or written.
    pub fn write_csv_file(&self, path: &Path) -> Result<(), CoreError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

/// Parsed timestamps order by instant; unparseable values order below every
/// parsed one and then by their raw text.
fn compare_activity(a: &Project, b: &Project) -> Ordering {
    (a.last_activity(), &a.last_activity_at).cmp(&(b.last_activity(), &b.last_activity_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProjectId;
    use pretty_assertions::assert_eq;

    fn project(id: u64, path: &str, activity: Option<&str>) -> Project {
        Project {
            id: ProjectId::Numeric(id),
            path_with_namespace: path.to_string(),
            last_activity_at: activity.map(str::to_string),
            web_url: format!("https://gitlab.example.com/{path}"),
        }
    }

    #[test]
    fn sorts_newest_first() {
        let report = ReportBuilder::new(vec![
            project(1, "acme/old", Some("2023-01-01T00:00:00Z")),
            project(3, "acme/new", Some("2024-06-01T00:00:00Z")),
            project(2, "acme/mid", Some("2023-09-15T12:30:00Z")),
        ]);
        let paths: Vec<_> = report
            .projects()
            .iter()
            .map(|p| p.path_with_namespace.as_str())
            .collect();
        assert_eq!(paths, vec!["acme/new", "acme/mid", "acme/old"]);
    }

    #[test]
    fn missing_activity_sorts_last() {
        let report = ReportBuilder::new(vec![
            project(1, "acme/none", None),
            project(2, "acme/some", Some("2020-01-01T00:00:00Z")),
        ]);
        assert_eq!(report.projects()[0].path_with_namespace, "acme/some");
        assert_eq!(report.projects()[1].path_with_namespace, "acme/none");
    }

    #[test]
    fn offsets_compare_by_instant() {
        // 10:00+02:00 is 08:00Z, earlier than 09:00Z.
        let report = ReportBuilder::new(vec![
            project(1, "acme/plus-two", Some("2024-01-01T10:00:00+02:00")),
            project(2, "acme/utc", Some("2024-01-01T09:00:00Z")),
        ]);
        assert_eq!(report.projects()[0].path_with_namespace, "acme/utc");
    }

    #[test]
    fn csv_has_header_and_rows() {
        let report = ReportBuilder::new(vec![
            project(1, "acme/a", Some("2024-01-01T00:00:00Z")),
            project(2, "acme/b", None),
        ]);
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "last_activity,project,url\n\
             2024-01-01T00:00:00Z,acme/a,https://gitlab.example.com/acme/a\n\
             ,acme/b,https://gitlab.example.com/acme/b\n"
        );
    }

    #[test]
    fn empty_report_still_writes_header() {
        let report = ReportBuilder::new(Vec::new());
        assert!(report.is_empty());
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "last_activity,project,url\n");
    }
}
