use serde::Serialize;

/// Severity level for ingest issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning, // Loaded, but with degraded data (e.g., unknown nodes in a line path)
    Error,   // Feature dropped (e.g., open station ring)
}

/// A single issue found while turning raw ways into stations and lines
#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub severity: Severity,
    pub category: String, // "station", "plant", "line"
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>, // "Way 42"
}

/// Feature counts of an ingest
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub nodes: usize,
    pub ways: usize,
    pub relations: usize,
    pub stations: usize,
    pub plants: usize,
    pub lines: usize,
    pub ground_truth_relations: usize,
    pub dropped_features: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestDiagnostics {
    pub stats: IngestStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<IngestIssue>,
}

impl IngestDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, category: &str, message: &str, entity: &str) {
        self.issues.push(IngestIssue {
            severity: Severity::Warning,
            category: category.to_string(),
            message: message.to_string(),
            entity: Some(entity.to_string()),
        });
    }

    /// Record a dropped feature
    pub fn add_error(&mut self, category: &str, message: &str, entity: &str) {
        self.issues.push(IngestIssue {
            severity: Severity::Error,
            category: category.to_string(),
            message: message.to_string(),
            entity: Some(entity.to_string()),
        });
        self.stats.dropped_features += 1;
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

impl std::fmt::Display for IngestDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for issue in &self.issues {
            let level = match issue.severity {
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            write!(f, "{level} [{}]", issue.category)?;
            if let Some(entity) = &issue.entity {
                write!(f, " {entity}")?;
            }
            writeln!(f, ": {}", issue.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = IngestDiagnostics::new();
        diag.add_warning("line", "path skips unknown node 7", "Way 3");
        diag.add_error("station", "ring is not closed", "Way 4");

        assert_eq!(diag.warning_count(), 1);
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.stats.dropped_features, 1);
        assert!(diag.has_issues());
        assert!(diag
            .to_string()
            .contains("error [station] Way 4: ring is not closed"));
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = IngestDiagnostics::new();
        diag.stats.stations = 14;
        diag.add_warning("line", "unparsable cables tag", "Way 9");

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"stations\": 14"));
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"entity\": \"Way 9\""));
    }
}
