//! Drift check results and their rendering.

use std::fmt;

/// The state of one committed artifact relative to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Stored bytes equal the generated bytes.
    Fresh,
    /// No artifact at the expected path.
    Missing,
    /// An artifact exists but its bytes differ.
    Stale,
    /// The artifact could not be read, even after retries.
    Unreadable(String),
}

impl EntryStatus {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }

    /// Label used at the start of a report line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "ok",
            Self::Missing => "missing",
            Self::Stale => "stale",
            Self::Unreadable(_) => "unreadable",
        }
    }
}

/// The outcome for one catalog document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub name: &'static str,
    pub path: String,
    pub status: EntryStatus,
}

impl fmt::Display for EntryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.status.label(), self.name, self.path)?;
        if let EntryStatus::Unreadable(reason) = &self.status {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

/// Aggregate result of a drift check.
///
/// Entries are in catalog order, orphans in path order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftReport {
    pub entries: Vec<EntryReport>,
    /// Artifacts in the store that no document claims.
    pub orphans: Vec<String>,
    /// Whether orphans count as failures.
    pub orphans_fail: bool,
}

impl DriftReport {
    /// Entries that are not fresh.
    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| !e.status.is_fresh())
    }

    /// Number of catalog documents checked.
    pub fn checked(&self) -> usize {
        self.entries.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none() && !(self.orphans_fail && !self.orphans.is_empty())
    }

    /// Process exit code for this result: 0 when clean, 1 on drift.
    pub fn exit_code(&self) -> u8 {
        if self.is_clean() { 0 } else { 1 }
    }

    /// One line per failing entry and per orphan. With `verbose`, fresh
    /// entries get an `ok:` line too.
    pub fn lines(&self, verbose: bool) -> Vec<String> {
        let entries = self
            .entries
            .iter()
            .filter(|e| verbose || !e.status.is_fresh())
            .map(ToString::to_string);
        let orphans = self.orphans.iter().map(|path| format!("orphan: {path}"));
        entries.chain(orphans).collect()
    }

    /// The closing line of the report.
    pub fn summary(&self) -> String {
        let failed = self.failures().count();
        let orphaned = self.orphans.len();
        if self.is_clean() {
            if orphaned == 0 {
                format!("schemas in sync ({} checked)", self.checked())
            } else {
                format!(
                    "schemas in sync ({} checked, {orphaned} orphaned)",
                    self.checked()
                )
            }
        } else {
            let orphan_note = if self.orphans_fail && orphaned > 0 {
                format!(", {orphaned} orphaned")
            } else {
                String::new()
            };
            format!(
                "schema drift detected: {failed} of {} failed{orphan_note}; \
                 run `rumble-schemas generate` to regenerate",
                self.checked()
            )
        }
    }

    /// The full report: detail lines followed by the summary.
    pub fn render(&self, verbose: bool) -> String {
        let mut out = String::new();
        for line in self.lines(verbose) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&self.summary());
        out.push('\n');
        out
    }
}

impl fmt::Display for DriftReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &'static str, path: &str, status: EntryStatus) -> EntryReport {
        EntryReport {
            name,
            path: path.to_string(),
            status,
        }
    }

    fn report(statuses: Vec<EntryStatus>) -> DriftReport {
        let names = ["Position", "Velocity", "Message"];
        let paths = [
            "common/position.json",
            "common/velocity.json",
            "common/message.json",
        ];
        DriftReport {
            entries: statuses
                .into_iter()
                .enumerate()
                .map(|(i, s)| entry(names[i], paths[i], s))
                .collect(),
            orphans: vec![],
            orphans_fail: false,
        }
    }

    #[test]
    fn test_clean_report() {
        let report = report(vec![EntryStatus::Fresh; 3]);
        assert!(report.is_clean());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.to_string(), "schemas in sync (3 checked)\n");
    }

    #[test]
    fn test_drift_lines_and_summary() {
        let report = report(vec![
            EntryStatus::Fresh,
            EntryStatus::Stale,
            EntryStatus::Missing,
        ]);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(
            report.lines(false),
            [
                "stale: Velocity (common/velocity.json)",
                "missing: Message (common/message.json)",
            ]
        );
        assert_eq!(
            report.summary(),
            "schema drift detected: 2 of 3 failed; run `rumble-schemas generate` to regenerate"
        );
    }

    #[test]
    fn test_verbose_includes_ok_lines() {
        let report = report(vec![EntryStatus::Fresh, EntryStatus::Fresh]);
        assert_eq!(
            report.lines(true),
            [
                "ok: Position (common/position.json)",
                "ok: Velocity (common/velocity.json)",
            ]
        );
    }

    #[test]
    fn test_unreadable_line_carries_reason() {
        let line = entry(
            "Position",
            "common/position.json",
            EntryStatus::Unreadable("permission denied".into()),
        );
        assert_eq!(
            line.to_string(),
            "unreadable: Position (common/position.json): permission denied"
        );
    }

    #[test]
    fn test_orphans_fail_only_when_configured() {
        let mut report = report(vec![EntryStatus::Fresh]);
        report.orphans = vec!["common/old-thing.json".into()];
        assert!(report.is_clean());
        assert_eq!(report.summary(), "schemas in sync (1 checked, 1 orphaned)");
        assert_eq!(report.lines(false), ["orphan: common/old-thing.json"]);

        report.orphans_fail = true;
        assert!(!report.is_clean());
        assert_eq!(
            report.summary(),
            "schema drift detected: 0 of 1 failed, 1 orphaned; run `rumble-schemas generate` to regenerate"
        );
    }
}
