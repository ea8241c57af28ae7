//! Extension options
//!
//! Plain serde model of the host-facing settings this crate consumes.
//! Loading the settings file is the host's job; everything here has a
//! sensible default so an empty object works.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionOptions {
    pub memory_report: MemoryReportOptions,

    /// Ordered candidate directories searched for compile_commands.json.
    /// `${CWD}` expands to the workspace root.
    pub compilation_database_candidates: Vec<String>,
}

/// Shape of the rendered `$/memoryUsage` report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryReportOptions {
    /// Title of the node printed as the report header line.
    pub root_label: String,

    /// Subsystem titles printed as top-level entries. Anything else is
    /// traversed but not printed.
    pub interesting: Vec<String>,
}

impl Default for MemoryReportOptions {
    fn default() -> Self {
        Self {
            root_label: "clangd_server".to_string(),
            interesting: vec![
                "background_index".to_string(),
                "tuscheduler".to_string(),
                "dynamic_index".to_string(),
            ],
        }
    }
}

/// Return the first candidate directory containing a compilation database,
/// or `None`. Candidates are tried in order; `${CWD}` in a candidate
/// expands to the workspace root. A missing workspace yields `None` and
/// clangd falls back to its own lookup.
pub fn closest_compilation_database(workspace: &Path, candidates: &[String]) -> Option<PathBuf> {
    if !workspace.exists() {
        return None;
    }

    candidates
        .iter()
        .map(|candidate| {
            PathBuf::from(candidate.replace("${CWD}", &workspace.to_string_lossy()))
        })
        .find(|dir| dir.join("compile_commands.json").exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_options() {
        let options: ExtensionOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.memory_report.root_label, "clangd_server");
        assert!(
            options
                .memory_report
                .interesting
                .contains(&"background_index".to_string())
        );
    }

    #[test]
    fn test_missing_workspace_finds_nothing() {
        let result = closest_compilation_database(
            Path::new("/definitely/not/a/workspace"),
            &["${CWD}/build".to_string()],
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("build");
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join("compile_commands.json"), "[]").unwrap();

        let found = closest_compilation_database(dir.path(), &[
            "${CWD}/missing".to_string(),
            "${CWD}/build".to_string(),
        ]);
        assert_eq!(found, Some(build));
    }
}
