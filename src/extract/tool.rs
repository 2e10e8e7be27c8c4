//! Extraction tool discovery and invocation templates.

use std::ffi::OsString;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use serde::{Deserialize, Serialize};

use crate::error::{ModsyncError, Result};

/// Supported archive tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    /// 7-Zip (`7z.exe`, or `7z` from p7zip).
    #[serde(rename = "7zip")]
    SevenZip,
    /// WinRAR (`WinRAR.exe`, or `unrar`).
    #[serde(rename = "winrar")]
    WinRar,
}

impl ToolKind {
    /// Command-line arguments to extract `archive` into `dest`, overwriting.
    pub fn args(&self, archive: &Path, dest: &Path) -> Vec<OsString> {
        match self {
            ToolKind::SevenZip => {
                let mut out = OsString::from("-o");
                out.push(dest);
                vec!["x".into(), archive.into(), out, "-y".into()]
            }
            ToolKind::WinRar => {
                // WinRAR treats a destination without a trailing separator as a file name
                let mut out = dest.as_os_str().to_owned();
                if !dest.as_os_str().to_string_lossy().ends_with(MAIN_SEPARATOR_STR) {
                    out.push(MAIN_SEPARATOR_STR);
                }
                vec!["x".into(), "-y".into(), archive.into(), out]
            }
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SevenZip => "7-Zip",
            ToolKind::WinRar => "WinRAR",
        }
    }
}

/// An extraction program and how to drive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionTool {
    #[serde(rename = "path")]
    pub executable: PathBuf,
    pub kind: ToolKind,
}

impl ExtractionTool {
    pub fn new(executable: impl Into<PathBuf>, kind: ToolKind) -> Self {
        Self {
            executable: executable.into(),
            kind,
        }
    }
}

/// Built-in candidate list, in preference order.
#[cfg(windows)]
pub fn default_candidates() -> Vec<ExtractionTool> {
    let program_files = std::env::var_os("ProgramFiles")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
    let program_files_x86 = std::env::var_os("ProgramFiles(x86)")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));

    vec![
        ExtractionTool::new(program_files.join("7-Zip").join("7z.exe"), ToolKind::SevenZip),
        ExtractionTool::new(
            program_files_x86.join("7-Zip").join("7z.exe"),
            ToolKind::SevenZip,
        ),
        ExtractionTool::new(program_files.join("WinRAR").join("WinRAR.exe"), ToolKind::WinRar),
        ExtractionTool::new(
            program_files_x86.join("WinRAR").join("WinRAR.exe"),
            ToolKind::WinRar,
        ),
    ]
}

/// Built-in candidate list, in preference order.
#[cfg(not(windows))]
pub fn default_candidates() -> Vec<ExtractionTool> {
    vec![
        ExtractionTool::new("/usr/bin/7z", ToolKind::SevenZip),
        ExtractionTool::new("/usr/local/bin/7z", ToolKind::SevenZip),
        ExtractionTool::new("/opt/homebrew/bin/7z", ToolKind::SevenZip),
        ExtractionTool::new("/usr/bin/unrar", ToolKind::WinRar),
        ExtractionTool::new("/usr/local/bin/unrar", ToolKind::WinRar),
    ]
}

/// Return the first candidate whose executable exists.
pub fn locate(candidates: &[ExtractionTool]) -> Result<ExtractionTool> {
    candidates
        .iter()
        .find(|tool| tool.executable.is_file())
        .cloned()
        .inspect(|tool| {
            tracing::debug!(
                "Using {} at {}",
                tool.kind.name(),
                tool.executable.display()
            )
        })
        .ok_or_else(|| ModsyncError::ToolNotFound {
            searched: candidates.iter().map(|t| t.executable.clone()).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn seven_zip_args() {
        let args = ToolKind::SevenZip.args(Path::new("pkg.7z"), Path::new("game"));
        assert_eq!(
            args,
            vec![
                OsString::from("x"),
                OsString::from("pkg.7z"),
                OsString::from("-ogame"),
                OsString::from("-y")
            ]
        );
    }

    #[test]
    fn winrar_args_end_destination_with_separator() {
        let args = ToolKind::WinRar.args(Path::new("pkg.7z"), Path::new("game"));
        let expected_dest = format!("game{}", MAIN_SEPARATOR_STR);
        assert_eq!(args[0], "x");
        assert_eq!(args[1], "-y");
        assert_eq!(args[2], "pkg.7z");
        assert_eq!(args[3], OsString::from(expected_dest.clone()));

        // Not doubled when already present
        let args = ToolKind::WinRar.args(Path::new("pkg.7z"), Path::new(&expected_dest));
        assert_eq!(args[3], OsString::from(expected_dest));
    }

    #[test]
    fn locate_returns_first_existing_candidate() {
        let temp = TempDir::new().unwrap();
        let winrar = temp.path().join("WinRAR.exe");
        let seven_zip_x86 = temp.path().join("7z-x86.exe");
        std::fs::write(&winrar, "").unwrap();
        std::fs::write(&seven_zip_x86, "").unwrap();

        let candidates = vec![
            ExtractionTool::new(temp.path().join("7z.exe"), ToolKind::SevenZip),
            ExtractionTool::new(&seven_zip_x86, ToolKind::SevenZip),
            ExtractionTool::new(&winrar, ToolKind::WinRar),
        ];

        let tool = locate(&candidates).unwrap();
        assert_eq!(tool.executable, seven_zip_x86);
        assert_eq!(tool.kind, ToolKind::SevenZip);
    }

    #[test]
    fn locate_ignores_directories() {
        let temp = TempDir::new().unwrap();
        let candidates = vec![ExtractionTool::new(temp.path(), ToolKind::SevenZip)];
        assert!(locate(&candidates).is_err());
    }

    #[test]
    fn locate_reports_all_searched_paths() {
        let candidates = vec![
            ExtractionTool::new("/nope/7z.exe", ToolKind::SevenZip),
            ExtractionTool::new("/nope/WinRAR.exe", ToolKind::WinRar),
        ];

        match locate(&candidates).unwrap_err() {
            ModsyncError::ToolNotFound { searched } => {
                assert_eq!(
                    searched,
                    vec![
                        PathBuf::from("/nope/7z.exe"),
                        PathBuf::from("/nope/WinRAR.exe")
                    ]
                );
            }
            other => panic!("expected ToolNotFound, got {other}"),
        }
    }

    #[test]
    fn default_candidates_prefer_seven_zip() {
        let candidates = default_candidates();
        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].kind, ToolKind::SevenZip);
        assert_eq!(candidates.last().map(|t| t.kind), Some(ToolKind::WinRar));
    }

    #[test]
    fn tool_kind_deserializes_from_config_names() {
        let tool: ExtractionTool =
            serde_yaml::from_str("path: /usr/bin/7z\nkind: 7zip\n").unwrap();
        assert_eq!(tool.kind, ToolKind::SevenZip);
        let kind: ToolKind = serde_yaml::from_str("winrar").unwrap();
        assert_eq!(kind, ToolKind::WinRar);
    }
}
