//! Archive extraction through an external tool.
//!
//! [`ArchiveExtractor`] finds an installed extraction program, runs it with
//! the installation root as working directory, and classifies failures.
//! When the failure looks like antivirus interference it offers to add a
//! temporary exclusion for the archive's directory and retries exactly once,
//! restarting elevated first if the process lacks administrator rights.

pub mod classify;
pub mod exclusion;
pub mod tool;

pub use classify::{classify_failure, FailureClass};
pub use exclusion::{DefenderExclusions, ExclusionManager};
pub use tool::{default_candidates, locate, ExtractionTool, ToolKind};

use std::path::{Path, PathBuf};

use crate::error::{ModsyncError, Result};
use crate::shell::{run_program, CommandOptions, CommandResult, Elevation, ResumeState, SystemElevation};
use crate::ui::UserInterface;

/// Runs an extraction tool.
pub trait ToolRunner {
    fn run(&self, tool: &ExtractionTool, archive: &Path, dest: &Path) -> Result<CommandResult>;
}

/// Runs the tool as a child process with `dest` as working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, tool: &ExtractionTool, archive: &Path, dest: &Path) -> Result<CommandResult> {
        let options = CommandOptions {
            cwd: Some(dest.to_path_buf()),
            ..Default::default()
        };
        run_program(&tool.executable, tool.kind.args(archive, dest), &options)
    }
}

/// One extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractJob {
    /// Archive to extract.
    pub archive: PathBuf,
    /// Installation root the archive unpacks into.
    pub output_dir: PathBuf,
    /// Release tag being installed, recorded in the resume checkpoint.
    pub tag: String,
    /// Config file of this run, so a restarted process loads the same one.
    pub config_path: Option<PathBuf>,
}

impl ExtractJob {
    /// Checkpoint that lets an elevated restart continue this job.
    pub fn checkpoint(&self) -> ResumeState {
        ResumeState::new(self.output_dir.clone(), self.archive.clone(), self.tag.clone())
            .with_config_path(self.config_path.clone())
    }

    /// Directory excluded from antivirus scanning during recovery.
    pub fn exclusion_dir(&self) -> PathBuf {
        self.archive
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.output_dir.clone())
    }
}

/// Anything that can unpack a release archive.
pub trait Extractor {
    fn extract(&self, job: &ExtractJob, ui: &mut dyn UserInterface) -> Result<()>;
}

/// Extracts archives with 7-Zip or WinRAR.
pub struct ArchiveExtractor {
    candidates: Vec<ExtractionTool>,
    runner: Box<dyn ToolRunner>,
    exclusions: Box<dyn ExclusionManager>,
    elevation: Box<dyn Elevation>,
}

impl ArchiveExtractor {
    /// Extractor probing `candidates` in order, using the real system.
    pub fn new(candidates: Vec<ExtractionTool>) -> Self {
        Self {
            candidates,
            runner: Box::new(ProcessRunner),
            exclusions: Box::new(DefenderExclusions::new()),
            elevation: Box::new(SystemElevation),
        }
    }

    pub fn with_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_exclusions(mut self, exclusions: impl ExclusionManager + 'static) -> Self {
        self.exclusions = Box::new(exclusions);
        self
    }

    pub fn with_elevation(mut self, elevation: impl Elevation + 'static) -> Self {
        self.elevation = Box::new(elevation);
        self
    }

    /// Extract `job.archive` into `job.output_dir`.
    pub fn extract(&self, job: &ExtractJob, ui: &mut dyn UserInterface) -> Result<()> {
        let tool = locate(&self.candidates)?;
        tracing::info!(
            "Extracting {} with {}",
            job.archive.display(),
            tool.kind.name()
        );

        let result = self.runner.run(&tool, &job.archive, &job.output_dir)?;
        tracing::debug!(
            "{} exited with {:?} after {:?}",
            tool.kind.name(),
            result.exit_code,
            result.duration
        );
        if result.success {
            return Ok(());
        }

        match classify_failure(result.exit_code, &result.stderr) {
            FailureClass::Blocked => self.recover_blocked(&tool, job, result, ui),
            class => Err(failure_error(job, result, class)),
        }
    }

    fn recover_blocked(
        &self,
        tool: &ExtractionTool,
        job: &ExtractJob,
        failed: CommandResult,
        ui: &mut dyn UserInterface,
    ) -> Result<()> {
        tracing::warn!("Extraction blocked: {}", failed.stderr.trim());

        if !self.exclusions.is_supported() {
            return Err(failure_error(job, failed, FailureClass::Blocked));
        }

        let dir = job.exclusion_dir();
        ui.warning("Extraction was blocked, most likely by antivirus software.");
        let question = format!(
            "Add a temporary antivirus exclusion for {} and retry?",
            dir.display()
        );
        if !ui.confirm("add_exclusion", &question, false)? {
            return Err(ModsyncError::Aborted {
                reason: "antivirus exclusion declined".to_string(),
            });
        }

        if !self.elevation.is_elevated() {
            let restart = ui.confirm(
                "restart_elevated",
                "Adding an exclusion needs administrator rights. Restart as administrator?",
                false,
            )?;
            if !restart {
                return Err(ModsyncError::ElevationRequired {
                    operation: format!("add an antivirus exclusion for {}", dir.display()),
                });
            }
            let never = self.elevation.relaunch(&job.checkpoint())?;
            match never {}
        }

        self.exclusions.add(&dir)?;
        let retried = self.runner.run(tool, &job.archive, &job.output_dir);
        if let Err(e) = self.exclusions.remove(&dir) {
            tracing::warn!("Could not remove antivirus exclusion: {}", e);
        }

        let retried = retried?;
        if retried.success {
            tracing::info!("Extraction succeeded after adding exclusion");
            return Ok(());
        }

        let class = classify_failure(retried.exit_code, &retried.stderr);
        Err(failure_error(job, retried, class))
    }
}

impl Extractor for ArchiveExtractor {
    fn extract(&self, job: &ExtractJob, ui: &mut dyn UserInterface) -> Result<()> {
        ArchiveExtractor::extract(self, job, ui)
    }
}

fn failure_error(job: &ExtractJob, result: CommandResult, class: FailureClass) -> ModsyncError {
    let stderr = result.stderr;
    match class {
        FailureClass::Blocked => ModsyncError::AntivirusBlocked {
            archive: job.archive.clone(),
            stderr,
        },
        FailureClass::Transient | FailureClass::Fatal => ModsyncError::ExtractionFailed {
            exit_code: result.exit_code,
            stderr,
            transient: class == FailureClass::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::convert::Infallible;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ok() -> CommandResult {
        CommandResult::success(String::new(), String::new(), Duration::ZERO)
    }

    fn failed(code: i32, stderr: &str) -> CommandResult {
        CommandResult::failure(Some(code), String::new(), stderr.to_string(), Duration::ZERO)
    }

    struct FakeRunner {
        results: RefCell<VecDeque<CommandResult>>,
        calls: Rc<Cell<usize>>,
    }

    impl FakeRunner {
        fn new(results: Vec<CommandResult>) -> (Self, Rc<Cell<usize>>) {
            let calls = Rc::new(Cell::new(0));
            (
                Self {
                    results: RefCell::new(results.into()),
                    calls: Rc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl ToolRunner for FakeRunner {
        fn run(&self, _: &ExtractionTool, _: &Path, _: &Path) -> Result<CommandResult> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.results.borrow_mut().pop_front().unwrap_or_else(ok))
        }
    }

    #[derive(Default, Clone)]
    struct FakeExclusions {
        unsupported: bool,
        fail_remove: bool,
        added: Rc<RefCell<Vec<PathBuf>>>,
        removed: Rc<RefCell<Vec<PathBuf>>>,
    }

    impl ExclusionManager for FakeExclusions {
        fn is_supported(&self) -> bool {
            !self.unsupported
        }

        fn add(&self, path: &Path) -> Result<()> {
            self.added.borrow_mut().push(path.to_path_buf());
            Ok(())
        }

        fn remove(&self, path: &Path) -> Result<()> {
            self.removed.borrow_mut().push(path.to_path_buf());
            if self.fail_remove {
                return Err(ModsyncError::ExclusionFailed {
                    path: path.to_path_buf(),
                    message: "denied".into(),
                });
            }
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct FakeElevation {
        elevated: bool,
        relaunched: Rc<RefCell<Option<ResumeState>>>,
    }

    impl Elevation for FakeElevation {
        fn is_elevated(&self) -> bool {
            self.elevated
        }

        fn relaunch(&self, checkpoint: &ResumeState) -> Result<Infallible> {
            *self.relaunched.borrow_mut() = Some(checkpoint.clone());
            // Stands in for the process exiting
            Err(ModsyncError::Aborted {
                reason: "relaunched".into(),
            })
        }
    }

    struct Fixture {
        temp: TempDir,
        job: ExtractJob,
        candidates: Vec<ExtractionTool>,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("7z.exe");
        std::fs::write(&tool, "").unwrap();
        let downloads = temp.path().join("downloads");
        let game = temp.path().join("game");
        std::fs::create_dir_all(&downloads).unwrap();
        std::fs::create_dir_all(&game).unwrap();

        Fixture {
            job: ExtractJob {
                archive: downloads.join("HeatedMetal.7z"),
                output_dir: game,
                tag: "v1.4.0".into(),
                config_path: None,
            },
            candidates: vec![ExtractionTool::new(tool, ToolKind::SevenZip)],
            temp,
        }
    }

    fn elevated() -> FakeElevation {
        FakeElevation {
            elevated: true,
            ..Default::default()
        }
    }

    #[test]
    fn success_runs_tool_once() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![ok()]);
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(FakeExclusions::default())
            .with_elevation(elevated());

        extractor.extract(&fx.job, &mut MockUI::new()).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn missing_tool_is_tool_not_found() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![]);
        let extractor = ArchiveExtractor::new(vec![ExtractionTool::new(
            "/nope/7z.exe",
            ToolKind::SevenZip,
        )])
        .with_runner(runner);

        let err = extractor.extract(&fx.job, &mut MockUI::new()).unwrap_err();
        assert!(matches!(err, ModsyncError::ToolNotFound { .. }));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn access_denied_retries_exactly_once_after_granted_exclusion() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![failed(2, "ERROR: Access is denied."), ok()]);
        let exclusions = FakeExclusions::default();
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(exclusions.clone())
            .with_elevation(elevated());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "yes");

        extractor.extract(&fx.job, &mut ui).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(ui.prompts_shown(), &["add_exclusion".to_string()]);
        let dir = fx.job.exclusion_dir();
        assert_eq!(*exclusions.added.borrow(), vec![dir.clone()]);
        assert_eq!(*exclusions.removed.borrow(), vec![dir]);
    }

    #[test]
    fn access_denied_is_not_retried_when_declined() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![failed(2, "access denied"), ok()]);
        let exclusions = FakeExclusions::default();
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(exclusions.clone())
            .with_elevation(elevated());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "no");

        let err = extractor.extract(&fx.job, &mut ui).unwrap_err();

        assert!(matches!(err, ModsyncError::Aborted { .. }));
        assert_eq!(calls.get(), 1);
        assert!(exclusions.added.borrow().is_empty());
    }

    #[test]
    fn relaunch_checkpoint_carries_the_config_file() {
        let mut fx = fixture();
        let config = fx.temp.path().join("custom.yml");
        fx.job.config_path = Some(config.clone());
        let (runner, _) = FakeRunner::new(vec![failed(2, "Access denied")]);
        let elevation = FakeElevation::default();
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(FakeExclusions::default())
            .with_elevation(elevation.clone());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "yes");
        ui.set_prompt_response("restart_elevated", "yes");
        let _ = extractor.extract(&fx.job, &mut ui);

        let checkpoint = elevation.relaunched.borrow().clone().unwrap();
        assert_eq!(checkpoint.config_path.as_ref(), Some(&config));
        let args = checkpoint.relaunch_args();
        assert_eq!(args[0], "--config");
        assert_eq!(PathBuf::from(&args[1]), config);
    }

    #[test]
    fn second_failure_is_surfaced_and_exclusion_still_removed() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![
            failed(2, "Access is denied"),
            failed(2, "Can not open the file as archive"),
        ]);
        let exclusions = FakeExclusions::default();
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(exclusions.clone())
            .with_elevation(elevated());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "yes");

        let err = extractor.extract(&fx.job, &mut ui).unwrap_err();
        assert!(matches!(
            err,
            ModsyncError::ExtractionFailed {
                exit_code: Some(2),
                transient: false,
                ..
            }
        ));
        assert_eq!(calls.get(), 2);
        assert_eq!(exclusions.removed.borrow().len(), 1);
    }

    #[test]
    fn exclusion_removal_failure_is_not_escalated() {
        let fx = fixture();
        let (runner, _) = FakeRunner::new(vec![failed(2, "blocked"), ok()]);
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(FakeExclusions {
                fail_remove: true,
                ..Default::default()
            })
            .with_elevation(elevated());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "yes");

        extractor.extract(&fx.job, &mut ui).unwrap();
    }

    #[test]
    fn unsupported_exclusions_report_antivirus_blocked() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![failed(2, "file contains a virus")]);
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(FakeExclusions {
                unsupported: true,
                ..Default::default()
            })
            .with_elevation(elevated());

        let mut ui = MockUI::new();
        let err = extractor.extract(&fx.job, &mut ui).unwrap_err();

        match err {
            ModsyncError::AntivirusBlocked { archive, stderr } => {
                assert_eq!(archive, fx.job.archive);
                assert!(stderr.contains("virus"));
            }
            other => panic!("expected AntivirusBlocked, got {other}"),
        }
        assert_eq!(calls.get(), 1);
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn not_elevated_and_declined_restart_requires_elevation() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![failed(2, "Access denied")]);
        let elevation = FakeElevation::default();
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(FakeExclusions::default())
            .with_elevation(elevation.clone());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "yes");
        ui.set_prompt_response("restart_elevated", "no");

        let err = extractor.extract(&fx.job, &mut ui).unwrap_err();
        assert!(matches!(err, ModsyncError::ElevationRequired { .. }));
        assert_eq!(calls.get(), 1);
        assert!(elevation.relaunched.borrow().is_none());
    }

    #[test]
    fn not_elevated_and_accepted_restart_relaunches_with_checkpoint() {
        let fx = fixture();
        let (runner, calls) = FakeRunner::new(vec![failed(2, "Access denied")]);
        let elevation = FakeElevation::default();
        let exclusions = FakeExclusions::default();
        let extractor = ArchiveExtractor::new(fx.candidates.clone())
            .with_runner(runner)
            .with_exclusions(exclusions.clone())
            .with_elevation(elevation.clone());

        let mut ui = MockUI::new();
        ui.set_prompt_response("add_exclusion", "yes");
        ui.set_prompt_response("restart_elevated", "yes");

        let _ = extractor.extract(&fx.job, &mut ui);

        let checkpoint = elevation.relaunched.borrow().clone().unwrap();
        assert_eq!(checkpoint.archive, fx.job.archive);
        assert_eq!(checkpoint.game_dir, fx.job.output_dir);
        assert_eq!(checkpoint.tag, "v1.4.0");
        assert_eq!(calls.get(), 1);
        assert!(exclusions.added.borrow().is_empty());
    }

    #[test]
    fn transient_failure_is_retryable_extraction_error() {
        let fx = fixture();
        let (runner, _) = FakeRunner::new(vec![failed(
            2,
            "The process cannot access the file because it is being used by another process.",
        )]);
        let extractor = ArchiveExtractor::new(fx.candidates.clone()).with_runner(runner);

        let err = extractor.extract(&fx.job, &mut MockUI::new()).unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            err,
            ModsyncError::ExtractionFailed {
                transient: true,
                ..
            }
        ));
    }

    #[test]
    fn exclusion_dir_is_archive_parent() {
        let job = ExtractJob {
            archive: PathBuf::from("/tmp/modsync/HeatedMetal.7z"),
            output_dir: PathBuf::from("/games/r6"),
            tag: "v1".into(),
            config_path: None,
        };
        assert_eq!(job.exclusion_dir(), PathBuf::from("/tmp/modsync"));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn script(dir: &Path, body: &str) -> ExtractionTool {
            let path = dir.join("fake-7z");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            ExtractionTool::new(path, ToolKind::SevenZip)
        }

        #[test]
        fn runs_tool_in_output_dir_with_seven_zip_args() {
            let fx = fixture();
            let tool = script(
                fx.temp.path(),
                "printf '%s\\n' \"$@\" > invoked-args.txt",
            );
            let extractor = ArchiveExtractor::new(vec![tool]);

            extractor.extract(&fx.job, &mut MockUI::new()).unwrap();

            let args = std::fs::read_to_string(fx.job.output_dir.join("invoked-args.txt")).unwrap();
            let lines: Vec<_> = args.lines().collect();
            assert_eq!(lines[0], "x");
            assert_eq!(lines[1], fx.job.archive.to_string_lossy());
            assert_eq!(lines[2], format!("-o{}", fx.job.output_dir.display()));
            assert_eq!(lines[3], "-y");
        }

        #[test]
        fn nonzero_exit_surfaces_stderr() {
            let fx = fixture();
            let tool = script(fx.temp.path(), "echo 'Headers Error' >&2\nexit 2");
            let extractor = ArchiveExtractor::new(vec![tool]);

            let err = extractor.extract(&fx.job, &mut MockUI::new()).unwrap_err();
            assert!(err.to_string().ends_with(": Headers Error"));
            match err {
                ModsyncError::ExtractionFailed {
                    exit_code, stderr, ..
                } => {
                    assert_eq!(exit_code, Some(2));
                    assert_eq!(stderr, "Headers Error\n");
                }
                other => panic!("expected ExtractionFailed, got {other}"),
            }
        }
    }
}
