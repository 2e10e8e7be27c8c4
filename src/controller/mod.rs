//! Update orchestration.
//!
//! [`UpdateController`] sequences the release check, download, extraction
//! and verification of an update, and runs variant swaps on request.
//!
//! ```text
//! Idle -> CheckingRelease -> UpToDate
//!                         -> Downloading -> Extracting -> Installed
//!                                                      -> Failed
//! any phase -> SwappingVariant -> same phase
//! ```
//!
//! Every component error is wrapped in [`ModsyncError::Workflow`] naming the
//! step that failed; the original error stays reachable through
//! [`ModsyncError::root`].

pub mod archive;
pub mod phase;

pub use archive::{archive_file_name, DownloadedArchive};
pub use phase::{UpdateOutcome, UpdatePhase};

use std::fs;
use std::path::PathBuf;

use crate::config::{require_game_dir, Config};
use crate::download::{ArtifactFetcher, Downloader};
use crate::error::{ModsyncError, Result, WorkflowStep};
use crate::extract::{default_candidates, ArchiveExtractor, ExtractJob, Extractor};
use crate::install::{
    InstallLayout, InstallationState, LiveInspector, StateInspector, SwapOutcome, Variant,
    VariantSwapper,
};
use crate::probe::SystemLibrary;
use crate::progress::ProgressEvent;
use crate::release::{latest_release_url, ReleaseCache, ReleaseInfo, ReleaseResolver, ReleaseSource};
use crate::shell::ResumeState;
use crate::ui::UserInterface;

/// Runs the update and swap workflows for one installation.
pub struct UpdateController {
    releases: Box<dyn ReleaseSource>,
    fetcher: Box<dyn ArtifactFetcher>,
    extractor: Box<dyn Extractor>,
    inspector: Box<dyn StateInspector>,
    swapper: VariantSwapper,
    download_dir: PathBuf,
    config_path: Option<PathBuf>,
    phase: UpdatePhase,
}

impl UpdateController {
    /// Controller for `layout` using the real downloader, extractor and probe.
    pub fn new(
        layout: InstallLayout,
        releases: impl ReleaseSource + 'static,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            releases: Box::new(releases),
            fetcher: Box::new(Downloader::new()),
            extractor: Box::new(ArchiveExtractor::new(default_candidates())),
            inspector: Box::new(LiveInspector::<SystemLibrary>::new(layout.clone())),
            swapper: VariantSwapper::new(layout),
            download_dir: download_dir.into(),
            config_path: None,
            phase: UpdatePhase::Idle,
        }
    }

    /// Controller wired up from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let layout = InstallLayout::new(require_game_dir(config)?, config.layout.clone());
        let cache = ReleaseCache::new(
            config
                .cache_path
                .clone()
                .unwrap_or_else(ReleaseCache::default_path),
        );

        let feed = &config.feed;
        let resolver = ReleaseResolver::new(
            latest_release_url(&feed.api_base, &feed.owner, &feed.repo),
            cache,
        )
        .with_token(feed.token())
        .with_asset(feed.asset_selector());

        Ok(Self::new(layout, resolver, config.download_dir())
            .with_extractor(ArchiveExtractor::new(config.extract.tools.clone())))
    }

    pub fn with_fetcher(mut self, fetcher: impl ArtifactFetcher + 'static) -> Self {
        self.fetcher = Box::new(fetcher);
        self
    }

    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn with_inspector(mut self, inspector: impl StateInspector + 'static) -> Self {
        self.inspector = Box::new(inspector);
        self
    }

    /// Config file to hand to an elevated restart.
    pub fn with_config_path(mut self, config_path: Option<PathBuf>) -> Self {
        self.config_path = config_path;
        self
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    pub fn layout(&self) -> &InstallLayout {
        self.swapper.layout()
    }

    /// Current installation state.
    pub fn inspect(&self) -> Result<InstallationState> {
        self.inspector.inspect()
    }

    /// Latest release from the feed (or its cache).
    pub fn latest_release(&self) -> Result<ReleaseInfo> {
        self.releases.latest_release()
    }

    /// Check for a newer release and install it.
    pub fn run_update(&mut self, ui: &mut dyn UserInterface) -> Result<UpdateOutcome> {
        let result = self.check_and_install(ui);
        self.settle(result)
    }

    /// Continue an update interrupted by an elevated restart, starting at
    /// extraction of the saved archive.
    pub fn resume_update(
        &mut self,
        checkpoint: &ResumeState,
        ui: &mut dyn UserInterface,
    ) -> Result<UpdateOutcome> {
        tracing::info!(
            "Resuming update to {} from {}",
            checkpoint.tag,
            checkpoint.archive.display()
        );

        if !checkpoint.archive.is_file() {
            self.phase = UpdatePhase::Failed;
            return Err(ModsyncError::Aborted {
                reason: format!(
                    "saved archive {} no longer exists; run the update again",
                    checkpoint.archive.display()
                ),
            }
            .in_step(WorkflowStep::Extracting));
        }

        let archive = DownloadedArchive::new(checkpoint.archive.clone());
        let result = self.install(&archive, &checkpoint.tag, ui);
        self.settle(result)
    }

    /// Swap between the stock and modified variants.
    pub fn swap_variant(&mut self, ui: &mut dyn UserInterface) -> Result<SwapOutcome> {
        let previous = self.phase;
        self.phase = UpdatePhase::SwappingVariant;
        let result = self.swap_with_progress(ui);
        self.phase = previous;
        result
    }

    fn settle(&mut self, result: Result<UpdateOutcome>) -> Result<UpdateOutcome> {
        if let Err(e) = &result {
            tracing::debug!("Update failed in phase {}: {}", self.phase, e);
            self.phase = UpdatePhase::Failed;
        }
        result
    }

    fn check_and_install(&mut self, ui: &mut dyn UserInterface) -> Result<UpdateOutcome> {
        self.phase = UpdatePhase::CheckingRelease;
        self.layout()
            .validate_game_dir()
            .map_err(|e| e.in_step(WorkflowStep::CheckingRelease))?;
        let state = self
            .inspector
            .inspect()
            .map_err(|e| e.in_step(WorkflowStep::CheckingRelease))?;
        let release = self
            .releases
            .latest_release()
            .map_err(|e| e.in_step(WorkflowStep::CheckingRelease))?;

        tracing::info!(
            "Latest release is {}, installed version is {}",
            release.tag,
            state.local_version
        );

        if state.variant.is_some() && state.local_version.matches(&release.tag) {
            self.phase = UpdatePhase::UpToDate;
            return Ok(UpdateOutcome::UpToDate {
                version: release.tag,
            });
        }

        if state.variant == Some(Variant::Stock) {
            ui.message("Switching back to the modified variant before updating");
            let previous = self.phase;
            self.phase = UpdatePhase::SwappingVariant;
            self.swap_with_progress(ui)?;
            self.phase = previous;
        }

        self.phase = UpdatePhase::Downloading;
        let archive = self.download(&release, ui)?;
        self.install(&archive, &release.tag, ui)
    }

    fn download(
        &mut self,
        release: &ReleaseInfo,
        ui: &mut dyn UserInterface,
    ) -> Result<DownloadedArchive> {
        fs::create_dir_all(&self.download_dir)
            .map_err(|e| ModsyncError::from(e).in_step(WorkflowStep::Downloading))?;
        let archive = DownloadedArchive::new(
            self.download_dir
                .join(archive_file_name(&release.download_url)),
        );

        let mut bar = ui.start_progress(&format!("Downloading {}", release.tag));
        let fetched = {
            let mut observer = |event: ProgressEvent| bar.set_percent(event.percent);
            self.fetcher
                .fetch(&release.download_url, archive.path(), &mut observer)
        };

        match fetched {
            Ok(bytes) => {
                bar.finish_success(&format!("Downloaded {} ({} bytes)", release.tag, bytes));
                Ok(archive)
            }
            Err(e) => {
                bar.finish_error("Download failed");
                Err(e.in_step(WorkflowStep::Downloading))
            }
        }
    }

    fn install(
        &mut self,
        archive: &DownloadedArchive,
        tag: &str,
        ui: &mut dyn UserInterface,
    ) -> Result<UpdateOutcome> {
        self.phase = UpdatePhase::Extracting;
        let job = ExtractJob {
            archive: archive.path().to_path_buf(),
            output_dir: self.layout().game_dir().to_path_buf(),
            tag: tag.to_string(),
            config_path: self.config_path.clone(),
        };

        ui.message(&format!("Extracting {}", job.archive.display()));
        self.extractor
            .extract(&job, ui)
            .map_err(|e| e.in_step(WorkflowStep::Extracting))?;

        let state = self
            .inspector
            .inspect()
            .map_err(|e| e.in_step(WorkflowStep::Verifying))?;
        let verified = state.local_version.matches(tag);
        if !verified {
            tracing::warn!(
                "Installed version reads as {} but the release is {}",
                state.local_version,
                tag
            );
        }

        self.phase = UpdatePhase::Installed;
        Ok(UpdateOutcome::Installed {
            version: tag.to_string(),
            verified,
        })
    }

    fn swap_with_progress(&mut self, ui: &mut dyn UserInterface) -> Result<SwapOutcome> {
        let mut bar = ui.start_progress("Swapping variant");
        let result = {
            let mut observer = |event: ProgressEvent| bar.set_percent(event.percent);
            self.swapper.swap(&mut observer)
        };

        match result {
            Ok(outcome) => {
                bar.finish_success(&outcome.to_string());
                Ok(outcome)
            }
            Err(e) => {
                bar.finish_error("Swap failed");
                Err(e.in_step(WorkflowStep::SwappingVariant))
            }
        }
    }
}
