//! Library integration tests.

use modsync::error::WorkflowStep;
use modsync::ModsyncError;
use std::fs;
use tempfile::TempDir;

#[test]
fn error_types_are_public() {
    let err = ModsyncError::DirectoryNotFound {
        path: "/games/r6/HeatedMetal".into(),
    };
    assert!(err.to_string().contains("HeatedMetal"));
}

#[test]
fn workflow_errors_keep_their_root() {
    let err = ModsyncError::Aborted {
        reason: "archive missing".into(),
    }
    .in_step(WorkflowStep::Extracting);

    assert_eq!(err.step(), Some(WorkflowStep::Extracting));
    assert!(matches!(err.root(), ModsyncError::Aborted { .. }));
    assert!(err.to_string().starts_with("Extraction failed"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> modsync::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use modsync::cli::{Cli, Commands};

    let cli = Cli::parse_from(["modsync", "--game-dir", "/games/r6", "status", "--offline"]);
    assert_eq!(cli.game_dir.as_deref(), Some(std::path::Path::new("/games/r6")));

    match cli.command {
        Some(Commands::Status(args)) => assert!(args.offline),
        other => panic!("expected status command, got {other:?}"),
    }
}

#[test]
fn version_comparison_is_public() {
    use modsync::release::{is_newer, same_version, Version};

    assert!(is_newer("v2.0", "1.9.9").unwrap());
    assert!(!is_newer("1.4.0", "v1.4").unwrap());
    assert!(same_version("1.4", "v1.4.0"));

    let parsed: Version = "v1.2.3".parse().unwrap();
    assert_eq!(parsed.to_string(), "1.2.3");
}

#[test]
fn config_parses_from_yaml() {
    use modsync::config::{parse_config, validate};

    let config = parse_config(
        "game_dir: /games/r6\nlayout:\n  stock_file: Stock.dll\n",
        std::path::Path::new("config.yml"),
    )
    .unwrap();
    validate(&config).unwrap();

    assert_eq!(config.game_dir.as_deref(), Some(std::path::Path::new("/games/r6")));
    assert_eq!(config.layout.stock_file, "Stock.dll");
    assert_eq!(config.layout.modified_file, "HeatedMetal.dll");
}

#[test]
fn swapper_is_usable_from_outside_the_crate() {
    use modsync::config::LayoutConfig;
    use modsync::install::{InstallLayout, SwapOutcome, Variant, VariantSwapper};
    use modsync::progress::ProgressEvent;

    let temp = TempDir::new().unwrap();
    let layout = InstallLayout::new(temp.path(), LayoutConfig::default());
    fs::create_dir_all(layout.component_dir()).unwrap();
    fs::write(layout.variant_path(Variant::Stock), "stock").unwrap();

    let mut seen = Vec::new();
    let mut observer = |event: ProgressEvent| seen.push(event.percent);
    let outcome = VariantSwapper::new(layout.clone())
        .swap(&mut observer)
        .unwrap();

    assert_eq!(
        outcome,
        SwapOutcome::Swapped {
            from: Variant::Stock,
            to: Variant::Modified
        }
    );
    assert_eq!(seen.last(), Some(&100));
    assert_eq!(
        fs::read_to_string(layout.variant_path(Variant::Modified)).unwrap(),
        "stock"
    );
}

#[test]
fn progress_events_clamp() {
    use modsync::progress::ProgressEvent;

    assert_eq!(ProgressEvent::new(250).percent, 100);
    assert_eq!(ProgressEvent::from_ratio(1, 4).percent, 25);
    assert_eq!(ProgressEvent::from_ratio(0, 0).percent, 100);
}
