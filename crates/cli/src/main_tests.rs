// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::error::ErrorKind;
use clap::Parser;
use simrun_core::{Platform, PlatformMode};

use super::{cli_command, format_error, Cli, Commands};
use crate::output::OutputFormat;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_definition_is_consistent() {
    cli_command().debug_assert();
}

#[test]
fn version_long() {
    let err = cli_command()
        .try_get_matches_from(["simrun", "--version"])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn no_subcommand_is_allowed() {
    assert!(parse(&["simrun"]).command.is_none());
}

#[test]
fn start_defaults_to_parallel() {
    let cli = parse(&["simrun", "start", "sim1", "--config", "/tmp/c.json"]);
    let Some(Commands::Start(args)) = cli.command else {
        panic!("expected start");
    };
    assert_eq!(args.id, "sim1");
    assert_eq!(args.platform, PlatformMode::Parallel);
    assert_eq!(args.config, std::path::PathBuf::from("/tmp/c.json"));
    assert!(!args.follow);
}

#[test]
fn start_accepts_platform_and_follow() {
    let cli = parse(&[
        "simrun", "start", "sim1", "--config", "c.json", "--platform", "reddit", "--follow",
    ]);
    let Some(Commands::Start(args)) = cli.command else {
        panic!("expected start");
    };
    assert_eq!(args.platform, PlatformMode::Reddit);
    assert!(args.follow);
}

#[test]
fn start_rejects_unknown_platform() {
    let err = Cli::try_parse_from([
        "simrun", "start", "sim1", "--config", "c.json", "--platform", "mastodon",
    ])
    .err()
    .unwrap();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
    assert!(err.to_string().contains("mastodon"));
}

#[test]
fn start_requires_config() {
    let err = Cli::try_parse_from(["simrun", "start", "sim1"]).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn output_flag_is_global() {
    let cli = parse(&["simrun", "status", "sim1", "-o", "json"]);
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(matches!(cli.command, Some(Commands::Status { ref id }) if id == "sim1"));
}

#[test]
fn actions_filters() {
    let cli = parse(&[
        "simrun", "actions", "sim1", "--platform", "twitter", "--agent", "7", "-n", "10",
    ]);
    let Some(Commands::Actions(args)) = cli.command else {
        panic!("expected actions");
    };
    assert_eq!(args.platform, Some(Platform::Twitter));
    assert_eq!(args.agent, Some(7));
    assert_eq!(args.round, None);
    assert_eq!(args.limit, 10);
    assert_eq!(args.offset, 0);
}

#[test]
fn list_paging() {
    let cli = parse(&["simrun", "list", "--limit", "5", "--offset", "10"]);
    let Some(Commands::List(args)) = cli.command else {
        panic!("expected list");
    };
    assert_eq!(args.limit, Some(5));
    assert_eq!(args.offset, 10);
}

#[derive(Debug, thiserror::Error)]
#[error("launch failed: {0}")]
struct Wrapping(#[source] std::io::Error);

#[test]
fn format_error_skips_redundant_chain() {
    let err = anyhow::Error::new(Wrapping(std::io::Error::other("no such file")));
    assert_eq!(format_error(&err), "launch failed: no such file");
}

#[test]
fn format_error_keeps_new_context() {
    let err = anyhow::Error::new(std::io::Error::other("permission denied"))
        .context("cannot create state directory /var/simrun");
    assert_eq!(
        format_error(&err),
        "cannot create state directory /var/simrun\n\nCaused by:\n    0: permission denied"
    );
}
