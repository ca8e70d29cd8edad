//! CLI help specs

use crate::prelude::*;

#[test]
fn no_subcommand_prints_help() {
    cli()
        .passes()
        .stdout_has("Usage: simrun [OPTIONS] [COMMAND]")
        .stdout_has("start")
        .stdout_has("timeline");
}

#[test]
fn help_lists_every_command() {
    let out = cli().args(&["--help"]).passes();
    for command in [
        "start", "stop", "status", "list", "actions", "timeline", "stats", "purge",
    ] {
        assert!(
            out.stdout().contains(command),
            "help is missing {command}:\n{}",
            out.stdout()
        );
    }
}

#[test]
fn start_help_shows_platform_choices() {
    cli()
        .args(&["start", "--help"])
        .passes()
        .stdout_has("--platform")
        .stdout_has("twitter, reddit, or parallel")
        .stdout_has("--follow");
}

#[test]
fn version_flag() {
    cli()
        .args(&["--version"])
        .passes()
        .stdout_has("simrun ");
}
