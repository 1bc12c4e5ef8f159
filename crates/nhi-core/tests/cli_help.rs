//! CLI help output tests for nhi-core.
//!
//! These tests verify that all commands and subcommands correctly display
//! their help text without errors.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the nhi-core binary.
fn nhi_core() -> Command {
    cargo_bin_cmd!("nhi-core")
}

mod top_level {
    use super::*;

    #[test]
    fn help_flag_works() {
        nhi_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("inspection timing"));
    }

    #[test]
    fn help_subcommand_works() {
        nhi_core()
            .arg("help")
            .assert()
            .success()
            .stdout(predicate::str::contains("inspection timing"));
    }

    #[test]
    fn version_flag_works() {
        nhi_core()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("nhi-core"));
    }

    #[test]
    fn no_command_prints_help() {
        nhi_core()
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }

    #[test]
    fn help_shows_all_commands() {
        nhi_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("mechanism"))
            .stdout(predicate::str::contains("time-share"))
            .stdout(predicate::str::contains("outcomes"))
            .stdout(predicate::str::contains("sample"))
            .stdout(predicate::str::contains("config"))
            .stdout(predicate::str::contains("version"));
    }

    #[test]
    fn help_shows_global_options() {
        nhi_core()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--format"))
            .stdout(predicate::str::contains("--model"))
            .stdout(predicate::str::contains("--log-format"))
            .stdout(predicate::str::contains("--verbose"));
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn mechanism_help() {
        nhi_core()
            .args(["mechanism", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--predictability"))
            .stdout(predicate::str::contains("--ui-scale"))
            .stdout(predicate::str::contains("--weeks"));
    }

    #[test]
    fn time_share_help() {
        nhi_core()
            .args(["time-share", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--hazard"))
            .stdout(predicate::str::contains("--shape"))
            .stdout(predicate::str::contains("--target"));
    }

    #[test]
    fn outcomes_help_lists_subcommands() {
        nhi_core()
            .args(["outcomes", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("lookup"))
            .stdout(predicate::str::contains("interpolate"))
            .stdout(predicate::str::contains("scenarios"))
            .stdout(predicate::str::contains("--table"));
    }

    #[test]
    fn outcomes_interpolate_help() {
        nhi_core()
            .args(["outcomes", "interpolate", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--frequency"))
            .stdout(predicate::str::contains("--metric"));
    }

    #[test]
    fn sample_help() {
        nhi_core()
            .args(["sample", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--seed"))
            .stdout(predicate::str::contains("--count"));
    }

    #[test]
    fn config_help_lists_subcommands() {
        nhi_core()
            .args(["config", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("show"))
            .stdout(predicate::str::contains("validate"))
            .stdout(predicate::str::contains("schema"));
    }
}

mod invalid_options {
    use super::*;

    #[test]
    fn unknown_flag_is_args_error() {
        nhi_core()
            .arg("--nonexistent-flag")
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn invalid_format_value_fails() {
        nhi_core()
            .args(["--format", "yaml", "version"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn predictability_out_of_u8_range_fails() {
        nhi_core()
            .args(["mechanism", "--predictability", "300"])
            .assert()
            .code(10);
    }
}
