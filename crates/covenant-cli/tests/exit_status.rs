//! End-to-end tests for the `covenant` binary: a failed check must end the
//! process with status 1 and a single diagnostic on stderr.

use std::process::{Command, Output};

fn covenant(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_covenant"))
        .args(args)
        .output()
        .expect("failed to spawn covenant binary")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn all_true_exits_zero_and_logs_nothing() {
    let output = covenant(&["check", "true", "true", "true"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).is_empty(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Condition passed: 3 expression(s)"));
}

#[test]
fn second_of_three_terminates_with_status_one() {
    let output = covenant(&["check", "true", "false", "true"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.contains("Condition failed: expression 2 of 3"), "stderr: {}", err);
    assert!(err.contains("in function covenant::run_check in file main.rs"), "stderr: {}", err);
    assert!(err.contains("Terminating!"), "stderr: {}", err);
    assert_eq!(err.matches("failed: expression").count(), 1);
    assert!(stdout(&output).is_empty());
}

#[test]
fn diagnostic_fields_stay_on_the_message_line() {
    let output = covenant(&["check", "true", "false", "true"]);
    let err = stderr(&output);

    let message = err
        .lines()
        .find(|line| line.contains("failed: expression"))
        .unwrap_or_else(|| panic!("no diagnostic line in stderr: {}", err));
    assert!(message.contains("position=2"), "line: {}", message);
    assert!(message.contains("count=3"), "line: {}", message);
    assert!(!message.contains("Terminating!"), "line: {}", message);
    assert!(err.lines().any(|line| line.trim_end().ends_with("Terminating!")));
}

#[test]
fn logging_off_still_prints_the_diagnostic() {
    let output = covenant(&["--log-level", "off", "check", "true", "false", "true"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.contains("Condition failed: expression 2 of 3"), "stderr: {}", err);
    assert!(err.contains("Terminating!"), "stderr: {}", err);
    assert_eq!(err.matches("failed: expression").count(), 1);
}

#[test]
fn logging_off_still_prints_the_invariant_diagnostic() {
    let output = covenant(&["invariant", "--mutate", "--log-level", "off"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invariant failed: expression 1 of 1"));
}

#[test]
fn first_failure_wins_over_later_ones() {
    let output = covenant(&["check", "--kind", "precondition", "false", "false"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Precondition failed: expression 1 of 2"));
}

#[test]
fn postcondition_label_is_used() {
    let output = covenant(&["check", "-k", "postcondition", "1", "1", "0", "1"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Postcondition failed: expression 3 of 4"));
}

#[test]
fn unchanged_record_passes_repeated_checks() {
    let output = covenant(&["invariant", "--checks", "3"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Invariant held across 3 check(s)"));
    assert!(stderr(&output).is_empty());
}

#[test]
fn mutated_record_terminates_with_invariant_diagnostic() {
    let output = covenant(&["invariant", "--mutate"]);
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.contains("Invariant failed: expression 1 of 1"), "stderr: {}", err);
    assert!(err.contains("in function covenant::run_invariant"), "stderr: {}", err);
    assert!(err.contains("Terminating!"));
}

#[test]
fn panic_reporter_panics_instead_of_exiting() {
    let output = covenant(&["--reporter", "panic", "check", "false"]);
    assert_eq!(output.status.code(), Some(101));
    assert!(stderr(&output).contains("Condition failed: expression 1 of 1"));
}

#[test]
fn verbose_logs_progress() {
    let output = covenant(&["--verbose", "invariant"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("guard taken"));
}

#[test]
fn missing_results_is_a_usage_error() {
    let output = covenant(&["check"]);
    assert_eq!(output.status.code(), Some(2));
}
