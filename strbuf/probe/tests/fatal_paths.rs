use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn strbuf_cli() -> Command {
    let mut cmd = Command::cargo_bin("strbuf-probe").expect("strbuf-probe binary built");
    cmd.env_remove("STRBUF_HOOK_LOG");
    cmd
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn concat_that_fits_exactly_succeeds() {
    strbuf_cli()
        .args(["concat", "--capacity", "8", "--initial", "ab", "--source", "cdefg"])
        .assert()
        .success()
        .stdout("abcdefg len=7\n");
}

#[test]
fn concat_one_byte_over_aborts() {
    let assert = strbuf_cli()
        .args(["concat", "--capacity", "8", "--initial", "ab", "--source", "cdefgh"])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(
        stderr.contains("overflow while appending source to destination failed at "),
        "unexpected stderr: {stderr}"
    );
    assert!(stderr.contains("main.rs:"), "location missing: {stderr}");
    assert!(assert.get_output().stdout.is_empty());
}

#[test]
fn copy_does_not_truncate() {
    let assert = strbuf_cli()
        .args(["copy", "--capacity", "8", "--source", "0123456789"])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(stderr.contains("overflow while copying source to destination failed at "));
}

#[test]
fn checked_copy_reports_instead_of_aborting() {
    let assert = strbuf_cli()
        .args(["--checked", "copy", "--capacity", "8", "--source", "0123456789"])
        .assert()
        .failure()
        .code(1);
    let stderr = stderr_of(assert.get_output());
    assert!(stderr.contains("11 bytes (content + terminator) fit in capacity 8"));
    assert!(!stderr.contains("failed at"));
}

#[test]
fn append_respects_max_count() {
    strbuf_cli()
        .args([
            "append", "--capacity", "8", "--initial", "ab", "--source", "0123456789", "--max", "5",
        ])
        .assert()
        .success()
        .stdout("ab01234 len=7\n");
}

#[test]
fn unterminated_fixed_source_aborts() {
    let assert = strbuf_cli()
        .args([
            "concat",
            "--capacity",
            "64",
            "--source",
            "abcd",
            "--source-capacity",
            "4",
        ])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(stderr.contains("source terminated within 4 bytes failed at "));
}

#[test]
fn unterminated_buffer_length_aborts() {
    let assert = strbuf_cli()
        .args(["len", "--capacity", "4", "--initial", "full"])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(stderr.contains("sequence terminated within 4 bytes failed at "));
}

#[test]
fn zero_capacity_copy_aborts() {
    let assert = strbuf_cli()
        .args(["copy", "--capacity", "0", "--source", ""])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(stderr.contains("destination capacity != 0 failed at "));
}

#[test]
fn missing_operands_abort() {
    let assert = strbuf_cli()
        .args(["null", "--missing", "source"])
        .assert()
        .failure();
    assert!(stderr_of(assert.get_output()).contains("source != NULL failed at "));

    let assert = strbuf_cli()
        .args(["null", "--missing", "destination"])
        .assert()
        .failure();
    assert!(stderr_of(assert.get_output()).contains("destination != NULL failed at "));
}

#[test]
fn explicit_capacity_is_enforced() {
    strbuf_cli()
        .args(["lcat", "--capacity", "32", "--explicit", "6", "--source", "abcde"])
        .assert()
        .success()
        .stdout("abcde len=5\n");

    let assert = strbuf_cli()
        .args(["lcat", "--capacity", "32", "--explicit", "6", "--source", "abcdef"])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(stderr.contains("overflow while copying source to destination failed at "));
}

#[test]
fn fatal_assert_names_the_condition() {
    strbuf_cli()
        .args(["check", "--value", "1", "--limit", "2"])
        .assert()
        .success()
        .stdout("ok\n");

    let assert = strbuf_cli()
        .args(["check", "--value", "3", "--limit", "2"])
        .assert()
        .failure();
    assert!(stderr_of(assert.get_output()).contains("value < limit failed at "));
}

#[test]
fn hook_runs_before_abort() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let hook_log = temp.path().join("hook.log");

    let assert = strbuf_cli()
        .arg("--hook-log")
        .arg(&hook_log)
        .args(["concat", "--capacity", "4", "--source", "long"])
        .assert()
        .failure();
    assert!(stderr_of(assert.get_output()).contains("failed at "));

    let logged = fs::read_to_string(&hook_log)?;
    assert!(
        logged.starts_with("hook: overflow while appending source to destination at "),
        "unexpected hook log: {logged}"
    );
    assert_eq!(logged.lines().count(), 1);
    Ok(())
}

#[test]
fn hook_is_silent_on_success() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let hook_log = temp.path().join("hook.log");

    strbuf_cli()
        .env("STRBUF_HOOK_LOG", &hook_log)
        .args(["copy", "--capacity", "8", "--source", "fine"])
        .assert()
        .success();
    assert!(!hook_log.exists());
    Ok(())
}

#[test]
fn naming_macros_report_both_operands() {
    strbuf_cli()
        .args(["named", "--capacity", "8", "--source", "short"])
        .assert()
        .success()
        .stdout("short len=5\n");

    let assert = strbuf_cli()
        .args(["named", "--capacity", "8", "--source", "0123456789"])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(
        stderr.contains("overflow while copying 'source_text' to 'dest_buf' failed at "),
        "unexpected stderr: {stderr}"
    );
    assert!(stderr.contains("main.rs:"), "location missing: {stderr}");

    let assert = strbuf_cli()
        .args(["named", "--capacity", "4", "--source", "abcdef", "--max", "4"])
        .assert()
        .failure();
    let stderr = stderr_of(assert.get_output());
    assert!(
        stderr.contains("overflow while appending 'source_text' to 'dest_buf' failed at "),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn bounded_macro_append_within_limit() {
    strbuf_cli()
        .args(["named", "--capacity", "4", "--source", "abcdef", "--max", "3"])
        .assert()
        .success()
        .stdout("abc len=3\n");
}

#[test]
fn fatal_abort_is_unconditional() {
    let assert = strbuf_cli()
        .args(["abort", "--reason", "unreachable state"])
        .assert()
        .failure();
    let output = assert.get_output();
    let stderr = stderr_of(output);
    let line = stderr
        .lines()
        .find(|line| line.starts_with("unreachable state failed at "))
        .unwrap_or_else(|| panic!("no failure line in: {stderr}"));
    let (_, line_number) = line.rsplit_once(':').expect("file:line location");
    assert!(line.contains("main.rs:"), "location missing: {line}");
    assert!(line_number.parse::<u32>().is_ok(), "bad line number: {line}");
    assert!(output.stdout.is_empty());
}

#[test]
fn panicking_hook_still_terminates() {
    let assert = strbuf_cli()
        .args(["--hook-panics", "concat", "--capacity", "4", "--source", "long"])
        .assert()
        .failure();
    let output = assert.get_output();
    assert!(stderr_of(output).contains("hook panicked on overflow while appending"));
    assert!(output.stdout.is_empty());
}
