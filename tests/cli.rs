use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

fn pipesh() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pipesh"))
}

/// Runs one line with `-c` inside `dir`.
fn run_line(dir: &Path, line: &str) -> Output {
    pipesh()
        .arg("-c")
        .arg(line)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run pipesh")
}

/// Feeds `script` to an interactive session on stdin.
fn run_session(dir: &Path, script: &str) -> Output {
    let mut child = pipesh()
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn pipesh");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for pipesh")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn output_redirection_truncates() {
    let dir = tempfile::tempdir().unwrap();
    for _ in 0..2 {
        assert!(run_line(dir.path(), "echo hi > out.txt").status.success());
    }
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hi\n");
}

#[test]
fn output_redirection_appends() {
    let dir = tempfile::tempdir().unwrap();
    for _ in 0..2 {
        assert!(run_line(dir.path(), "echo hi >> out.txt").status.success());
    }
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "hi\nhi\n"
    );
}

#[test]
fn input_redirection_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in.txt"), "a\nb\nc\n").unwrap();

    let output = run_line(dir.path(), "wc -l < in.txt");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3");
}

#[test]
fn pipeline_feeds_stages() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_line(dir.path(), "printf 3\\n1\\n2\\n | sort");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n2\n3\n");
}

#[test]
fn long_pipeline_with_both_redirections() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("words.txt"), "b\na\nb\nc\na\n").unwrap();

    let output = run_line(dir.path(), "cat < words.txt | sort | uniq | wc -l > count.txt");
    assert!(output.status.success());
    let count = fs::read_to_string(dir.path().join("count.txt")).unwrap();
    assert_eq!(count.trim(), "3");
}

#[cfg(target_os = "linux")]
#[test]
fn pipeline_descriptors_do_not_leak() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in.txt"), "").unwrap();

    let output = run_line(dir.path(), "ls /proc/self/fd < in.txt | cat | cat > out.txt");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    // 3 is the directory `ls` opens to list itself.
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "0\n1\n2\n3\n"
    );
}

#[test]
fn last_output_redirection_wins() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_line(dir.path(), "echo one > o1 > o2").status.success());
    assert_eq!(fs::read_to_string(dir.path().join("o1")).unwrap(), "");
    assert_eq!(fs::read_to_string(dir.path().join("o2")).unwrap(), "one\n");
}

#[test]
fn empty_segment_is_dropped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one"), "").unwrap();
    fs::write(dir.path().join("two"), "").unwrap();

    let output = run_line(dir.path(), "ls | | wc -l");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "2");
}

#[test]
fn background_returns_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let started = Instant::now();
    let status = pipesh()
        .args(["-c", "sleep 5 &"])
        .current_dir(dir.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("failed to run pipesh");
    assert!(status.success());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn trailing_operator_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_line(dir.path(), "touch made.txt | cat <");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("file name expected after <"));
    assert!(!dir.path().join("made.txt").exists());

    let output = run_line(dir.path(), "touch made.txt >");
    assert!(stderr(&output).contains("file name expected after >"));
    assert!(!dir.path().join("made.txt").exists());
}

#[test]
fn missing_input_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_line(dir.path(), "cat < nope.txt");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nope.txt: file not found"));
}

#[test]
fn unknown_command_is_reported_by_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_line(dir.path(), "definitely-not-a-command-xyz arg");
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr(&output).contains("definitely-not-a-command-xyz: command not found"));
}

#[test]
fn unknown_command_does_not_block_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_line(dir.path(), "definitely-not-a-command-xyz | wc -l");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0");
}

#[test]
fn quotes_are_passed_through() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_line(dir.path(), "echo \"a  b\" | cat");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "\"a b\"\n");
}

#[test]
fn session_cd_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let start = fs::canonicalize(dir.path()).unwrap();
    let sub = start.join("sub");
    fs::create_dir(&sub).unwrap();

    let script = format!(
        "cd sub\npwd > {first}\ncd -\npwd > {second}\nexit\n",
        first = start.join("first.txt").display(),
        second = start.join("second.txt").display(),
    );
    let output = run_session(&start, &script);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let first = fs::read_to_string(start.join("first.txt")).unwrap();
    let second = fs::read_to_string(start.join("second.txt")).unwrap();
    assert_eq!(first.trim(), sub.to_string_lossy());
    assert_eq!(second.trim(), start.to_string_lossy());
}

#[test]
fn session_cd_failure_keeps_directory() {
    let dir = tempfile::tempdir().unwrap();
    let start = fs::canonicalize(dir.path()).unwrap();

    let script = format!(
        "cd /nonexistent-pipesh-dir\npwd > {out}\n",
        out = start.join("pwd.txt").display(),
    );
    let output = run_session(&start, &script);
    assert!(output.status.success());
    assert!(stderr(&output).contains("cd: /nonexistent-pipesh-dir"));

    let pwd = fs::read_to_string(start.join("pwd.txt")).unwrap();
    assert_eq!(pwd.trim(), start.to_string_lossy());
}

#[test]
fn session_stops_at_exit() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_session(dir.path(), "exit\necho after > after.txt\n");
    assert!(output.status.success());
    assert!(!dir.path().join("after.txt").exists());
}
