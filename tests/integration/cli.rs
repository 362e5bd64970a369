use std::io::Write;
use std::process::{Command, Stdio};

use crate::{load_png, svg};

fn cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_svg-png-export"));
    cmd.arg("--skip-system-fonts").arg("--quiet");
    cmd
}

#[test]
fn file_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.md");
    std::fs::write(
        &input,
        format!("## Diagram\n\n{}\n", svg(r#"viewBox="0 0 50 25""#, "")),
    )
    .unwrap();

    let status = cmd()
        .args(["-s", "3x", "--date", "2025-01-02", "-o"])
        .arg(dir.path())
        .arg(&input)
        .status()
        .unwrap();
    assert!(status.success());

    let data = std::fs::read(dir.path().join("diagram-2025-01-02-3x.png")).unwrap();
    let img = load_png(&data);
    assert_eq!((img.width, img.height), (150, 75));
}

#[test]
fn stdin_to_stdout() {
    let mut child = cmd()
        .args(["--scale=6x", "-", "-c"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(svg(r#"viewBox="0 0 4 2""#, "").as_bytes())
        .unwrap();

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let img = load_png(&output.stdout);
    assert_eq!((img.width, img.height), (24, 12));
}

#[test]
fn no_svg_found() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "nothing to see").unwrap();

    let output = cmd().arg("-o").arg(dir.path()).arg(&input).output().unwrap();
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No SVG found!"), "{}", stderr);
}

#[test]
fn invalid_scale() {
    let output = cmd().args(["-s", "0.5x", "in.svg"]).output().unwrap();
    assert!(!output.status.success());
}
