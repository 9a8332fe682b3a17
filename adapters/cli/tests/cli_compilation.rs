use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "terminal-abyss"])
        .status()
        .expect("failed to invoke cargo check for terminal-abyss CLI binary");

    assert!(status.success(), "cargo check --bin terminal-abyss should succeed");
}

#[test]
fn scripted_run_prints_the_final_frame() {
    let output = Command::new(env!("CARGO_BIN_EXE_terminal-abyss"))
        .args([
            "--seed",
            "42",
            "--columns",
            "40",
            "--rows",
            "12",
            "--script",
            "ww>>e....",
        ])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run terminal-abyss");

    assert!(output.status.success(), "scripted run should succeed");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.starts_with("Welcome to the Terminal Abyss."));
    assert!(stdout.contains("FLOOR "));
    assert!(stdout.trim_end().lines().last().is_some_and(|line| line.starts_with("phase: ")));
}

#[test]
fn unknown_script_tokens_are_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_terminal-abyss"))
        .args(["--seed", "1", "--script", "wq"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run terminal-abyss");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("unknown script token"));
}
