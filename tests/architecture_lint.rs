//! Architecture enforcement lint - keeps the board core free of I/O and clocks.
//!
//! The board controllers (`src/board/*` except `runtime.rs`) take every instant
//! and wall-clock value as a parameter. That is what lets the scenario tests
//! drive them deterministically. Only the runtime task may read clocks, sleep
//! or spawn, and only the runtime owns a `BoardController`; HTTP handlers talk
//! to the board through `BoardHandle`.
//!
//! Test modules (everything after `#[cfg(test)]`) and comments are ignored.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Calls that read a clock, block, spawn or perform I/O
const CORE_DISALLOWED: &[(&str, &str)] = &[
    ("Instant::now(", "take `now: Instant` as a parameter"),
    ("SystemTime::now(", "take `now: Instant` as a parameter"),
    ("Local::now(", "take the local `NaiveDateTime` as a parameter"),
    ("Utc::now(", "take the local `NaiveDateTime` as a parameter"),
    ("tokio::spawn", "only board::runtime spawns"),
    ("sleep(", "arm a TimerSlot and let the runtime sleep"),
    ("sleep_until(", "arm a TimerSlot and let the runtime sleep"),
    ("reqwest::", "fetching belongs in adapters"),
    ("axum::", "HTTP belongs in api/ui"),
    ("std::fs", "persistence belongs in access/config"),
];

/// Files under src/board allowed to drive time
const CORE_EXEMPT: &[&str] = &["runtime.rs", "mod.rs"];

/// Production code only: strip the test module and comment lines.
fn production_source(content: &str) -> String {
    let code = content
        .find("#[cfg(test)]")
        .map_or(content, |pos| &content[..pos]);
    code.lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn rust_files(dir: &Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect()
}

fn src_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src")
}

#[test]
fn board_core_is_clock_and_io_free() {
    let mut violations = Vec::new();

    for path in rust_files(&src_dir().join("board")) {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if CORE_EXEMPT.contains(&name) {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap();
        let code = production_source(&content);

        for (line_no, line) in code.lines().enumerate() {
            for (pattern, fix) in CORE_DISALLOWED {
                if line.contains(pattern) {
                    violations.push(format!(
                        "  {}:{}\n    Found: {}\n    Fix: {}\n",
                        path.display(),
                        line_no + 1,
                        pattern,
                        fix
                    ));
                }
            }
        }
    }

    assert!(
        violations.is_empty(),
        "\n\nARCHITECTURE VIOLATION: board core must stay synchronous and clock-free\n\n{}",
        violations.join("\n")
    );
}

#[test]
fn only_the_runtime_owns_a_controller() {
    let mut owners = Vec::new();

    for path in rust_files(&src_dir()) {
        let content = fs::read_to_string(&path).unwrap();
        if production_source(&content).contains("BoardController::new(") {
            owners.push(path.display().to_string());
        }
    }

    assert_eq!(owners.len(), 1, "BoardController constructed in: {:?}", owners);
    assert!(owners[0].ends_with("runtime.rs"), "found in {}", owners[0]);
}

#[test]
fn handlers_go_through_board_handle() {
    for dir in ["api", "ui"] {
        for path in rust_files(&src_dir().join(dir)) {
            let content = fs::read_to_string(&path).unwrap();
            assert!(
                !production_source(&content).contains("BoardController"),
                "{} reaches into BoardController; use BoardHandle",
                path.display()
            );
        }
    }

    let api_mod = fs::read_to_string(src_dir().join("api").join("mod.rs")).unwrap();
    assert!(
        api_mod.contains("pub board: BoardHandle"),
        "AppState must carry a `pub board: BoardHandle` field"
    );
}
