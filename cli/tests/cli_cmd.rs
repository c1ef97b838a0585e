use std::process::Command;

fn run_xagent(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_xagent"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("LOG_FILE")
        .env_remove("PROMPTS_DIR")
        .output()
        .expect("failed to run xagent binary")
}

#[test]
fn help_lists_subcommands() {
    let out = run_xagent(&["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for sub in ["post", "ask", "plan", "tools"] {
        assert!(stdout.contains(sub), "missing {} in {}", sub, stdout);
    }
}

/// **Scenario**: The thread-id help says threads do not outlive the process.
#[test]
fn thread_id_help_states_process_lifetime() {
    let out = run_xagent(&["post", "--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--thread-id"), "{}", stdout);
    assert!(stdout.contains("lasts only for this process"), "{}", stdout);
}

#[test]
fn tools_json_lists_builtins() {
    let out = run_xagent(&["tools", "--json"]);
    assert!(out.status.success());
    let specs: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = specs
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert!(names.contains(&"get_current_weather"));
    assert!(names.contains(&"calculate_cylinder_volume"));
    assert!(names.contains(&"web_search"));
}

#[test]
fn tools_table_has_header() {
    let out = run_xagent(&["tools"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("NAME"));
}

#[test]
fn broken_prompt_override_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("workflow.yaml"), "planner: [unclosed").unwrap();
    let out = run_xagent(&["--prompts-dir", dir.path().to_str().unwrap(), "tools"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("ParseYaml"), "{}", stderr);
}

#[test]
fn post_requires_request() {
    let out = run_xagent(&["post"]);
    assert!(!out.status.success());
}
