use std::process::{Command, Output};
use tempfile::TempDir;

struct Workspace {
    home: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        let cache_dir = self.home.path().join("cache");
        Command::new(env!("CARGO_BIN_EXE_workbench"))
            .args(args)
            .arg("--cache-dir")
            .arg(&cache_dir)
            .env("XDG_CONFIG_HOME", self.home.path().join("config"))
            .env_remove("WORKBENCH_CACHE_DIR")
            .env_remove("WORKBENCH_CACHE_BACKEND")
            .env_remove("WORKBENCH_CACHE_NAMESPACE")
            .env_remove("WORKBENCH_API_URL")
            .env("WORKBENCH_LOG", "warn")
            .output()
            .unwrap()
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "workbench {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

#[test]
fn test_edit_marks_file_stale_and_persists() {
    let workspace = Workspace::new();

    workspace.stdout(&["cache", "edit", "notebooks/a.py", "--content", "x = 1"]);
    assert_eq!(workspace.stdout(&["cache", "stale", "notebooks/a.py"]).trim(), "true");

    let listing = workspace.stdout(&["cache", "list"]);
    assert_eq!(listing.trim(), "stale\tnotebooks/a.py");

    let shown: serde_json::Value =
        serde_json::from_str(&workspace.stdout(&["cache", "show", "notebooks/a.py"])).unwrap();
    assert_eq!(shown["client"]["file"]["content"], "x = 1");
    assert!(shown.get("server").is_none());
}

#[test]
fn test_remove_forgets_entry() {
    let workspace = Workspace::new();

    workspace.stdout(&["cache", "edit", "a.py", "--content", "y"]);
    workspace.stdout(&["cache", "remove", "a.py"]);

    assert_eq!(workspace.stdout(&["cache", "stale", "a.py"]).trim(), "false");
    assert!(!workspace.run(&["cache", "show", "a.py"]).status.success());
}

#[test]
fn test_replay_prints_group_views() {
    let workspace = Workspace::new();
    let log = workspace.home.path().join("events.jsonl");
    std::fs::write(
        &log,
        concat!(
            r#"{"result_id":"1","status":"running","type":"stdout","timestamp":1000,"process":{"message_request_uuid":"b"},"output":"hello"}"#,
            "\n",
            r#"{"result_id":"1","status":"success","type":"status","timestamp":1500,"process":{"message_request_uuid":"a"}}"#,
            "\n",
        ),
    )
    .unwrap();

    let stdout = workspace.stdout(&["replay", log.to_str().unwrap()]);
    let views: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&stdout)
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0]["view"]["group_id"], "a");
    assert_eq!(views[0]["status"], "success");
    assert_eq!(views[1]["executing"], true);
    assert_eq!(views[1]["view"]["text_blocks"][0]["text"], "hello");
}
