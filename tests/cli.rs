//! CLI integration tests for the analysis-store binary.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;
use serde_json::Value;
use uuid::Uuid;

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn data_dir_str(&self) -> String {
        self.data_dir().to_string_lossy().to_string()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("analysis-store").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn init(&self, extra: &[&str]) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["admin", "init", "--data-dir", &self.data_dir_str()])
            .args(extra)
            .assert()
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .args(["--data-dir", &self.data_dir_str(), "--json"])
            .output()
            .expect("failed to run command");
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        serde_json::from_slice(&output.stdout).expect("failed to parse JSON")
    }

    fn add_user(&self) -> String {
        let user = self.json(&["admin", "user", "add"]);
        user["id"].as_str().expect("id not a string").to_string()
    }

    fn insert(&self, identity: &str, user_id: &str, team: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args([
                "analysis",
                "insert",
                "--data-dir",
                &self.data_dir_str(),
                "--as",
                identity,
                "--user-id",
                user_id,
                "--team",
                team,
            ])
            .assert()
    }

    fn list_as(&self, identity: &str) -> Vec<Value> {
        self.json(&["analysis", "list", "--as", identity])
            .as_array()
            .expect("list not an array")
            .clone()
    }
}

#[test]
fn init_creates_database_and_config() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    assert!(ctx.data_dir().join("analyses.db").exists());
    assert!(ctx.data_dir().join("config.toml").exists());

    let info = ctx.json(&["admin", "info"]);
    assert_eq!(info["users"], 0);
    assert_eq!(info["analyses"], 0);
    assert_eq!(info["insert_policy"], false);
    assert_eq!(info["policies"][0], "Users can view their own analyses");
}

#[test]
fn init_twice_fails() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    ctx.init(&[])
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn commands_require_init() {
    let ctx = TestContext::new();
    ctx.cmd()
        .args(["admin", "info", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("admin init"));
}

#[test]
fn owner_sees_only_their_analyses() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    let u1 = ctx.add_user();
    let u2 = ctx.add_user();

    ctx.insert("service", &u1, "Lakers").success();
    ctx.insert("service", &u1, "Lakers").success();
    ctx.insert("service", &u2, "Celtics").success();

    let mine = ctx.list_as(&u1);
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|r| r["user_id"] == u1.as_str()));

    let theirs = ctx.list_as(&u2);
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0]["team"], "Celtics");

    assert!(ctx.list_as("anon").is_empty());
    assert_eq!(ctx.list_as("service").len(), 3);
}

#[test]
fn show_hides_foreign_rows() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    let u1 = ctx.add_user();
    let u2 = ctx.add_user();
    ctx.insert("service", &u1, "Lakers").success();

    let id = ctx.list_as(&u1)[0]["id"]
        .as_str()
        .expect("id not a string")
        .to_string();

    let shown = ctx.json(&["analysis", "show", "--as", &u1, "--id", &id]);
    assert_eq!(shown["team"], "Lakers");

    ctx.cmd()
        .args([
            "analysis",
            "show",
            "--data-dir",
            &ctx.data_dir_str(),
            "--as",
            &u2,
            "--id",
            &id,
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn user_insert_denied_by_default() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    let u1 = ctx.add_user();

    ctx.insert(&u1, &u1, "Lakers")
        .failure()
        .stderr(predicate::str::contains("row-level security"));
    assert!(ctx.list_as("service").is_empty());
}

#[test]
fn user_insert_allowed_with_insert_policy() {
    let ctx = TestContext::new();
    ctx.init(&["--insert-policy"]).success();
    let u1 = ctx.add_user();
    let u2 = ctx.add_user();

    ctx.insert(&u1, &u1, "Lakers").success();
    ctx.insert(&u1, &u2, "Lakers")
        .failure()
        .stderr(predicate::str::contains("row-level security"));

    assert_eq!(ctx.list_as(&u1).len(), 1);
    assert!(ctx.list_as(&u2).is_empty());
}

#[test]
fn insert_for_unregistered_user_fails() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    ctx.insert("service", &Uuid::new_v4().to_string(), "Lakers")
        .failure()
        .stderr(predicate::str::contains("not registered"));
}

#[test]
fn insert_without_user_fails() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    ctx.cmd()
        .args([
            "analysis",
            "insert",
            "--data-dir",
            &ctx.data_dir_str(),
            "--team",
            "Lakers",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-null"));
}

#[test]
fn invalid_identity_is_rejected() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    ctx.cmd()
        .args([
            "analysis",
            "list",
            "--data-dir",
            &ctx.data_dir_str(),
            "--as",
            "root",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid identity"));
}

#[test]
fn user_with_analyses_cannot_be_removed() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    let u1 = ctx.add_user();
    let u2 = ctx.add_user();
    ctx.insert("service", &u1, "Lakers").success();

    let remove = |id: &str| {
        ctx.cmd()
            .args([
                "admin",
                "user",
                "remove",
                "--data-dir",
                &ctx.data_dir_str(),
                "--id",
                id,
                "--non-interactive",
                "--yes",
            ])
            .assert()
    };

    remove(&u1)
        .failure()
        .stderr(predicate::str::contains("still owns analyses"));
    remove(&u2).success();

    let users = ctx.json(&["admin", "user", "list"]);
    let users = users.as_array().expect("users not an array");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], u1.as_str());
}

#[test]
fn remove_requires_yes_in_non_interactive_mode() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    let u1 = ctx.add_user();

    ctx.cmd()
        .args([
            "admin",
            "user",
            "remove",
            "--data-dir",
            &ctx.data_dir_str(),
            "--id",
            &u1,
            "--non-interactive",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes is required"));
}

#[test]
fn schema_prints_postgres_policies() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    ctx.cmd()
        .args(["schema", "--data-dir", &ctx.data_dir_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ALTER TABLE public.analyses ENABLE ROW LEVEL SECURITY;",
        ))
        .stdout(predicate::str::contains(
            "CREATE POLICY \"Users can view their own analyses\"",
        ));

    ctx.cmd()
        .args([
            "schema",
            "--data-dir",
            &ctx.data_dir_str(),
            "--dialect",
            "sqlite",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE IF NOT EXISTS analyses"));
}

#[test]
fn policy_list_reflects_config() {
    let ctx = TestContext::new();
    ctx.init(&["--insert-policy"]).success();

    let policies = ctx.json(&["policy", "list"]);
    let names: Vec<&str> = policies["policies"]
        .as_array()
        .expect("policies not an array")
        .iter()
        .map(|p| p["name"].as_str().expect("name not a string"))
        .collect();

    assert_eq!(
        names,
        vec![
            "Users can view their own analyses",
            "Users can insert their own analyses"
        ]
    );
    assert_eq!(policies["policies"][1]["command"], "INSERT");
}

#[test]
fn uppercase_user_id_can_be_removed() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();
    let upper = Uuid::new_v4().to_string().to_uppercase();

    ctx.cmd()
        .args([
            "admin",
            "user",
            "add",
            "--data-dir",
            &ctx.data_dir_str(),
            "--id",
            &upper,
        ])
        .assert()
        .success();

    ctx.cmd()
        .args([
            "admin",
            "user",
            "remove",
            "--data-dir",
            &ctx.data_dir_str(),
            "--id",
            &upper,
            "--non-interactive",
            "--yes",
        ])
        .assert()
        .success();

    let users = ctx.json(&["admin", "user", "list"]);
    assert!(users.as_array().expect("users not an array").is_empty());
}

#[test]
fn schema_flags_override_config() {
    let ctx = TestContext::new();
    ctx.init(&[]).success();

    ctx.cmd()
        .args([
            "schema",
            "--data-dir",
            &ctx.data_dir_str(),
            "--schema",
            "scouting",
            "--auth-schema",
            "identity",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CREATE TABLE IF NOT EXISTS scouting.analyses",
        ))
        .stdout(predicate::str::contains("REFERENCES identity.users"))
        .stdout(predicate::str::contains("USING (identity.uid() = user_id)"));
}

#[test]
fn schema_rejects_invalid_schema_name() {
    let ctx = TestContext::new();

    ctx.cmd()
        .args([
            "schema",
            "--data-dir",
            &ctx.data_dir_str(),
            "--schema",
            "public; DROP TABLE analyses",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lowercase letters"));
}
