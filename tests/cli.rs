use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RULE_YAML: &str = r"
id: blog-linkedin
name: Blog to LinkedIn
rule_type: content_generation
trigger:
  trigger_type: blog_published
  trigger_conditions:
    blog_categories: [ai]
actions:
  - type: generate_social_post
    platform: linkedin
";

const BLOG_YAML: &str = r"
title: Shipping a rule engine
url: https://example.com/rule-engine
content: Rules turn published articles into posts. Every action runs even when another fails.
categories: [ai]
tags: [rust, automation]
";

fn contentops(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("contentops").unwrap();
    cmd.env("CONTENTOPS_HOME", home)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off");
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn test_help() {
    let home = TempDir::new().unwrap();
    contentops(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("content automation"));
}

#[test]
fn test_seed_and_list_templates() {
    let home = TempDir::new().unwrap();

    contentops(home.path())
        .args(["templates", "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed 3 built-in templates"));

    contentops(home.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LinkedIn blog announcement"))
        .stdout(predicate::str::contains("default-weekly-newsletter"));
}

#[test]
fn test_add_and_list_rules_as_json() {
    let home = TempDir::new().unwrap();
    let rule = write(home.path(), "rule.yaml", RULE_YAML);

    contentops(home.path())
        .args(["rules", "add", &rule])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved rule: Blog to LinkedIn"));

    contentops(home.path())
        .args(["rules", "list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 1"))
        .stdout(predicate::str::contains("\"id\": \"blog-linkedin\""));
}

#[test]
fn test_blog_trigger_creates_post() {
    let home = TempDir::new().unwrap();
    let rule = write(home.path(), "rule.yaml", RULE_YAML);
    let blog = write(home.path(), "post.yaml", BLOG_YAML);

    contentops(home.path()).args(["templates", "seed"]).assert().success();
    contentops(home.path()).args(["rules", "add", &rule]).assert().success();

    contentops(home.path())
        .args(["trigger", "blog", &blog])
        .assert()
        .success()
        .stdout(predicate::str::contains("Executed 1 rules"));

    contentops(home.path())
        .args(["posts", "list", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 1"))
        .stdout(predicate::str::contains("\"platform\": \"linkedin\""))
        .stdout(predicate::str::contains("Shipping a rule engine"));

    contentops(home.path())
        .args(["rules", "show", "blog-linkedin", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"execution_count\": 1"));
}

#[test]
fn test_blog_trigger_skips_other_categories() {
    let home = TempDir::new().unwrap();
    let rule = write(home.path(), "rule.yaml", RULE_YAML);
    let blog = write(
        home.path(),
        "post.yaml",
        "title: Cooking\nurl: https://example.com/cooking\ncategories: [food]\n",
    );

    contentops(home.path()).args(["rules", "add", &rule]).assert().success();

    contentops(home.path())
        .args(["trigger", "blog", &blog, "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"executed_rules\": 0"))
        .stdout(predicate::str::contains("\"success\": true"));
}

#[test]
fn test_manual_trigger_unknown_rule() {
    let home = TempDir::new().unwrap();

    contentops(home.path())
        .args(["trigger", "manual", "missing", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule not found"));
}

#[test]
fn test_show_missing_rule_fails() {
    let home = TempDir::new().unwrap();

    contentops(home.path())
        .args(["rules", "show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found: Rule: missing"));
}

#[test]
fn test_config_init_and_show() {
    let home = TempDir::new().unwrap();

    contentops(home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));

    contentops(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scheduler_interval_minutes: 60"));
}

#[test]
fn test_config_default_output_json() {
    let home = TempDir::new().unwrap();
    write(home.path(), "config.yaml", "general:\n  default_output: json\n");

    contentops(home.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"count\": 0"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();

    contentops(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("contentops"));
}
