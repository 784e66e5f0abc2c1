mod common;

use assert_cmd::Command;
use common::{TestContext, TestContextBuilder};
use predicates::prelude::*;
use serde_json::json;

fn project() -> TestContext {
    TestContextBuilder::new()
        .with_json(
            "tokens/color.json",
            json!({"color": {"base": {"gray": {"value": "#cccccc"}}}}),
        )
        .with_json(
            "config.json",
            json!({
                "source": ["tokens/**/*.json"],
                "platforms": {
                    "css": {
                        "transformGroup": "css",
                        "buildPath": "build/css/",
                        "files": [{"destination": "vars.css", "format": "css/variables"}]
                    },
                    "android": {
                        "transformGroup": "android",
                        "buildPath": "build/android/",
                        "files": [{"destination": "colors.xml", "format": "android/resources"}]
                    }
                }
            }),
        )
        .build()
}

fn tokensmith(ctx: &TestContext) -> Command {
    let mut cmd = Command::cargo_bin("tokensmith").unwrap();
    cmd.current_dir(ctx.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("tokensmith").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_build_all_platforms() {
    let ctx = project();
    tokensmith(&ctx)
        .args(["build", "-c", "config.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✔︎ build/css/vars.css"))
        .stdout(predicate::str::contains("✔︎ build/android/colors.xml"));

    assert!(ctx.read("build/css/vars.css").contains("--color-base-gray: #cccccc;"));
    assert!(ctx
        .read("build/android/colors.xml")
        .contains("<color name=\"color_base_gray\">#ffcccccc</color>"));
}

#[test]
fn test_build_single_platform_silently() {
    let ctx = project();
    tokensmith(&ctx)
        .args(["build", "-p", "css", "--silent"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(ctx.exists("build/css/vars.css"));
    assert!(!ctx.exists("build/android"));
}

#[test]
fn test_unknown_platform_is_config_error() {
    let ctx = project();
    tokensmith(&ctx)
        .args(["build", "-p", "ios"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Platform \"ios\" does not exist"));
}

#[test]
fn test_missing_config_file_fails() {
    let ctx = TestContextBuilder::new().build();
    tokensmith(&ctx)
        .args(["build", "-c", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load missing.json"));
}

#[test]
fn test_clean_after_build() {
    let ctx = project();
    tokensmith(&ctx).arg("build").assert().success();
    assert!(ctx.exists("build/css/vars.css"));

    tokensmith(&ctx)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("- build/css/vars.css"));
    assert!(!ctx.exists("build"));

    tokensmith(&ctx)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("does not exist"));
}

#[test]
fn test_circular_reference_exits_with_failure() {
    let ctx = TestContextBuilder::new()
        .with_json(
            "config.json",
            json!({
                "tokens": {"a": {"value": "{b}"}, "b": {"value": "{a}"}},
                "platforms": {
                    "js": {
                        "transforms": ["name/cti/kebab"],
                        "files": [{"destination": "flat.json", "format": "json/flat"}]
                    }
                }
            }),
        )
        .build();

    tokensmith(&ctx)
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Circular reference detected"));
    assert!(!ctx.exists("flat.json"));
}
