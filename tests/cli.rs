use assert_cmd::Command;
use httpmock::{Method::GET, MockServer};
use predicates::prelude::*;

fn cmd_with_env(envs: &[(&str, &str)]) -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("okta-client")?;
    cmd.env_remove("OKTA_API_TOKEN").env_remove("OKTA_BASE_URL");
    for (k, v) in envs {
        cmd.env(k, v);
    }
    cmd.arg("--log-level").arg("warn");
    Ok(cmd)
}

#[test]
fn prints_value_and_meta() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v1/users/me")
            .header("authorization", "SSWS t");
        then.status(200)
            .header("x-rate-limit-limit", "600")
            .header("x-rate-limit-remaining", "599")
            .header("x-rate-limit-reset", "0")
            .header("link", "<https://acme.okta.com/api/v1/users?after=00u2>; rel=\"next\"")
            .json_body(serde_json::json!({"id": "00u1"}));
    });
    let base = server.url("/api/v1/");
    let assert = cmd_with_env(&[("OKTA_API_TOKEN", "t"), ("OKTA_BASE_URL", &base)])?
        .args(["--category", "users-get-by-id", "get", "users/me"])
        .assert()
        .success();
    let out: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(out["status"], 200);
    assert_eq!(out["value"]["id"], "00u1");
    assert_eq!(out["meta"]["rate"]["remaining"], 599);
    assert_eq!(
        out["meta"]["pagination"]["next"],
        "https://acme.okta.com/api/v1/users?after=00u2"
    );
    Ok(())
}

#[test]
fn api_error_exits_nonzero() -> anyhow::Result<()> {
    let server = MockServer::start();
    let _m = server.mock(|when, then| {
        when.method(GET).path("/api/v1/apps/nope");
        then.status(404)
            .json_body(serde_json::json!({"errorCode": "E0000007", "errorSummary": "Not found: Resource not found: nope (App)"}));
    });
    let base = server.url("/api/v1/");
    cmd_with_env(&[("OKTA_API_TOKEN", "t"), ("OKTA_BASE_URL", &base)])?
        .args(["GET", "apps/nope"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"kind\":\"api\""))
        .stdout(predicate::str::contains("E0000007"));
    Ok(())
}

#[test]
fn missing_token_fails() -> anyhow::Result<()> {
    cmd_with_env(&[("OKTA_BASE_URL", "https://acme.okta.com/api/v1/")])?
        .args(["GET", "users/me"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OKTA_API_TOKEN"));
    Ok(())
}

#[test]
fn version_flag() -> anyhow::Result<()> {
    cmd_with_env(&[])?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("okta-client "));
    Ok(())
}

#[test]
fn unknown_category_is_rejected() -> anyhow::Result<()> {
    cmd_with_env(&[("OKTA_API_TOKEN", "t"), ("OKTA_BASE_URL", "https://acme.okta.com/api/v1/")])?
        .args(["--category", "widgets", "GET", "users/me"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rate-limit category: widgets"));
    Ok(())
}
