use std::fs;
use std::path::Path;

use bastion_cli::commands::{inspect, issue, keygen, load_service, verify};
use serial_test::serial;
use tempfile::TempDir;

fn output(f: impl FnOnce(&mut Vec<u8>) -> bastion_cli::commands::CommandResult) -> String {
    let mut buf = Vec::new();
    f(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

/// A config directory with a generated key pair and an application.yaml
/// pointing at it.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let keys = tmp.path().join("keys");
    output(|out| keygen::run(&keys, false, out));

    let yaml = format!(
        "security:\n  jwt:\n    audience: cli-test\n    issuer: bastion-cli\n    lifetime: 600\n    keys:\n      privatefile: {}\n      publicfile: {}\n",
        keys.join(keygen::PRIVATE_FILE).display(),
        keys.join(keygen::PUBLIC_FILE).display(),
    );
    fs::write(tmp.path().join("application.yaml"), yaml).unwrap();
    tmp
}

fn issue_for(dir: &Path, args: issue::IssueArgs) -> String {
    let service = load_service(dir, "test").unwrap();
    output(|out| issue::run(&service, args, out)).trim().to_string()
}

// ── keygen ──

#[test]
fn keygen_writes_pem_files() {
    let tmp = TempDir::new().unwrap();
    let text = output(|out| keygen::run(tmp.path(), false, out));

    let private = fs::read_to_string(tmp.path().join("private.pem")).unwrap();
    let public = fs::read_to_string(tmp.path().join("public.pem")).unwrap();
    assert!(private.contains("BEGIN PRIVATE KEY"));
    assert!(public.contains("BEGIN PUBLIC KEY"));
    assert!(text.contains("privatefile:"));
}

#[test]
fn keygen_refuses_to_overwrite() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("private.pem"), "keep me").unwrap();

    let mut buf = Vec::new();
    let err = keygen::run(tmp.path(), false, &mut buf).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fs::read_to_string(tmp.path().join("private.pem")).unwrap(), "keep me");

    output(|out| keygen::run(tmp.path(), true, out));
    assert_ne!(fs::read_to_string(tmp.path().join("private.pem")).unwrap(), "keep me");
}

// ── issue / verify ──

#[test]
#[serial]
fn issued_token_verifies() {
    let tmp = project();
    let jwt = issue_for(
        tmp.path(),
        issue::IssueArgs {
            account_id: "abc123".into(),
            email: Some("jane@example.com".into()),
            permissions: 5,
            admin: true,
            ..Default::default()
        },
    );
    assert_eq!(jwt.split('.').count(), 3);

    let service = load_service(tmp.path(), "test").unwrap();
    let text = output(|out| verify::run(&service, &jwt, out));
    assert!(text.contains("Valid token"));
    assert!(text.contains("\"accountId\": \"abc123\""));
    assert!(text.contains("\"email\": \"jane@example.com\""));
    assert!(text.contains("\"isAdmin\": true"));
}

#[test]
#[serial]
fn verify_rejects_garbage() {
    let tmp = project();
    let service = load_service(tmp.path(), "test").unwrap();
    let mut buf = Vec::new();
    assert!(verify::run(&service, "not.a.token", &mut buf).is_err());
}

#[test]
#[serial]
fn issue_requires_an_account() {
    let tmp = project();
    let service = load_service(tmp.path(), "test").unwrap();
    let mut buf = Vec::new();
    let err = issue::run(&service, issue::IssueArgs::default(), &mut buf).unwrap_err();
    assert!(err.to_string().contains("account_id"));
}

#[test]
#[serial]
fn load_service_reports_missing_configuration() {
    let tmp = TempDir::new().unwrap();
    let err = match load_service(tmp.path(), "test") {
        Ok(_) => panic!("an empty project must not yield a service"),
        Err(err) => err,
    };
    assert!(err.to_string().contains("Invalid auth configuration"));
}

// ── inspect ──

#[test]
#[serial]
fn inspect_labels_output_unverified() {
    let tmp = project();
    let jwt = issue_for(
        tmp.path(),
        issue::IssueArgs {
            account_id: "abc123".into(),
            ..Default::default()
        },
    );

    let text = output(|out| inspect::run(&jwt, out));
    assert!(text.contains("UNVERIFIED"));
    assert!(text.contains("\"accountId\": \"abc123\""));
}

#[test]
fn inspect_rejects_malformed_token() {
    let mut buf = Vec::new();
    assert!(inspect::run("abc", &mut buf).is_err());
}
