//! Error reporting tests.

use crate::support::*;

#[test]
fn test_unsupported_extension() {
    let t = Test::new();
    t.write("settings.cfg", SAMPLE_YAML);

    let output = t.encrypt("settings.cfg", "sealed.cfg");
    assert_failure(&output);
    assert_stderr_contains(&output, "don't know how to handle file with extension '.cfg'");
    assert_stderr_contains(&output, "--input-type");
    assert!(!t.path("sealed.cfg").exists());
}

#[test]
fn test_already_encrypted() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);
    assert_success(&t.encrypt("secrets.yaml", "sealed.yaml"));

    let output = t.encrypt("sealed.yaml", "twice.yaml");
    assert_failure(&output);
    assert_stderr_contains(&output, "file already encrypted");
    assert!(!t.path("twice.yaml").exists());
}

#[test]
fn test_missing_age_recipients() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "-o", "sealed.yaml"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "age.recipients is not set");
    assert_stderr_contains(&output, "sealfile.toml");
}

#[test]
fn test_invalid_age_recipient() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "-o", "sealed.yaml", "--age", INVALID_PUBLIC_KEY])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid age recipient");
}

#[test]
fn test_unknown_mode() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "--mode", "pgp"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "unrecognized encryption mode 'pgp'");
}

#[test]
fn test_conflicting_selection_rules() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args([
            "encrypt",
            "secrets.yaml",
            "--unencrypted-suffix",
            "_plain",
            "--encrypted-regex",
            "^pass",
            "--age",
        ])
        .arg(&t.recipient)
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "only one of");
}

#[test]
fn test_malformed_input() {
    let t = Test::new();
    t.write("broken.json", "{\"db\": ");

    let output = t.encrypt("broken.json", "sealed.json");
    assert_failure(&output);
    assert_stderr_contains(&output, "malformed json input");
}

#[test]
fn test_missing_input_file() {
    let t = Test::new();

    let output = t.encrypt("nope.yaml", "sealed.yaml");
    assert_failure(&output);
    assert_stderr_contains(&output, "io error");
}

#[test]
fn test_invalid_config_file() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);
    t.write("sealfile.toml", "[age\nrecipients = ");

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "-o", "sealed.yaml"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config file");
}

#[cfg(not(any(feature = "aws", feature = "test-kms")))]
#[test]
fn test_kms_mode_without_client() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "--mode", "kms", "--kms-arn", KMS_ARN, "--kms-profile", "default"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "every recipient failed to wrap it");
}
