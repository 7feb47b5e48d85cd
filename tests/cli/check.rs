//! Tests for `sealfile check`.

use crate::support::*;

fn sealed(t: &Test) -> String {
    t.write("secrets.yaml", SAMPLE_YAML);
    let output = t.encrypt("secrets.yaml", "sealed.yaml");
    assert_success(&output);
    stdout(&output).trim().to_string()
}

#[test]
fn test_check_unchanged() {
    let t = Test::new();
    let checksum = sealed(&t);

    let output = t.check("sealed.yaml", &checksum);
    assert_success(&output);
    assert_stderr_contains(&output, "sealed.yaml unchanged");
}

#[test]
fn test_check_is_case_insensitive() {
    let t = Test::new();
    let checksum = sealed(&t);

    let output = t.check("sealed.yaml", &checksum.to_uppercase());
    assert_success(&output);
}

#[test]
fn test_check_detects_edit() {
    let t = Test::new();
    let checksum = sealed(&t);

    let mut artifact = t.read("sealed.yaml");
    artifact.push_str("# touched\n");
    t.write("sealed.yaml", &artifact);

    let output = t.check("sealed.yaml", &checksum);
    assert_exit_code(&output, 1);
    assert_stderr_contains(&output, "changed since it was encrypted");
    assert_stderr_contains(&output, &checksum);
}

#[test]
fn test_check_needs_no_key() {
    let t = Test::new();
    let checksum = sealed(&t);

    let output = t
        .cmd()
        .env_remove("SOPS_AGE_KEY_FILE")
        .args(["check", "sealed.yaml", &checksum])
        .output()
        .unwrap();
    assert_success(&output);
}
