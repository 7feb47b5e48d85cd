//! Tests for `sealfile decrypt`.

use crate::support::*;

fn sealed_yaml(t: &Test) {
    t.write("secrets.yaml", SAMPLE_YAML);
    assert_success(&t.encrypt("secrets.yaml", "sealed.yaml"));
}

#[test]
fn test_decrypt_raw() {
    let t = Test::new();
    sealed_yaml(&t);

    let output = t.decrypt("sealed.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}

#[test]
fn test_decrypt_flat() {
    let t = Test::new();
    sealed_yaml(&t);

    let output = t.decrypt_with("sealed.yaml", &["--flat"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "db.user=alice\ndb.pass=s3cr3t\ndb.port=5432\ndb.ratio=0.5\ndb.tls=true\n"
    );
}

#[test]
fn test_decrypt_flat_json() {
    let t = Test::new();
    sealed_yaml(&t);

    let output = t.decrypt_with("sealed.yaml", &["--json"]);
    assert_success(&output);

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["db.pass"], "s3cr3t");
    assert_eq!(value["db.port"], "5432");
    assert_eq!(value.as_object().unwrap().len(), 5);
}

#[test]
fn test_decrypt_flat_and_json_conflict() {
    let t = Test::new();
    sealed_yaml(&t);

    let output = t.decrypt_with("sealed.yaml", &["--flat", "--json"]);
    assert_failure(&output);
}

#[test]
fn test_decrypt_with_key_file_flag() {
    let t = Test::new();
    sealed_yaml(&t);

    let output = t
        .cmd()
        .env_remove("SOPS_AGE_KEY_FILE")
        .arg("--age-key-file")
        .arg(&t.key_file)
        .args(["decrypt", "sealed.yaml"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}

#[test]
fn test_decrypt_with_inline_key() {
    let t = Test::new();
    sealed_yaml(&t);
    let keys = std::fs::read_to_string(&t.key_file).unwrap();

    let output = t
        .cmd()
        .env_remove("SOPS_AGE_KEY_FILE")
        .env("SOPS_AGE_KEY", keys)
        .args(["decrypt", "sealed.yaml"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}

#[test]
fn test_decrypt_without_key_fails() {
    let t = Test::new();
    sealed_yaml(&t);

    let output = t
        .cmd()
        .env_remove("SOPS_AGE_KEY_FILE")
        .args(["decrypt", "sealed.yaml"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "no recipient could recover the data key");
    assert_stderr_contains(&output, "SOPS_AGE_KEY_FILE");
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_decrypt_tampered_file_fails() {
    let t = Test::new();
    sealed_yaml(&t);

    let artifact = t.read("sealed.yaml");
    let tampered = artifact.replace("  user: ", "  login: ");
    t.write("sealed.yaml", &tampered);

    let output = t.decrypt("sealed.yaml");
    assert_failure(&output);
    assert_stderr_contains(&output, "integrity check failed at path db.login");
}

#[test]
fn test_decrypt_plaintext_fails() {
    let t = Test::new();
    t.write("plain.yaml", SAMPLE_YAML);

    let output = t.decrypt("plain.yaml");
    assert_failure(&output);
    assert_stderr_contains(&output, "artifact has no metadata entry");
}
