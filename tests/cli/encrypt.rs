//! Tests for `sealfile encrypt`.

use crate::support::*;

#[test]
fn test_encrypt_roundtrips_every_format() {
    let t = Test::new();
    for (name, contents) in SAMPLES {
        assert_file_roundtrip(&t, name, contents);
    }
}

#[test]
fn test_encrypt_dotfile_env() {
    let t = Test::new();
    assert_file_roundtrip(&t, ".env", SAMPLE_ENV);
}

#[test]
fn test_encrypt_writes_artifact_not_plaintext() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t.encrypt("secrets.yaml", "sealed.yaml");
    assert_success(&output);
    assert_stderr_contains(&output, "encrypted sealed.yaml");

    let artifact = t.read("sealed.yaml");
    assert!(artifact.contains("ENC[AES256_GCM,"));
    assert!(artifact.contains(&t.recipient));
    assert!(!artifact.contains("s3cr3t"));

    // input is left alone
    assert_eq!(t.read("secrets.yaml"), SAMPLE_YAML);
}

#[test]
fn test_encrypt_checksum_matches_file() {
    let t = Test::new();
    t.write("secrets.json", SAMPLE_JSON);

    let output = t.encrypt("secrets.json", "sealed.json");
    assert_success(&output);
    let checksum = stdout(&output).trim().to_string();

    let output = t.check("sealed.json", &checksum);
    assert_success(&output);
}

#[test]
fn test_encrypt_to_stdout() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "--age"])
        .arg(&t.recipient)
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "sops:");
    assert_stdout_excludes(&output, "s3cr3t");
    assert_stderr_contains(&output, "checksum");
    assert!(!t.path("secrets.yaml.enc").exists());
}

#[test]
fn test_encrypt_with_unencrypted_suffix() {
    let t = Test::new();
    t.write("app.yaml", "host_unencrypted: localhost\npassword: s3cr3t\n");

    let output = t
        .cmd()
        .args(["encrypt", "app.yaml", "-o", "sealed.yaml", "--unencrypted-suffix", "_unencrypted", "--age"])
        .arg(&t.recipient)
        .output()
        .unwrap();
    assert_success(&output);

    let artifact = t.read("sealed.yaml");
    assert!(artifact.contains("host_unencrypted: localhost"));
    assert!(!artifact.contains("s3cr3t"));

    let output = t.get("sealed.yaml", "password");
    assert_success(&output);
    assert_eq!(stdout(&output), "s3cr3t\n");
}

#[test]
fn test_encrypt_with_recipients_from_config_file() {
    let t = Test::new();
    t.write("secrets.yaml", SAMPLE_YAML);
    t.write(
        "sealfile.toml",
        &format!("[age]\nrecipients = [\"{}\"]\n", t.recipient),
    );

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "-o", "sealed.yaml"])
        .output()
        .unwrap();
    assert_success(&output);

    let output = t.decrypt("sealed.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}

#[test]
fn test_encrypt_with_input_type() {
    let t = Test::new();
    t.write("settings.cfg", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "settings.cfg", "-o", "sealed.cfg", "--input-type", "yaml", "--age"])
        .arg(&t.recipient)
        .output()
        .unwrap();
    assert_success(&output);

    let output = t.decrypt_with("sealed.cfg", &["--input-type", "yaml"]);
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}

#[test]
fn test_encrypt_for_several_recipients() {
    let t = Test::new();
    let (_, other) = age_pair();
    t.write("secrets.yaml", SAMPLE_YAML);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml", "-o", "sealed.yaml", "--age"])
        .arg(format!("{}, {}", other, t.recipient))
        .output()
        .unwrap();
    assert_success(&output);

    let artifact = t.read("sealed.yaml");
    assert!(artifact.contains(&other));
    assert!(artifact.contains(&t.recipient));

    let output = t.decrypt("sealed.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}
