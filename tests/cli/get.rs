//! Tests for `sealfile get`.

use crate::support::*;

fn sealed(t: &Test, name: &str, contents: &str) -> String {
    t.write(name, contents);
    let sealed = format!("sealed.{}", name);
    assert_success(&t.encrypt(name, &sealed));
    sealed
}

#[test]
fn test_get_scalar() {
    let t = Test::new();
    let file = sealed(&t, "secrets.yaml", SAMPLE_YAML);

    let output = t.get(&file, "db.pass");
    assert_success(&output);
    assert_eq!(stdout(&output), "s3cr3t\n");

    let output = t.get(&file, "db.port");
    assert_success(&output);
    assert_eq!(stdout(&output), "5432\n");
}

#[test]
fn test_get_yaml_snippet() {
    let t = Test::new();
    let file = sealed(&t, "secrets.yaml", SAMPLE_YAML);

    let output = t.get_yaml(&file, "db.pass");
    assert_success(&output);
    assert_eq!(stdout(&output), "pass: s3cr3t\n");
}

#[test]
fn test_get_subtree_prints_yaml() {
    let t = Test::new();
    let file = sealed(&t, "secrets.yaml", SAMPLE_YAML);

    let output = t.get(&file, "db");
    assert_success(&output);
    assert_eq!(stdout(&output), SAMPLE_YAML);
}

#[test]
fn test_get_list_item_from_json() {
    let t = Test::new();
    let file = sealed(&t, "secrets.json", SAMPLE_JSON);

    let output = t.get(&file, "hosts.1");
    assert_success(&output);
    assert_eq!(stdout(&output), "b.example\n");
}

#[test]
fn test_get_ini_section_value() {
    let t = Test::new();
    let file = sealed(&t, "secrets.ini", SAMPLE_INI);

    let output = t.get(&file, "cache.url");
    assert_success(&output);
    assert_eq!(stdout(&output), "redis://localhost:6379\n");
}

#[test]
fn test_get_missing_key() {
    let t = Test::new();
    let file = sealed(&t, "secrets.yaml", SAMPLE_YAML);

    let output = t.get(&file, "db.missing");
    assert_failure(&output);
    assert_stderr_contains(&output, "key not found: db.missing");
    assert_eq!(stdout(&output), "");
}
