//! Test fixtures and constants.
//!
//! Documents are written in the exact layout each format serializes to,
//! so a decrypt of their artifact prints them back byte for byte.

/// A valid KMS key ARN for stubbed KMS tests.
pub const KMS_ARN: &str = "arn:aws:kms:us-east-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab";

/// A second KMS key ARN in another region.
pub const KMS_ARN_EU: &str = "arn:aws:kms:eu-west-1:123456789012:key/0987dcba-09fe-87dc-65ba-ab0987654321";

/// An invalid public key for negative tests.
pub const INVALID_PUBLIC_KEY: &str = "not-a-valid-age-key";

/// Nested YAML with mixed scalar types.
pub const SAMPLE_YAML: &str = "db:
  user: alice
  pass: s3cr3t
  port: 5432
  ratio: 0.5
  tls: true
";

/// Nested JSON with a list.
pub const SAMPLE_JSON: &str = r#"{
  "db": {
    "user": "alice",
    "pass": "s3cr3t",
    "port": 5432
  },
  "hosts": [
    "a.example",
    "b.example"
  ],
  "debug": false
}
"#;

/// Flat dotenv.
pub const SAMPLE_ENV: &str = "DATABASE_URL=postgres://localhost/mydb
API_KEY=sk-test-12345
GREETING=\"hello world\"
";

/// INI with a top-level key and two sections.
pub const SAMPLE_INI: &str = "name = demo

[database]
user = alice
pass = s3cr3t

[cache]
url = redis://localhost:6379
";

/// Every sample with a file name carrying its extension.
pub const SAMPLES: &[(&str, &str)] = &[
    ("secrets.yaml", SAMPLE_YAML),
    ("secrets.json", SAMPLE_JSON),
    ("secrets.env", SAMPLE_ENV),
    ("secrets.ini", SAMPLE_INI),
];
