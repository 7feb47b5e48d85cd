//! AWS KMS client.
//!
//! Enable with `--features aws`. Credentials come from the named profile
//! of each key; the region is taken from the key ARN. Calls are blocking,
//! bounded by an operation timeout, and retried with exponential backoff
//! on transient failures.

use std::time::Duration;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use tracing::trace;

use super::kms::{KmsClient, KmsKey};
use crate::error::{CryptoError, Result};

/// Per-call operation timeout.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Total attempts, including the first one.
const MAX_ATTEMPTS: u32 = 3;

/// Initial retry backoff; doubles on each attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(200);

/// AWS Key Management Service client.
#[derive(Debug, Default)]
pub struct AwsKms;

impl AwsKms {
    pub fn new() -> Self {
        Self
    }

    fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
    }

    async fn client(key: &KmsKey) -> aws_sdk_kms::Client {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(OPERATION_TIMEOUT)
                    .build(),
            )
            .retry_config(
                RetryConfig::standard()
                    .with_max_attempts(MAX_ATTEMPTS)
                    .with_initial_backoff(INITIAL_BACKOFF),
            );
        if !key.profile.is_empty() {
            loader = loader.profile_name(&key.profile);
        }
        if let Some(region) = key.region() {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;
        aws_sdk_kms::Client::new(&config)
    }
}

impl KmsClient for AwsKms {
    fn encrypt(&self, key: &KmsKey, plaintext: &[u8]) -> Result<Vec<u8>> {
        trace!(arn = %key.arn, plaintext_len = plaintext.len(), "encrypting with AWS KMS");

        let failed = |reason: String| CryptoError::Wrap {
            recipient: key.arn.clone(),
            reason,
        };

        let rt = Self::runtime()
            .map_err(|e| failed(format!("failed to create runtime: {}", e)))?;

        rt.block_on(async {
            let client = Self::client(key).await;
            let result = client
                .encrypt()
                .key_id(&key.arn)
                .plaintext(aws_sdk_kms::primitives::Blob::new(plaintext))
                .send()
                .await
                .map_err(|e| failed(format!("KMS encrypt failed: {}", e)))?;

            let blob = result
                .ciphertext_blob()
                .ok_or_else(|| failed("no ciphertext returned".to_string()))?;

            trace!(ciphertext_len = blob.as_ref().len(), "encrypted with AWS KMS");
            Ok::<_, crate::error::Error>(blob.as_ref().to_vec())
        })
    }

    fn decrypt(&self, key: &KmsKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        trace!(arn = %key.arn, ciphertext_len = ciphertext.len(), "decrypting with AWS KMS");

        let failed = |reason: String| CryptoError::Unwrap {
            recipient: key.arn.clone(),
            reason,
        };

        let rt = Self::runtime()
            .map_err(|e| failed(format!("failed to create runtime: {}", e)))?;

        rt.block_on(async {
            let client = Self::client(key).await;
            let result = client
                .decrypt()
                .key_id(&key.arn)
                .ciphertext_blob(aws_sdk_kms::primitives::Blob::new(ciphertext))
                .send()
                .await
                .map_err(|e| failed(format!("KMS decrypt failed: {}", e)))?;

            let plaintext = result
                .plaintext()
                .ok_or_else(|| failed("no plaintext returned".to_string()))?;

            trace!("decrypted with AWS KMS");
            Ok::<_, crate::error::Error>(plaintext.as_ref().to_vec())
        })
    }
}
