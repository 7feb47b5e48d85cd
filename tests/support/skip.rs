/// Skip a test if AWS credentials or a test key are not configured.
#[macro_export]
macro_rules! skip_without_aws {
    () => {
        if std::env::var("AWS_ACCESS_KEY_ID").is_err() && std::env::var("AWS_PROFILE").is_err() {
            eprintln!("SKIPPED: no AWS credentials (AWS_ACCESS_KEY_ID or AWS_PROFILE)");
            return;
        }
        if std::env::var("SEALFILE_TEST_KMS_ARN").is_err() {
            eprintln!("SKIPPED: SEALFILE_TEST_KMS_ARN not set (set to an AWS KMS key ARN)");
            return;
        }
    };
}
