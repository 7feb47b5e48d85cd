//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a sealfile command for this environment.
    ///
    /// Returns a Command configured with:
    /// - Current directory set to the test directory
    /// - `SOPS_AGE_KEY_FILE` pointing at the test key file
    /// - Color and inherited sealfile variables cleared
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("sealfile").expect("failed to find sealfile binary");
        cmd.current_dir(self.dir.path());
        cmd.env("SOPS_AGE_KEY_FILE", &self.key_file);
        cmd.env_remove("SOPS_AGE_KEY");
        cmd.env_remove("SEALFILE_LOG");
        cmd.env_remove("SEALFILE_CONFIG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Shortcut for `sealfile encrypt <input> -o <output> --mode age --age <recipient>`.
    pub fn encrypt(&self, input: &str, output: &str) -> Output {
        self.cmd()
            .args(["encrypt", input, "-o", output, "--mode", "age", "--age"])
            .arg(&self.recipient)
            .output()
            .expect("failed to run sealfile encrypt")
    }

    /// Shortcut for `sealfile decrypt`.
    pub fn decrypt(&self, file: &str) -> Output {
        self.cmd()
            .args(["decrypt", file])
            .output()
            .expect("failed to run sealfile decrypt")
    }

    /// Shortcut for `sealfile decrypt` with extra flags.
    pub fn decrypt_with(&self, file: &str, flags: &[&str]) -> Output {
        self.cmd()
            .args(["decrypt", file])
            .args(flags)
            .output()
            .expect("failed to run sealfile decrypt")
    }

    /// Shortcut for `sealfile get`.
    pub fn get(&self, file: &str, key: &str) -> Output {
        self.cmd()
            .args(["get", file, key])
            .output()
            .expect("failed to run sealfile get")
    }

    /// Shortcut for `sealfile get --yaml`.
    pub fn get_yaml(&self, file: &str, key: &str) -> Output {
        self.cmd()
            .args(["get", file, key, "--yaml"])
            .output()
            .expect("failed to run sealfile get --yaml")
    }

    /// Shortcut for `sealfile check`.
    pub fn check(&self, file: &str, checksum: &str) -> Output {
        self.cmd()
            .args(["check", file, checksum])
            .output()
            .expect("failed to run sealfile check")
    }
}
