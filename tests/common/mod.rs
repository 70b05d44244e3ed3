//! Shared fixtures for the CLI integration tests.
//!
//! Each test builds a sandbox directory holding test scripts and a small
//! shell script standing in for the real test client.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary suite directory plus a stand-in client executable.
pub struct Sandbox {
    dir: TempDir,
    pub client: PathBuf,
}

impl Sandbox {
    /// Creates a sandbox whose client runs `body` with the script name in `$1`.
    pub fn with_client(body: &str) -> Sandbox {
        let dir = TempDir::new().unwrap();
        let client = dir.path().join("client.sh");
        fs::write(&client, format!("#!/bin/sh\n{body}\n")).unwrap();
        make_executable(&client);
        Sandbox { dir, client }
    }

    /// A client that passes everything, failing only scripts whose name
    /// contains "broken".
    pub fn with_default_client() -> Sandbox {
        Sandbox::with_client("case \"$1\" in\n  *broken*) exit 1 ;;\nesac\nexit 0")
    }

    /// Adds a test script file. Its content never matters to the harness.
    pub fn add_script(&self, name: &str) {
        fs::write(self.path().join(name), "// client test script\n").unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}
