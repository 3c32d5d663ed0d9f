//! Fake simulator binaries for integration tests
//!
//! The execution engine only needs a program it can spawn, time and
//! status-check, and a trace file at the well-known path afterwards. A
//! small shell script stands in for the real simulator, keeping the
//! tests hermetic.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Install an executable `/bin/sh` script with the given body.
pub fn install_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake_wave_propagation");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A well-behaved simulator: writes a decaying four-line energy trace
/// to `results_dir` and reports one line on stdout.
pub fn install_default(dir: &Path, results_dir: &Path) -> PathBuf {
    install_script(
        dir,
        &format!(
            "mkdir -p '{results}'\n\
             printf '# step energy\\n0 10.0\\n1 8.0\\n2 5.0\\n3 2.0\\n' > '{results}/energy_trace.dat'\n\
             echo 'OK simulated run'",
            results = results_dir.display()
        ),
    )
}

/// A broken simulator: complains on stderr and exits non-zero without
/// writing a trace.
pub fn install_failing(dir: &Path) -> PathBuf {
    install_script(dir, "echo 'boom: invalid flags' >&2\nexit 2")
}
