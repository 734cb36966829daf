// Embeds the git commit in the version string the crate reports at runtime.

use std::process::Command;

fn main() {
    let commit = option_env!("WARDEN_COMMIT_HASH")
        .map(|hash| hash[..7].to_string())
        .unwrap_or_else(|| {
            Command::new("git")
                .args(["rev-parse", "--short", "HEAD"])
                .output()
                .ok()
                .filter(|output| output.status.success())
                .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        });

    println!("cargo:rerun-if-env-changed=WARDEN_COMMIT_HASH");
    println!(
        "cargo:rustc-env=BUILD_VERSION={}-{}",
        env!("CARGO_PKG_VERSION"),
        commit
    );
}
