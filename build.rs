use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    // Reported by --version and the health endpoint
    let version = match git(&["rev-parse", "--short", "HEAD"]) {
        Some(hash) => {
            let dirty = Command::new("git")
                .args(["diff", "--quiet"])
                .status()
                .map(|s| !s.success())
                .unwrap_or(false);
            if dirty { format!("{}-dirty", hash) } else { hash }
        }
        None => env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("cargo:rustc-env=GIT_HASH={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
