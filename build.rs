use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    // Short commit hash, with a -dirty suffix when the tree has local edits.
    let hash = git(&["rev-parse", "--short", "HEAD"]).map(|h| {
        match git(&["status", "--porcelain"]).map(|s| s.is_empty()) {
            Some(true) => h,
            _ => format!("{}-dirty", h),
        }
    });

    println!(
        "cargo:rustc-env=GIT_HASH={}",
        hash.unwrap_or_else(|| "unknown".to_string())
    );
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
