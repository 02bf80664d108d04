use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Stamps the binary's `--version` with the commit it was built from.
///
/// Builds outside a checkout (crates.io tarballs, vendored sources) report
/// `unknown`. A checkout with uncommitted changes gets a `-dirty` suffix.
fn main() {
    let version = match git(&["rev-parse", "--short", "HEAD"]) {
        Some(hash) if worktree_is_dirty() => format!("{hash}-dirty"),
        Some(hash) => hash,
        None => "unknown".to_string(),
    };
    println!("cargo:rustc-env=SNIPMARK_GIT_HASH={version}");
    println!("cargo:rerun-if-env-changed=GIT_DIR");

    if let Some(git_dir) = locate_git_dir() {
        for watched in ["HEAD", "index", "refs", "packed-refs"] {
            rerun_if_exists(&git_dir.join(watched));
        }
    }
}

/// Runs git and returns its trimmed stdout, or `None` on any failure.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn worktree_is_dirty() -> bool {
    git(&["status", "--porcelain", "--untracked-files=no"]).is_some()
}

/// Finds the git directory, following the `gitdir:` pointer that
/// worktrees and submodules leave in a `.git` file.
fn locate_git_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("GIT_DIR") {
        return Some(PathBuf::from(dir));
    }

    let dot_git = Path::new(".git");
    if dot_git.is_dir() {
        return Some(dot_git.to_path_buf());
    }

    let pointer = fs::read_to_string(dot_git).ok()?;
    let target = PathBuf::from(pointer.strip_prefix("gitdir:")?.trim());
    if target.is_absolute() {
        Some(target)
    } else {
        Some(Path::new(".").join(target))
    }
}

fn rerun_if_exists(path: &Path) {
    if let Some(display) = path.exists().then(|| path.to_str()).flatten() {
        println!("cargo:rerun-if-changed={display}");
    }
}
