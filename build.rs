use std::process::Command;
use std::str::from_utf8;

const GIT_COMMAND: &str = "git";
const GIT_ARGS: [&str; 3] = ["log", "-1", "--format=%h %as"];

const UNKNOWN_HASH: &str = "unknown";
const UNKNOWN_DATE: &str = "0000-00-00";

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");

    let (hash, date) = last_commit().unwrap_or_else(|| {
        (UNKNOWN_HASH.to_string(), UNKNOWN_DATE.to_string())
    });
    println!("cargo:rustc-env=BUILD_HASH={hash}");
    println!("cargo:rustc-env=BUILD_DATE={date}");
}

/// Returns the abbreviated hash and date of the most recent commit, or `None` when
/// `git` is unavailable or the crate is not built from a repository.
fn last_commit() -> Option<(String, String)> {
    let out = match Command::new(GIT_COMMAND).args(GIT_ARGS).output() {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            eprintln!("{GIT_COMMAND} {}: {}", GIT_ARGS.join(" "), out.status);
            return None;
        }
        Err(e) => {
            eprintln!("{GIT_COMMAND} {}: {e}", GIT_ARGS.join(" "));
            return None;
        }
    };
    let text = from_utf8(&out.stdout).ok()?;
    let (hash, date) = text.trim().split_once(' ')?;
    Some((hash.to_string(), date.to_string()))
}
