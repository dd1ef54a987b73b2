use std::{env, fs, path::Path};

use anyhow::Result;

#[derive(Debug)]
struct ReleaseInfo {
    version: String,
    branch: String,
}

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DISTRIBUTION");
    println!("cargo:rerun-if-env-changed=RELEASE_TAG_NAME");

    let release_info = get_info();

    let meta_file = Path::new(&env::var("OUT_DIR")?).join("meta.rs");

    let ReleaseInfo { version, branch } = release_info;

    #[rustfmt::skip]
    let meta = format!(r#"
        pub const NAME: &str = "Spinlab-{branch}";
        pub const VERSION: &str = "{version}";
        pub const RELEASE: ReleaseType = ReleaseType::{branch};
    "#);

    fs::write(meta_file, meta)?;

    Ok(())
}

fn get_info() -> ReleaseInfo {
    // CARGO_PKG_* are always available, even in build scripts
    let cargo_tag = env!("CARGO_PKG_VERSION");

    if env::var("CARGO_FEATURE_DISTRIBUTION").is_ok() {
        return ReleaseInfo {
            version: cargo_tag.to_string(),
            branch: String::from("Stable"),
        };
    }

    let release_tag = env::var("RELEASE_TAG_NAME").unwrap_or_default();
    if release_tag.starts_with('v') {
        return ReleaseInfo {
            version: cargo_tag.to_string(),
            branch: "Stable".to_string(),
        };
    }

    #[cfg(not(debug_assertions))]
    let release = "Nightly";
    #[cfg(debug_assertions)]
    let release = "Debug";

    ReleaseInfo {
        version: format!(
            "{cargo_tag}+{release}.{}",
            get_head().unwrap_or_else(|| "unknown".to_string())
        ),
        branch: release.to_string(),
    }
}

fn get_head() -> Option<String> {
    let cmd = std::process::Command::new("git")
        .args(["show", "--pretty=format:%h", "--no-patch"])
        .output()
        .ok()?;
    if !cmd.status.success() {
        return None;
    }

    let commit = String::from_utf8_lossy(&cmd.stdout);
    let commit = commit.trim();
    if commit.is_empty() {
        return None;
    }

    Some(commit.to_string())
}
