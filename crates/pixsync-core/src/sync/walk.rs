//! Project tree enumeration with exclusion globs.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Never uploaded: dependencies, build output, VCS metadata, lockfile, logs, secrets.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules/**",
    "dist/**",
    ".git/**",
    "package-lock.json",
    "*.log",
    ".env",
    ".env.*",
];

/// Compiled exclusion globs. Every pattern matches at any depth, so
/// `node_modules/**` also excludes `web/node_modules/x.js`.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    files: GlobSet,
    /// Directory forms of `dir/**` patterns, used to prune the walk.
    dirs: GlobSet,
}

impl ExcludeSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, globset::Error> {
        let mut files = GlobSetBuilder::new();
        let mut dirs = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim().trim_start_matches("./");
            if pattern.is_empty() {
                continue;
            }
            for p in anchored_and_nested(pattern) {
                files.add(GlobBuilder::new(&p).literal_separator(true).build()?);
            }
            if let Some(dir) = pattern.strip_suffix("/**") {
                for p in anchored_and_nested(dir) {
                    dirs.add(GlobBuilder::new(&p).literal_separator(true).build()?);
                }
            }
        }
        Ok(Self {
            files: files.build()?,
            dirs: dirs.build()?,
        })
    }

    #[cfg(test)]
    pub(crate) fn defaults() -> Self {
        Self::new(DEFAULT_EXCLUDES).unwrap()
    }

    /// `rel` is relative to the project root.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        self.files.is_match(rel)
    }

    fn is_excluded_dir(&self, rel: &Path) -> bool {
        self.dirs.is_match(rel)
    }
}

fn anchored_and_nested(pattern: &str) -> [String; 2] {
    let pattern = pattern.trim_start_matches('/');
    [pattern.to_string(), format!("**/{}", pattern)]
}

/// All regular files under `root` that survive `excludes`, as paths
/// relative to `root`, in sorted order.
///
/// Only an unreadable `root` is an error; entries below it that cannot be
/// read are logged and skipped.
pub fn enumerate_files(root: &Path, excludes: &ExcludeSet) -> Result<Vec<PathBuf>, walkdir::Error> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match entry.path().strip_prefix(root) {
                Ok(rel) => !excludes.is_excluded_dir(rel),
                Err(_) => true,
            }
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e),
            Err(e) => {
                tracing::warn!(path = ?e.path(), "skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if excludes.is_excluded(rel) {
            tracing::trace!(path = %rel.display(), "excluded");
            continue;
        }
        files.push(rel.to_path_buf());
    }
    Ok(files)
}

/// Repository path for a relative file path: components joined with `/`.
pub fn repo_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, rel.as_bytes()).unwrap();
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files.iter().map(|p| repo_path(p)).collect()
    }

    #[test]
    fn default_excludes_skip_deps_build_vcs_lock_logs_and_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in [
            "index.html",
            "src/app.ts",
            "src/components/Chat.tsx",
            "node_modules/react/index.js",
            "web/node_modules/x/y.js",
            "dist/bundle.js",
            ".git/HEAD",
            "package-lock.json",
            "package.json",
            "debug.log",
            "logs/server.log",
            ".env",
            "server/.env",
            ".env.local",
            ".gitignore",
        ] {
            touch(root, rel);
        }

        let files = enumerate_files(root, &ExcludeSet::defaults()).unwrap();
        assert_eq!(
            names(&files),
            vec![
                ".gitignore",
                "index.html",
                "package.json",
                "src/app.ts",
                "src/components/Chat.tsx",
            ]
        );
    }

    #[test]
    fn custom_patterns_apply_at_any_depth() {
        let set = ExcludeSet::new(&["target/**", "*.tmp"]).unwrap();
        assert!(set.is_excluded(Path::new("target/debug/x")));
        assert!(set.is_excluded(Path::new("crates/a/target/debug/x")));
        assert!(set.is_excluded(Path::new("a/b/c.tmp")));
        assert!(!set.is_excluded(Path::new("src/target.rs")));
        assert!(set.is_excluded_dir(Path::new("crates/a/target")));
    }

    #[test]
    fn star_does_not_cross_directories() {
        let set = ExcludeSet::new(&["dist/*.js"]).unwrap();
        assert!(set.is_excluded(Path::new("dist/a.js")));
        assert!(!set.is_excluded(Path::new("dist/sub/a.js")));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(ExcludeSet::new(&["src/[unclosed"]).is_err());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(enumerate_files(&missing, &ExcludeSet::defaults()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "a.txt");
        touch(root, "locked/secret.txt");
        touch(root, "z/b.txt");
        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users read through mode 000; nothing to check then.
        let readable = fs::read_dir(&locked).is_ok();

        let files = enumerate_files(root, &ExcludeSet::defaults());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            return;
        }
        assert_eq!(names(&files.unwrap()), vec!["a.txt", "z/b.txt"]);
    }

    #[test]
    fn empty_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = enumerate_files(dir.path(), &ExcludeSet::defaults()).unwrap();
        assert!(files.is_empty());
    }
}
