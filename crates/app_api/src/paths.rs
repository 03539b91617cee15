use std::path::{Path, PathBuf};

/// Expands a leading `~` against `$HOME`. Other paths pass through untouched.
pub fn expand_home_path(path: &str) -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => expand_with_home(path, Path::new(&home)),
        None => PathBuf::from(path),
    }
}

fn expand_with_home(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}
