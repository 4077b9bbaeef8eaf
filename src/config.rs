use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_FILE: &str = "data/tasks.json";
pub const DATA_FILE_ENV: &str = "TT_DATA_FILE";

/// `RUST_LOG` wins over `--debug`, which wins over the default `info`.
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Expands a leading `~` to the home directory. Anything else is returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_home(Path::new(DEFAULT_DATA_FILE)), PathBuf::from("data/tasks.json"));
        assert_eq!(expand_home(Path::new("/tmp/t.json")), PathBuf::from("/tmp/t.json"));
        assert_eq!(expand_home(Path::new("~other/t.json")), PathBuf::from("~other/t.json"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/todo/tasks.json")), home.join("todo/tasks.json"));
        }
    }
}
