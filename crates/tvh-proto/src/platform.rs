//! Where tvhc keeps its files.

#[cfg(not(windows))]
use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "tvhc";

/// Log files live here: `~/.local/share/tvhc` on unix (also on macOS, for one
/// layout everywhere), the local app-data folder on Windows.
pub fn data_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(dir) = beside_exe("data") {
            return dir;
        }
        return dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR);
    }
    #[cfg(not(windows))]
    {
        match dirs::home_dir() {
            Some(home) => home.join(".local").join("share").join(APP_DIR),
            None => std::env::temp_dir().join(APP_DIR),
        }
    }
}

/// Directory holding `config.toml`.
pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Some(dir) = beside_exe("config.toml").and_then(|p| p.parent().map(PathBuf::from)) {
            return dir;
        }
        return dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
    }
    #[cfg(not(windows))]
    {
        config_dir_from(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
    }
}

#[cfg(not(windows))]
fn config_dir_from(xdg: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    match xdg.filter(|x| !x.is_empty()) {
        Some(xdg) => PathBuf::from(xdg).join(APP_DIR),
        None => home
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR),
    }
}

/// Portable installs keep their files next to the executable.
#[cfg(windows)]
fn beside_exe(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe.parent()?.join(name);
    candidate.exists().then_some(candidate)
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_xdg_config_home_wins() {
        let dir = config_dir_from(Some("/xdg".into()), Some("/home/me".into()));
        assert_eq!(dir, PathBuf::from("/xdg/tvhc"));
    }

    #[test]
    fn test_empty_xdg_falls_back_to_home() {
        let dir = config_dir_from(Some(OsString::new()), Some("/home/me".into()));
        assert_eq!(dir, PathBuf::from("/home/me/.config/tvhc"));
    }
}
