use std::env;
use std::path::PathBuf;

/// XDG Base Directory paths for workbench
pub struct XdgPaths;

impl XdgPaths {
    /// Get XDG_CONFIG_HOME/workbench or fallback
    pub fn config_dir() -> PathBuf {
        Self::base("XDG_CONFIG_HOME", ".config").join("workbench")
    }

    /// Get XDG_CACHE_HOME/workbench or fallback
    pub fn cache_dir() -> PathBuf {
        Self::base("XDG_CACHE_HOME", ".cache").join("workbench")
    }

    /// Default location of the JSON configuration file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    fn base(var: &str, home_relative: &str) -> PathBuf {
        env::var(var).map(PathBuf::from).unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|home| home.join(home_relative))
                .unwrap_or_else(|| PathBuf::from(home_relative))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_xdg_paths_with_env() {
        let config_orig = env::var("XDG_CONFIG_HOME").ok();
        let cache_orig = env::var("XDG_CACHE_HOME").ok();

        env::set_var("XDG_CONFIG_HOME", "/tmp/config");
        env::set_var("XDG_CACHE_HOME", "/tmp/cache");

        assert_eq!(XdgPaths::config_dir(), PathBuf::from("/tmp/config/workbench"));
        assert_eq!(XdgPaths::cache_dir(), PathBuf::from("/tmp/cache/workbench"));
        assert_eq!(
            XdgPaths::config_file(),
            PathBuf::from("/tmp/config/workbench/config.json")
        );

        match config_orig {
            Some(val) => env::set_var("XDG_CONFIG_HOME", val),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
        match cache_orig {
            Some(val) => env::set_var("XDG_CACHE_HOME", val),
            None => env::remove_var("XDG_CACHE_HOME"),
        }
    }
}
