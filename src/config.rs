use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const APP_DIR: &str = "rdm-connect";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub backend_url: String,
    pub gitlab_host: String,
    pub token_store: PathBuf,
    pub log_file: PathBuf,
    pub request_timeout_secs: u64,
    pub max_branches: usize,
}

impl Default for Config {
    fn default() -> Self {
        let dir = config_dir().join(APP_DIR);
        Self {
            backend_url: "http://localhost:7788".to_string(),
            gitlab_host: "https://gitlab.kuleuven.be".to_string(),
            token_store: dir.join("tokens.toml"),
            log_file: dir.join("rdm-connect.log"),
            request_timeout_secs: 30,
            max_branches: 100,
        }
    }
}

impl Config {
    pub fn load(backend_url: Option<String>) -> Self {
        let config_file = config_dir().join(APP_DIR).join("config.toml");
        Self::load_from(&config_file, backend_url)
    }

    fn load_from(config_file: &std::path::Path, backend_url: Option<String>) -> Self {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if config_file.exists() {
            figment = figment.merge(Toml::file(config_file));
        }

        figment = figment.merge(Env::prefixed("RDM_CONNECT_"));

        if let Some(url) = backend_url {
            figment = figment.merge(Serialized::default("backend_url", url));
        }

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("warning: config parse error, using defaults: {e}");
                Config::default()
            }
        }
    }

    /// URL template shown in the URL field for a fresh GitLab form.
    pub fn gitlab_placeholder(&self) -> String {
        format!(
            "{}/<group>/<project>",
            self.gitlab_host.trim_end_matches('/')
        )
    }
}

pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_when_no_file_or_env() {
        std::env::remove_var("RDM_CONNECT_BACKEND_URL");
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml"), None);
        assert_eq!(config.backend_url, "http://localhost:7788");
        assert_eq!(config.max_branches, 100);
    }

    #[test]
    #[serial]
    fn file_then_env_then_cli() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(
            &file,
            "backend_url = \"http://file:1\"\ngitlab_host = \"https://git.example.org/\"\n",
        )
        .unwrap();

        std::env::remove_var("RDM_CONNECT_BACKEND_URL");
        let from_file = Config::load_from(&file, None);
        assert_eq!(from_file.backend_url, "http://file:1");
        assert_eq!(
            from_file.gitlab_placeholder(),
            "https://git.example.org/<group>/<project>"
        );

        std::env::set_var("RDM_CONNECT_BACKEND_URL", "http://env:2");
        let from_env = Config::load_from(&file, None);
        assert_eq!(from_env.backend_url, "http://env:2");

        let from_cli = Config::load_from(&file, Some("http://cli:3".to_string()));
        assert_eq!(from_cli.backend_url, "http://cli:3");
        std::env::remove_var("RDM_CONNECT_BACKEND_URL");
    }

    #[test]
    #[serial]
    fn bad_file_falls_back_to_defaults() {
        std::env::remove_var("RDM_CONNECT_BACKEND_URL");
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(&file, "max_branches = \"lots\"\n").unwrap();
        assert_eq!(Config::load_from(&file, None), Config::default());
    }
}
