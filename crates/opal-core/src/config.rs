use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub vault_path: String,
    pub db_path: String,
    pub template_dir: String,
    pub index_before_run: bool,
    pub sync_bookmarks: bool,
    pub sync_stars: bool,
    pub busy_timeout_ms: u64,
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_with(None)
}

/// Defaults, then `Config.toml`, then `OPAL_*` environment variables. A vault
/// path given on the command line wins over all of them.
pub fn load_configuration_with(vault_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("db_path", default_db_path())?
        .set_default("template_dir", "./templates")?
        .set_default("index_before_run", true)?
        .set_default("sync_bookmarks", true)?
        .set_default("sync_stars", true)?
        .set_default("busy_timeout_ms", 10_000_i64)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("OPAL").try_parsing(true))
        .set_override_option("vault_path", vault_path.map(str::to_string))?
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

fn default_db_path() -> String {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".diatom.sqlite")
            .to_string_lossy()
            .into_owned(),
        Err(_) => ".diatom.sqlite".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_override_and_defaults() {
        let config = load_configuration_with(Some("/tmp/vault")).unwrap();
        assert_eq!(config.vault_path, "/tmp/vault");
        assert!(config.db_path.ends_with(".diatom.sqlite"));
        assert!(config.busy_timeout_ms > 0);
    }

    #[test]
    fn test_missing_vault_path_is_an_error() {
        if env::var("OPAL_VAULT_PATH").is_ok() {
            return;
        }
        assert!(load_configuration().is_err());
    }
}
