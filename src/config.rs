use eyre::{Error, WrapErr};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_DATABASE: &str = "postgres://localhost/hackbright";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

impl Config {
    pub fn load(file_name: &Path) -> Result<Config, Error> {
        let content = std::fs::read_to_string(file_name).wrap_err_with(|| {
            format!("cannot load configuration file {}", file_name.display())
        })?;
        Config::parse(&content)
            .wrap_err_with(|| format!("cannot parse configuration file {}", file_name.display()))
    }

    /// Like [`Config::load`], except that a missing file yields the default configuration.
    pub fn load_if_exists(file_name: &Path) -> Result<Config, Error> {
        if file_name.exists() {
            Config::load(file_name)
        } else {
            Ok(Config::default())
        }
    }

    fn parse(content: &str) -> Result<Config, Error> {
        Ok(toml::from_str(content)?)
    }

    /// The connection string, the one given on the command line taking precedence.
    pub fn database_url(&self, from_command_line: Option<&str>) -> String {
        from_command_line
            .or(self.database.url.as_deref())
            .unwrap_or(DEFAULT_DATABASE)
            .to_owned()
    }
}
