//! Implementation of the `order-service config` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::Cli;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    pub config: Config,
}

impl ConfigOutput {
    /// YAML, in the same shape the config file accepts.
    pub fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn render(&self, json_mode: bool) -> String {
        if json_mode {
            serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
        } else {
            self.to_human()
        }
    }
}

pub fn execute(cli: &Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref(), &cli.overrides())?;
    println!("{}", ConfigOutput { config }.render(cli.json));
    Ok(())
}
