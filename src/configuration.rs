use std::{path::Path, time::Duration};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::services::MatchStrategy;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub fetch: FetchSettings,
    pub place_search: PlaceSearchSettings,
    pub registry: RegistrySettings,
    pub pipeline: PipelineSettings,
    pub export: ExportSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct FetchSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_retries: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub initial_delay_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
}

impl FetchSettings {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_millis)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct PlaceSearchSettings {
    pub base_url: String,
    pub path: String,
    pub search_coord: String,
    pub cookie: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RegistrySettings {
    pub base_url: String,
    pub search_path: String,
    pub match_strategy: MatchStrategy,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_candidates: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PipelineSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workers: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExportSettings {
    pub output_dir: String,
    pub default_base_name: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No current directory: {}", e)))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    configuration_builder(&base_path.join("configuration"), &environment)
        // e.g. `APP_FETCH__MAX_RETRIES=3` sets `Settings.fetch.max_retries`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize::<Settings>()
}

/// `base.yaml` overlaid by the optional `<environment>.yaml`.
fn configuration_builder(
    configuration_directory: &Path,
    environment: &Environment,
) -> config::ConfigBuilder<config::builder::DefaultState> {
    let environment_filename = format!("{}.yaml", environment.as_str());

    config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename))
                .required(false),
        )
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
