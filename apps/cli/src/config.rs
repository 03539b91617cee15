use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tabstats_app::ReportSettings;

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_PORT: u16 = 3845;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    pub reports: ReportSettings,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_dir: None,
            reports: ReportSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub file: PathBuf,
    pub data_dir: PathBuf,
    pub created: bool,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "tabstats", "tabstats")
        .ok_or_else(|| anyhow!("could not resolve a home directory"))
}

pub fn load_or_create() -> Result<ConfigLoad> {
    let dirs = project_dirs()?;
    let mut load = load_or_create_in(dirs.config_dir())?;
    load.data_dir = match load.config.data_dir.as_deref() {
        Some(dir) => tabstats_app_api::expand_home_path(dir),
        None => dirs.data_dir().to_path_buf(),
    };
    Ok(load)
}

fn load_or_create_in(dir: &Path) -> Result<ConfigLoad> {
    fs::create_dir_all(dir).with_context(|| format!("create config dir {}", dir.display()))?;
    let file = dir.join(CONFIG_FILE_NAME);

    if file.exists() {
        let contents = fs::read_to_string(&file)
            .with_context(|| format!("read config {}", file.display()))?;
        let config: CliConfig = toml::from_str(&contents)
            .with_context(|| format!("parse config {}", file.display()))?;
        return Ok(ConfigLoad {
            config,
            data_dir: PathBuf::new(),
            file,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents = toml::to_string_pretty(&config).context("serialize config")?;
    fs::write(&file, contents).with_context(|| format!("write config {}", file.display()))?;

    Ok(ConfigLoad {
        config,
        data_dir: PathBuf::new(),
        file,
        created: true,
    })
}
