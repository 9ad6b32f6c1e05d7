use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::{
    app::connection::{Connection, ENVIRONMENTS},
    query::QueryParams,
};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_ENVIRONMENT: &str = "production";
const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 1000;
const DEFAULT_ORDER: &str = "title";
/// Projection used for book listings.
const DEFAULT_BOOK_KEYS: &str = "title,baseUrl,tags,langPointers,uploader,inCirculation,\
features,bookshelves,level,license,copyright,country,publisher,originalPublisher,\
harvestState,allTitles,createdAt,updatedAt";
const DEFAULT_INCLUDE: &str = "langPointers,uploader";

/// Phrases the search box knows even when the store has no such tag record.
fn default_fixed_phrases() -> Vec<String> {
    ["system:Incoming", "level:1", "level:2", "level:3", "level:4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_order() -> String {
    DEFAULT_ORDER.to_string()
}

fn default_book_keys() -> String {
    DEFAULT_BOOK_KEYS.to_string()
}

fn default_include() -> String {
    DEFAULT_INCLUDE.to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `production`, `develop` or `local`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Overrides the environment's server url.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Overrides the environment's application id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Session of a logged in moderator; needed for updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_order")]
    pub order: String,
    #[serde(default = "default_book_keys")]
    pub book_keys: String,
    #[serde(default = "default_include")]
    pub include: String,
    #[serde(default = "default_fixed_phrases")]
    pub fixed_phrases: Vec<String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            server_url: None,
            app_id: None,
            session_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            order: default_order(),
            book_keys: default_book_keys(),
            include: default_include(),
            fixed_phrases: default_fixed_phrases(),
            base_path: PathBuf::new(),
        }
    }
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            bail!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            );
        }

        let custom_server = self.server_url.is_some() && self.app_id.is_some();
        if !custom_server && !ENVIRONMENTS.contains(&self.environment.as_str()) {
            bail!(
                "environment must be one of {}, got {:?}",
                ENVIRONMENTS.join(", "),
                self.environment
            );
        }

        for phrase in &self.fixed_phrases {
            if !phrase.contains(':') {
                bail!("fixed phrase {phrase:?} must look like axis:value");
            }
        }

        Ok(())
    }

    /// `SHELF_BASE_PATH`, or `~/.local/share/shelf`.
    pub fn base_path() -> anyhow::Result<PathBuf> {
        if let Ok(path) = std::env::var("SHELF_BASE_PATH") {
            return Ok(PathBuf::from(path));
        }
        let home = my_home()
            .map_err(|err| anyhow::anyhow!("could not determine home directory: {err:?}"))?
            .context("home directory path is empty")?;
        Ok(home.join(".local/share/shelf"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_with(&Self::base_path()?)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn load_with(base_path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(base_path)
            .with_context(|| format!("failed to create {}", base_path.display()))?;
        let path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !path.exists() {
            let config = Self {
                base_path: base_path.to_path_buf(),
                ..Default::default()
            };
            config.save()?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("{} is malformed", path.display()))?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(self.base_path.join(CONFIG_FILE), config_str)
            .context("failed to write config")?;
        Ok(())
    }

    /// Environment variables win over the file but are never saved.
    fn apply_env(&mut self) {
        if let Ok(environment) = std::env::var("SHELF_SERVER") {
            log::debug!("using server environment {environment:?} from SHELF_SERVER");
            self.environment = environment;
            self.server_url = None;
            self.app_id = None;
        }
        if let Ok(token) = std::env::var("SHELF_SESSION_TOKEN") {
            self.session_token = Some(token);
        }
    }

    pub fn connection(&self) -> anyhow::Result<Connection> {
        let connection = match (&self.server_url, &self.app_id) {
            (Some(url), Some(app_id)) => Connection::new(url, app_id),
            _ => Connection::for_environment(&self.environment)?,
        };
        Ok(connection.with_session_token(self.session_token.clone()))
    }

    /// Paging, projection and order for book listings.
    pub fn book_params(&self, page: u32) -> QueryParams {
        QueryParams {
            limit: Some(self.page_size),
            skip: Some(page.saturating_mul(self.page_size)).filter(|skip| *skip > 0),
            count: None,
            keys: Some(self.book_keys.clone()),
            include: Some(self.include.clone()),
            order: Some(self.order.clone()),
        }
    }
}
