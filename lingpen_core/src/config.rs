use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::CoreError;

static DATA_DIR_NAME: &str = "lingpen";
static LINGPEN_DB_NAME: &str = "lingpen_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// Layout on disk:
// data_dir_path
// |- lingpen
//    |- lingpen_db.sqlite
//    |- config.json

#[derive(Serialize, Deserialize, Debug)]
pub struct LingpenConfig {
    pub(crate) database_path: PathBuf,
}

impl LingpenConfig {
    fn new(data_dir: PathBuf) -> Self {
        LingpenConfig {
            database_path: data_dir.join(LINGPEN_DB_NAME),
        }
    }

    pub fn database_path(&self) -> &PathBuf {
        &self.database_path
    }
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<LingpenConfig, CoreError> {
    let data_dir = dirs::data_dir().ok_or(CoreError::NoDataDir)?;

    let lingpen_dir = data_dir.join(DATA_DIR_NAME);
    let config_path = lingpen_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(&lingpen_dir).await?;

    if config_path.exists() {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: LingpenConfig = serde_json::from_str(&contents)?;
        Ok(config)
    } else {
        let config = LingpenConfig::new(lingpen_dir.clone());

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        Ok(config)
    }
}
