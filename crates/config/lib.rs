use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// 组合编号可能写成数字，也可能写成字符串
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_yaml::Value> = Deserialize::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(serde::de::Error::custom("Expected string|number")),
    }
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Portfolios {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub first: Option<String>,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub second: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub source: Option<String>,
    pub reference_date: Option<NaiveDate>,
    #[serde(default)]
    pub portfolios: Portfolios,
    pub top: Option<usize>,
}

impl Config {
    pub fn new(filename: &str) -> Result<Config, ConfigError> {
        let reader = File::open(filename)?;
        let config: Config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// 文件不存在时使用默认配置
    pub fn load_or_default(filename: &str) -> Result<Config, ConfigError> {
        if Path::new(filename).exists() {
            Config::new(filename)
        } else {
            Ok(Config::default())
        }
    }

    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or("data/book_data.csv")
    }
}
