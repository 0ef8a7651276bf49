use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Root configuration: target name to connection settings, processed in the
/// map's sorted order.
pub type Config = BTreeMap<String, TargetConfig>;

/// Connection settings for a single backup target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetConfig {
    #[serde(rename = "type")]
    pub engine: Engine,

    /// Local socket of the database server
    pub socket: PathBuf,

    pub user: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Postgresql,
    Mariadb,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Postgresql => write!(f, "postgresql"),
            Engine::Mariadb => write!(f, "mariadb"),
        }
    }
}
