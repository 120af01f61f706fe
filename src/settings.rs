// Copyright 2023 Remi Bernotavicius

use crate::store::StoreConfig;
use std::path::{Path, PathBuf};

#[derive(clap::Args, Clone, Debug)]
pub struct StoreSettings {
    /// SQLite database to use. Defaults to `data.sqlite` in the data directory.
    #[arg(long, global = true, env = "MEAL_PLANNER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Where to keep data when the database can't be opened. Defaults to `local.json` in the
    /// data directory.
    #[arg(long, global = true, env = "MEAL_PLANNER_LOCAL_STORE")]
    pub local_store: Option<PathBuf>,
}

impl StoreSettings {
    pub fn store_config(&self, data_path: &Path) -> StoreConfig {
        StoreConfig {
            database: self
                .database
                .clone()
                .unwrap_or_else(|| data_path.join("data.sqlite")),
            local_store: Some(
                self.local_store
                    .clone()
                    .unwrap_or_else(|| data_path.join("local.json")),
            ),
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct ServerSettings {
    #[arg(long, env = "MEAL_PLANNER_PORT", default_value_t = 3002)]
    pub port: u16,

    /// Origin allowed to make cross-origin requests. Any origin when unset.
    #[arg(long, env = "MEAL_PLANNER_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Reported by the health endpoint.
    #[arg(long, env = "MEAL_PLANNER_ENVIRONMENT", default_value = "production")]
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestArgs {
        #[command(flatten)]
        store: StoreSettings,
        #[command(flatten)]
        server: ServerSettings,
    }

    #[test]
    fn explicit_paths_win() {
        let args = TestArgs::try_parse_from([
            "test",
            "--database",
            "/tmp/meals.sqlite",
            "--port",
            "8080",
            "--environment",
            "development",
        ])
        .unwrap();
        assert_eq!(args.server.port, 8080);
        assert_eq!(args.server.environment, "development");

        let config = args.store.store_config(Path::new("/data"));
        assert_eq!(config.database, PathBuf::from("/tmp/meals.sqlite"));
        assert_eq!(config.local_store, Some(PathBuf::from("/data/local.json")));
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(TestArgs::try_parse_from(["test", "--port", "lots"]).is_err());
    }
}
