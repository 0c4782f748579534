use directories::ProjectDirs;
use std::path::PathBuf;

const DEFAULT_ZMANIM_URL: &str = "http://localhost:8030/api/zmanim";

/// Process-wide fixed configuration: where durable data lives and which
/// zmanim service to ask. Built once at startup, before anything runs.
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub zmanim_url: String,
}

impl AppConfig {
    pub fn new() -> Self {
        let proj_dirs = ProjectDirs::from("org", "luach-board", "LuachBoard")
            .expect("Failed to determine project directories");
        let data_dir = proj_dirs.data_dir().to_path_buf();
        let zmanim_url = std::env::var("LUACH_ZMANIM_URL")
            .unwrap_or_else(|_| DEFAULT_ZMANIM_URL.to_string());
        Self {
            data_dir,
            zmanim_url,
        }
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
