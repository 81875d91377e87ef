#![allow(dead_code)]
use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    _dir: TempDir,
    pub cfg: PathBuf,
    pub state: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = dir.path().join("config");
        let state = dir.path().join("state");
        std::fs::create_dir_all(&cfg).expect("cfg dir");
        Self {
            _dir: dir,
            cfg,
            state,
        }
    }

    /// Binary with isolated XDG dirs and logging kept quiet.
    pub fn bin(&self) -> Command {
        let mut cmd = Command::cargo_bin("galleria").unwrap();
        cmd.env("XDG_CONFIG_HOME", &self.cfg);
        cmd.env("XDG_STATE_HOME", &self.state);
        cmd.env_remove("GALLERIA_LOG");
        cmd
    }

    /// Binary serving pages from `fixture` instead of the network.
    pub fn offline(&self, fixture: &PathBuf) -> Command {
        let mut cmd = self.bin();
        cmd.arg("--fixture").arg(fixture);
        cmd
    }

    /// Checked-in five-record sample.
    pub fn sample_fixture(&self) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/artworks.json")
    }

    /// Generated catalog with ids `1..=n`.
    pub fn write_catalog(&self, n: u64) -> PathBuf {
        let records: Vec<serde_json::Value> = (1..=n)
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "title": format!("Work {}", id),
                    "artist_display": "Unknown",
                    "date_start": 1900,
                    "date_end": 1901,
                })
            })
            .collect();
        let path = self.cfg.join(format!("catalog-{}.json", n));
        std::fs::write(&path, serde_json::to_vec(&records).unwrap()).unwrap();
        path
    }

    pub fn write_settings(&self, toml: &str) {
        let dir = self.cfg.join("galleria");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("settings.toml"), toml).unwrap();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
