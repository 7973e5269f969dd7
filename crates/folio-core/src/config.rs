//! Configuration — YAML config + env var overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Content file with topics, projects and preset questions
    /// (built-in content when unset)
    #[serde(default)]
    pub content_path: Option<String>,

    /// Delay between revealed characters of plain text
    #[serde(default = "default_text_delay")]
    pub text_delay_ms: u64,

    /// Delay between revealed characters inside a markup tag
    #[serde(default = "default_tag_delay")]
    pub tag_delay_ms: u64,

    /// Force a scroll-to-bottom every N revealed characters
    #[serde(default = "default_scroll_every")]
    pub scroll_every: u32,

    /// Per-character delay when typing a terminal command
    #[serde(default = "default_command_char_delay")]
    pub command_char_delay_ms: u64,

    /// Pause before a terminal command starts typing
    #[serde(default = "default_command_start_delay")]
    pub command_start_delay_ms: u64,

    /// Pause between a typed command and its project info appearing
    #[serde(default = "default_project_info_delay")]
    pub project_info_delay_ms: u64,

    /// Pause between sending a question and the thinking indicator
    #[serde(default = "default_send_delay")]
    pub send_delay_ms: u64,

    /// How long "Thinking..." stays up before the reply types out
    #[serde(default = "default_thinking_delay")]
    pub thinking_delay_ms: u64,

    /// Pause between a finished reply and the input re-enabling
    #[serde(default = "default_reenable_delay")]
    pub reenable_delay_ms: u64,

    /// Duration of the minimize / restore animation
    #[serde(default = "default_window_animation")]
    pub window_animation_ms: u64,

    /// Resolved project root (set at load time, not serialized from YAML)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_text_delay() -> u64 {
    18
}
fn default_tag_delay() -> u64 {
    25
}
fn default_scroll_every() -> u32 {
    3
}
fn default_command_char_delay() -> u64 {
    30
}
fn default_command_start_delay() -> u64 {
    200
}
fn default_project_info_delay() -> u64 {
    300
}
fn default_send_delay() -> u64 {
    300
}
fn default_thinking_delay() -> u64 {
    500
}
fn default_reenable_delay() -> u64 {
    200
}
fn default_window_animation() -> u64 {
    500
}

impl Config {
    /// Load config from a YAML file with env var overrides.
    pub fn load(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        let mut config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config.yaml")?;

        config.project_root = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf()
            .canonicalize()
            .unwrap_or_else(|_| {
                config_path
                    .parent()
                    .unwrap_or(Path::new("."))
                    .to_path_buf()
            });

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from the default location (project_root/config.yaml).
    /// Without a config file, defaults are used and env overrides still apply.
    pub fn load_from_dir(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join("config.yaml");
        if config_path.exists() {
            return Self::load(&config_path);
        }
        let mut config = Config {
            project_root: project_root.to_path_buf(),
            ..Config::default()
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("FOLIO_CONTENT") {
            self.content_path = Some(path);
        }
        if let Ok(ms) = std::env::var("FOLIO_TEXT_DELAY_MS") {
            self.text_delay_ms = ms
                .parse()
                .with_context(|| format!("FOLIO_TEXT_DELAY_MS is not a number: {}", ms))?;
        }
        if let Ok(ms) = std::env::var("FOLIO_TAG_DELAY_MS") {
            self.tag_delay_ms = ms
                .parse()
                .with_context(|| format!("FOLIO_TAG_DELAY_MS is not a number: {}", ms))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.text_delay_ms == 0 {
            anyhow::bail!("text_delay_ms must be greater than zero");
        }
        // Tag spans are invisible but still take time, so the reveal never pops.
        if self.tag_delay_ms == 0 {
            anyhow::bail!("tag_delay_ms must be greater than zero");
        }
        if self.command_char_delay_ms == 0 {
            anyhow::bail!("command_char_delay_ms must be greater than zero");
        }
        Ok(())
    }

    /// Resolve the content file path against the project root.
    pub fn resolve_content_path(&self) -> Option<PathBuf> {
        let path = self.content_path.as_ref()?;
        let p = Path::new(path);
        if p.is_absolute() {
            Some(p.to_path_buf())
        } else {
            Some(self.project_root.join(p))
        }
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    pub fn reenable_delay(&self) -> Duration {
        Duration::from_millis(self.reenable_delay_ms)
    }

    pub fn command_start_delay(&self) -> Duration {
        Duration::from_millis(self.command_start_delay_ms)
    }

    pub fn project_info_delay(&self) -> Duration {
        Duration::from_millis(self.project_info_delay_ms)
    }

    pub fn window_animation(&self) -> Duration {
        Duration::from_millis(self.window_animation_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_path: None,
            text_delay_ms: default_text_delay(),
            tag_delay_ms: default_tag_delay(),
            scroll_every: default_scroll_every(),
            command_char_delay_ms: default_command_char_delay(),
            command_start_delay_ms: default_command_start_delay(),
            project_info_delay_ms: default_project_info_delay(),
            send_delay_ms: default_send_delay(),
            thinking_delay_ms: default_thinking_delay(),
            reenable_delay_ms: default_reenable_delay(),
            window_animation_ms: default_window_animation(),
            project_root: PathBuf::new(),
        }
    }
}
