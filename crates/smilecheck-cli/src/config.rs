use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use smilecheck_core::FlowConfig;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "SMILECHECK_CONFIG";

/// CLI configuration: the protocol tunables plus where they came from.
pub struct Config {
    /// Tunables after file and environment overrides.
    pub flow: FlowConfig,
    /// The TOML file that was read, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load tunables from an optional TOML file, then apply `SMILECHECK_*`
    /// environment overrides and validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let base = match &source {
            Some(path) => read_file(path)?,
            None => FlowConfig::default(),
        };

        let flow = apply_env(base);
        flow.validate().context("invalid configuration")?;

        Ok(Self { flow, source })
    }

    /// Effective configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.flow).context("failed to serialize configuration")
    }
}

fn read_file(path: &Path) -> Result<FlowConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Environment takes precedence over the file.
fn apply_env(mut flow: FlowConfig) -> FlowConfig {
    flow.hold_still_seconds = env_f32("SMILECHECK_HOLD_STILL_SECONDS", flow.hold_still_seconds);
    flow.smile_hold_seconds = env_f32("SMILECHECK_SMILE_HOLD_SECONDS", flow.smile_hold_seconds);
    flow.stability.movement_threshold = env_f32(
        "SMILECHECK_MOVEMENT_THRESHOLD",
        flow.stability.movement_threshold,
    );
    flow.smile.smoothing_alpha = env_f32("SMILECHECK_SMOOTHING_ALPHA", flow.smile.smoothing_alpha);
    flow.smile.smile_min = env_f32("SMILECHECK_SMILE_MIN", flow.smile.smile_min);
    flow.smile.asym_threshold = env_f32("SMILECHECK_ASYM_THRESHOLD", flow.smile.asym_threshold);
    flow
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "smilecheck-config-test-{tag}-{}.toml",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let path = temp_path("partial");
        std::fs::write(
            &path,
            "hold_still_seconds = 2.0\n\n[smile]\nasym_threshold = 0.5\n",
        )
        .unwrap();

        let flow = read_file(&path).unwrap();
        assert_eq!(flow.hold_still_seconds, 2.0);
        assert_eq!(flow.smile.asym_threshold, 0.5);
        assert_eq!(flow.smile.smile_min, 0.06);
        assert_eq!(flow.layout.mouth_right, 54);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_layout_section() {
        let path = temp_path("layout");
        std::fs::write(
            &path,
            "[layout]\nleft_eye = { start = 0, end = 5 }\nright_eye = { start = 6, end = 11 }\nmouth_left = 12\nmouth_right = 13\n",
        )
        .unwrap();

        let flow = read_file(&path).unwrap();
        assert_eq!(flow.layout.left_eye.end, 5);
        assert_eq!(flow.layout.mouth_right, 13);
        assert_eq!(flow.layout.required_len(), 14);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_file(&temp_path("missing")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_path("malformed");
        std::fs::write(&path, "hold_still_seconds = \"soon\"\n").unwrap();
        let err = read_file(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_env_f32_fallback() {
        assert_eq!(env_f32("SMILECHECK_TEST_UNSET_VARIABLE", 0.25), 0.25);
    }

    // Each env test owns a distinct variable; tests share the process env.

    #[test]
    fn test_env_overrides_file() {
        let path = temp_path("env-wins");
        std::fs::write(&path, "[smile]\nsmile_min = 0.08\nasym_threshold = 0.4\n").unwrap();

        std::env::set_var("SMILECHECK_SMILE_MIN", "0.5");
        let config = Config::load(Some(&path));
        std::env::remove_var("SMILECHECK_SMILE_MIN");

        let config = config.unwrap();
        assert_eq!(config.flow.smile.smile_min, 0.5);
        assert_eq!(config.flow.smile.asym_threshold, 0.4);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_env_override_is_rejected() {
        let path = temp_path("env-invalid");
        std::fs::write(&path, "hold_still_seconds = 2.0\n").unwrap();

        std::env::set_var("SMILECHECK_SMILE_HOLD_SECONDS", "-1");
        let result = Config::load(Some(&path));
        std::env::remove_var("SMILECHECK_SMILE_HOLD_SECONDS");

        let err = result.err().expect("negative hold accepted");
        assert!(err.to_string().contains("invalid configuration"));
        assert!(format!("{err:#}").contains("smile_hold_seconds"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let config = Config {
            flow: FlowConfig::default(),
            source: None,
        };
        let text = config.to_toml().unwrap();
        let back: FlowConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, FlowConfig::default());
    }
}
