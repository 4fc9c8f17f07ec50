//! Composition settings
//!
//! Settings are layered with figment: built-in defaults, then an optional
//! TOML file, then `CLASSMIX_`-prefixed environment variables.
//!
//! The process-wide copy follows a single-writer rule: [`configure`] may
//! install it once, before the first global merge. The first global merge
//! freezes whatever is installed (the defaults if nothing was).

use std::path::Path;
use std::sync::OnceLock;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{ClassError, Result};

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "CLASSMIX_";

static SETTINGS: OnceLock<ComposeConfig> = OnceLock::new();

/// Settings read by the merge engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Replace members that two parents define with different functions
    /// by a stub that fails when called (default: off)
    pub disambiguate_diamonds: bool,
}

impl ComposeConfig {
    /// Settings with diamond disambiguation switched on
    pub fn disambiguating() -> Self {
        Self {
            disambiguate_diamonds: true,
        }
    }

    /// Load settings from defaults, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(ComposeConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config: ComposeConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }
}

/// Install the process-wide settings.
///
/// Fails with [`ClassError::AlreadyConfigured`] if settings were already
/// installed or a global merge already ran.
pub fn configure(config: ComposeConfig) -> Result<()> {
    SETTINGS
        .set(config)
        .map_err(|_| ClassError::AlreadyConfigured)?;
    tracing::debug!(
        "Installed composition settings (disambiguate_diamonds={})",
        config.disambiguate_diamonds
    );
    Ok(())
}

/// The process-wide settings, freezing the defaults on first use
pub fn settings() -> ComposeConfig {
    *SETTINGS.get_or_init(ComposeConfig::default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = ComposeConfig::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, ComposeConfig::default());
            assert!(!config.disambiguate_diamonds);
            Ok(())
        });
    }

    #[test]
    fn test_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("classmix.toml", "disambiguate_diamonds = true")?;
            let config = ComposeConfig::load(Some(Path::new("classmix.toml")))
                .map_err(|e| e.to_string())?;
            assert!(config.disambiguate_diamonds);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("classmix.toml", "disambiguate_diamonds = true")?;
            jail.set_env("CLASSMIX_DISAMBIGUATE_DIAMONDS", "false");
            let config = ComposeConfig::load(Some(Path::new("classmix.toml")))
                .map_err(|e| e.to_string())?;
            assert!(!config.disambiguate_diamonds);
            Ok(())
        });
    }

    #[test]
    fn test_bad_value_is_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("classmix.toml", "disambiguate_diamonds = \"sometimes\"")?;
            let result = ComposeConfig::load(Some(Path::new("classmix.toml")));
            assert!(matches!(result, Err(ClassError::Config(_))));
            Ok(())
        });
    }
}
