//! Terminal user interface over a registry

pub mod app;

pub use app::App;

use crate::config::BerthConfig;
use crate::error::Result;
use crate::registry::Registry;
use crate::scenario::STARTER;

/// Bring a registry built from `config` to the state an interactive
/// session opens with. Without a configured `initial_scenario` that is
/// the starter preset.
pub fn open_session(registry: &mut Registry, config: &BerthConfig) -> Result<()> {
    if config.initial_scenario.is_none() {
        registry.load_scenario(STARTER)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdStrategy;

    fn config() -> BerthConfig {
        BerthConfig {
            id_strategy: IdStrategy::Sequential,
            ..BerthConfig::default()
        }
    }

    #[test]
    fn test_session_opens_with_starter() {
        let config = config();
        let mut registry = Registry::from_config(&config).unwrap();
        open_session(&mut registry, &config).unwrap();

        assert!(registry.find_image_ref("nginx:latest").is_some());
        assert!(registry.find_image_ref("node:18-alpine").is_some());
        assert!(registry.find_volume("app-data").is_some());
        assert!(registry.graph().containers().is_empty());
        assert!(registry.command_log().is_empty());
        assert_eq!(registry.active_scenario(), Some(STARTER));
    }

    #[test]
    fn test_configured_scenario_wins() {
        let config = BerthConfig {
            initial_scenario: Some("web-db".to_string()),
            ..config()
        };
        let mut registry = Registry::from_config(&config).unwrap();
        open_session(&mut registry, &config).unwrap();

        assert_eq!(registry.active_scenario(), Some("web-db"));
        assert!(registry.find_volume("app-data").is_none());
    }
}
