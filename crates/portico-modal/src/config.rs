//! Declarative overlay configuration.
//!
//! ```yaml
//! modal:
//!   allow_scroll: false
//!   background_props: { data-testid: backdrop }
//!   wrapper_style: "background: white; padding: ${padding};"
//! background:
//!   color: "rgba(0, 0, 0, 0.5)"
//!   z_index: 30
//! ```

use crate::modal::ModalBuilder;
use crate::styled::{StyleError, StyleTemplate, StyledWrapper};
use portico_core::Props;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;

/// Default backdrop colour.
pub const DEFAULT_BACKGROUND_COLOR: &str = "rgba(0, 0, 0, 0.5)";

/// Default backdrop stacking order.
pub const DEFAULT_Z_INDEX: i32 = 30;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    /// Invalid `wrapper_style`
    #[error("invalid wrapper style: {0}")]
    Style(#[from] StyleError),
}

/// Top-level overlay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Defaults for modals
    pub modal: ModalConfig,
    /// Backdrop appearance
    pub background: BackgroundConfig,
}

impl OverlayConfig {
    /// Parse from YAML. The wrapper style is validated up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or `wrapper_style` does not
    /// parse as a style template.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.modal.wrapper()?;
        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

/// Modal defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Leave page scrolling enabled while open
    pub allow_scroll: bool,
    /// Attributes for the backdrop element
    pub background_props: Props,
    /// Pass-through props for the wrapper
    pub props: Props,
    /// Style template for a generated wrapper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper_style: Option<String>,
}

impl ModalConfig {
    /// Styled wrapper described by `wrapper_style`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `wrapper_style` does not parse.
    pub fn wrapper(&self) -> Result<Option<StyledWrapper>, StyleError> {
        self.wrapper_style
            .as_deref()
            .map(|style| StyleTemplate::parse(style).map(StyledWrapper::new))
            .transpose()
    }
}

impl ModalBuilder {
    /// Apply configured defaults. Props from the config are merged over
    /// props already set; a configured wrapper style replaces the wrapper.
    ///
    /// # Errors
    ///
    /// Returns an error if `wrapper_style` does not parse.
    pub fn config(self, config: &ModalConfig) -> Result<Self, StyleError> {
        let mut background_props = self.peek().background_props.clone();
        background_props.merge(&config.background_props);
        let mut props = self.peek().props.clone();
        props.merge(&config.props);

        let builder = self
            .allow_scroll(config.allow_scroll)
            .background_props(background_props)
            .props(props);
        Ok(match config.wrapper()? {
            Some(wrapper) => builder.wrapper_rc(Rc::new(wrapper)),
            None => builder,
        })
    }

    /// Builder preconfigured from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `wrapper_style` does not parse.
    pub fn from_config(config: &ModalConfig) -> Result<Self, StyleError> {
        Self::new().config(config)
    }
}

/// Backdrop appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// CSS background colour
    pub color: String,
    /// CSS z-index
    pub z_index: i32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: DEFAULT_BACKGROUND_COLOR.to_string(),
            z_index: DEFAULT_Z_INDEX,
        }
    }
}

impl BackgroundConfig {
    /// Inline style of the backdrop element.
    #[must_use]
    pub fn style(&self) -> String {
        format!(
            "display: flex; position: fixed; top: 0; left: 0; width: 100vw; height: 100vh; \
             z-index: {}; background-color: {}; align-items: center; justify-content: center;",
            self.z_index, self.color
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
modal:
  allow_scroll: true
  background_props: { data-testid: backdrop }
  props: { padding: 2rem }
  wrapper_style: "background: white; padding: ${padding};"
background:
  color: "rgba(10, 20, 30, 0.8)"
  z_index: 99
"#;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert!(!config.modal.allow_scroll);
        assert!(config.modal.wrapper_style.is_none());
        assert_eq!(config.background.color, DEFAULT_BACKGROUND_COLOR);
        assert_eq!(config.background.z_index, DEFAULT_Z_INDEX);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = OverlayConfig::from_yaml("{}").unwrap();
        assert_eq!(config, OverlayConfig::default());
    }

    #[test]
    fn test_parse_sample() {
        let config = OverlayConfig::from_yaml(SAMPLE).unwrap();
        assert!(config.modal.allow_scroll);
        assert_eq!(config.modal.background_props.get("data-testid"), Some("backdrop"));
        assert_eq!(config.modal.props.get("padding"), Some("2rem"));
        assert_eq!(config.background.z_index, 99);
        let wrapper = config.modal.wrapper().unwrap().unwrap();
        assert_eq!(
            wrapper.template().render(&config.modal.props),
            "background: white; padding: 2rem;"
        );
    }

    #[test]
    fn test_bad_wrapper_style_rejected() {
        let err = OverlayConfig::from_yaml("modal:\n  wrapper_style: \"width: ${w\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Style(StyleError::Unterminated(_))));
    }

    #[test]
    fn test_bad_yaml_rejected() {
        let err = OverlayConfig::from_yaml("modal: [").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().starts_with("YAML error"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = OverlayConfig::from_yaml(SAMPLE).unwrap();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(OverlayConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_background_style() {
        let style = BackgroundConfig::default().style();
        assert!(style.contains("position: fixed;"));
        assert!(style.contains("z-index: 30;"));
        assert!(style.contains("background-color: rgba(0, 0, 0, 0.5);"));
    }

    #[test]
    fn test_builder_config_merges_props() {
        let config = OverlayConfig::from_yaml(SAMPLE).unwrap();
        let builder = ModalBuilder::new()
            .background_prop("id", "bg")
            .config(&config.modal)
            .unwrap();
        let props = builder.peek();
        assert!(props.allow_scroll);
        assert_eq!(props.background_props.get("id"), Some("bg"));
        assert_eq!(props.background_props.get("data-testid"), Some("backdrop"));
        assert!(props.wrapper.is_some());
    }

    #[test]
    fn test_from_config_without_style_has_no_wrapper() {
        let builder = ModalBuilder::from_config(&ModalConfig::default()).unwrap();
        assert!(builder.peek().wrapper.is_none());
    }
}
