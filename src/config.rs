use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Host page conventions and timings. `Default` matches the generator page;
/// every field can be overridden from JSON, missing fields keep defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerConfig {
    pub selectors: Selectors,
    pub classes: Classes,
    pub timing: Timing,
    pub shortcuts: Shortcuts,
    /// Local storage key of the parameter snapshot.
    pub storage_key: String,
    /// Attribute holding tooltip text.
    pub tooltip_attribute: String,
    pub progress_message: String,
    pub error_prefix: String,
    /// Printed to the console once initialization finishes; empty disables it.
    pub loaded_message: String,
    pub revert_policy: RevertPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub anchors: String,
    pub results_containers: String,
    pub primary_buttons: String,
    pub sliders: String,
    pub tooltip_triggers: String,
    pub named_inputs: String,
    pub secondary_button: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            anchors: r##"a[href^="#"]"##.to_string(),
            results_containers: ".results-container".to_string(),
            primary_buttons: ".stButton > button".to_string(),
            sliders: ".stSlider".to_string(),
            tooltip_triggers: "[data-tooltip]".to_string(),
            named_inputs: "input, select".to_string(),
            secondary_button: r#"button[kind="secondary"]"#.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classes {
    pub entrance: String,
    pub tooltip: String,
    pub progress_bar: String,
    pub progress_fill: String,
    pub progress_text: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            entrance: "fadeInUp".to_string(),
            tooltip: "custom-tooltip".to_string(),
            progress_bar: "progress-bar".to_string(),
            progress_fill: "progress-fill".to_string(),
            progress_text: "progress-text".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub press_revert_ms: u32,
    pub glow_revert_ms: u32,
    /// Gap between a tooltip's bottom edge and its trigger's top edge.
    pub tooltip_gap_px: f64,
    pub press_transform: String,
    pub glow_shadow: String,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            press_revert_ms: 150,
            glow_revert_ms: 300,
            tooltip_gap_px: 10.0,
            press_transform: "scale(0.98)".to_string(),
            glow_shadow: "0 0 10px rgba(102, 126, 234, 0.3)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutModifier {
    #[default]
    Ctrl,
    Meta,
    CtrlOrMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcuts {
    pub modifier: ShortcutModifier,
    pub generate_key: String,
    pub download_key: String,
    /// Visible text the generate button must contain.
    pub generate_label: String,
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            modifier: ShortcutModifier::Ctrl,
            generate_key: "g".to_string(),
            download_key: "d".to_string(),
            generate_label: "Generate".to_string(),
        }
    }
}

/// What happens to a pending style revert when the same control is used
/// again before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertPolicy {
    /// The pending revert is cancelled and rescheduled.
    CancelPrevious,
    /// Every interaction schedules its own revert; the first to fire clears
    /// the style.
    #[default]
    LastWriteWins,
}

impl EnhancerConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let selectors = [
            ("selectors.anchors", &self.selectors.anchors),
            ("selectors.results_containers", &self.selectors.results_containers),
            ("selectors.primary_buttons", &self.selectors.primary_buttons),
            ("selectors.sliders", &self.selectors.sliders),
            ("selectors.tooltip_triggers", &self.selectors.tooltip_triggers),
            ("selectors.named_inputs", &self.selectors.named_inputs),
            ("selectors.secondary_button", &self.selectors.secondary_button),
        ];
        for (name, value) in selectors {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{name} must not be empty")));
            }
        }
        if self.storage_key.is_empty() {
            return Err(Error::Config("storage_key must not be empty".into()));
        }
        if self.tooltip_attribute.is_empty() {
            return Err(Error::Config("tooltip_attribute must not be empty".into()));
        }
        if self.timing.press_revert_ms == 0 || self.timing.glow_revert_ms == 0 {
            return Err(Error::Config("revert delays must be at least 1ms".into()));
        }
        if self.shortcuts.generate_key.is_empty() || self.shortcuts.download_key.is_empty() {
            return Err(Error::Config("shortcut keys must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            classes: Classes::default(),
            timing: Timing::default(),
            shortcuts: Shortcuts::default(),
            storage_key: "quantumGeneratorParams".to_string(),
            tooltip_attribute: "data-tooltip".to_string(),
            progress_message: "Generating quantum data...".to_string(),
            error_prefix: "Application Error:".to_string(),
            loaded_message: "Quantum Data Generator - Enhanced UI Loaded".to_string(),
            revert_policy: RevertPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() -> Result<()> {
        let config = EnhancerConfig::from_json(
            r#"{"revert_policy":"cancel_previous","timing":{"press_revert_ms":90}}"#,
        )?;
        assert_eq!(config.revert_policy, RevertPolicy::CancelPrevious);
        assert_eq!(config.timing.press_revert_ms, 90);
        assert_eq!(config.timing.glow_revert_ms, 300);
        assert_eq!(config.storage_key, "quantumGeneratorParams");
        assert_eq!(config.selectors.primary_buttons, ".stButton > button");
        Ok(())
    }

    #[test]
    fn reverts_are_independent_by_default() {
        assert_eq!(EnhancerConfig::default().revert_policy, RevertPolicy::LastWriteWins);
    }

    #[test]
    fn empty_selector_is_rejected() {
        let err = EnhancerConfig::from_json(r#"{"selectors":{"sliders":"  "}}"#)
            .expect_err("blank selector must fail");
        assert!(matches!(err, Error::Config(msg) if msg.contains("selectors.sliders")));
    }

    #[test]
    fn zero_delay_is_rejected() {
        let mut config = EnhancerConfig::default();
        config.timing.glow_revert_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EnhancerConfig::from_json("{"),
            Err(Error::Config(_))
        ));
    }
}
