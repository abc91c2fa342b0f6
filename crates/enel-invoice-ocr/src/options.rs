use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ExtractError;
use crate::layout::{LayoutId, LayoutRules, LayoutVariant, RegionBox};

/// Layout choice: detect from the anchor region, or force one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Auto,
    Fixed(LayoutId),
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        LayoutId::from_str(value).map(Self::Fixed)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractOptions {
    pub layout: LayoutMode,
    pub rules: Option<LayoutRules>,
}

impl ExtractOptions {
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: LayoutRules) -> Self {
        self.rules = Some(rules);
        self
    }
}

/// Reads anchor rules from a JSON file.
pub fn load_rules(path: &Path) -> Result<LayoutRules, ExtractError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Builds rules from a comma-separated anchor list and an `x,y,w,h` region,
/// as supplied through environment configuration. The second variant is
/// enabled so that an anchor miss selects it.
pub fn rules_from_parts(anchors: &str, region: &str) -> Result<LayoutRules, ExtractError> {
    let anchors = anchors
        .split(',')
        .map(str::trim)
        .filter(|anchor| !anchor.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if anchors.is_empty() {
        return Err(ExtractError::InvalidOption(
            "layout anchors cannot be empty".to_string(),
        ));
    }
    let region = RegionBox::from_str(region).map_err(ExtractError::InvalidOption)?;

    Ok(LayoutRules {
        v1: Some(LayoutVariant {
            anchors,
            region: Some(region),
        }),
        v2: Some(LayoutVariant::default()),
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::layout::LayoutId;

    use super::{LayoutMode, load_rules, rules_from_parts};

    #[test]
    fn parse_layout_mode() {
        assert_eq!(LayoutMode::from_str("AUTO"), Ok(LayoutMode::Auto));
        assert_eq!(
            LayoutMode::from_str("v2"),
            Ok(LayoutMode::Fixed(LayoutId::V2))
        );
        let err = LayoutMode::from_str("v9").expect_err("unknown layout should fail");
        assert!(err.contains("unknown layout"));
    }

    #[test]
    fn builds_rules_from_env_values() {
        let rules = rules_from_parts("CONTA DE ENERGIA, NOTA FISCAL", "0,0,800,120")
            .expect("rules should build");
        let region = rules.anchor_region().expect("anchor region");
        assert_eq!((region.width, region.height), (800, 120));
        assert!(rules.v2.is_some());
    }

    #[test]
    fn rejects_bad_env_values() {
        assert!(rules_from_parts(" , ", "0,0,800,120").is_err());
        assert!(rules_from_parts("CONTA", "0,0,800").is_err());
    }

    #[test]
    fn loads_rules_file() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("headers.json");
        std::fs::write(
            &path,
            r#"{"v1": {"anchors": ["CONTA"], "region": {"x": 1, "y": 2, "w": 3, "h": 4}}}"#,
        )
        .expect("rules file should be written");

        let rules = load_rules(&path).expect("rules should load");
        assert!(rules.anchor_region().is_some());
        assert!(rules.v2.is_none());

        std::fs::write(&path, "{not json").expect("rules file should be written");
        assert!(load_rules(&path).is_err());
    }
}
