use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::annotation::annotator::ChargeRange;
use crate::annotation::tolerance::Tolerance;
use crate::layout::geometry::{LabelPos, Rect};
use crate::layout::placement::LabelPlacer;

// ---------------------------------------------------------------------------
// Settings – everything a user can tweak, loaded from JSON
// ---------------------------------------------------------------------------

/// Top-level settings file.
///
/// ```json
/// {
///   "annotation": { "tolerance": { "minus": 10, "plus": 10, "is_absolute": false } },
///   "layout": { "space": 3.0, "templates": ["above", "above_right1"] }
/// }
/// ```
///
/// Every field is optional and falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub annotation: AnnotationSettings,
    pub layout: LayoutSettings,
}

/// Which ion kinds to annotate, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    pub tolerance: Tolerance,
    pub precursor_charges: ChargeRange,
    pub fragment_charges: ChargeRange,
    pub oxonium_charges: ChargeRange,
    pub precursor: bool,
    pub precursor_h2o: bool,
    pub precursor_nh3: bool,
    pub precursor_h3po4: bool,
    pub oxonium: bool,
    pub glycan_y: bool,
    pub n_core: bool,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        AnnotationSettings {
            tolerance: Tolerance::default(),
            precursor_charges: ChargeRange::unbounded(1),
            fragment_charges: ChargeRange::unbounded(1),
            oxonium_charges: ChargeRange::new(1, 1),
            precursor: true,
            precursor_h2o: true,
            precursor_nh3: false,
            precursor_h3po4: false,
            oxonium: true,
            glycan_y: true,
            n_core: true,
        }
    }
}

/// Label placement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Gap between an anchor and its label, in screen units.
    pub space: f64,
    /// Templates to try, in preference order.
    pub templates: Vec<LabelPos>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        LayoutSettings {
            space: 2.0,
            templates: LabelPos::ABOVE.to_vec(),
        }
    }
}

impl LayoutSettings {
    /// Placer for a drawing area. An empty template list falls back to the
    /// "above" family.
    pub fn placer(&self, area: Rect) -> LabelPlacer {
        if self.templates.is_empty() {
            log::warn!("no label templates configured, using the default set");
            return LabelPlacer::new(self.space, area);
        }
        LabelPlacer::with_templates(self.space, area, self.templates.clone())
    }
}

/// Parse settings from JSON text.
pub fn parse_settings(text: &str) -> Result<Settings> {
    serde_json::from_str(text).context("parsing settings JSON")
}

/// Load settings from a JSON file.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    parse_settings(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let settings = parse_settings("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_override() {
        let text = r#"{
            "annotation": {
                "tolerance": { "minus": 0.02, "plus": 0.02, "is_absolute": true },
                "fragment_charges": { "min": 1, "max": 3 },
                "n_core": false
            },
            "layout": { "space": 4.0, "templates": ["above", "above_left2"] }
        }"#;
        let settings = parse_settings(text).unwrap();
        assert_eq!(
            settings.annotation.tolerance,
            Tolerance::absolute(0.02, 0.02)
        );
        assert_eq!(settings.annotation.fragment_charges, ChargeRange::new(1, 3));
        assert!(!settings.annotation.n_core);
        assert!(settings.annotation.oxonium);
        assert_eq!(settings.layout.space, 4.0);
        assert_eq!(
            settings.layout.templates,
            vec![LabelPos::Above, LabelPos::AboveLeft2]
        );
    }

    #[test]
    fn test_rejects_unknown_template() {
        let text = r#"{"layout": {"templates": ["below"]}}"#;
        assert!(parse_settings(text).is_err());
    }

    #[test]
    fn test_rejects_invalid_charge_ranges() {
        let zero = r#"{"annotation": {"fragment_charges": {"min": 0, "max": 1}}}"#;
        let err = parse_settings(zero).unwrap_err();
        assert!(format!("{err:#}").contains("charge range must start at 1"));

        let inverted = r#"{"annotation": {"precursor_charges": {"min": 3, "max": 1}}}"#;
        assert!(parse_settings(inverted).is_err());

        let open = parse_settings(r#"{"annotation": {"oxonium_charges": {"min": 2}}}"#).unwrap();
        assert_eq!(open.annotation.oxonium_charges, ChargeRange::unbounded(2));
    }

    #[test]
    fn test_unbounded_charge_range_serializes_as_null() {
        let json = serde_json::to_string(&ChargeRange::unbounded(2)).unwrap();
        assert_eq!(json, r#"{"min":2,"max":null}"#);
    }
}
