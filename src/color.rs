use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};

use crate::annotation::ion::{IonFamily, IonKind};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format()
        })
        .collect()
}

/// `#rrggbb` form of a colour.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: ion family → colour
// ---------------------------------------------------------------------------

/// Maps each ion family to a distinct colour for drawing annotated peaks.
#[derive(Debug, Clone)]
pub struct IonColorMap {
    mapping: BTreeMap<IonFamily, Srgb<u8>>,
    default_color: Srgb<u8>,
}

impl Default for IonColorMap {
    fn default() -> Self {
        IonColorMap::new()
    }
}

impl IonColorMap {
    pub fn new() -> Self {
        let palette = generate_palette(IonFamily::ALL.len());
        let mapping: BTreeMap<IonFamily, Srgb<u8>> =
            IonFamily::ALL.iter().copied().zip(palette).collect();

        IonColorMap {
            mapping,
            default_color: Srgb::new(128, 128, 128),
        }
    }

    /// Look up the colour for an ion kind.
    pub fn color_for(&self, kind: IonKind) -> Srgb<u8> {
        self.mapping
            .get(&kind.family())
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (family name → colour).
    pub fn legend_entries(&self) -> Vec<(String, Srgb<u8>)> {
        self.mapping
            .iter()
            .map(|(family, c)| (format!("{family:?}"), *c))
            .collect()
    }
}
