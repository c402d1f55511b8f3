use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Physical constants (monoisotopic, Daltons)
// ---------------------------------------------------------------------------

pub const PROTON_MASS: f64 = 1.007_276_466_812;
pub const WATER_MASS: f64 = 18.010_564_684;
pub const AMMONIA_MASS: f64 = 17.026_549_101;
pub const PHOSPHORIC_ACID_MASS: f64 = 97.976_895_573;

/// m/z of a neutral `mass` carrying `charge` protons.
pub fn mz_for(mass: f64, charge: u32) -> f64 {
    debug_assert!(charge > 0, "charge must be positive");
    (mass + charge as f64 * PROTON_MASS) / charge as f64
}

// ---------------------------------------------------------------------------
// IonKind – closed set of ion categories
// ---------------------------------------------------------------------------

/// Peptide backbone fragment series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BackboneSeries {
    A,
    B,
    C,
    X,
    Y,
    Z,
}

impl BackboneSeries {
    pub fn letter(&self) -> &'static str {
        match self {
            BackboneSeries::A => "a",
            BackboneSeries::B => "b",
            BackboneSeries::C => "c",
            BackboneSeries::X => "x",
            BackboneSeries::Y => "y",
            BackboneSeries::Z => "z",
        }
    }

    pub fn is_n_terminal(&self) -> bool {
        matches!(
            self,
            BackboneSeries::A | BackboneSeries::B | BackboneSeries::C
        )
    }
}

/// Every ion category an annotation can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IonKind {
    Precursor,
    PrecursorH2O,
    PrecursorNH3,
    PrecursorH3PO4,
    Oxonium,
    GlycanY,
    GlycanCore,
    Immonium,
    /// Backbone fragment; `glyco` marks fragments still carrying the glycan.
    Backbone { series: BackboneSeries, glyco: bool },
}

/// Coarse grouping used for display colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IonFamily {
    Precursor,
    Oxonium,
    Glycan,
    Immonium,
    NTerminal,
    CTerminal,
}

impl IonFamily {
    pub const ALL: [IonFamily; 6] = [
        IonFamily::Precursor,
        IonFamily::Oxonium,
        IonFamily::Glycan,
        IonFamily::Immonium,
        IonFamily::NTerminal,
        IonFamily::CTerminal,
    ];
}

impl IonKind {
    /// Short display name used as the stem of an annotation symbol.
    pub fn name(&self) -> String {
        match self {
            IonKind::Precursor => "[M]".to_string(),
            IonKind::PrecursorH2O => "[M-H2O]".to_string(),
            IonKind::PrecursorNH3 => "[M-NH3]".to_string(),
            IonKind::PrecursorH3PO4 => "[M-H3PO4]".to_string(),
            IonKind::Oxonium => "oxo".to_string(),
            IonKind::GlycanY => "Y".to_string(),
            IonKind::GlycanCore => "core".to_string(),
            IonKind::Immonium => "imm".to_string(),
            IonKind::Backbone { series, glyco } => {
                if *glyco {
                    format!("{}*", series.letter())
                } else {
                    series.letter().to_string()
                }
            }
        }
    }

    /// Neutral mass removed from the precursor for the precursor variants.
    pub fn precursor_loss(&self) -> Option<f64> {
        match self {
            IonKind::Precursor => Some(0.0),
            IonKind::PrecursorH2O => Some(WATER_MASS),
            IonKind::PrecursorNH3 => Some(AMMONIA_MASS),
            IonKind::PrecursorH3PO4 => Some(PHOSPHORIC_ACID_MASS),
            _ => None,
        }
    }

    pub fn family(&self) -> IonFamily {
        match self {
            IonKind::Precursor
            | IonKind::PrecursorH2O
            | IonKind::PrecursorNH3
            | IonKind::PrecursorH3PO4 => IonFamily::Precursor,
            IonKind::Oxonium => IonFamily::Oxonium,
            IonKind::GlycanY | IonKind::GlycanCore => IonFamily::Glycan,
            IonKind::Immonium => IonFamily::Immonium,
            IonKind::Backbone { series, .. } if series.is_n_terminal() => IonFamily::NTerminal,
            IonKind::Backbone { .. } => IonFamily::CTerminal,
        }
    }
}

impl fmt::Display for IonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ---------------------------------------------------------------------------
// Charge superscripts
// ---------------------------------------------------------------------------

const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Superscript charge marker, e.g. `²⁺`. Empty for singly charged ions.
pub fn charge_superscript(charge: u32) -> String {
    if charge <= 1 {
        return String::new();
    }
    let mut out: String = charge
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| SUPERSCRIPT_DIGITS[d as usize])
        .collect();
    out.push('⁺');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mz_for_charge_one_adds_a_proton() {
        assert!((mz_for(1000.0, 1) - (1000.0 + PROTON_MASS)).abs() < 1e-12);
    }

    #[test]
    fn test_mz_for_higher_charges() {
        let mz = mz_for(1000.0, 2);
        assert!((mz - (1000.0 + 2.0 * PROTON_MASS) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_charge_superscript() {
        assert_eq!(charge_superscript(1), "");
        assert_eq!(charge_superscript(2), "²⁺");
        assert_eq!(charge_superscript(12), "¹²⁺");
    }

    #[test]
    fn test_names_and_families() {
        let b_glyco = IonKind::Backbone {
            series: BackboneSeries::B,
            glyco: true,
        };
        assert_eq!(b_glyco.name(), "b*");
        assert_eq!(b_glyco.family(), IonFamily::NTerminal);
        let y = IonKind::Backbone {
            series: BackboneSeries::Y,
            glyco: false,
        };
        assert_eq!(y.to_string(), "y");
        assert_eq!(y.family(), IonFamily::CTerminal);
        assert_eq!(IonKind::PrecursorH2O.precursor_loss(), Some(WATER_MASS));
        assert_eq!(IonKind::Oxonium.precursor_loss(), None);
    }
}
