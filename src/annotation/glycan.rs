use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ion::PROTON_MASS;

// ---------------------------------------------------------------------------
// Monosaccharide residues
// ---------------------------------------------------------------------------

/// Glycan building blocks, with residue (dehydrated) monoisotopic masses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Monosaccharide {
    HexNAc,
    Hex,
    Fuc,
    NeuAc,
    NeuGc,
}

impl Monosaccharide {
    pub fn mass(&self) -> f64 {
        match self {
            Monosaccharide::HexNAc => 203.079_373,
            Monosaccharide::Hex => 162.052_824,
            Monosaccharide::Fuc => 146.057_909,
            Monosaccharide::NeuAc => 291.095_417,
            Monosaccharide::NeuGc => 307.090_331,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Monosaccharide::HexNAc => "HexNAc",
            Monosaccharide::Hex => "Hex",
            Monosaccharide::Fuc => "Fuc",
            Monosaccharide::NeuAc => "NeuAc",
            Monosaccharide::NeuGc => "NeuGc",
        }
    }
}

/// Residue spellings accepted by the parser, longest first so that
/// `HexNAc` is never read as `Hex` followed by garbage.
const RESIDUE_SPELLINGS: [(&str, Monosaccharide); 8] = [
    ("HexNAc", Monosaccharide::HexNAc),
    ("Neu5Ac", Monosaccharide::NeuAc),
    ("Neu5Gc", Monosaccharide::NeuGc),
    ("NeuAc", Monosaccharide::NeuAc),
    ("NeuGc", Monosaccharide::NeuGc),
    ("dHex", Monosaccharide::Fuc),
    ("Fuc", Monosaccharide::Fuc),
    ("Hex", Monosaccharide::Hex),
];

/// Fixed N-glycan core (chitobiose + trimannosyl) in attachment order.
pub const N_CORE_LADDER: [Monosaccharide; 5] = [
    Monosaccharide::HexNAc,
    Monosaccharide::HexNAc,
    Monosaccharide::Hex,
    Monosaccharide::Hex,
    Monosaccharide::Hex,
];

// ---------------------------------------------------------------------------
// GlycanComposition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlycanParseError {
    #[error("empty glycan composition")]
    Empty,
    #[error("unknown residue at position {position}: '{found}'")]
    UnknownResidue { position: usize, found: String },
    #[error("invalid residue count at position {position}")]
    InvalidCount { position: usize },
    #[error("unclosed parenthesis at position {position}")]
    UnclosedParen { position: usize },
    #[error("composition has {count} sub-compositions, the limit is {}", MAX_SUB_COMPOSITIONS)]
    TooLarge { count: u64 },
}

/// Upper bound on the Y fragments enumerated for one composition.
pub const MAX_SUB_COMPOSITIONS: u64 = 100_000;

/// Residue counts of a glycan, e.g. `HexNAc(2)Hex(5)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlycanComposition {
    counts: BTreeMap<Monosaccharide, u32>,
}

impl GlycanComposition {
    pub fn from_counts(counts: impl IntoIterator<Item = (Monosaccharide, u32)>) -> Self {
        let mut out = GlycanComposition::default();
        for (sugar, n) in counts {
            if n > 0 {
                *out.counts.entry(sugar).or_default() += n;
            }
        }
        out
    }

    pub fn count(&self, sugar: Monosaccharide) -> u32 {
        self.counts.get(&sugar).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Summed residue mass.
    pub fn mass(&self) -> f64 {
        self.counts
            .iter()
            .map(|(sugar, n)| sugar.mass() * *n as f64)
            .sum()
    }

    /// Number of non-empty sub-compositions, saturating at `u64::MAX`.
    pub fn sub_composition_count(&self) -> u64 {
        self.counts
            .values()
            .fold(1u64, |acc, n| acc.saturating_mul(u64::from(*n) + 1))
            - 1
    }

    /// Every non-empty sub-composition, including the full composition.
    pub fn sub_compositions(&self) -> Vec<GlycanComposition> {
        let entries: Vec<(Monosaccharide, u32)> =
            self.counts.iter().map(|(s, n)| (*s, *n)).collect();

        let mut out = vec![GlycanComposition::default()];
        for (sugar, max) in entries {
            let mut next = Vec::with_capacity(out.len() * (max as usize + 1));
            for partial in &out {
                for n in 0..=max {
                    let mut extended = partial.clone();
                    if n > 0 {
                        extended.counts.insert(sugar, n);
                    }
                    next.push(extended);
                }
            }
            out = next;
        }
        out.retain(|c| !c.is_empty());
        out
    }
}

impl fmt::Display for GlycanComposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (sugar, n) in &self.counts {
            write!(f, "{}({n})", sugar.name())?;
        }
        Ok(())
    }
}

impl FromStr for GlycanComposition {
    type Err = GlycanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(GlycanParseError::Empty);
        }

        let mut counts: Vec<(Monosaccharide, u32)> = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let Some((spelling, sugar)) = RESIDUE_SPELLINGS
                .iter()
                .find(|(spelling, _)| rest.starts_with(spelling))
            else {
                let found: String = rest.chars().take_while(|c| c.is_alphanumeric()).collect();
                return Err(GlycanParseError::UnknownResidue {
                    position: pos,
                    found: if found.is_empty() {
                        rest.chars().take(1).collect()
                    } else {
                        found
                    },
                });
            };
            pos += spelling.len();

            let rest = &text[pos..];
            let count = if let Some(inner) = rest.strip_prefix('(') {
                let close = inner
                    .find(')')
                    .ok_or(GlycanParseError::UnclosedParen { position: pos })?;
                let n = inner[..close]
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| GlycanParseError::InvalidCount { position: pos + 1 })?;
                pos += close + 2;
                n
            } else {
                let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
                if digits == 0 {
                    1
                } else {
                    let n = rest[..digits]
                        .parse::<u32>()
                        .map_err(|_| GlycanParseError::InvalidCount { position: pos })?;
                    pos += digits;
                    n
                }
            };
            counts.push((*sugar, count));
        }

        let composition = GlycanComposition::from_counts(counts);
        let count = composition.sub_composition_count();
        if count > MAX_SUB_COMPOSITIONS {
            return Err(GlycanParseError::TooLarge { count });
        }
        Ok(composition)
    }
}

// ---------------------------------------------------------------------------
// Oxonium marker table
// ---------------------------------------------------------------------------

/// A diagnostic oxonium ion, stored as its singly-protonated m/z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OxoniumMarker {
    pub name: String,
    pub mz: f64,
}

impl OxoniumMarker {
    pub fn new(name: &str, mz: f64) -> Self {
        OxoniumMarker {
            name: name.to_string(),
            mz,
        }
    }

    /// Mass of the marker without its charging proton.
    pub fn neutral_mass(&self) -> f64 {
        self.mz - PROTON_MASS
    }
}

/// The set of oxonium markers to look for.
#[derive(Debug, Clone, PartialEq)]
pub struct OxoniumMarkers {
    markers: Vec<OxoniumMarker>,
}

impl Default for OxoniumMarkers {
    fn default() -> Self {
        OxoniumMarkers::builtin()
    }
}

impl OxoniumMarkers {
    pub fn new(markers: Vec<OxoniumMarker>) -> Self {
        OxoniumMarkers { markers }
    }

    /// Common N- and O-glycan oxonium ions.
    pub fn builtin() -> Self {
        OxoniumMarkers::new(vec![
            OxoniumMarker::new("HexNAc-C2H6O3", 126.0550),
            OxoniumMarker::new("HexNAc-CH6O3", 138.0550),
            OxoniumMarker::new("HexNAc-C2H4O2", 144.0655),
            OxoniumMarker::new("Hex", 163.0601),
            OxoniumMarker::new("HexNAc-2H2O", 168.0655),
            OxoniumMarker::new("HexNAc-H2O", 186.0761),
            OxoniumMarker::new("HexNAc", 204.0867),
            OxoniumMarker::new("NeuAc-H2O", 274.0921),
            OxoniumMarker::new("NeuGc-H2O", 290.0870),
            OxoniumMarker::new("NeuAc", 292.1027),
            OxoniumMarker::new("NeuGc", 308.0976),
            OxoniumMarker::new("HexHexNAc", 366.1395),
            OxoniumMarker::new("HexHexNAcFuc", 512.1974),
            OxoniumMarker::new("HexHexNAcNeuAc", 657.2349),
        ])
    }

    pub fn as_slice(&self) -> &[OxoniumMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Glycan Y-fragment ladder
// ---------------------------------------------------------------------------

/// A glycan fragment still attached to the peptide (Y ion), minus the peptide.
#[derive(Debug, Clone, PartialEq)]
pub struct GlycanFragment {
    pub composition: GlycanComposition,
    pub mass: f64,
}

impl GlycanFragment {
    pub fn mass(&self) -> f64 {
        self.mass
    }
}

/// Precomputed Y fragments, keyed by the intact glycan composition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlycanYLadder {
    fragments: BTreeMap<GlycanComposition, Vec<GlycanFragment>>,
}

impl GlycanYLadder {
    pub fn new() -> Self {
        GlycanYLadder::default()
    }

    /// Precompute the Y fragments of `composition` (no-op if already present).
    /// Compositions with more than [`MAX_SUB_COMPOSITIONS`] fragments are skipped.
    pub fn insert_composition(&mut self, composition: &GlycanComposition) {
        if self.fragments.contains_key(composition) {
            return;
        }
        if composition.sub_composition_count() > MAX_SUB_COMPOSITIONS {
            log::warn!("{composition} has too many sub-compositions, no Y ladder built");
            return;
        }
        let mut frags: Vec<GlycanFragment> = composition
            .sub_compositions()
            .into_iter()
            .map(|c| GlycanFragment {
                mass: c.mass(),
                composition: c,
            })
            .collect();
        frags.sort_by(|a, b| {
            a.mass
                .total_cmp(&b.mass)
                .then_with(|| a.composition.cmp(&b.composition))
        });
        log::debug!(
            "precomputed {} Y fragments for {composition}",
            frags.len()
        );
        self.fragments.insert(composition.clone(), frags);
    }

    /// Ladder for a composition; empty when it was never precomputed.
    pub fn fragments_for(&self, composition: &GlycanComposition) -> &[GlycanFragment] {
        self.fragments
            .get(composition)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
