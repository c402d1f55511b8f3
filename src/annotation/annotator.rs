use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::glycan::{
    GlycanComposition, GlycanYLadder, OxoniumMarker, OxoniumMarkers, N_CORE_LADDER,
};
use super::ion::{charge_superscript, mz_for, IonKind, AMMONIA_MASS, WATER_MASS};
use super::peaks::{Annotation, PeakList, PeakLookup, Precursor};
use super::tolerance::Tolerance;
use crate::config::AnnotationSettings;

// ---------------------------------------------------------------------------
// ChargeRange
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChargeRangeError {
    #[error("charge range must start at 1 or above")]
    ZeroCharge,
    #[error("charge range maximum {max} is below its minimum {min}")]
    Inverted { min: u32, max: u32 },
}

/// Inclusive charge range; `max = None` means "up to the precursor charge".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawChargeRange")]
pub struct ChargeRange {
    min: u32,
    max: Option<u32>,
}

#[derive(Deserialize)]
struct RawChargeRange {
    min: u32,
    #[serde(default)]
    max: Option<u32>,
}

impl TryFrom<RawChargeRange> for ChargeRange {
    type Error = ChargeRangeError;

    fn try_from(raw: RawChargeRange) -> Result<Self, Self::Error> {
        ChargeRange::try_new(raw.min, raw.max)
    }
}

impl Default for ChargeRange {
    fn default() -> Self {
        ChargeRange::new(1, 1)
    }
}

impl ChargeRange {
    pub fn new(min: u32, max: u32) -> Self {
        debug_assert!(min >= 1, "charge range must start at 1 or above");
        ChargeRange {
            min,
            max: Some(max),
        }
    }

    pub fn unbounded(min: u32) -> Self {
        debug_assert!(min >= 1, "charge range must start at 1 or above");
        ChargeRange { min, max: None }
    }

    /// Checked constructor for ranges coming from user input.
    pub fn try_new(min: u32, max: Option<u32>) -> Result<Self, ChargeRangeError> {
        if min == 0 {
            return Err(ChargeRangeError::ZeroCharge);
        }
        match max {
            Some(max) if max < min => Err(ChargeRangeError::Inverted { min, max }),
            _ => Ok(ChargeRange { min, max }),
        }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Charges to try for fragment-like ions. An unbounded maximum falls back
    /// to the precursor charge, or to `min` when that is unknown.
    pub fn resolve(&self, precursor: Option<Precursor>) -> RangeInclusive<u32> {
        let max = match self.max {
            Some(max) => max,
            None => precursor.map(|p| p.charge).unwrap_or(self.min),
        };
        self.min..=max
    }

    /// Charges to try for precursor ions: never above the precursor charge.
    pub fn resolve_precursor(&self, precursor_charge: u32) -> RangeInclusive<u32> {
        let max = match self.max {
            Some(max) => max.min(precursor_charge),
            None => precursor_charge,
        };
        self.min..=max
    }
}

// ---------------------------------------------------------------------------
// Shared match step
// ---------------------------------------------------------------------------

/// Try `mass` at every charge in `charges`; annotate the most intense peak in
/// the window for each hit. Returns the number of annotations attached.
fn match_mass<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    mass: f64,
    charges: RangeInclusive<u32>,
    ion_kind: IonKind,
    symbol: impl Fn(u32, f64) -> String,
) -> usize {
    let mut attached = 0;
    for charge in charges {
        let theoretical = mz_for(mass, charge);
        let Some(index) = peaks.most_intense_index_within(theoretical, tol) else {
            continue;
        };
        let annotation = Annotation {
            peak_index: index,
            mz: peaks.mz_at(index),
            charge,
            symbol: symbol(charge, theoretical),
            ion_kind,
        };
        log::trace!(
            "{} matched peak {index} at m/z {:.4} (theoretical {theoretical:.4})",
            annotation.symbol,
            annotation.mz
        );
        peaks.add_annotation(index, annotation);
        attached += 1;
    }
    attached
}

// ---------------------------------------------------------------------------
// Oxonium markers
// ---------------------------------------------------------------------------

/// Annotate diagnostic oxonium ions, labelled with their rounded m/z.
pub fn annotate_oxonium<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    markers: &[OxoniumMarker],
    charges: ChargeRange,
) -> usize {
    let range = charges.resolve(peaks.precursor());
    let mut attached = 0;
    for marker in markers {
        attached += match_mass(
            peaks,
            tol,
            marker.neutral_mass(),
            range.clone(),
            IonKind::Oxonium,
            |charge, mz| format!("{mz:.2}{}", charge_superscript(charge)),
        );
    }
    attached
}

// ---------------------------------------------------------------------------
// Precursor and its neutral losses
// ---------------------------------------------------------------------------

fn annotate_precursor_variant<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    charges: ChargeRange,
    ion_kind: IonKind,
) -> usize {
    let (Some(precursor), Some(loss)) = (peaks.precursor(), ion_kind.precursor_loss()) else {
        return 0;
    };
    let name = ion_kind.name();
    match_mass(
        peaks,
        tol,
        precursor.mass - loss,
        charges.resolve_precursor(precursor.charge),
        ion_kind,
        |charge, _| format!("{name}{}", charge_superscript(charge)),
    )
}

pub fn annotate_precursor<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    charges: ChargeRange,
) -> usize {
    annotate_precursor_variant(peaks, tol, charges, IonKind::Precursor)
}

pub fn annotate_precursor_h2o<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    charges: ChargeRange,
) -> usize {
    annotate_precursor_variant(peaks, tol, charges, IonKind::PrecursorH2O)
}

pub fn annotate_precursor_nh3<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    charges: ChargeRange,
) -> usize {
    annotate_precursor_variant(peaks, tol, charges, IonKind::PrecursorNH3)
}

pub fn annotate_precursor_h3po4<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    charges: ChargeRange,
) -> usize {
    annotate_precursor_variant(peaks, tol, charges, IonKind::PrecursorH3PO4)
}

// ---------------------------------------------------------------------------
// Glycan Y ions
// ---------------------------------------------------------------------------

/// Annotate Y0 (bare peptide) and every precomputed Y fragment of
/// `composition` on top of the peptide.
pub fn annotate_glycan_y<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    peptide_mass: f64,
    charges: ChargeRange,
    ladder: &GlycanYLadder,
    composition: Option<&GlycanComposition>,
) -> usize {
    let range = charges.resolve(peaks.precursor());
    let mut attached = match_mass(
        peaks,
        tol,
        peptide_mass,
        range.clone(),
        IonKind::GlycanY,
        |charge, _| format!("Y0{}", charge_superscript(charge)),
    );

    let Some(composition) = composition else {
        return attached;
    };
    for fragment in ladder.fragments_for(composition) {
        attached += match_mass(
            peaks,
            tol,
            peptide_mass + fragment.mass(),
            range.clone(),
            IonKind::GlycanY,
            |charge, _| format!("Y[{}]{}", fragment.composition, charge_superscript(charge)),
        );
    }
    attached
}

// ---------------------------------------------------------------------------
// N-glycan core ladder
// ---------------------------------------------------------------------------

/// Walk the N-glycan core, testing each step with and without a water loss.
/// Step 0 (bare peptide) is also tested with an ammonia loss.
pub fn anno_n_core<P: PeakLookup>(
    peaks: &mut P,
    tol: &Tolerance,
    peptide_mass: f64,
    charges: ChargeRange,
) -> usize {
    let range = charges.resolve(peaks.precursor());
    let mut attached = 0;
    let mut mass = peptide_mass;

    for step in 0..=N_CORE_LADDER.len() {
        if step > 0 {
            mass += N_CORE_LADDER[step - 1].mass();
        }
        for charge in range.clone() {
            let sup = charge_superscript(charge);
            attached += match_mass(peaks, tol, mass, charge..=charge, IonKind::GlycanCore, |_, _| {
                format!("core{step}{sup}")
            });
            attached += match_mass(
                peaks,
                tol,
                mass - WATER_MASS,
                charge..=charge,
                IonKind::GlycanCore,
                |_, _| format!("core{step}-H2O{sup}"),
            );
            if step == 0 {
                attached += match_mass(
                    peaks,
                    tol,
                    mass - AMMONIA_MASS,
                    charge..=charge,
                    IonKind::GlycanCore,
                    |_, _| format!("core0-NH3{sup}"),
                );
            }
        }
    }
    attached
}

// ---------------------------------------------------------------------------
// Annotator – settings-driven orchestration
// ---------------------------------------------------------------------------

/// The molecule the spectrum is annotated against.
#[derive(Debug, Clone, PartialEq)]
pub struct Analyte {
    /// Neutral mass of the bare peptide.
    pub peptide_mass: f64,
    pub glycan: Option<GlycanComposition>,
}

/// Runs every annotation pass enabled in [`AnnotationSettings`].
#[derive(Debug, Clone)]
pub struct Annotator {
    settings: AnnotationSettings,
    markers: OxoniumMarkers,
    ladder: GlycanYLadder,
}

impl Annotator {
    pub fn new(
        settings: AnnotationSettings,
        markers: OxoniumMarkers,
        ladder: GlycanYLadder,
    ) -> Self {
        Annotator {
            settings,
            markers,
            ladder,
        }
    }

    pub fn settings(&self) -> &AnnotationSettings {
        &self.settings
    }

    /// Precompute the Y ladder for a composition before annotating with it.
    pub fn register(&mut self, composition: &GlycanComposition) {
        self.ladder.insert_composition(composition);
    }

    /// Replace all annotations of `peaks`. Returns the number attached.
    pub fn annotate(&self, peaks: &mut PeakList, analyte: &Analyte) -> usize {
        peaks.clear_annotations();
        let s = &self.settings;
        let tol = &s.tolerance;
        let mut total = 0;

        let precursor_passes = [
            (s.precursor, IonKind::Precursor),
            (s.precursor_h2o, IonKind::PrecursorH2O),
            (s.precursor_nh3, IonKind::PrecursorNH3),
            (s.precursor_h3po4, IonKind::PrecursorH3PO4),
        ];
        for (enabled, kind) in precursor_passes {
            if enabled {
                total += annotate_precursor_variant(peaks, tol, s.precursor_charges, kind);
            }
        }
        if s.oxonium {
            total += annotate_oxonium(peaks, tol, self.markers.as_slice(), s.oxonium_charges);
        }
        if s.glycan_y {
            if let Some(glycan) = &analyte.glycan {
                if self.ladder.fragments_for(glycan).is_empty() {
                    log::warn!("no Y ladder registered for {glycan}; only Y0 will be annotated");
                }
            }
            total += annotate_glycan_y(
                peaks,
                tol,
                analyte.peptide_mass,
                s.fragment_charges,
                &self.ladder,
                analyte.glycan.as_ref(),
            );
        }
        if s.n_core {
            total += anno_n_core(peaks, tol, analyte.peptide_mass, s.fragment_charges);
        }

        log::debug!(
            "annotated {total} matches on {} of {} peaks",
            peaks.annotated_indices().len(),
            peaks.len()
        );
        total
    }
}
