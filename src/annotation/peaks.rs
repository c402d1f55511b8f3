use serde::{Deserialize, Serialize};

use super::ion::IonKind;
use super::tolerance::Tolerance;

// ---------------------------------------------------------------------------
// ObservedPeak / Precursor
// ---------------------------------------------------------------------------

/// One centroided peak of the observed spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPeak {
    pub mz: f64,
    pub intensity: f64,
}

/// Precursor information needed by the precursor annotators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Precursor {
    /// Neutral (uncharged) monoisotopic mass.
    pub mass: f64,
    pub charge: u32,
}

// ---------------------------------------------------------------------------
// Annotation
// ---------------------------------------------------------------------------

/// A symbolic label attached to an observed peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub peak_index: usize,
    /// Observed m/z of the matched peak.
    pub mz: f64,
    pub charge: u32,
    pub symbol: String,
    pub ion_kind: IonKind,
}

// ---------------------------------------------------------------------------
// PeakLookup – what the annotators need from a peak list
// ---------------------------------------------------------------------------

/// Capabilities the ion annotators require from a spectrum.
pub trait PeakLookup {
    /// Index of the most intense peak whose m/z lies within `tol` of `mz`.
    fn most_intense_index_within(&self, mz: f64, tol: &Tolerance) -> Option<usize>;

    /// Observed m/z of the peak at `index`.
    fn mz_at(&self, index: usize) -> f64;

    /// Attach `annotation` to the peak at `index`.
    fn add_annotation(&mut self, index: usize, annotation: Annotation);

    /// Precursor of the spectrum, if known.
    fn precursor(&self) -> Option<Precursor>;
}

// ---------------------------------------------------------------------------
// PeakList
// ---------------------------------------------------------------------------

/// Observed peaks sorted by ascending m/z, each with zero or more annotations.
#[derive(Debug, Clone, Default)]
pub struct PeakList {
    peaks: Vec<ObservedPeak>,
    annotations: Vec<Vec<Annotation>>,
    precursor: Option<Precursor>,
}

impl PeakList {
    /// Build a peak list; peaks are sorted by m/z.
    pub fn new(mut peaks: Vec<ObservedPeak>, precursor: Option<Precursor>) -> Self {
        peaks.sort_by(|a, b| a.mz.total_cmp(&b.mz));
        let annotations = vec![Vec::new(); peaks.len()];
        PeakList {
            peaks,
            annotations,
            precursor,
        }
    }

    pub fn peaks(&self) -> &[ObservedPeak] {
        &self.peaks
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn annotations_at(&self, index: usize) -> &[Annotation] {
        self.annotations
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Human-readable label for a peak: every symbol in attachment order.
    pub fn combined_label(&self, index: usize) -> Option<String> {
        let annos = self.annotations_at(index);
        if annos.is_empty() {
            return None;
        }
        let symbols: Vec<&str> = annos.iter().map(|a| a.symbol.as_str()).collect();
        Some(symbols.join("/"))
    }

    /// Total number of annotations across all peaks.
    pub fn annotation_count(&self) -> usize {
        self.annotations.iter().map(Vec::len).sum()
    }

    /// Indices of peaks carrying at least one annotation, ascending.
    pub fn annotated_indices(&self) -> Vec<usize> {
        self.annotations
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Drop every annotation, keeping the peaks.
    pub fn clear_annotations(&mut self) {
        for annos in &mut self.annotations {
            annos.clear();
        }
    }
}

impl PeakLookup for PeakList {
    fn most_intense_index_within(&self, mz: f64, tol: &Tolerance) -> Option<usize> {
        let (low, high) = tol.bounds(mz);
        let start = self.peaks.partition_point(|p| p.mz < low);

        let mut best: Option<usize> = None;
        for (offset, peak) in self.peaks[start..].iter().enumerate() {
            if peak.mz > high {
                break;
            }
            let is_better = match best {
                Some(b) => peak.intensity > self.peaks[b].intensity,
                None => true,
            };
            if is_better {
                best = Some(start + offset);
            }
        }
        best
    }

    fn mz_at(&self, index: usize) -> f64 {
        self.peaks[index].mz
    }

    fn add_annotation(&mut self, index: usize, annotation: Annotation) {
        if let Some(annos) = self.annotations.get_mut(index) {
            annos.push(annotation);
        }
    }

    fn precursor(&self) -> Option<Precursor> {
        self.precursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peaks(pairs: &[(f64, f64)]) -> PeakList {
        PeakList::new(
            pairs
                .iter()
                .map(|&(mz, intensity)| ObservedPeak { mz, intensity })
                .collect(),
            None,
        )
    }

    #[test]
    fn test_new_sorts_by_mz() {
        let list = peaks(&[(300.0, 1.0), (100.0, 2.0), (200.0, 3.0)]);
        let mzs: Vec<f64> = list.peaks().iter().map(|p| p.mz).collect();
        assert_eq!(mzs, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_lookup_prefers_most_intense_over_nearest() {
        let list = peaks(&[
            (499.99, 10.0),
            (500.0, 50.0),
            (500.008, 900.0),
            (500.5, 5000.0),
        ]);
        let tol = Tolerance::absolute(0.01, 0.01);
        // 500.0 is the exact match but 500.008 is more intense
        assert_eq!(list.most_intense_index_within(500.0, &tol), Some(2));
    }

    #[test]
    fn test_lookup_first_wins_on_equal_intensity() {
        let list = peaks(&[(500.0, 10.0), (500.005, 10.0)]);
        let tol = Tolerance::absolute(0.01, 0.01);
        assert_eq!(list.most_intense_index_within(500.002, &tol), Some(0));
    }

    #[test]
    fn test_lookup_not_found() {
        let list = peaks(&[(100.0, 1.0), (200.0, 1.0)]);
        let tol = Tolerance::ppm(10.0, 10.0);
        assert_eq!(list.most_intense_index_within(150.0, &tol), None);
        assert_eq!(peaks(&[]).most_intense_index_within(150.0, &tol), None);
    }

    #[test]
    fn test_combined_label_keeps_attachment_order() {
        let mut list = peaks(&[(204.087, 100.0)]);
        for symbol in ["204.09", "core1"] {
            list.add_annotation(
                0,
                Annotation {
                    peak_index: 0,
                    mz: 204.087,
                    charge: 1,
                    symbol: symbol.to_string(),
                    ion_kind: IonKind::Oxonium,
                },
            );
        }
        assert_eq!(list.combined_label(0).as_deref(), Some("204.09/core1"));
        assert_eq!(list.annotation_count(), 2);
        assert_eq!(list.annotated_indices(), vec![0]);

        list.clear_annotations();
        assert_eq!(list.annotation_count(), 0);
        assert_eq!(list.combined_label(0), None);
    }
}
