/// Annotation layer: tolerances, ion kinds, peak lists and the annotators.
///
/// Architecture:
/// ```text
///  PeakList + Analyte + Settings
///        │
///        ▼
///   ┌───────────┐
///   │ annotator │  theoretical m/z per ion kind and charge
///   └───────────┘
///        │  most intense peak within Tolerance
///        ▼
///   ┌───────────┐
///   │  peaks    │  annotations attached per peak index
///   └───────────┘
/// ```

pub mod annotator;
pub mod glycan;
pub mod ion;
pub mod peaks;
pub mod tolerance;
