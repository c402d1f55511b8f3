//! Ion annotation and overlap-free label placement for glycopeptide spectra.
//!
//! [`annotation`] matches theoretical ion masses against an observed peak
//! list; [`layout`] places one text label per annotated peak so that labels
//! overlap as little as possible.

pub mod annotation;
pub mod color;
pub mod config;
pub mod layout;
pub mod loader;

pub use annotation::annotator::{Analyte, Annotator, ChargeRange, ChargeRangeError};
pub use annotation::peaks::{Annotation, ObservedPeak, PeakList, PeakLookup, Precursor};
pub use annotation::tolerance::Tolerance;
pub use layout::geometry::{LabelPos, Point2D, PointLabel, Rect};
pub use layout::placement::{LabelPlacer, LabelRequest, Placement};
