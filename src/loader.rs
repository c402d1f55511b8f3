use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::annotation::glycan::{OxoniumMarker, OxoniumMarkers};
use crate::annotation::peaks::{ObservedPeak, PeakList, Precursor};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a peak list from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "precursor": { "mass": ..., "charge": ... }, "peaks": [[mz, intensity], ...] }`
/// * `.csv`  – header row with `mz` and `intensity` columns
pub fn load_peak_list(path: &Path) -> Result<PeakList> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_peak_json(&text)
        }
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            parse_peak_csv(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load an oxonium marker table from a `name,mz` CSV file.
pub fn load_markers(path: &Path) -> Result<OxoniumMarkers> {
    let file = std::fs::File::open(path).context("opening marker CSV")?;
    parse_marker_csv(file)
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PeakFile {
    #[serde(default)]
    precursor: Option<Precursor>,
    peaks: Vec<(f64, f64)>,
}

/// Parse the JSON peak-list layout described in [`load_peak_list`].
pub fn parse_peak_json(text: &str) -> Result<PeakList> {
    let file: PeakFile = serde_json::from_str(text).context("parsing JSON")?;
    let peaks = file
        .peaks
        .into_iter()
        .map(|(mz, intensity)| ObservedPeak { mz, intensity })
        .collect();
    Ok(PeakList::new(validate(peaks)?, file.precursor))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse a CSV peak list with `mz` and `intensity` columns. Other columns
/// are ignored.
pub fn parse_peak_csv<R: Read>(input: R) -> Result<PeakList> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mz_idx = headers
        .iter()
        .position(|h| h == "mz")
        .context("CSV missing 'mz' column")?;
    let int_idx = headers
        .iter()
        .position(|h| h == "intensity")
        .context("CSV missing 'intensity' column")?;

    let mut peaks = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let mz = parse_field(record.get(mz_idx), row_no, "mz")?;
        let intensity = parse_field(record.get(int_idx), row_no, "intensity")?;
        peaks.push(ObservedPeak { mz, intensity });
    }

    Ok(PeakList::new(validate(peaks)?, None))
}

/// Parse a `name,mz` marker table.
pub fn parse_marker_csv<R: Read>(input: R) -> Result<OxoniumMarkers> {
    let mut reader = csv::Reader::from_reader(input);
    let mut markers = Vec::new();
    for (row_no, result) in reader.deserialize::<OxoniumMarker>().enumerate() {
        let marker = result.with_context(|| format!("marker row {row_no}"))?;
        if !marker.mz.is_finite() || marker.mz <= 0.0 {
            bail!("marker row {row_no}: invalid m/z {}", marker.mz);
        }
        markers.push(marker);
    }
    if markers.is_empty() {
        log::warn!("marker table is empty, no oxonium ions will be annotated");
    }
    Ok(OxoniumMarkers::new(markers))
}

fn parse_field(value: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = value.unwrap_or("").trim();
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

/// Reject non-finite values; drop peaks without positive intensity.
fn validate(peaks: Vec<ObservedPeak>) -> Result<Vec<ObservedPeak>> {
    let total = peaks.len();
    let mut kept = Vec::with_capacity(total);
    for (i, peak) in peaks.into_iter().enumerate() {
        if !peak.mz.is_finite() || !peak.intensity.is_finite() {
            bail!("Peak {i}: non-finite value ({}, {})", peak.mz, peak.intensity);
        }
        if peak.intensity > 0.0 {
            kept.push(peak);
        }
    }
    if kept.len() < total {
        log::warn!("dropped {} peaks without positive intensity", total - kept.len());
    }
    Ok(kept)
}
