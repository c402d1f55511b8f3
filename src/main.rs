use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use peak_labeler::annotation::glycan::{GlycanComposition, GlycanYLadder, OxoniumMarkers};
use peak_labeler::color::{to_hex, IonColorMap};
use peak_labeler::config::{load_settings, Settings};
use peak_labeler::loader::{load_markers, load_peak_list};
use peak_labeler::{Analyte, Annotator, LabelRequest, ObservedPeak, PeakList, Point2D, Rect};

/// Approximate glyph metrics used to size labels.
const CHAR_WIDTH: f64 = 7.0;
const LABEL_HEIGHT: f64 = 14.0;
const LABEL_PADDING: f64 = 4.0;

#[derive(Debug, Parser)]
#[command(
    name = "peak-labeler",
    about = "Annotate a glycopeptide spectrum and lay out its labels"
)]
struct Cli {
    /// Peak list (.json or .csv)
    #[arg(long)]
    peaks: PathBuf,
    /// Neutral mass of the bare peptide
    #[arg(long)]
    peptide_mass: f64,
    /// Glycan composition, e.g. HexNAc(2)Hex(5)
    #[arg(long)]
    composition: Option<String>,
    /// Settings JSON
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Oxonium marker table (name,mz CSV); built-in markers otherwise
    #[arg(long)]
    markers: Option<PathBuf>,
    /// Plot width in screen units
    #[arg(long, default_value_t = 1200.0)]
    width: f64,
    /// Plot height in screen units
    #[arg(long, default_value_t = 600.0)]
    height: f64,
}

/// Maps spectrum coordinates to screen space, leaving headroom for labels.
struct PlotView {
    min_mz: f64,
    mz_range: f64,
    max_intensity: f64,
    width: f64,
    height: f64,
}

impl PlotView {
    const MARGIN: f64 = 10.0;
    const HEADROOM: f64 = 80.0;

    fn fit(peaks: &PeakList, width: f64, height: f64) -> Self {
        let min_mz = peaks.peaks().first().map(|p| p.mz).unwrap_or(0.0);
        let max_mz = peaks.peaks().last().map(|p| p.mz).unwrap_or(1.0);
        let max_intensity = peaks
            .peaks()
            .iter()
            .map(|p| p.intensity)
            .fold(0.0, f64::max);
        PlotView {
            min_mz,
            mz_range: (max_mz - min_mz).max(1.0),
            max_intensity: if max_intensity > 0.0 {
                max_intensity
            } else {
                1.0
            },
            width,
            height,
        }
    }

    fn area(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    fn to_screen(&self, peak: &ObservedPeak) -> Point2D {
        let plot_w = self.width - 2.0 * Self::MARGIN;
        let plot_h = self.height - 2.0 * Self::MARGIN - Self::HEADROOM;
        let x = Self::MARGIN + (peak.mz - self.min_mz) / self.mz_range * plot_w;
        let y = self.height - Self::MARGIN - peak.intensity / self.max_intensity * plot_h;
        Point2D::new(x, y)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let markers = match &cli.markers {
        Some(path) => load_markers(path)?,
        None => OxoniumMarkers::builtin(),
    };
    let glycan = cli
        .composition
        .as_deref()
        .map(str::parse::<GlycanComposition>)
        .transpose()
        .context("parsing glycan composition")?;

    let mut annotator = Annotator::new(settings.annotation.clone(), markers, GlycanYLadder::new());
    if let Some(glycan) = &glycan {
        annotator.register(glycan);
    }

    let mut peaks = load_peak_list(&cli.peaks)
        .with_context(|| format!("loading peaks from {}", cli.peaks.display()))?;
    let analyte = Analyte {
        peptide_mass: cli.peptide_mass,
        glycan,
    };
    let matched = annotator.annotate(&mut peaks, &analyte);
    log::info!("{matched} annotations on {} peaks", peaks.len());

    let view = PlotView::fit(&peaks, cli.width, cli.height);
    let indices = peaks.annotated_indices();
    let texts: Vec<String> = indices
        .iter()
        .map(|&i| peaks.combined_label(i).unwrap_or_default())
        .collect();
    let requests: Vec<LabelRequest> = indices
        .iter()
        .zip(&texts)
        .map(|(&i, text)| {
            let width = text.chars().count() as f64 * CHAR_WIDTH + LABEL_PADDING;
            LabelRequest::new(view.to_screen(&peaks.peaks()[i]), width, LABEL_HEIGHT)
        })
        .collect();

    let placement = settings.layout.placer(view.area()).place(&requests);
    let colors = IonColorMap::new();

    for (req, label) in placement.iter() {
        let peak_index = indices[req];
        let kind = peaks.annotations_at(peak_index)[0].ion_kind;
        let origin = label.min_loc();
        let link = label
            .link_point()
            .map(|p| format!("link ({:.1}, {:.1})", p.x, p.y))
            .unwrap_or_default();
        println!(
            "{:>10.4}  {:<32} {} {:<12} ({:>7.1}, {:>6.1}) {link}",
            peaks.peaks()[peak_index].mz,
            texts[req],
            to_hex(colors.color_for(kind)),
            format!("{:?}", label.pos),
            origin.x,
            origin.y,
        );
    }

    let unplaced = requests.len() - placement.len();
    if unplaced > 0 {
        log::warn!("{unplaced} labels did not fit the plot area");
    }
    Ok(())
}
