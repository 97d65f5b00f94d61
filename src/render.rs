use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::error::KiraError;
use crate::view::{ClusteredHeatmap, HistogramData};

pub trait ChartRenderer {
    fn render_histogram(&self, data: &HistogramData, destination: &Path) -> Result<(), KiraError>;

    fn render_heatmap(
        &self,
        heatmap: &ClusteredHeatmap,
        destination: &Path,
    ) -> Result<(), KiraError>;
}

/// PNG charts through the plotters bitmap backend.
///
/// Built without a font backend, so the charts carry no text: no captions,
/// axis descriptions or tick labels. Sample and gene order of the heatmap is
/// in `RunResult` and the matrix CSV.
#[derive(Debug, Clone, Copy)]
pub struct PlottersRenderer {
    pub histogram_size: (u32, u32),
    pub heatmap_size: (u32, u32),
}

impl Default for PlottersRenderer {
    fn default() -> Self {
        Self {
            histogram_size: (1000, 500),
            heatmap_size: (1000, 1000),
        }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render_histogram(&self, data: &HistogramData, destination: &Path) -> Result<(), KiraError> {
        draw_histogram(data, destination, self.histogram_size)
            .map_err(|err| KiraError::Render(format!("{}: {err}", destination.display())))
    }

    fn render_heatmap(
        &self,
        heatmap: &ClusteredHeatmap,
        destination: &Path,
    ) -> Result<(), KiraError> {
        draw_heatmap(heatmap, destination, self.heatmap_size)
            .map_err(|err| KiraError::Render(format!("{}: {err}", destination.display())))
    }
}

const AXIS: RGBColor = RGBColor(0x40, 0x40, 0x40);

fn draw_histogram(
    data: &HistogramData,
    out_path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let (Some(first), Some(last)) = (data.bins.first(), data.bins.last()) else {
        return Err("histogram has no bins".into());
    };
    let x_range = first.start..last.end;
    let peak = data
        .density
        .iter()
        .map(|(_, y)| *y)
        .fold(data.max_count() as f64, f64::max);
    let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

    let root = BitMapBackend::new(out_path, size).into_drawing_area();
    root.fill(&WHITE)?;
    // No caption or label areas: any text would need a font backend.
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(x_range.clone(), 0.0..y_max)?;

    let bar = RGBColor(0x1f, 0x77, 0xb4);
    chart.draw_series(data.bins.iter().map(|bin| {
        Rectangle::new(
            [(bin.start, 0.0), (bin.end, bin.count as f64)],
            bar.mix(0.6).filled(),
        )
    }))?;
    if !data.density.is_empty() {
        chart.draw_series(LineSeries::new(
            data.density.iter().copied(),
            bar.stroke_width(2),
        ))?;
    }
    chart.draw_series(LineSeries::new(
        [
            (x_range.start, y_max),
            (x_range.start, 0.0),
            (x_range.end, 0.0),
        ],
        AXIS.stroke_width(1),
    ))?;

    root.present()?;
    Ok(())
}

fn draw_heatmap(
    heatmap: &ClusteredHeatmap,
    out_path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let Some((lo, hi)) = heatmap.value_range() else {
        return Err("heatmap has no cells".into());
    };
    let rows = heatmap.row_labels.len();
    let cols = heatmap.col_labels.len();

    let root = BitMapBackend::new(out_path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0.0..cols as f64, 0.0..rows as f64)?;

    // Row 0 of the clustered order sits at the top.
    chart.draw_series(heatmap.values.iter().enumerate().flat_map(|(r, row)| {
        let top = (rows - r) as f64;
        row.iter().enumerate().map(move |(c, &value)| {
            Rectangle::new(
                [(c as f64, top - 1.0), (c as f64 + 1.0, top)],
                coolwarm(normalize(value, lo, hi)).filled(),
            )
        })
    }))?;

    root.present()?;
    Ok(())
}

fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo { (value - lo) / (hi - lo) } else { 0.5 }
}

/// Diverging blue-white-red map, `t` in [0, 1].
pub fn coolwarm(t: f64) -> RGBColor {
    const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = t.clamp(0.0, 1.0);
    let (from, to, w) = if t < 0.5 {
        (COLD, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * w).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(0.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.5), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
    }
}
