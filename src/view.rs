//! Chart-ready data: a seeded row subsample ordered by hierarchical
//! clustering, and a histogram with a density overlay.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::matrix::ExpressionMatrix;

pub const DEFAULT_HEATMAP_ROWS: usize = 50;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Rows drawn from an expression matrix, in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixSubset {
    pub row_ids: Vec<String>,
    pub samples: Vec<String>,
    /// One `Vec` per row, `samples.len()` values each.
    pub values: Vec<Vec<f64>>,
}

/// Draw `min(max_rows, n_rows)` distinct rows with a fixed seed.
pub fn sample_rows(matrix: &ExpressionMatrix, max_rows: usize, seed: u64) -> MatrixSubset {
    let amount = max_rows.min(matrix.n_rows());
    let mut rng = StdRng::seed_from_u64(seed);
    let picked = index::sample(&mut rng, matrix.n_rows(), amount);

    let mut row_ids = Vec::with_capacity(amount);
    let mut values = Vec::with_capacity(amount);
    for row in picked.iter() {
        row_ids.push(matrix.row_ids()[row].clone());
        values.push(matrix.row(row).to_vec());
    }
    MatrixSubset {
        row_ids,
        samples: matrix.samples().to_vec(),
        values,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Cluster ids: `0..n` are leaves, `n + k` is the cluster made by merge `k`.
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dendrogram {
    pub merges: Vec<Merge>,
    /// Leaf indices left to right.
    pub order: Vec<usize>,
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Agglomerative clustering with average linkage (UPGMA) on Euclidean
/// distances. Equal distances merge the lowest index pair first.
pub fn average_linkage(points: &[Vec<f64>]) -> Dendrogram {
    let n = points.len();
    if n == 0 {
        return Dendrogram {
            merges: Vec::new(),
            order: Vec::new(),
        };
    }

    let mut dist = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&points[i], &points[j]);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    // Slot i holds (cluster id, leaves) while active.
    let mut slots: Vec<Option<(usize, Vec<usize>)>> =
        (0..n).map(|i| Some((i, vec![i]))).collect();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..n {
            if slots[i].is_none() {
                continue;
            }
            for j in (i + 1)..n {
                if slots[j].is_none() {
                    continue;
                }
                if best.is_none_or(|(_, _, d)| dist[i][j] < d) {
                    best = Some((i, j, dist[i][j]));
                }
            }
        }
        let Some((i, j, distance)) = best else {
            break;
        };

        let (Some((left_id, left_leaves)), Some((right_id, right_leaves))) =
            (slots[i].take(), slots[j].take())
        else {
            break;
        };
        let (size_i, size_j) = (left_leaves.len() as f64, right_leaves.len() as f64);
        for k in 0..n {
            if k == i || slots[k].is_none() {
                continue;
            }
            let d = (size_i * dist[i][k] + size_j * dist[j][k]) / (size_i + size_j);
            dist[i][k] = d;
            dist[k][i] = d;
        }

        let mut leaves = left_leaves;
        leaves.extend(right_leaves);
        merges.push(Merge {
            left: left_id,
            right: right_id,
            distance,
            size: leaves.len(),
        });
        slots[i] = Some((n + step, leaves));
    }

    let order = slots
        .into_iter()
        .flatten()
        .flat_map(|(_, leaves)| leaves)
        .collect();
    Dendrogram { merges, order }
}

/// Heatmap input with rows and columns in dendrogram order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredHeatmap {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub row_dendrogram: Dendrogram,
    pub col_dendrogram: Dendrogram,
}

impl ClusteredHeatmap {
    pub fn build(subset: &MatrixSubset) -> Self {
        let row_dendrogram = average_linkage(&subset.values);
        let columns: Vec<Vec<f64>> = (0..subset.samples.len())
            .map(|col| subset.values.iter().map(|row| row[col]).collect())
            .collect();
        let col_dendrogram = average_linkage(&columns);

        let values = row_dendrogram
            .order
            .iter()
            .map(|&row| {
                col_dendrogram
                    .order
                    .iter()
                    .map(|&col| subset.values[row][col])
                    .collect()
            })
            .collect();

        Self {
            row_labels: row_dendrogram
                .order
                .iter()
                .map(|&row| subset.row_ids[row].clone())
                .collect(),
            col_labels: col_dendrogram
                .order
                .iter()
                .map(|&col| subset.samples[col].clone())
                .collect(),
            values,
            row_dendrogram,
            col_dendrogram,
        }
    }

    /// `(min, max)` over all cells, `None` when empty.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramData {
    pub bins: Vec<HistogramBin>,
    /// Gaussian KDE scaled to bin counts; empty for zero-variance input.
    pub density: Vec<(f64, f64)>,
}

const DENSITY_POINTS: usize = 200;

impl HistogramData {
    pub fn build(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let Some((min, max)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        }) else {
            return Self {
                bins: Vec::new(),
                density: Vec::new(),
            };
        };

        let span = max - min;
        let width = if span > 0.0 { span / bins as f64 } else { 1.0 };
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        let hist_bins = counts
            .into_iter()
            .enumerate()
            .map(|(idx, count)| HistogramBin {
                start: min + idx as f64 * width,
                end: min + (idx as f64 + 1.0) * width,
                count,
            })
            .collect();

        let density = match scott_bandwidth(values) {
            Some(bandwidth) if span > 0.0 => {
                let scale = values.len() as f64 * width;
                (0..DENSITY_POINTS)
                    .map(|i| {
                        let x = min + span * i as f64 / (DENSITY_POINTS - 1) as f64;
                        (x, gaussian_kde(values, bandwidth, x) * scale)
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        Self {
            bins: hist_bins,
            density,
        }
    }

    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }
}

/// Scott's rule: sample std × n^(-1/5).
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let bandwidth = var.sqrt() * n.powf(-0.2);
    (bandwidth > 0.0).then_some(bandwidth)
}

pub fn gaussian_kde(values: &[f64], bandwidth: f64, x: f64) -> f64 {
    let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * bandwidth * values.len() as f64);
    values
        .iter()
        .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
        .sum::<f64>()
        * norm
}
