//! Data preparation before coloring: dropping, scaling, normalizing, color range.

use crate::models::{DataAxis, RenderParams};
use crate::table::DataTable;
use anyhow::{Result, bail};

/// Apply drop lists, then scaling, then normalization, as configured.
pub fn prepare(data: &DataTable, params: &RenderParams) -> Result<DataTable> {
    let mut out = data.clone();
    out.drop_rows(&params.data_rows_to_drop)?;
    out.drop_columns(&params.data_cols_to_drop)?;
    if out.row_labels.is_empty() || out.column_labels.is_empty() {
        bail!("no data left to plot after dropping rows/columns");
    }
    if let Some(axis) = params.scale_along {
        apply_along(&mut out.values, axis, standardize);
    }
    if let Some(axis) = params.normalize_along {
        apply_along(&mut out.values, axis, min_max);
    }
    Ok(out)
}

fn apply_along(values: &mut [Vec<f64>], axis: DataAxis, f: fn(&mut [f64])) {
    match axis {
        DataAxis::Rows => values.iter_mut().for_each(|row| f(row)),
        DataAxis::Columns => {
            let ncols = values.first().map_or(0, |r| r.len());
            for j in 0..ncols {
                let mut col: Vec<f64> = values.iter().map(|r| r[j]).collect();
                f(&mut col);
                for (row, v) in values.iter_mut().zip(col) {
                    row[j] = v;
                }
            }
        }
    }
}

/// Z-score ignoring NaN; constant vectors become zeros.
fn standardize(v: &mut [f64]) {
    let finite: Vec<f64> = v.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        return;
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let var = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let sd = var.sqrt();
    for x in v.iter_mut().filter(|x| x.is_finite()) {
        *x = if sd > f64::EPSILON { (*x - mean) / sd } else { 0.0 };
    }
}

/// Rescale to `[0, 1]` ignoring NaN; constant vectors become zeros.
fn min_max(v: &mut [f64]) {
    let (lo, hi) = v
        .iter()
        .filter(|x| x.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    if !lo.is_finite() {
        return;
    }
    let span = hi - lo;
    for x in v.iter_mut().filter(|x| x.is_finite()) {
        *x = if span > f64::EPSILON { (*x - lo) / span } else { 0.0 };
    }
}

/// Linear-interpolated quantile of already sorted values, `q` in `[0, 1]`.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Value range mapped onto the colormap.
///
/// Data spanning zero gets a symmetric range `[-q, q]` where `q` is the
/// requested percentile of absolute values; one-signed data uses the
/// percentile window of the raw values instead.
pub fn color_range(data: &DataTable, quantile_pct: u8) -> (f64, f64) {
    let mut vals: Vec<f64> = data.finite_values().collect();
    if vals.is_empty() {
        return (0.0, 1.0);
    }
    vals.sort_by(|a, b| a.total_cmp(b));
    let q = quantile_pct.clamp(80, 100) as f64 / 100.0;
    let (min, max) = (vals[0], vals[vals.len() - 1]);

    let (lo, hi) = if min < 0.0 && max > 0.0 {
        let mut abs: Vec<f64> = vals.iter().map(|v| v.abs()).collect();
        abs.sort_by(|a, b| a.total_cmp(b));
        let m = quantile(&abs, q).unwrap_or(max);
        (-m, m)
    } else {
        (
            quantile(&vals, 1.0 - q).unwrap_or(min),
            quantile(&vals, q).unwrap_or(max),
        )
    };

    if (hi - lo).abs() < f64::EPSILON {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: Vec<Vec<f64>>) -> DataTable {
        DataTable {
            row_labels: (0..values.len()).map(|i| format!("r{i}")).collect(),
            column_labels: (0..values[0].len()).map(|j| format!("c{j}")).collect(),
            values,
        }
    }

    #[test]
    fn scale_columns_to_zero_mean() {
        let t = table(vec![vec![1.0, 10.0], vec![3.0, 10.0]]);
        let params = RenderParams::default();
        let out = prepare(&t, &params).unwrap();
        assert_eq!(out.values[0][0], -1.0);
        assert_eq!(out.values[1][0], 1.0);
        assert_eq!(out.values[0][1], 0.0);
    }

    #[test]
    fn normalize_rows_keeps_nan() {
        let t = table(vec![vec![2.0, f64::NAN, 4.0]]);
        let params = RenderParams {
            scale_along: None,
            normalize_along: Some(DataAxis::Rows),
            ..RenderParams::default()
        };
        let out = prepare(&t, &params).unwrap();
        assert_eq!(out.values[0][0], 0.0);
        assert!(out.values[0][1].is_nan());
        assert_eq!(out.values[0][2], 1.0);
    }

    #[test]
    fn dropping_everything_fails() {
        let t = table(vec![vec![1.0]]);
        let params = RenderParams {
            data_rows_to_drop: vec!["r0".into()],
            ..RenderParams::default()
        };
        assert!(prepare(&t, &params).is_err());
    }

    #[test]
    fn symmetric_range_for_signed_data() {
        let t = table(vec![vec![-2.0, 1.0, 4.0]]);
        let (lo, hi) = color_range(&t, 100);
        assert_eq!((lo, hi), (-4.0, 4.0));
    }

    #[test]
    fn constant_data_gets_a_window() {
        let t = table(vec![vec![5.0, 5.0]]);
        assert_eq!(color_range(&t, 95), (4.0, 6.0));
    }
}
