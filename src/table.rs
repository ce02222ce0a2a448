//! CSV tables with a header row and a row-label column.
//!
//! - [`DataTable`]: the main numeric matrix (empty, `NA` and `NaN` cells become `NaN`)
//! - [`MetadataTable`]: categorical annotations aligned to rows or columns of the main data

use crate::models::TableShape;
use anyhow::{Context, Result, anyhow, bail};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// Row-major values, `values[row][col]`.
    pub values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTable {
    /// Labels of the data rows (or data columns) being annotated.
    pub index: Vec<String>,
    /// Annotation names, one track each.
    pub columns: Vec<String>,
    /// `cells[i][j]`: value of annotation `columns[j]` for `index[i]`.
    pub cells: Vec<Vec<String>>,
}

/// Top-left corner of a table as display text.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub columns: Vec<String>,
    /// Row label followed by its shown cells.
    pub rows: Vec<(String, Vec<String>)>,
    /// Full size of the previewed table.
    pub shape: TableShape,
}

impl Preview {
    fn build<F>(index: &[String], columns: &[String], max_rows: usize, max_cols: usize, cell: F) -> Self
    where
        F: Fn(usize, usize) -> String,
    {
        let ncols = columns.len().min(max_cols);
        Self {
            columns: columns[..ncols].to_vec(),
            rows: index
                .iter()
                .take(max_rows)
                .enumerate()
                .map(|(i, label)| (label.clone(), (0..ncols).map(|j| cell(i, j)).collect()))
                .collect(),
            shape: TableShape::new(index.len(), columns.len()),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.rows.len() < self.shape.row_count || self.columns.len() < self.shape.column_count
    }
}

/// Header-less cells plus index, as read from any labelled CSV.
struct RawTable {
    index: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn read_raw<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers().context("read header row")?.clone();
    if headers.len() < 2 {
        bail!("expected an index column and at least one data column in the header");
    }
    let columns: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

    let mut index = Vec::new();
    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("read record {}", i + 1))?;
        if rec.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if rec.len() != headers.len() {
            bail!(
                "row {} has {} fields, header has {}",
                i + 1,
                rec.len(),
                headers.len()
            );
        }
        index.push(rec[0].trim().to_string());
        rows.push(rec.iter().skip(1).map(|c| c.trim().to_string()).collect());
    }

    Ok(RawTable {
        index,
        columns,
        rows,
    })
}

fn parse_cell(cell: &str) -> Option<f64> {
    match cell {
        "" | "NA" | "N/A" | "nan" | "NaN" | "NAN" | "null" => Some(f64::NAN),
        s => s.parse::<f64>().ok(),
    }
}

impl DataTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw = read_raw(reader)?;
        let mut values = Vec::with_capacity(raw.rows.len());
        for (label, row) in raw.index.iter().zip(&raw.rows) {
            let parsed = row
                .iter()
                .zip(&raw.columns)
                .map(|(cell, col)| {
                    parse_cell(cell).ok_or_else(|| {
                        anyhow!("non-numeric value {:?} at row {:?}, column {:?}", cell, label, col)
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            values.push(parsed);
        }
        Ok(Self {
            row_labels: raw.index,
            column_labels: raw.columns,
            values,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_reader(f).with_context(|| format!("parse {}", path.display()))
    }

    pub fn shape(&self) -> TableShape {
        TableShape::new(self.row_labels.len(), self.column_labels.len())
    }

    /// Remove rows by label. Unknown labels are an error.
    pub fn drop_rows(&mut self, labels: &[String]) -> Result<()> {
        for label in labels {
            let pos = self
                .row_labels
                .iter()
                .position(|r| r == label)
                .ok_or_else(|| anyhow!("row {:?} not found in main data", label))?;
            self.row_labels.remove(pos);
            self.values.remove(pos);
        }
        Ok(())
    }

    /// Remove columns by label. Unknown labels are an error.
    pub fn drop_columns(&mut self, labels: &[String]) -> Result<()> {
        for label in labels {
            let pos = self
                .column_labels
                .iter()
                .position(|c| c == label)
                .ok_or_else(|| anyhow!("column {:?} not found in main data", label))?;
            self.column_labels.remove(pos);
            for row in &mut self.values {
                row.remove(pos);
            }
        }
        Ok(())
    }

    /// First `max_rows` x `max_cols` cells; missing values show as `NaN`.
    pub fn preview(&self, max_rows: usize, max_cols: usize) -> Preview {
        Preview::build(&self.row_labels, &self.column_labels, max_rows, max_cols, |i, j| {
            let v = self.values[i][j];
            if v.is_nan() { "NaN".to_string() } else { v.to_string() }
        })
    }

    /// Finite values only, in row-major order.
    pub fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied().filter(|v| v.is_finite())
    }
}

impl MetadataTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw = read_raw(reader)?;
        Ok(Self {
            index: raw.index,
            columns: raw.columns,
            cells: raw.rows,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_reader(f).with_context(|| format!("parse {}", path.display()))
    }

    /// Values of one annotation, ordered like `index`.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(self.cells.iter().map(|row| row[j].as_str()).collect())
    }

    pub fn preview(&self, max_rows: usize, max_cols: usize) -> Preview {
        Preview::build(&self.index, &self.columns, max_rows, max_cols, |i, j| {
            self.cells[i][j].clone()
        })
    }

    /// Annotation values for one labelled item.
    pub fn row_for(&self, label: &str) -> Option<&[String]> {
        let i = self.index.iter().position(|l| l == label)?;
        Some(&self.cells[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "gene,s1,s2,s3\nA,1.0,2.5,\nB,NA,-3,4e2\n";

    #[test]
    fn parses_index_header_and_missing_cells() {
        let t = DataTable::from_reader(MAIN.as_bytes()).unwrap();
        assert_eq!(t.row_labels, vec!["A", "B"]);
        assert_eq!(t.column_labels, vec!["s1", "s2", "s3"]);
        assert!(t.values[0][2].is_nan());
        assert!(t.values[1][0].is_nan());
        assert_eq!(t.values[1][2], 400.0);
        assert_eq!(t.shape(), TableShape::new(2, 3));
        assert_eq!(t.finite_values().count(), 4);
    }

    #[test]
    fn rejects_text_in_main_data() {
        let err = DataTable::from_reader("id,a\nx,hello\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("hello"));
    }

    #[test]
    fn drop_rows_and_columns() {
        let mut t = DataTable::from_reader(MAIN.as_bytes()).unwrap();
        t.drop_rows(&["A".into()]).unwrap();
        t.drop_columns(&["s2".into()]).unwrap();
        assert_eq!(t.shape(), TableShape::new(1, 2));
        assert_eq!(t.values[0][1], 400.0);
        assert!(t.drop_rows(&["missing".into()]).is_err());
    }

    #[test]
    fn metadata_lookup() {
        let m = MetadataTable::from_reader("sample,group,batch\ns1,ctl,b1\ns2,trt,b1\n".as_bytes())
            .unwrap();
        assert_eq!(m.column("group").unwrap(), vec!["ctl", "trt"]);
        assert_eq!(m.row_for("s2").unwrap(), &["trt".to_string(), "b1".to_string()]);
        assert!(m.column("nope").is_none());
    }

    #[test]
    fn preview_keeps_top_left_corner() {
        let t = DataTable::from_reader(MAIN.as_bytes()).unwrap();
        let p = t.preview(1, 2);
        assert_eq!(p.columns, vec!["s1", "s2"]);
        assert_eq!(p.rows, vec![("A".to_string(), vec!["1".to_string(), "2.5".to_string()])]);
        assert_eq!(p.shape, TableShape::new(2, 3));
        assert!(p.is_truncated());

        let full = t.preview(10, 10);
        assert_eq!(full.rows[1].1, vec!["NaN", "-3", "400"]);
        assert!(!full.is_truncated());

        let m = MetadataTable::from_reader("sample,group\ns1,ctl\n".as_bytes()).unwrap();
        assert_eq!(m.preview(5, 5).rows, vec![("s1".to_string(), vec!["ctl".to_string()])]);
    }
}
