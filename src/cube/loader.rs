use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use ndarray::Array3;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::Cube;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a cube from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – long table with `i`, `j`, `k` and `value` columns (recommended)
/// * `.json`    – `{ "shape": [nx, ny, nz], "data": [...] }`, row-major, `i` slowest
/// * `.csv`     – long table with header `i,j,k,value`
///
/// Indices in long tables are 1-based. Voxels that never appear are NaN.
pub fn load_file(path: &Path) -> Result<Cube> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DenseCube {
    shape: [usize; 3],
    data: Vec<Option<f64>>,
}

fn load_json(path: &Path) -> Result<Cube> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let dense: DenseCube = serde_json::from_str(&text).context("parsing JSON cube")?;

    let [nx, ny, nz] = dense.shape;
    let expected = nx * ny * nz;
    if dense.data.len() != expected {
        bail!(
            "shape {:?} needs {expected} samples but data has {}",
            dense.shape,
            dense.data.len()
        );
    }
    let samples: Vec<f64> = dense
        .data
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    let array = Array3::from_shape_vec((nx, ny, nz), samples).context("building cube array")?;
    Ok(Cube::new(array)?)
}

// ---------------------------------------------------------------------------
// Long-format assembly (CSV and Parquet)
// ---------------------------------------------------------------------------

/// One `(i, j, k, value)` row of a long table, 1-based indices.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct VoxelRecord {
    i: usize,
    j: usize,
    k: usize,
    value: Option<f64>,
}

fn assemble(records: &[VoxelRecord]) -> Result<Cube> {
    if records.is_empty() {
        bail!("no voxel rows found");
    }
    let mut shape = [0usize; 3];
    for (row, rec) in records.iter().enumerate() {
        if rec.i == 0 || rec.j == 0 || rec.k == 0 {
            bail!("Row {row}: indices are 1-based, got ({}, {}, {})", rec.i, rec.j, rec.k);
        }
        shape[0] = shape[0].max(rec.i);
        shape[1] = shape[1].max(rec.j);
        shape[2] = shape[2].max(rec.k);
    }

    let mut array = Array3::from_elem((shape[0], shape[1], shape[2]), f64::NAN);
    for rec in records {
        array[[rec.i - 1, rec.j - 1, rec.k - 1]] = rec.value.unwrap_or(f64::NAN);
    }
    log::debug!("Assembled cube {shape:?} from {} rows", records.len());
    Ok(Cube::new(array)?)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Cube> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let records = reader
        .deserialize::<VoxelRecord>()
        .enumerate()
        .map(|(row, result)| result.with_context(|| format!("CSV row {row}")))
        .collect::<Result<Vec<VoxelRecord>>>()?;
    assemble(&records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `i`, `j`, `k`: Int32 or Int64, 1-based voxel indices
/// - `value`: Float64, Float32, Int32 or Int64 (nulls become NaN)
///
/// Extra columns are ignored.
fn load_parquet(path: &Path) -> Result<Cube> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let i_col = column(&batch, "i")?;
        let j_col = column(&batch, "j")?;
        let k_col = column(&batch, "k")?;
        let value_col = column(&batch, "value")?;

        for row in 0..batch.num_rows() {
            records.push(VoxelRecord {
                i: extract_index(i_col, row).with_context(|| format!("Row {row}: 'i'"))?,
                j: extract_index(j_col, row).with_context(|| format!("Row {row}: 'j'"))?,
                k: extract_index(k_col, row).with_context(|| format!("Row {row}: 'k'"))?,
                value: extract_value(value_col, row)
                    .with_context(|| format!("Row {row}: 'value'"))?,
            });
        }
    }

    assemble(&records)
}

// -- Parquet / Arrow helpers --

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

fn extract_index(col: &ArrayRef, row: usize) -> Result<usize> {
    if col.is_null(row) {
        bail!("null index");
    }
    let raw = match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .value(row) as i64,
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row),
        other => bail!("Expected Int32 or Int64 index column, got {other:?}"),
    };
    usize::try_from(raw).with_context(|| format!("negative index {raw}"))
}

/// Sample value widened to `f64`; null → `None`.
fn extract_value(col: &ArrayRef, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => f64::from(
            col.as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?
                .value(row),
        ),
        DataType::Int32 => f64::from(
            col.as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?
                .value(row),
        ),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row) as f64,
        other => bail!("Unsupported value column type {other:?}"),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::cube::model::Voxel;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_json_dense_cube() {
        let file = write_temp(
            ".json",
            r#"{"shape": [2, 1, 3], "data": [1, 2, 3, 4, null, 6]}"#,
        );
        let cube = load_file(file.path()).unwrap();
        assert_eq!(cube.shape(), [2, 1, 3]);
        assert_eq!(cube.value_at(Voxel::new(1, 1, 3)).unwrap(), 3.0);
        assert_eq!(cube.value_at(Voxel::new(2, 1, 1)).unwrap(), 4.0);
        assert!(cube.value_at(Voxel::new(2, 1, 2)).unwrap().is_nan());
    }

    #[test]
    fn test_json_length_mismatch() {
        let file = write_temp(".json", r#"{"shape": [2, 2, 2], "data": [1, 2]}"#);
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("needs 8 samples"));
    }

    #[test]
    fn test_csv_long_table() {
        let file = write_temp(".csv", "i,j,k,value\n1,1,1,0.5\n2,3,1,7\n2,1,2,\n");
        let cube = load_file(file.path()).unwrap();
        assert_eq!(cube.shape(), [2, 3, 2]);
        assert_eq!(cube.value_at(Voxel::new(2, 3, 1)).unwrap(), 7.0);
        // explicit empty and never-listed voxels are both NaN
        assert!(cube.value_at(Voxel::new(2, 1, 2)).unwrap().is_nan());
        assert!(cube.value_at(Voxel::new(1, 2, 2)).unwrap().is_nan());
    }

    #[test]
    fn test_csv_zero_index_rejected() {
        let file = write_temp(".csv", "i,j,k,value\n0,1,1,1.0\n");
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".fits", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_parquet_long_table() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("i", DataType::Int32, false),
            Field::new("j", DataType::Int32, false),
            Field::new("k", DataType::Int64, false),
            Field::new("value", DataType::Float32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![1, 2, 2])),
                Arc::new(Int32Array::from(vec![1, 1, 2])),
                Arc::new(Int64Array::from(vec![1, 2, 2])),
                Arc::new(Float32Array::from(vec![Some(1.5), None, Some(-4.0)])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let cube = load_file(file.path()).unwrap();
        assert_eq!(cube.shape(), [2, 2, 2]);
        assert_eq!(cube.value_at(Voxel::new(1, 1, 1)).unwrap(), 1.5);
        assert_eq!(cube.value_at(Voxel::new(2, 2, 2)).unwrap(), -4.0);
        assert!(cube.value_at(Voxel::new(2, 1, 2)).unwrap().is_nan());
    }
}
