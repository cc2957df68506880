use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::ArrayRef;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{NumericPolicy, RawRow, RecordStore, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a vehicle dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` – header row with at least the required columns
/// * `.json`         – `[{ "MPG": 18, "Origin": "American", ... }, ...]`
/// * `.parquet`      – flat columns named like the CSV headers
pub fn load_file(path: &Path, policy: NumericPolicy) -> Result<RecordStore> {
    let rows = read_rows(path)?;
    let store = RecordStore::load(rows, policy)
        .with_context(|| format!("parsing records from {}", path.display()))?;
    Ok(store)
}

/// Read the raw text cells of every row without interpreting them.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path, b','),
        "tsv" => load_csv(path, b'\t'),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn check_columns<'a>(available: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let available: Vec<&str> = available.into_iter().collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !available.contains(c))
        .collect();
    if !missing.is_empty() {
        bail!("missing required column(s): {}", missing.join(", "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Delimited text with a header row. Extra columns are ignored and every
/// cell is trimmed.
fn load_csv(path: &Path, delimiter: u8) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    check_columns(headers.iter())?;

    reader
        .deserialize::<RawRow>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {}", row_no + 1)))
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the shape `d3.csv` or `df.to_json(orient='records')`
/// produce. Values may be numbers or strings.
fn load_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {} is not a JSON object", i + 1))?;
            check_columns(obj.keys().map(String::as_str))
                .with_context(|| format!("Row {}", i + 1))?;

            let cell = |key: &str| obj.get(key).map(json_to_text).unwrap_or_default();
            Ok(RawRow {
                mpg: cell("MPG"),
                horsepower: cell("Horsepower"),
                weight: cell("Weight"),
                model_year: cell("Model Year"),
                cylinders: cell("Cylinders"),
                origin: cell("Origin"),
                name: cell("Name"),
            })
        })
        .collect()
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Parquet with one flat column per field, named like the CSV headers.
/// Works with files written by **Pandas** and **Polars** as well as the
/// bundled `generate_sample` binary.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

        let column = |name: &str| -> Result<ArrayRef> {
            let idx = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
            Ok(batch.column(idx).clone())
        };
        let columns = [
            column("MPG")?,
            column("Horsepower")?,
            column("Weight")?,
            column("Model Year")?,
            column("Cylinders")?,
            column("Origin")?,
            column("Name")?,
        ];

        for row in 0..batch.num_rows() {
            let [mpg, horsepower, weight, model_year, cylinders, origin, name] =
                columns.each_ref().map(|col| cell_text(col, row));
            rows.push(RawRow {
                mpg: mpg?,
                horsepower: horsepower?,
                weight: weight?,
                model_year: model_year?,
                cylinders: cylinders?,
                origin: origin?,
                name: name?,
            });
        }
    }

    Ok(rows)
}

/// Render one Arrow cell as text; nulls become empty cells.
fn cell_text(col: &ArrayRef, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    array_value_to_string(col, row).with_context(|| format!("row {}: unreadable cell", row + 1))
}
