use crate::model::{EntityId, EntityRecord, MONTHS_PER_YEAR};
use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use rustc_hash::FxHashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use tokio::{fs, task};
use tracing::{info, warn};

const COLUMN_ID: &str = "company_id";
const COLUMN_NAME: &str = "company_name";
const COLUMN_MONTH: &str = "month";
const COLUMN_CALLS: &str = "calls";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Long-form rows: `company_id,company_name,month,calls`.
    MonthlyCountsCsv,
    /// A JSON array of entity records.
    EntityJson,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        if name.ends_with(".json") {
            Self::EntityJson
        } else {
            Self::MonthlyCountsCsv
        }
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

pub async fn load_entities(path: &Path) -> Result<Vec<EntityRecord>> {
    let raw = fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let format = InputFormat::from_path(path);
    let compressed = is_gzip(path);

    let entities = task::spawn_blocking(move || {
        let data = if compressed { decompress(&raw)? } else { raw };
        parse_entities(&data, format)
    })
    .await
    .context("failed to parse entity data")??;

    info!(
        path = %path.display(),
        entities = entities.len(),
        "loaded monthly data"
    );
    Ok(entities)
}

fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .context("failed to decompress gzip input")?;
    Ok(out)
}

pub fn parse_entities(data: &[u8], format: InputFormat) -> Result<Vec<EntityRecord>> {
    match format {
        InputFormat::EntityJson => {
            serde_json::from_slice(data).context("failed to decode entity JSON")
        }
        InputFormat::MonthlyCountsCsv => parse_monthly_counts(data),
    }
}

struct Accumulator {
    id: EntityId,
    name: String,
    counts: [f64; MONTHS_PER_YEAR],
}

/// Groups long-form monthly counts into one record per company, keeping the
/// order in which companies first appear. Counts for a repeated month are
/// summed.
pub fn parse_monthly_counts(data: &[u8]) -> Result<Vec<EntityRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(data));

    let headers = reader
        .headers()
        .context("missing CSV headers in monthly data")?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| anyhow!("missing '{name}' column in monthly data"))
    };
    let idx_id = column(COLUMN_ID)?;
    let idx_name = column(COLUMN_NAME)?;
    let idx_month = column(COLUMN_MONTH)?;
    let idx_calls = column(COLUMN_CALLS)?;

    let mut order: Vec<Accumulator> = Vec::new();
    let mut index: FxHashMap<EntityId, usize> = FxHashMap::default();

    for record in reader.records() {
        let record = record.context("failed to read monthly data record")?;
        let line = record.position().map_or(0, csv::Position::line);

        let id_raw = record.get(idx_id).unwrap_or("");
        if id_raw.is_empty() {
            return Err(anyhow!("line {line}: missing {COLUMN_ID}"));
        }
        let month_raw = record.get(idx_month).unwrap_or("");
        let month: u32 = month_raw
            .parse()
            .with_context(|| format!("line {line}: invalid month '{month_raw}'"))?;
        let calls_raw = record.get(idx_calls).unwrap_or("");
        let calls: f64 = match calls_raw.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => return Err(anyhow!("line {line}: non-numeric calls '{calls_raw}'")),
        };

        let Some(slot) = month_slot(month) else {
            warn!(line, month, "skipping row with month outside 1-12");
            continue;
        };

        let id = EntityId::parse(id_raw);
        let position = match index.get(&id) {
            Some(&position) => position,
            None => {
                let name = record.get(idx_name).unwrap_or("").to_string();
                index.insert(id.clone(), order.len());
                order.push(Accumulator {
                    id,
                    name,
                    counts: [0.0; MONTHS_PER_YEAR],
                });
                order.len() - 1
            }
        };
        order[position].counts[slot] += calls;
    }

    Ok(order
        .into_iter()
        .map(|acc| EntityRecord::from_counts(acc.name, acc.id, acc.counts))
        .collect())
}

fn month_slot(month: u32) -> Option<usize> {
    let slot = usize::try_from(month).ok()?.checked_sub(1)?;
    (slot < MONTHS_PER_YEAR).then_some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const SAMPLE: &str = "company_id,company_name,month,calls
7,Elite Plumbing,1,100
3,Monarch HVAC,1,1200
3,Monarch HVAC,2,1100
7,Elite Plumbing,3,50
3,Monarch HVAC,2,100
";

    #[test]
    fn groups_rows_in_first_seen_order() {
        let entities = parse_monthly_counts(SAMPLE.as_bytes()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name, "Elite Plumbing");
        assert_eq!(entities[0].id, EntityId::Number(7));
        assert_eq!(entities[1].name, "Monarch HVAC");

        let monarch = &entities[1].absolute_values;
        assert!((monarch[0] - 1200.0).abs() < f64::EPSILON);
        assert!((monarch[1] - 1200.0).abs() < f64::EPSILON);
        assert!(monarch[2..].iter().all(|value| *value == 0.0));

        let elite = entities[0].percentage_values.as_ref().unwrap();
        assert!((elite[0] - 200.0 / 3.0).abs() < 1e-9);
        assert!((elite[2] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn skips_months_out_of_range() {
        let data = "company_id,company_name,month,calls\n1,A,0,5\n1,A,13,5\n1,A,12,5\n";
        let entities = parse_monthly_counts(data.as_bytes()).unwrap();
        assert_eq!(entities.len(), 1);
        let total: f64 = entities[0].absolute_values.iter().sum();
        assert!((total - 5.0).abs() < f64::EPSILON);
        assert!((entities[0].absolute_values[11] - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_numeric_calls() {
        let data = "company_id,company_name,month,calls\n1,A,1,lots\n";
        let err = parse_monthly_counts(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("non-numeric calls 'lots'"));
    }

    #[test]
    fn rejects_missing_columns() {
        let data = "company_id,month,calls\n1,1,5\n";
        let err = parse_monthly_counts(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("company_name"));
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("data/companies.JSON")),
            InputFormat::EntityJson
        );
        assert_eq!(
            InputFormat::from_path(Path::new("data/companies.json.gz")),
            InputFormat::EntityJson
        );
        assert_eq!(
            InputFormat::from_path(Path::new("data/calls.csv")),
            InputFormat::MonthlyCountsCsv
        );
    }

    #[tokio::test]
    async fn loads_gzip_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();

        let entities = load_entities(&path).await.unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].id, EntityId::Number(3));
    }
}
