use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::{Deserialize, Serialize};

use crate::input::InputError;
use crate::model::degree::DegreeLevel;
use crate::model::metrics::MetricRegistry;
use crate::model::record::InstitutionRecord;

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn hash_file(path: &Path) -> Result<u64, InputError> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; 8192];
    let mut hasher = Fnv64::new();
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finish())
}

pub fn hash_bytes(data: &[u8]) -> u64 {
    let mut hasher = Fnv64::new();
    hasher.update(data);
    hasher.finish()
}

const CACHE_VERSION: u32 = 1;

/// Sidecar metadata validated before a cached table is trusted. Any mismatch
/// (format version, source extract hash, registered column set) is a miss,
/// never an error: the entry is rebuilt from the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    pub version: u32,
    pub source_hash: u64,
    pub columns_hash: u64,
    pub n_records: u32,
}

impl CacheMeta {
    pub fn for_source(source: &Path, registry: &MetricRegistry) -> Result<Self, InputError> {
        Ok(Self {
            version: CACHE_VERSION,
            source_hash: hash_file(source)?,
            columns_hash: hash_bytes(registry.columns_fingerprint().as_bytes()),
            n_records: 0,
        })
    }

    fn matches(&self, expect: &CacheMeta) -> bool {
        self.version == expect.version
            && self.source_hash == expect.source_hash
            && self.columns_hash == expect.columns_hash
    }
}

/// Paths of the slim CSV payload and its JSON sidecar for one year.
pub fn entry_paths(cache_dir: &Path, year: u16) -> (PathBuf, PathBuf) {
    (
        cache_dir.join(format!("scorecard_{year}.csv")),
        cache_dir.join(format!("scorecard_{year}.meta.json")),
    )
}

pub fn read_entry(
    csv_path: &Path,
    meta_path: &Path,
    expect: &CacheMeta,
    registry: &MetricRegistry,
) -> Result<Option<Vec<InstitutionRecord>>, InputError> {
    if !csv_path.exists() || !meta_path.exists() {
        return Ok(None);
    }

    let meta: CacheMeta = match serde_json::from_str(&fs::read_to_string(meta_path)?) {
        Ok(meta) => meta,
        Err(err) => {
            tracing::warn!(path = %meta_path.display(), %err, "unreadable cache sidecar; rebuilding");
            return Ok(None);
        }
    };
    if !meta.matches(expect) {
        tracing::info!(path = %csv_path.display(), "stale cache entry; rebuilding");
        return Ok(None);
    }

    match read_payload(csv_path, registry) {
        Ok(records) => {
            if records.len() as u32 != meta.n_records {
                tracing::warn!(
                    path = %csv_path.display(),
                    expected = meta.n_records,
                    found = records.len(),
                    "cache row count mismatch; rebuilding"
                );
                return Ok(None);
            }
            Ok(Some(records))
        }
        Err(err) => {
            tracing::warn!(path = %csv_path.display(), %err, "corrupt cache payload; rebuilding");
            Ok(None)
        }
    }
}

pub fn write_entry(
    csv_path: &Path,
    meta_path: &Path,
    expect: &CacheMeta,
    records: &[InstitutionRecord],
    registry: &MetricRegistry,
) -> Result<(), InputError> {
    if let Some(parent) = csv_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(csv_path)?;
    let mut header = vec!["UNITID", "INSTNM", "HIGHDEG"];
    header.extend(registry.specs().iter().map(|spec| spec.column));
    writer.write_record(&header)?;

    for record in records {
        let mut fields = Vec::with_capacity(header.len());
        fields.push(record.unit_id.to_string());
        fields.push(record.name.clone());
        fields.push(match record.highest_degree {
            Some(level) => level.code().to_string(),
            None => String::new(),
        });
        for value in &record.metrics {
            fields.push(match value {
                Some(v) => v.to_string(),
                None => String::new(),
            });
        }
        writer.write_record(&fields)?;
    }
    writer.flush()?;

    let meta = CacheMeta {
        n_records: records.len() as u32,
        ..expect.clone()
    };
    fs::write(meta_path, serde_json::to_string_pretty(&meta)?)?;
    Ok(())
}

fn read_payload(
    csv_path: &Path,
    registry: &MetricRegistry,
) -> Result<Vec<InstitutionRecord>, InputError> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let headers = reader.headers()?.clone();
    let expected_fields = 3 + registry.len();
    if headers.len() != expected_fields {
        return Err(InputError::InvalidInput(format!(
            "cache payload has {} columns, expected {}",
            headers.len(),
            expected_fields
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let unit_id = field(&row, 0)?
            .parse::<u32>()
            .map_err(|_| InputError::Parse("bad unit id in cache payload".to_string()))?;
        let name = field(&row, 1)?.to_string();
        let highest_degree = match field(&row, 2)? {
            "" => None,
            code => Some(
                code.parse::<u8>()
                    .ok()
                    .and_then(DegreeLevel::from_code)
                    .ok_or_else(|| {
                        InputError::Parse("bad degree code in cache payload".to_string())
                    })?,
            ),
        };
        let mut metrics = Vec::with_capacity(registry.len());
        for idx in 0..registry.len() {
            metrics.push(match field(&row, 3 + idx)? {
                "" => None,
                cell => Some(cell.parse::<f64>().map_err(|_| {
                    InputError::Parse("bad metric value in cache payload".to_string())
                })?),
            });
        }
        records.push(InstitutionRecord {
            unit_id,
            name,
            highest_degree,
            metrics,
        });
    }
    Ok(records)
}

fn field<'a>(row: &'a csv::StringRecord, idx: usize) -> Result<&'a str, InputError> {
    row.get(idx)
        .ok_or_else(|| InputError::Parse(format!("cache payload row is missing field {idx}")))
}

struct Fnv64 {
    hash: u64,
}

impl Fnv64 {
    fn new() -> Self {
        Self {
            hash: 0xcbf29ce484222325,
        }
    }

    fn update(&mut self, data: &[u8]) {
        let mut h = self.hash;
        for &b in data {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.hash = h;
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/cache.rs"]
mod tests;
