use super::*;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::metrics::MetricSpec;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("mobility_rank_cache_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const SPECS: &[MetricSpec] = &[
    MetricSpec {
        column: "NPT41_PUB",
        label: "Net price, lowest bracket",
        lower_is_better: true,
    },
    MetricSpec {
        column: "MD_EARN_WNE_P10",
        label: "Median earnings",
        lower_is_better: false,
    },
];

fn sample_records() -> Vec<InstitutionRecord> {
    vec![
        InstitutionRecord {
            unit_id: 100654,
            name: "Alpha State University".to_string(),
            highest_degree: Some(DegreeLevel::Graduate),
            metrics: vec![Some(10250.0), Some(41000.0)],
        },
        InstitutionRecord {
            unit_id: 100724,
            name: "Beta College".to_string(),
            highest_degree: Some(DegreeLevel::Bachelor),
            metrics: vec![Some(9120.5), Some(38500.0)],
        },
    ]
}

fn write_source(dir: &std::path::Path) -> PathBuf {
    let source = dir.join("source.csv");
    fs::write(&source, "UNITID,INSTNM\n1,One\n").unwrap();
    source
}

#[test]
fn test_round_trip() {
    let dir = make_temp_dir();
    let source = write_source(&dir);
    let registry = MetricRegistry::from_specs(SPECS);
    let meta = CacheMeta::for_source(&source, &registry).unwrap();
    let (csv_path, meta_path) = entry_paths(&dir, 2018);

    let records = sample_records();
    write_entry(&csv_path, &meta_path, &meta, &records, &registry).unwrap();
    let loaded = read_entry(&csv_path, &meta_path, &meta, &registry)
        .unwrap()
        .unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].unit_id, 100654);
    assert_eq!(loaded[0].name, "Alpha State University");
    assert_eq!(loaded[0].highest_degree, Some(DegreeLevel::Graduate));
    assert_eq!(loaded[0].metrics, vec![Some(10250.0), Some(41000.0)]);
    assert_eq!(loaded[1].metrics[0], Some(9120.5));
}

#[test]
fn test_missing_entry_is_a_miss() {
    let dir = make_temp_dir();
    let source = write_source(&dir);
    let registry = MetricRegistry::from_specs(SPECS);
    let meta = CacheMeta::for_source(&source, &registry).unwrap();
    let (csv_path, meta_path) = entry_paths(&dir, 2018);
    assert!(read_entry(&csv_path, &meta_path, &meta, &registry)
        .unwrap()
        .is_none());
}

#[test]
fn test_source_change_invalidates_entry() {
    let dir = make_temp_dir();
    let source = write_source(&dir);
    let registry = MetricRegistry::from_specs(SPECS);
    let meta = CacheMeta::for_source(&source, &registry).unwrap();
    let (csv_path, meta_path) = entry_paths(&dir, 2018);
    write_entry(&csv_path, &meta_path, &meta, &sample_records(), &registry).unwrap();

    fs::write(&source, "UNITID,INSTNM\n1,One\n2,Two\n").unwrap();
    let fresh = CacheMeta::for_source(&source, &registry).unwrap();
    assert!(read_entry(&csv_path, &meta_path, &fresh, &registry)
        .unwrap()
        .is_none());
}

#[test]
fn test_column_set_change_invalidates_entry() {
    let dir = make_temp_dir();
    let source = write_source(&dir);
    let registry = MetricRegistry::from_specs(SPECS);
    let meta = CacheMeta::for_source(&source, &registry).unwrap();
    let (csv_path, meta_path) = entry_paths(&dir, 2018);
    write_entry(&csv_path, &meta_path, &meta, &sample_records(), &registry).unwrap();

    let narrow = MetricRegistry::from_specs(&SPECS[..1]);
    let fresh = CacheMeta::for_source(&source, &narrow).unwrap();
    assert!(read_entry(&csv_path, &meta_path, &fresh, &narrow)
        .unwrap()
        .is_none());
}

#[test]
fn test_corrupt_payload_is_a_miss_not_an_error() {
    let dir = make_temp_dir();
    let source = write_source(&dir);
    let registry = MetricRegistry::from_specs(SPECS);
    let meta = CacheMeta::for_source(&source, &registry).unwrap();
    let (csv_path, meta_path) = entry_paths(&dir, 2018);
    write_entry(&csv_path, &meta_path, &meta, &sample_records(), &registry).unwrap();

    fs::write(&csv_path, "UNITID,INSTNM\nnot-a-number,Broken\n").unwrap();
    assert!(read_entry(&csv_path, &meta_path, &meta, &registry)
        .unwrap()
        .is_none());
}

#[test]
fn test_hash_file_tracks_content() {
    let dir = make_temp_dir();
    let path = dir.join("data.csv");
    fs::write(&path, "aaa").unwrap();
    let first = hash_file(&path).unwrap();
    assert_eq!(first, hash_file(&path).unwrap());
    fs::write(&path, "aab").unwrap();
    assert_ne!(first, hash_file(&path).unwrap());
    assert_ne!(hash_bytes(b"aaa"), hash_bytes(b"aab"));
}

#[test]
fn test_open_maybe_gz_reads_both_forms() {
    use std::io::{Read as _, Write as _};

    let dir = make_temp_dir();
    let plain = dir.join("table.csv");
    fs::write(&plain, "UNITID\n1\n").unwrap();

    let gz = dir.join("table.csv.gz");
    let mut encoder =
        flate2::write::GzEncoder::new(File::create(&gz).unwrap(), flate2::Compression::default());
    encoder.write_all(b"UNITID\n1\n").unwrap();
    encoder.finish().unwrap();

    for path in [&plain, &gz] {
        let mut contents = String::new();
        open_maybe_gz(path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "UNITID\n1\n");
    }
}
