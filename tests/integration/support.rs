use infranav::source::MemoryRecordSource;
use std::path::PathBuf;
use std::sync::Arc;

pub fn scenario_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scenario.json")
}

pub fn scenario_source() -> Arc<MemoryRecordSource> {
    Arc::new(MemoryRecordSource::from_seed_file(&scenario_path()).unwrap())
}
