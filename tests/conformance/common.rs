use std::path::PathBuf;

pub fn fixtures_dir() -> PathBuf {
    std::env::var("FORMSTATE_FIXTURES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

/// Reads a YAML fixture file into a list of cases.
pub fn load_cases<T: for<'de> serde::Deserialize<'de>>(file: &str) -> Vec<T> {
    let path = fixtures_dir().join(file);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {:?}: {}", path, e));
    serde_saphyr::from_str(&content).unwrap_or_else(|e| panic!("bad fixture {:?}: {}", path, e))
}
