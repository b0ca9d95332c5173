use opencc_chain::{Dictionary, EngineConfig, OpenCC, OpenccError};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture_dictionary(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("dictionary")
        .join(name)
}

#[test]
fn compiled_dictionary_round_trip_test() {
    let dir = tempdir().unwrap();
    let source = Dictionary::load_text(fixture_dictionary("TSCharacters.txt")).unwrap();
    let target = dir.path().join("TSCharacters.zst");
    source.save_compressed(&target).unwrap();

    let loaded = Dictionary::load_compressed(&target).unwrap();
    assert_eq!(loaded.len(), source.len());
    assert_eq!(loaded.max_len(), source.max_len());
    assert_eq!(loaded.min_len(), source.min_len());
    // Alternatives survive compilation; lookup still yields the first.
    assert_eq!(loaded.get_raw("儘"), Some("尽 侭"));
}

#[test]
fn compiled_output_is_deterministic_test() {
    let dir = tempdir().unwrap();
    let source = Dictionary::load_text(fixture_dictionary("STCharacters.txt")).unwrap();
    let a = dir.path().join("a.zst");
    let b = dir.path().join("b.zst");
    source.save_compressed(&a).unwrap();
    source.save_compressed(&b).unwrap();
    assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
}

#[test]
fn engine_converts_with_compiled_dictionaries_test() {
    let dir = tempdir().unwrap();
    for name in ["STPhrases", "STCharacters"] {
        Dictionary::load_text(fixture_dictionary(&format!("{name}.txt")))
            .unwrap()
            .save_compressed(dir.path().join(format!("{name}.zst")))
            .unwrap();
    }
    fs::write(
        dir.path().join("s2t.json"),
        r#"{
            "name": "Simplified Chinese to Traditional Chinese",
            "conversion_chain": [{"dict": {"type": "group", "policy": "per_segment", "dicts": [
                {"type": "zst", "file": "STPhrases.zst"},
                {"type": "zst", "file": "STCharacters.zst"}
            ]}}]
        }"#,
    )
    .unwrap();

    let mut opencc = OpenCC::with_config(EngineConfig::new(dir.path(), dir.path()));
    opencc.set_conversion("s2t");
    assert_eq!(
        opencc.convert("香烟（英语：Cigarette），为烟草制品的一种。").unwrap(),
        "香菸（英語：Cigarette），爲菸草製品的一種。"
    );
}

#[test]
fn corrupt_compiled_dictionary_test() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.zst");
    fs::write(&path, b"not a zstd frame").unwrap();
    let err = Dictionary::load_compressed(&path).unwrap_err();
    assert!(matches!(err, OpenccError::Codec { .. } | OpenccError::Io { .. }));
}
