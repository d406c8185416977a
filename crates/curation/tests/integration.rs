use curation::{CollectionStore, CurationService, Entry, FileStorage};
use serde_json::{json, Value};

fn open(path: &std::path::Path) -> CurationService<FileStorage> {
    let storage = FileStorage::new(path).unwrap();
    CurationService::new(CollectionStore::open(storage))
}

fn sample_payloads() -> Vec<(&'static str, Value)> {
    vec![
        (
            "chat",
            json!({"messages": [
                {"role": "system", "content": "You are a patient math tutor."},
                {"role": "user", "content": "What is 12 squared?"},
                {"role": "assistant", "content": "12 squared is 144, because 12 x 12 = 144."}
            ]}),
        ),
        (
            "instruction",
            json!({
                "instruction": "Explain how photosynthesis works in plants.",
                "output": "Photosynthesis converts light energy into chemical energy stored in glucose, using carbon dioxide and water as inputs, with oxygen as a byproduct."
            }),
        ),
        ("instruction", json!({"instruction": "", "output": ""})),
        ("chat", json!({"messages": [{"role": "user", "content": ""}]})),
    ]
}

#[test]
fn test_submit_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data/dataset.json");

    let mut ids = Vec::new();
    {
        let mut svc = open(&path);
        for (kind, data) in sample_payloads() {
            ids.push(svc.submit(kind, data).unwrap().id);
        }
    }

    let svc = open(&path);
    let got: Vec<&str> = svc.list().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(got, ids);

    for ((kind, data), entry) in sample_payloads().into_iter().zip(svc.list()) {
        assert_eq!(entry.data, data);
        assert_eq!(entry.kind.as_str(), kind);
        let expected = svc.validate_only(kind, &data).unwrap();
        assert_eq!(entry.quality_score, expected.quality_score);
    }
}

#[test]
fn test_scores_always_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let mut svc = open(&dir.path().join("dataset.json"));
    for (kind, data) in sample_payloads() {
        let sub = svc.submit(kind, data).unwrap();
        assert!(sub.validation.quality_score <= 100);
    }
    assert!(svc.list().iter().all(|e| e.quality_score <= 100));
}

#[test]
fn test_jsonl_lines_match_payloads() {
    let dir = tempfile::tempdir().unwrap();
    let mut svc = open(&dir.path().join("dataset.json"));
    for (kind, data) in sample_payloads() {
        svc.submit(kind, data).unwrap();
    }

    let jsonl = svc.export_jsonl().unwrap();
    assert!(jsonl.ends_with('\n'));

    let lines: Vec<&str> = jsonl.split('\n').filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), svc.list().len());
    for (line, entry) in lines.iter().zip(svc.list()) {
        let parsed: Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed, entry.data);
    }
}

#[test]
fn test_clear_leaves_empty_array_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    let mut svc = open(&path);
    for (kind, data) in sample_payloads() {
        svc.submit(kind, data).unwrap();
    }

    svc.clear().unwrap();
    assert!(svc.list().is_empty());

    let on_disk: Vec<Entry> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert!(on_disk.is_empty());
}

#[test]
fn test_delete_missing_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    let mut svc = open(&path);
    svc.submit("chat", json!({"messages": []})).unwrap();
    let before = std::fs::read(&path).unwrap();

    assert!(svc.delete("does-not-exist").is_err());
    assert_eq!(svc.list().len(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_loads_legacy_file_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    let legacy = json!([
        {
            "id": "0b5ad3a4-8f0e-4b7c-9a53-2f3b8f5d9c11",
            "type": "instruction",
            "data": {"instruction": "List three primes", "output": "2, 3 and 5 are prime numbers."},
            "timestamp": "2024-06-01T09:15:42.512345"
        },
        {
            "type": "chat",
            "data": {"messages": [{"role": "user", "content": "hello"}]}
        }
    ]);
    std::fs::write(&path, serde_json::to_vec_pretty(&legacy).unwrap()).unwrap();

    let svc = open(&path);
    assert_eq!(svc.list().len(), 2);
    assert_eq!(svc.list()[0].id, "0b5ad3a4-8f0e-4b7c-9a53-2f3b8f5d9c11");
    assert!(svc.list().iter().all(|e| e.quality_score == 100));
    assert!(!svc.list()[1].id.is_empty());
}

#[test]
fn test_corrupt_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    std::fs::write(&path, b"[{\"type\": \"chat\",").unwrap();

    let mut svc = open(&path);
    assert!(svc.list().is_empty());

    svc.submit("chat", json!({"messages": []})).unwrap();
    let on_disk: Vec<Entry> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 1);
    assert_eq!(
        std::fs::read(dir.path().join("dataset.json.corrupt")).unwrap(),
        b"[{\"type\": \"chat\","
    );
}

#[test]
fn test_bad_record_does_not_lose_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    let mixed = json!([
        {
            "id": "keep-1",
            "type": "instruction",
            "data": {"instruction": "List three primes", "output": "2, 3 and 5."}
        },
        {
            "id": "keep-2",
            "type": "chat",
            "data": {"messages": [{"role": "user", "content": "hello"}]},
            "quality_score": null
        },
        {
            "id": "drop-1",
            "type": "completion",
            "data": {"prompt": "Once upon a time"}
        }
    ]);
    let original = serde_json::to_vec_pretty(&mixed).unwrap();
    std::fs::write(&path, &original).unwrap();

    let mut svc = open(&path);
    let ids: Vec<&str> = svc.list().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["keep-1", "keep-2"]);

    svc.submit("chat", json!({"messages": []})).unwrap();
    let on_disk: Vec<Entry> = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.len(), 3);
    assert_eq!(on_disk[0].id, "keep-1");
    assert_eq!(on_disk[1].id, "keep-2");

    // the skipped record survives next to the data file
    let backup = std::fs::read(dir.path().join("dataset.json.corrupt")).unwrap();
    assert_eq!(backup, original);
}

#[test]
fn test_clean_file_leaves_no_backup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    {
        let mut svc = open(&path);
        svc.submit("chat", json!({"messages": []})).unwrap();
    }

    let svc = open(&path);
    assert_eq!(svc.list().len(), 1);
    assert!(!dir.path().join("dataset.json.corrupt").exists());
}

#[test]
fn test_stats_hash_matches_jsonl_download() {
    let dir = tempfile::tempdir().unwrap();
    let mut svc = open(&dir.path().join("dataset.json"));
    for (kind, data) in sample_payloads() {
        svc.submit(kind, data).unwrap();
    }
    svc.submit("chat", json!({"messages": [{"role": "user", "content": ""}]})).unwrap();

    let stats = svc.stats().unwrap();
    assert_eq!(stats.entries, 5);
    assert_eq!(stats.duplicate_entries, 1);
    let expected: [u8; 32] = blake3::hash(svc.export_jsonl().unwrap().as_bytes()).into();
    assert_eq!(stats.dataset_hash, expected);
}
