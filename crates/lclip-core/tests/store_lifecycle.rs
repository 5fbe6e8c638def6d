use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use lclip_core::{CoreError, LabelStore};

static TRACING_INIT: Once = Once::new();

fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lclip_core=debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn store_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("lclip.json")
}

fn reopen(path: &Path) -> LabelStore {
    LabelStore::open(path).expect("reopen store")
}

#[test]
fn values_round_trip_through_close_and_open() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("key", b"value".to_vec()),
        ("empty", Vec::new()),
        ("", b"unnamed".to_vec()),
        ("binary", (0..=255u8).collect()),
        ("multi\nline", b"first\nsecond\n".to_vec()),
    ];

    let mut store = LabelStore::open(&path).expect("open");
    for (label, value) in &cases {
        store.set(*label, value.clone());
    }
    store.close().expect("close");

    let store = reopen(&path);
    assert_eq!(store.len(), cases.len());
    for (label, value) in &cases {
        assert_eq!(store.get(label), value.as_slice(), "label {label:?}");
        assert!(store.contains(label));
    }
    store.close().expect("close");
}

#[test]
fn non_ascii_labels_and_values_survive() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = LabelStore::open(&path).expect("open");
    store.set("日本語", "日本語".as_bytes());
    store.close().expect("close");

    // Labels are stored as plain JSON strings, not escaped or encoded.
    let raw = fs::read_to_string(&path).expect("read store");
    assert!(raw.contains("\"日本語\""), "raw store: {raw}");

    let store = reopen(&path);
    assert_eq!(store.get("日本語"), "日本語".as_bytes());
}

#[test]
fn deletes_persist() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = LabelStore::open(&path).expect("open");
    for label in ["foo", "bar", "baz"] {
        store.set(label, label);
    }
    store.close().expect("close");

    let mut store = reopen(&path);
    store.delete("bar");
    store.delete("never-existed");
    store.close().expect("close");

    let store = reopen(&path);
    let mut labels = store.labels();
    labels.sort_unstable();
    assert_eq!(labels, ["baz", "foo"]);
}

#[test]
fn reads_stores_written_by_earlier_releases() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);
    fs::write(&path, "{\"foo\":\"YmFy\",\"hoge\":\"cGl5bw==\",\"nil\":null}\n")
        .expect("write fixture");

    let store = LabelStore::open(&path).expect("open");
    assert_eq!(store.get("foo"), b"bar");
    assert_eq!(store.get("hoge"), b"piyo");
    assert_eq!(store.lookup("nil"), Some(&b""[..]));
    store.close().expect("close");

    assert_eq!(
        fs::read_to_string(&path).expect("read store"),
        "{\"foo\":\"YmFy\",\"hoge\":\"cGl5bw==\",\"nil\":\"\"}\n"
    );
}

#[test]
fn corrupt_store_is_reported_not_replaced() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);
    fs::write(&path, "[\"not\", \"a\", \"mapping\"]").expect("write fixture");

    let err = LabelStore::open(&path).expect_err("open must fail");
    match &err {
        CoreError::Parse { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("expected parse error, got {other}"),
    }
    assert!(err.to_string().contains("lclip.json"));
    assert_eq!(
        fs::read_to_string(&path).expect("read store"),
        "[\"not\", \"a\", \"mapping\"]"
    );
}

#[test]
fn close_reports_io_error_naming_the_store() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = LabelStore::open(&path).expect("open");
    store.set("k", "v");

    // A non-empty directory where the store file was cannot be renamed over.
    fs::remove_file(&path).expect("remove store file");
    fs::create_dir(&path).expect("create directory in its place");
    fs::write(path.join("occupant"), "x").expect("fill directory");

    let err = store.close().expect_err("close must fail");
    match &err {
        CoreError::Io { path: reported, .. } => {
            assert!(reported.ends_with("lclip.json"), "reported path: {}", reported.display())
        }
        other => panic!("expected io error, got {other}"),
    }
    assert!(path.join("occupant").exists());
}

#[test]
fn dropping_without_close_discards_changes() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut store = LabelStore::open(&path).expect("open");
    store.set("lost", "value");
    drop(store);

    assert!(reopen(&path).is_empty());
}

/// Unlocked stores give no isolation between processes: two handles
/// opened on the same file each write their whole view on close, so the
/// later close silently drops the earlier one's update.
#[test]
fn unlocked_concurrent_handles_lose_updates() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let mut first = LabelStore::open(&path).expect("open first");
    let mut second = LabelStore::open(&path).expect("open second");

    first.set("from-first", "1");
    second.set("from-second", "2");
    first.close().expect("close first");
    second.close().expect("close second");

    let store = reopen(&path);
    assert!(!store.contains("from-first"));
    assert_eq!(store.get("from-second"), b"2");
}

#[cfg(unix)]
#[test]
fn locked_handles_serialize_read_modify_write() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = store_path(&dir);

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let path = path.clone();
            std::thread::spawn(move || {
                let mut store = LabelStore::open_locked(&path).expect("open locked");
                store.set(format!("worker-{i}"), i.to_string());
                store.close().expect("close");
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker thread");
    }

    let store = reopen(&path);
    assert_eq!(store.len(), 8);
    for i in 0..8 {
        assert_eq!(store.get(&format!("worker-{i}")), i.to_string().as_bytes());
    }
}
