
use super::*;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("burnout_compressed_test_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_gz(path: &Path, data: &[u8]) {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    std::fs::write(path, enc.finish().unwrap()).unwrap();
}

#[test]
fn test_is_gzip() {
    assert!(is_gzip(Path::new("a.csv.gz")));
    assert!(!is_gzip(Path::new("a.csv")));
    assert!(!is_gzip(Path::new("gz")));
}

#[test]
fn test_plain_and_gzip_read_the_same() {
    let dir = make_temp_dir();
    let data = b"a,b\n1,2\n";
    std::fs::write(dir.join("t.csv"), data).unwrap();
    write_gz(&dir.join("t.csv.gz"), data);

    assert_eq!(read_upload(&dir.join("t.csv"), 1024).unwrap(), data);
    assert_eq!(read_upload(&dir.join("t.csv.gz"), 1024).unwrap(), data);
}

#[test]
fn test_plain_file_over_limit() {
    let dir = make_temp_dir();
    std::fs::write(dir.join("t.csv"), vec![b'x'; 100]).unwrap();
    let err = read_upload(&dir.join("t.csv"), 99).unwrap_err();
    assert!(matches!(
        err,
        InputError::TooLarge {
            unit: "bytes",
            actual: 100,
            limit: 99
        }
    ));
    assert!(read_upload(&dir.join("t.csv"), 100).is_ok());
}

#[test]
fn test_decompressed_size_is_limited() {
    let dir = make_temp_dir();
    // compresses to far less than the limit
    write_gz(&dir.join("t.csv.gz"), &vec![b'0'; 10_000]);
    let err = read_upload(&dir.join("t.csv.gz"), 1_000).unwrap_err();
    assert!(matches!(err, InputError::TooLarge { unit: "bytes", .. }));
}

#[test]
fn test_missing_file() {
    let dir = make_temp_dir();
    let err = read_upload(&dir.join("absent.csv"), 1_000).unwrap_err();
    assert!(matches!(err, InputError::Io(_)));
}
