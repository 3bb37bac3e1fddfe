//! Integration test: buffered file layer on real files.
//!
//! Exercises `fastfile::File` against files in the system temp directory:
//! whole/partial reads, line splitting for LF and CRLF content (with and
//! without a forced refill split), capacity-bounded reads, seek/tell,
//! write round trips, append, and closed/moved-from handles.
//!
//! Run: cargo test -p fastfile --test file_test

use std::path::{Path, PathBuf};

use fastfile::{Error, OpenMode, SeekMode};

const TEST_TXT: &str = "this is a line\nthis is line 2\nend\n";
const TEST_CRLF: &str = "this is a line\r\nthis is line 2\r\nend\r\n";

/// A temp file unique to this process and test, removed on drop.
struct Fixture {
    path: PathBuf,
}

impl Fixture {
    fn new(tag: &str, contents: &[u8]) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let path = std::env::temp_dir().join(format!(
            "fastfile_test_{tag}_{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, contents).expect("write fixture");
        Self { path }
    }

    fn empty(tag: &str) -> Self {
        let fx = Self::new(tag, b"");
        std::fs::remove_file(&fx.path).expect("remove fixture");
        fx
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn read_all_lines(f: &mut fastfile::File) -> Vec<String> {
    let mut out = Vec::new();
    let mut line = String::new();
    while f.read_line_string(&mut line).expect("read_line") {
        out.push(line.clone());
    }
    out
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[test]
fn read_into_raw_buffer() {
    let fx = Fixture::new("raw_buffer", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    let mut buf = [0u8; 100];
    let n = f.read(&mut buf).unwrap();
    assert_eq!(n, 34);
    assert_eq!(n as u64, f.size());
}

#[test]
fn read_whole_file_as_string() {
    let fx = Fixture::new("whole", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    let s = f.read_text(None).unwrap();
    assert_eq!(s.len(), 34);
    assert_eq!(s, TEST_TXT);
}

#[test]
fn read_a_few_bytes_as_string() {
    let fx = Fixture::new("few", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    assert_eq!(f.read_text(Some(5)).unwrap(), "this ");
    assert_eq!(f.read_text(Some(2)).unwrap(), "is");
}

#[test]
fn read_bytes_as_vector() {
    let fx = Fixture::new("bytes", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    let v = f.read_bytes(Some(5)).unwrap();
    assert_eq!(v.len(), 5);
    assert_eq!(v[0], b't');
    let v = f.read_bytes(Some(2)).unwrap();
    assert_eq!(v.len(), 2);
    assert_eq!(v[0], b'i');
}

#[test]
fn bounded_reads_reproduce_large_file() {
    let data: Vec<u8> = (0..100_000u32).map(|i| (i * 31 % 256) as u8).collect();
    let fx = Fixture::new("large", &data);
    let mut f = fastfile::open(fx.path()).unwrap();
    let mut got = Vec::new();
    let mut chunk = vec![0u8; 1000 + 17];
    loop {
        let n = f.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        got.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(got, data);
}

#[test]
fn read_into_capacity_of_existing_vector() {
    let fx = Fixture::new("capacity", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    let mut v: Vec<u8> = Vec::with_capacity(5);
    let cap = v.capacity();

    assert_eq!(f.read_into_capacity(&mut v).unwrap(), cap);
    assert_eq!(v[0], b't');
    assert_eq!(f.read_into_capacity(&mut v).unwrap(), 0);
    v.clear();

    assert_eq!(v.capacity(), cap);
    assert_eq!(f.read_into_capacity(&mut v).unwrap(), cap);
    assert_eq!(v[0], TEST_TXT.as_bytes()[cap]);
    assert_eq!(v.capacity(), cap);
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

#[test]
fn read_line_by_line() {
    let fx = Fixture::new("lines", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    let mut line = String::new();
    assert!(f.read_line_string(&mut line).unwrap());
    assert_eq!(line, "this is a line");
    assert!(f.read_line_string(&mut line).unwrap());
    assert_eq!(line, "this is line 2");
    assert!(f.read_line_string(&mut line).unwrap());
    assert_eq!(line, "end");
    assert!(!f.read_line_string(&mut line).unwrap());
    assert!(line.is_empty());
}

#[test]
fn lines_iterator_counts_three() {
    let fx = Fixture::new("iter", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    let mut count = 0;
    for line in f.lines() {
        line.unwrap();
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn crlf_file_gives_same_lines() {
    let lf = Fixture::new("lf", TEST_TXT.as_bytes());
    let crlf = Fixture::new("crlf", TEST_CRLF.as_bytes());
    assert_eq!(std::fs::metadata(crlf.path()).unwrap().len(), 37);

    let expected = read_all_lines(&mut fastfile::open(lf.path()).unwrap());
    assert_eq!(expected, ["this is a line", "this is line 2", "end"]);
    assert_eq!(read_all_lines(&mut fastfile::open(crlf.path()).unwrap()), expected);
}

#[test]
fn crlf_split_across_refill_on_real_file() {
    let crlf = Fixture::new("crlf_split", TEST_CRLF.as_bytes());
    // 15 bytes ends the first fill right after the first '\r'.
    let raw = fastfile::open_raw(crlf.path(), OpenMode::Read).unwrap();
    let mut f = fastfile::File::from_raw_with_capacity(raw, 15).unwrap();
    assert_eq!(
        read_all_lines(&mut f),
        ["this is a line", "this is line 2", "end"]
    );
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

#[test]
fn write_close_reopen_round_trip() {
    let fx = Fixture::empty("roundtrip");
    let data: Vec<u8> = (0..20_000u32).map(|i| (i % 253) as u8).collect();

    let mut w = fastfile::open_with(fx.path(), OpenMode::Write).unwrap();
    assert_eq!(w.write(&data).unwrap(), data.len());
    w.close().unwrap();

    let mut r = fastfile::open(fx.path()).unwrap();
    assert_eq!(r.size(), data.len() as u64);
    assert_eq!(r.read_bytes(None).unwrap(), data);
}

#[test]
fn write_truncates_and_drop_flushes() {
    let fx = Fixture::new("truncate", b"old contents that are longer");
    {
        let mut w = fastfile::open_with(fx.path(), OpenMode::Write).unwrap();
        w.write_str("Hello World\n").unwrap();
    }
    assert_eq!(std::fs::read(fx.path()).unwrap(), b"Hello World\n");
}

#[test]
fn append_mode_extends_file() {
    let fx = Fixture::new("append", b"jello\n");
    let mut a = fastfile::open_with(fx.path(), OpenMode::Append).unwrap();
    a.write_str("more\n").unwrap();
    a.sync().unwrap();
    assert_eq!(std::fs::read(fx.path()).unwrap(), b"jello\nmore\n");
}

#[test]
fn raw_write_and_sync() {
    let fx = Fixture::empty("raw_sync");
    let mut raw = fastfile::open_raw(fx.path(), OpenMode::Write).unwrap();
    assert_eq!(raw.write(b"jello\n").unwrap(), 6);
    raw.sync().unwrap();
    raw.close().unwrap();

    let mut f = fastfile::open(fx.path()).unwrap();
    assert_eq!(f.read_text(None).unwrap(), "jello\n");
}

// ---------------------------------------------------------------------------
// Preconditions and positioning
// ---------------------------------------------------------------------------

#[test]
fn cannot_write_or_flush_a_read_handle() {
    let fx = Fixture::new("readonly", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    assert_eq!(f.write_str("try this"), Err(Error::BadDescriptor));
    assert_eq!(f.flush(), Err(Error::BadDescriptor));
}

#[test]
fn can_close() {
    let fx = Fixture::new("close", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    f.close().unwrap();
    assert!(f.is_closed());
    assert_eq!(f.read_text(None), Err(Error::BadDescriptor));
}

#[test]
fn can_seek() {
    let fx = Fixture::new("seek", TEST_TXT.as_bytes());
    let mut f = fastfile::open(fx.path()).unwrap();
    assert_eq!(f.seek(5, SeekMode::Set).unwrap(), 5);
    assert_eq!(f.tell().unwrap(), 5);
    assert_eq!(f.read_text(Some(2)).unwrap(), "is");
    assert_eq!(f.position().unwrap(), 7);
}

#[test]
fn open_missing_file_is_not_found() {
    let fx = Fixture::empty("missing");
    assert_eq!(fastfile::open(fx.path()).unwrap_err(), Error::NotFound);
}

#[test]
fn moved_from_file_reports_closed() {
    let fx = Fixture::new("moved", TEST_TXT.as_bytes());
    let mut a = fastfile::open(fx.path()).unwrap();
    let mut b = a.take();
    assert!(a.is_closed());
    assert_eq!(a.read_text(Some(1)), Err(Error::BadDescriptor));
    assert_eq!(b.read_text(Some(4)).unwrap(), "this");
}
