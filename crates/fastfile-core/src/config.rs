//! Buffer sizing configuration.
//!
//! The buffer capacity of a [`BufferedFile`](crate::BufferedFile) is the
//! filesystem block size reported at open time, or [`DEFAULT_BLOCK_SIZE`]
//! when none is reported. The `FASTFILE_BUFFER_SIZE` environment variable
//! overrides that choice process-wide:
//! - a byte count (`8192`), optionally with a `k`/`m` suffix (`16k`, `1m`);
//! - `auto`, `default`, an empty string, `0` or anything unparsable leaves
//!   sizing to the block size.

use std::sync::OnceLock;

/// Block size used when the OS reports none.
pub const DEFAULT_BLOCK_SIZE: u64 = 4096;

/// Largest accepted override (64 MiB).
pub const MAX_BUFFER_SIZE: usize = 64 << 20;

/// Parse an override value (case-insensitive, surrounding whitespace ignored).
#[must_use]
pub fn parse_size_loose(s: &str) -> Option<usize> {
    let s = s.trim().to_ascii_lowercase();
    let (digits, scale) = match s.as_bytes().last() {
        Some(b'k') => (&s[..s.len() - 1], 1usize << 10),
        Some(b'm') => (&s[..s.len() - 1], 1usize << 20),
        _ => (s.as_str(), 1),
    };
    let n: usize = digits.parse().ok()?;
    let bytes = n.checked_mul(scale)?;
    (bytes > 0 && bytes <= MAX_BUFFER_SIZE).then_some(bytes)
}

static BUFFER_OVERRIDE: OnceLock<Option<usize>> = OnceLock::new();

/// The configured override (reads the env var on first call, caches thereafter).
#[must_use]
pub fn buffer_size_override() -> Option<usize> {
    *BUFFER_OVERRIDE.get_or_init(|| {
        std::env::var("FASTFILE_BUFFER_SIZE")
            .ok()
            .and_then(|v| parse_size_loose(&v))
    })
}

/// Effective block size: the reported one, or the default when it is zero.
#[must_use]
pub const fn effective_block_size(reported: u64) -> u64 {
    if reported == 0 {
        DEFAULT_BLOCK_SIZE
    } else {
        reported
    }
}

/// Buffer capacity for a file whose effective block size is `block_size`.
#[must_use]
pub fn buffer_capacity(block_size: u64) -> usize {
    buffer_size_override().unwrap_or_else(|| {
        usize::try_from(effective_block_size(block_size))
            .map_or(MAX_BUFFER_SIZE, |b| b.min(MAX_BUFFER_SIZE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sizes() {
        assert_eq!(parse_size_loose("8192"), Some(8192));
        assert_eq!(parse_size_loose(" 16K "), Some(16 * 1024));
        assert_eq!(parse_size_loose("1m"), Some(1 << 20));
        assert_eq!(parse_size_loose("auto"), None);
        assert_eq!(parse_size_loose("default"), None);
        assert_eq!(parse_size_loose(""), None);
        assert_eq!(parse_size_loose("0"), None);
        assert_eq!(parse_size_loose("k"), None);
        assert_eq!(parse_size_loose("-4"), None);
        assert_eq!(parse_size_loose("128m"), None);
    }

    #[test]
    fn zero_block_size_falls_back() {
        assert_eq!(effective_block_size(0), DEFAULT_BLOCK_SIZE);
        assert_eq!(effective_block_size(512), 512);
    }
}
