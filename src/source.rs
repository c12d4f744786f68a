//! Row source: read a dump into ordered data rows (header dropped).

use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::utils::config::{MMAP_THRESHOLD, READ_BUFFER_SIZE};

/// Read every line of `path` except the first (header). Uses memory-mapped I/O for files above
/// [`MMAP_THRESHOLD`], buffered reads otherwise. `\n` and `\r\n` endings are both stripped.
/// Any I/O or UTF-8 failure is fatal for the run.
pub fn read_rows(path: &Path) -> Result<Vec<String>> {
    read_rows_with_threshold(path, MMAP_THRESHOLD)
}

fn read_rows_with_threshold(path: &Path, mmap_threshold: u64) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let size = file
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();

    if size > mmap_threshold {
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("memory-map {}", path.display()))?;
        let text = std::str::from_utf8(&mmap)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
        return Ok(rows_from_text(text));
    }

    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
    let mut rows = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read line {} of {}", n + 1, path.display()))?;
        if n > 0 {
            rows.push(line);
        }
    }
    Ok(rows)
}

/// Data rows of an in-memory dump: every line after the header.
pub fn rows_from_text(text: &str) -> Vec<String> {
    text.lines().skip(1).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rows_from_text_skips_header_and_strips_crlf() {
        let rows = rows_from_text("ip_address,country_code\r\na,b\r\nc,d\n");
        assert_eq!(rows, ["a,b", "c,d"]);
    }

    #[test]
    fn rows_from_text_header_only_or_empty() {
        assert!(rows_from_text("ip_address,country_code").is_empty());
        assert!(rows_from_text("").is_empty());
    }

    fn dump_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn mmap_and_buffered_reads_agree() {
        let f = dump_file("ip_address,country_code\r\n1.1.1.1,AU\r\n\r\n2.2.2.2,FR");
        let mapped = read_rows_with_threshold(f.path(), 0).unwrap();
        let buffered = read_rows_with_threshold(f.path(), u64::MAX).unwrap();
        assert_eq!(mapped, ["1.1.1.1,AU", "", "2.2.2.2,FR"]);
        assert_eq!(mapped, buffered);
    }

    #[test]
    fn mmap_rejects_invalid_utf8() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"header\n\xff\xfe,AU\n").unwrap();
        assert!(read_rows_with_threshold(f.path(), 0).is_err());
        assert!(read_rows_with_threshold(f.path(), u64::MAX).is_err());
    }

    #[test]
    fn rows_from_text_keeps_blank_data_lines() {
        assert_eq!(rows_from_text("h\n\nx\n"), ["", "x"]);
    }
}
