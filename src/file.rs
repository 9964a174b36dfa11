//! Plaintext and gzip-compressed file input and output.
//!
//! Every table this crate consumes or produces may be gzip-compressed;
//! [`InputFile`] sniffs the gzip magic bytes and [`OutputFile`] compresses
//! whenever the output path ends in `.gz`, so callers read and write
//! through a single interface.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Check for the gzip magic bytes at the start of a file.
fn is_gzipped(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == [0x1f, 0x8b]),
        // shorter than two bytes cannot be gzip
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    }
}

/// An input file that is transparently decompressed if gzip-compressed.
pub struct InputFile {
    pub path: PathBuf,
}

impl InputFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open the file for buffered reading, decompressing if needed.
    pub fn reader(&self) -> Result<BufReader<Box<dyn Read>>, FileError> {
        let file = File::open(&self.path)?;
        let reader: Box<dyn Read> = if is_gzipped(&self.path)? {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(BufReader::new(reader))
    }

    /// Read all non-empty lines, trimming trailing whitespace.
    ///
    /// Used for the line-oriented inputs (liftOver output) that are not
    /// delimited tables.
    pub fn lines(&self) -> Result<Vec<String>, FileError> {
        let reader = self.reader()?;
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }
        Ok(lines)
    }
}

/// An output file that is gzip-compressed when the path ends in `.gz`.
pub struct OutputFile {
    pub path: PathBuf,
}

impl OutputFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Open the file for buffered writing, compressing if the path ends
    /// in `.gz`.
    pub fn writer(&self) -> Result<Box<dyn Write>, FileError> {
        let is_gzip = self
            .path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));
        let file = File::create(&self.path)?;
        let writer: Box<dyn Write> = if is_gzip {
            Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
        } else {
            Box::new(BufWriter::new(file))
        };
        Ok(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_plain_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tsv");

        let out = OutputFile::new(&path);
        let mut writer = out.writer().unwrap();
        writeln!(writer, "chr1\t100").unwrap();
        writeln!(writer, "chr2\t200").unwrap();
        drop(writer);

        let input = InputFile::new(&path);
        let lines = input.lines().unwrap();
        assert_eq!(lines, vec!["chr1\t100", "chr2\t200"]);
    }

    #[test]
    fn test_gzip_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");

        let out = OutputFile::new(&path);
        let mut writer = out.writer().unwrap();
        writeln!(writer, "chrX\t42").unwrap();
        writer.flush().unwrap();
        drop(writer);

        let input = InputFile::new(&path);
        let lines = input.lines().unwrap();
        assert_eq!(lines, vec!["chrX\t42"]);
    }

    #[test]
    fn test_empty_file_is_not_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty");
        File::create(&path).unwrap();
        let input = InputFile::new(&path);
        assert!(input.lines().unwrap().is_empty());
    }
}
