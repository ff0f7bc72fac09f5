//! integrity::digest
//!
//! Streaming content digests for display and audit.
//!
//! The digest is informational: there is no stored expected value and no
//! comparison. Files are read in fixed-size chunks so memory use does not
//! depend on file size.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use super::IntegrityError;

/// Read buffer size for streaming digests.
pub const CHUNK_SIZE: usize = 4096;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Sha224,
    #[default]
    Sha256,
    Sha384,
    Sha512,
    Md5,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 5] = [
        DigestAlgorithm::Sha224,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
        DigestAlgorithm::Md5,
    ];

    /// Name used in configuration and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha224 => "sha224",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
            DigestAlgorithm::Md5 => "md5",
        }
    }

    /// Name used in output (`SHA-256`).
    pub fn label(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha224 => "SHA-224",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
            DigestAlgorithm::Md5 => "MD5",
        }
    }

    /// Parse an algorithm name; case and a `-` separator are ignored.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityError::UnsupportedAlgorithm` for unknown names.
    pub fn parse(name: &str) -> Result<Self, IntegrityError> {
        let folded = name.trim().to_ascii_lowercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|a| a.name() == folded)
            .ok_or_else(|| IntegrityError::UnsupportedAlgorithm(name.to_string()))
    }

    /// Comma-separated list of valid names, for error messages.
    pub fn valid_names() -> String {
        Self::ALL.map(DigestAlgorithm::name).join(", ")
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = IntegrityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Compute the hex digest of a file.
///
/// # Errors
///
/// - `IntegrityError::FileNotFound` if the path does not exist
/// - `IntegrityError::Io` if the file cannot be read
///
/// # Example
///
/// ```no_run
/// use docmeta::integrity::{digest, DigestAlgorithm};
/// use std::path::Path;
///
/// let hex = digest(Path::new("report.xlsx"), DigestAlgorithm::Sha256).unwrap();
/// println!("File Hash (SHA-256): {hex}");
/// ```
pub fn digest(path: &Path, algorithm: DigestAlgorithm) -> Result<String, IntegrityError> {
    let file = File::open(path).map_err(|e| IntegrityError::from_io(path, e))?;
    digest_reader(file, algorithm).map_err(|e| IntegrityError::from_io(path, e))
}

/// Compute the hex digest of everything a reader yields.
pub fn digest_reader<R: Read>(reader: R, algorithm: DigestAlgorithm) -> io::Result<String> {
    match algorithm {
        DigestAlgorithm::Sha224 => stream::<Sha224, _>(reader),
        DigestAlgorithm::Sha256 => stream::<Sha256, _>(reader),
        DigestAlgorithm::Sha384 => stream::<Sha384, _>(reader),
        DigestAlgorithm::Sha512 => stream::<Sha512, _>(reader),
        DigestAlgorithm::Md5 => {
            let mut context = md5::Context::new();
            for_each_chunk(reader, |chunk| context.consume(chunk))?;
            Ok(format!("{:x}", context.compute()))
        }
    }
}

fn stream<D: Digest, R: Read>(reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    for_each_chunk(reader, |chunk| hasher.update(chunk))?;
    Ok(hex::encode(hasher.finalize()))
}

fn for_each_chunk<R: Read>(mut reader: R, mut sink: impl FnMut(&[u8])) -> io::Result<()> {
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => sink(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sha256_known_vector() {
        let hex = digest_reader(&b"abc"[..], DigestAlgorithm::Sha256).unwrap();
        assert_eq!(
            hex,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn md5_known_vector() {
        let hex = digest_reader(&b"abc"[..], DigestAlgorithm::Md5).unwrap();
        assert_eq!(hex, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn empty_input() {
        let hex = digest_reader(&b""[..], DigestAlgorithm::Sha256).unwrap();
        assert_eq!(
            hex,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn multi_chunk_matches_one_shot() {
        let data: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let streamed = digest_reader(&data[..], DigestAlgorithm::Sha512).unwrap();
        let one_shot = hex::encode(Sha512::digest(&data));
        assert_eq!(streamed, one_shot);
    }

    #[test]
    fn file_digest_is_stable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.bin");
        fs::write(&path, b"stable contents").unwrap();

        let first = digest(&path, DigestAlgorithm::Sha256).unwrap();
        let second = digest(&path, DigestAlgorithm::Sha256).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn missing_file() {
        let temp = TempDir::new().unwrap();
        let err = digest(&temp.path().join("nope"), DigestAlgorithm::Sha256).unwrap_err();
        assert!(matches!(err, IntegrityError::FileNotFound(_)));
    }

    #[test]
    fn parse_names() {
        assert_eq!(
            DigestAlgorithm::parse("SHA-256").unwrap(),
            DigestAlgorithm::Sha256
        );
        assert_eq!(DigestAlgorithm::parse("md5").unwrap(), DigestAlgorithm::Md5);
        assert!(matches!(
            DigestAlgorithm::parse("crc32"),
            Err(IntegrityError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn default_is_sha256() {
        assert_eq!(DigestAlgorithm::default(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::default().label(), "SHA-256");
    }
}
