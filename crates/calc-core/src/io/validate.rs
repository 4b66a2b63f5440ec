//! Checks applied to a downloaded binary before it may replace the running one.

use std::io::Read;
use std::path::Path;

/// Anything smaller is a truncated transfer or an error page, not a build.
pub const MIN_BINARY_SIZE: u64 = 1024;

/// Executable container recognised by its leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableFormat {
    /// `7F 45 4C 46`
    Elf,
    /// `FEEDFACE` / `FEEDFACF` in either byte order.
    MachO,
    /// `4D 5A` (`MZ`)
    Pe,
}

impl ExecutableFormat {
    /// Identify a header. Only the first four bytes are inspected.
    ///
    /// # Example
    ///
    /// ```
    /// use calc_core::io::validate::ExecutableFormat;
    ///
    /// assert_eq!(ExecutableFormat::detect(b"MZ\x90\x00"), Some(ExecutableFormat::Pe));
    /// assert_eq!(ExecutableFormat::detect(b"<!DOCTYPE html>"), None);
    /// ```
    pub fn detect(header: &[u8]) -> Option<Self> {
        match header {
            [0x7F, b'E', b'L', b'F', ..] => Some(Self::Elf),
            [0xFE, 0xED, 0xFA, 0xCE | 0xCF, ..] | [0xCE | 0xCF, 0xFA, 0xED, 0xFE, ..] => {
                Some(Self::MachO)
            }
            [b'M', b'Z', ..] => Some(Self::Pe),
            _ => None,
        }
    }

    /// Read the head of a file and identify it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn sniff(path: &Path) -> std::io::Result<Option<Self>> {
        let mut header = Vec::with_capacity(16);
        std::fs::File::open(path)?
            .take(16)
            .read_to_end(&mut header)?;
        Ok(Self::detect(&header))
    }

    /// Display name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elf => "ELF",
            Self::MachO => "Mach-O",
            Self::Pe => "PE",
        }
    }
}

impl std::fmt::Display for ExecutableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const BINARY_MEDIA_TYPES: &[&str] = &[
    "application/octet-stream",
    "application/x-executable",
    "application/x-binary",
    "application/x-msdownload",
    "binary/octet-stream",
];

/// Verdict on the declared `Content-Type` of a download. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// A media type used for executables.
    Binary,
    /// Not a binary type, but commonly served for release assets
    /// (`text/plain`, or no header at all).
    Plausible,
    /// Anything else, e.g. `text/html`.
    Unexpected,
}

impl ContentType {
    /// Classify a raw `Content-Type` header value; parameters are ignored.
    pub fn classify(header: Option<&str>) -> Self {
        let Some(value) = header else {
            return Self::Plausible;
        };
        let media_type = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if BINARY_MEDIA_TYPES.contains(&media_type.as_str()) {
            Self::Binary
        } else if media_type.is_empty() || media_type == "text/plain" {
            Self::Plausible
        } else {
            Self::Unexpected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_elf() {
        assert_eq!(
            ExecutableFormat::detect(&[0x7F, b'E', b'L', b'F', 2, 1, 1]),
            Some(ExecutableFormat::Elf)
        );
        assert_eq!(ExecutableFormat::detect(&[0x7F, b'E', b'L']), None);
    }

    #[test]
    fn test_detect_macho_all_byte_orders() {
        for magic in [
            [0xFE, 0xED, 0xFA, 0xCE],
            [0xCE, 0xFA, 0xED, 0xFE],
            [0xFE, 0xED, 0xFA, 0xCF],
            [0xCF, 0xFA, 0xED, 0xFE],
        ] {
            assert_eq!(
                ExecutableFormat::detect(&magic),
                Some(ExecutableFormat::MachO),
                "{magic:02X?}"
            );
        }
        // Fat/universal headers are not accepted.
        assert_eq!(ExecutableFormat::detect(&[0xCA, 0xFE, 0xBA, 0xBE]), None);
    }

    #[test]
    fn test_detect_pe_regardless_of_platform() {
        assert_eq!(
            ExecutableFormat::detect(&[0x4D, 0x5A]),
            Some(ExecutableFormat::Pe)
        );
        assert_eq!(ExecutableFormat::detect(b"ZM"), None);
    }

    #[test]
    fn test_detect_rejects_text() {
        assert_eq!(ExecutableFormat::detect(b"#!/bin/sh\necho hi"), None);
        assert_eq!(ExecutableFormat::detect(b""), None);
    }

    #[test]
    fn test_sniff_reads_file_head() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload");
        let mut bytes = vec![0x7F, b'E', b'L', b'F'];
        bytes.resize(4096, 0);
        std::fs::write(&path, &bytes).unwrap();
        assert_eq!(
            ExecutableFormat::sniff(&path).unwrap(),
            Some(ExecutableFormat::Elf)
        );

        std::fs::write(&path, b"<html>").unwrap();
        assert_eq!(ExecutableFormat::sniff(&path).unwrap(), None);

        assert!(ExecutableFormat::sniff(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            ContentType::classify(Some("application/octet-stream")),
            ContentType::Binary
        );
        assert_eq!(
            ContentType::classify(Some("Application/X-Executable; charset=binary")),
            ContentType::Binary
        );
        assert_eq!(
            ContentType::classify(Some("text/plain; charset=utf-8")),
            ContentType::Plausible
        );
        assert_eq!(ContentType::classify(None), ContentType::Plausible);
        assert_eq!(
            ContentType::classify(Some("text/html")),
            ContentType::Unexpected
        );
    }
}
