//! Construction-time options for following a file.

use crate::error::{Error, Result};

/// Bytes scanned per reassembly pass unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 65_536;

/// Record separator unless configured otherwise.
pub const DEFAULT_SEPARATOR: u8 = b'\n';

/// How completed records reach the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionMode {
    /// The subscriber runs in-line with the reassembly pass.
    #[default]
    Synchronous,
    /// Records are queued during a pass and released after it yields.
    Deferred,
}

/// Immutable snapshot of how a file is followed.
///
/// ```
/// use log_tail::{EmissionMode, TailOptions};
///
/// # fn main() -> log_tail::Result<()> {
/// let options = TailOptions::default()
///     .from_beginning(true)
///     .emission(EmissionMode::Deferred)
///     .with_separator("|")?
///     .with_chunk_size(4096)?;
///
/// assert_eq!(options.separator(), b'|');
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailOptions {
    from_beginning: bool,
    emission: EmissionMode,
    separator: u8,
    chunk_size: usize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            from_beginning: false,
            emission: EmissionMode::default(),
            separator: DEFAULT_SEPARATOR,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TailOptions {
    /// Start at offset zero instead of the current end of file.
    pub fn from_beginning(mut self, from_beginning: bool) -> Self {
        self.from_beginning = from_beginning;
        self
    }

    pub fn emission(mut self, mode: EmissionMode) -> Self {
        self.emission = mode;
        self
    }

    /// Sets the separator from a one-character value.
    ///
    /// Fails unless `value` is exactly one ASCII character.
    pub fn with_separator(mut self, value: &str) -> Result<Self> {
        self.separator = parse_separator(value)?;
        Ok(self)
    }

    pub fn separator_byte(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Sets the maximum number of bytes scanned per pass.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn starts_from_beginning(&self) -> bool {
        self.from_beginning
    }

    pub fn emission_mode(&self) -> EmissionMode {
        self.emission
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

/// Convert a one-character separator into its byte code.
pub(crate) fn parse_separator(value: &str) -> Result<u8> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(Error::InvalidSeparator {
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TailOptions::default();
        assert!(!options.starts_from_beginning());
        assert_eq!(options.emission_mode(), EmissionMode::Synchronous);
        assert_eq!(options.separator(), b'\n');
        assert_eq!(options.chunk_size(), 65_536);
    }

    #[test]
    fn test_parse_separator_single_char() {
        assert_eq!(parse_separator("\n").unwrap(), b'\n');
        assert_eq!(parse_separator("|").unwrap(), b'|');
        assert_eq!(parse_separator("\0").unwrap(), 0);
    }

    #[test]
    fn test_parse_separator_rejects_multi_char() {
        let err = parse_separator("<<>>").unwrap_err();
        match err {
            Error::InvalidSeparator { value } => assert_eq!(value, "<<>>"),
            other => panic!("Expected InvalidSeparator, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_separator_rejects_empty() {
        assert!(matches!(
            parse_separator(""),
            Err(Error::InvalidSeparator { .. })
        ));
    }

    #[test]
    fn test_parse_separator_rejects_multibyte_char() {
        // One character, but two bytes in UTF-8
        assert!(matches!(
            parse_separator("é"),
            Err(Error::InvalidSeparator { .. })
        ));
    }

    #[test]
    fn test_with_chunk_size_rejects_zero() {
        assert!(matches!(
            TailOptions::default().with_chunk_size(0),
            Err(Error::InvalidChunkSize)
        ));
    }

    #[test]
    fn test_separator_byte_accepts_any_byte() {
        // Raw bytes bypass the one-character check, including non-ASCII values
        let options = TailOptions::default().separator_byte(0x1e);
        assert_eq!(options.separator(), 0x1e);

        let options = TailOptions::default().separator_byte(0xff);
        assert_eq!(options.separator(), 0xff);
    }

    #[test]
    fn test_builder_chain() {
        let options = TailOptions::default()
            .from_beginning(true)
            .emission(EmissionMode::Deferred)
            .with_separator(";")
            .unwrap()
            .with_chunk_size(16)
            .unwrap();

        assert!(options.starts_from_beginning());
        assert_eq!(options.emission_mode(), EmissionMode::Deferred);
        assert_eq!(options.separator(), b';');
        assert_eq!(options.chunk_size(), 16);
    }
}
