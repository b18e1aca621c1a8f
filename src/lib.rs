//! A small PDF417 encoder.
//!
//! Input bytes are compacted into high-level codewords (text, byte and numeric
//! compaction), framed with a length descriptor, padding and Reed-Solomon error
//! correction over GF(929), then mapped row by row to the bar patterns of the
//! symbology.
//!
//! ```
//! # fn main() -> Result<(), smolpdf417::Error> {
//! let symbol = smolpdf417::encode(b"HELLO WORLD", 3, 2)?;
//! assert_eq!(symbol.rows(), 5);
//!
//! let bars = (0..symbol.width()).filter(|x| symbol.get(*x, 0)).count();
//! assert!(bars > 0);
//! # Ok(())
//! # }
//! ```

pub mod compact;
pub mod err_corr;
mod matrix;
pub mod structure;
pub mod tables;

use core::{fmt, str::FromStr};

pub use compact::Compaction;
pub use matrix::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid column count {columns}, must be within 1..=30")]
    InvalidColumns { columns: usize },
    #[error("invalid security level {level}, must be within 0..=8")]
    InvalidSecurityLevel { level: u8 },
    #[error("data too long: length descriptor is {length}, the limit is 928")]
    DataTooLong { length: usize },
    #[error("too few rows: {rows}, the minimum is 3")]
    TooFewRows { rows: usize },
    #[error("too many rows: {rows}, the maximum is 90")]
    TooManyRows { rows: usize },
    #[error("{rows} rows cannot hold the data, {needed} are needed")]
    RowsTooSmall { rows: usize, needed: usize },
    #[error("character {ch:?} cannot be encoded in {encoding}")]
    UnencodableCharacter { ch: char, encoding: Encoding },
    #[error("unknown character encoding {0:?}, expected utf-8 or latin-1")]
    UnknownEncoding(String),
}

/// Character encoding applied to text before compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

impl Encoding {
    pub fn encode(self, text: &str) -> Result<Vec<u8>, Error> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Latin1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(ch).map_err(|_| Error::UnencodableCharacter { ch, encoding: self })
                })
                .collect(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Latin1 => "latin-1",
        })
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Encoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            _ => Err(Error::UnknownEncoding(s.to_owned())),
        }
    }
}

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Data columns per row, 1 to 30.
    pub columns: usize,
    /// Error correction level, 0 to 8.
    pub security_level: u8,
    pub encoding: Encoding,
    pub numeric_threshold: usize,
    pub text_threshold: usize,
    pub force_binary: bool,
    /// Exact row count, 3 to 90.
    pub force_rows: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        let compaction = Compaction::default();

        Self {
            columns: 6,
            security_level: 2,
            encoding: Encoding::default(),
            numeric_threshold: compaction.numeric_threshold,
            text_threshold: compaction.text_threshold,
            force_binary: compaction.force_binary,
            force_rows: None,
        }
    }
}

impl Options {
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_security_level(mut self, security_level: u8) -> Self {
        self.security_level = security_level;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_thresholds(mut self, numeric: usize, text: usize) -> Self {
        self.numeric_threshold = numeric;
        self.text_threshold = text;
        self
    }

    pub fn with_force_binary(mut self, force_binary: bool) -> Self {
        self.force_binary = force_binary;
        self
    }

    pub fn with_force_rows(mut self, rows: Option<usize>) -> Self {
        self.force_rows = rows;
        self
    }

    pub fn compaction(&self) -> Compaction {
        Compaction {
            numeric_threshold: self.numeric_threshold,
            text_threshold: self.text_threshold,
            force_binary: self.force_binary,
        }
    }

    pub fn encode(&self, data: impl AsRef<[u8]>) -> Result<Symbol, Error> {
        structure::validate(self.columns, self.security_level)?;
        Symbol::generate(data.as_ref(), self)
    }

    /// Encodes `text` after converting it with [`Options::encoding`].
    pub fn encode_str(&self, text: &str) -> Result<Symbol, Error> {
        self.encode(self.encoding.encode(text)?)
    }
}

/// Encodes `data` with `columns` data columns and the given error correction level.
pub fn encode(data: &[u8], columns: usize, security_level: u8) -> Result<Symbol, Error> {
    Options::default()
        .with_columns(columns)
        .with_security_level(security_level)
        .encode(data)
}

#[test]
fn test_empty() {
    let symbol = encode(b"", 1, 0).unwrap();
    assert_eq!(symbol.rows(), 3);
    assert_eq!(symbol.codewords()[0][1], 1);

    assert_eq!(encode(b"", 2, 0), Err(Error::TooFewRows { rows: 2 }));
}

#[test]
fn test_hello_world() {
    let symbol = encode(b"HELLO WORLD", 3, 2).unwrap();

    let data: Vec<u16> = symbol.codewords().iter().flat_map(|r| r[1..4].to_vec()).collect();
    assert_eq!(data.len(), 15);
    assert_eq!(&data[..7], [7, 214, 341, 446, 674, 521, 119]);

    assert_eq!(symbol.rows(), 5);
    assert!(symbol.patterns().iter().all(|r| r.len() == 7));
}

#[test]
fn test_numeric_symbol() {
    let symbol = encode(b"123456789012345", 2, 1).unwrap();
    let data: Vec<u16> = symbol.codewords().iter().flat_map(|r| r[1..3].to_vec()).collect();

    assert_eq!(&data[..8], [8, 902, 1, 812, 292, 890, 124, 745]);
    assert_eq!(data.len(), 8 + 4);
    assert_eq!(symbol.rows(), 6);
}

#[test]
fn test_byte_symbol() {
    let data: Vec<u8> = (0..6).collect();
    let symbol = encode(&data, 2, 0).unwrap();
    let words: Vec<u16> = symbol.codewords().iter().flat_map(|r| r[1..3].to_vec()).collect();

    assert_eq!(words, [8, 924, 0, 5, 844, 88, 165, 900, words[8], words[9]]);
    assert_eq!(symbol.rows(), 5);
}

#[test]
fn test_too_long() {
    assert!(matches!(
        encode(&[b'A'; 2000], 30, 0),
        Err(Error::DataTooLong { length }) if length > 928
    ));
    assert!(matches!(encode(&[b'7'; 3000], 30, 8), Err(Error::DataTooLong { .. })));
}

#[test]
fn test_geometry() {
    let options = Options::default().with_columns(4).with_security_level(3);
    let symbol = options.encode(b"PDF417").unwrap();

    let words: Vec<u16> = symbol.codewords().iter().flat_map(|r| r[1..5].to_vec()).collect();
    let length = words[0] as usize;
    assert_eq!(words.len() - length, 16);
    assert_eq!(length % 4, 0);
    assert_eq!(symbol.rows() * 4, words.len());

    for level in 0..=8 {
        for columns in [1, 2, 5, 13, 30] {
            let options = Options::default().with_columns(columns).with_security_level(level);
            let Ok(symbol) = options.encode(b"Lorem ipsum dolor sit amet, 0123456789012345.") else {
                continue;
            };

            let words: Vec<u16> = symbol
                .codewords()
                .iter()
                .flat_map(|r| r[1..=columns].to_vec())
                .collect();
            assert_eq!(words.len() - words[0] as usize, 2 << level);
            assert!((3..=90).contains(&symbol.rows()));
            assert!(symbol.codewords().iter().flatten().all(|w| *w < 929));
        }
    }
}

#[test]
fn test_row_clusters() {
    let symbol = encode(b"Row clusters cycle every three rows.", 2, 4).unwrap();

    for (r, row) in symbol.patterns().iter().enumerate() {
        assert_eq!(row[0], tables::START);
        assert_eq!(row[row.len() - 1], tables::STOP);
        for (p, w) in row[1..row.len() - 1].iter().zip(&symbol.codewords()[r]) {
            assert_eq!(*p, tables::cluster(r % 3)[*w as usize]);
            assert!(p >> 16 == 1 && p & 1 == 0);
        }
    }
}

#[test]
fn test_options() {
    assert_eq!(
        Options::default().with_columns(0).encode(b"x"),
        Err(Error::InvalidColumns { columns: 0 }),
    );
    assert_eq!(
        Options::default().with_security_level(9).encode(b"x"),
        Err(Error::InvalidSecurityLevel { level: 9 }),
    );

    let forced = Options::default().with_force_rows(Some(20)).encode(b"HELLO").unwrap();
    assert_eq!(forced.rows(), 20);

    let binary = Options::default().with_force_binary(true).encode(b"HELLO WORLD").unwrap();
    assert_eq!(binary.codewords()[0][2], compact::BYTE_LATCH);

    let tuned = Options::default().with_thresholds(3, 5).encode(b"ABC 123").unwrap();
    assert!(tuned.codewords().iter().flatten().any(|w| *w == compact::NUMERIC_LATCH));
}

#[test]
fn test_encodings() {
    assert_eq!("UTF-8".parse::<Encoding>(), Ok(Encoding::Utf8));
    assert_eq!("latin1".parse::<Encoding>(), Ok(Encoding::Latin1));
    assert_eq!("ebcdic".parse::<Encoding>(), Err(Error::UnknownEncoding("ebcdic".into())));

    assert_eq!(Encoding::Utf8.encode("é").unwrap(), [0xc3, 0xa9]);
    assert_eq!(Encoding::Latin1.encode("é").unwrap(), [0xe9]);
    assert_eq!(
        Encoding::Latin1.encode("€"),
        Err(Error::UnencodableCharacter { ch: '€', encoding: Encoding::Latin1 }),
    );

    let options = Options::default().with_encoding(Encoding::Latin1);
    assert_eq!(options.encode_str("café").unwrap(), options.encode(b"caf\xe9").unwrap());
}

#[test]
fn test_error_messages() {
    assert_eq!(
        Error::InvalidColumns { columns: 31 }.to_string(),
        "invalid column count 31, must be within 1..=30",
    );
    assert_eq!(
        Error::DataTooLong { length: 1001 }.to_string(),
        "data too long: length descriptor is 1001, the limit is 928",
    );
    assert_eq!(Error::TooManyRows { rows: 91 }.to_string(), "too many rows: 91, the maximum is 90");
}

#[test]
fn test_deterministic() {
    let data = b"Deterministic output across threads: 31415926535897932384626";
    let expected = encode(data, 5, 3).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| encode(data, 5, 3))).collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Ok(expected.clone()));
        }
    });
}
