use crate::{
    structure::{structure, Frame},
    tables::{cluster, PATTERN_LEN, START, STOP, STOP_LEN},
    Error, Options,
};

/// An encoded PDF417 symbol: per row, the start pattern, the left indicator, the data
/// codewords, the right indicator and the stop pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    patterns: Vec<Vec<u32>>,
    codewords: Vec<Vec<u16>>,
    columns: usize,
    level: u8,
}

impl Symbol {
    pub fn generate(data: &[u8], options: &Options) -> Result<Self, Error> {
        let words = crate::compact::compact_with(data, &options.compaction());
        let frame = structure(&words, options.columns, options.security_level, options.force_rows)?;

        Ok(Self::from_frame(&frame))
    }

    /// Maps every row of `frame` through the cluster table of that row.
    pub fn from_frame(frame: &Frame) -> Self {
        let mut patterns = Vec::with_capacity(frame.rows());
        let mut codewords = Vec::with_capacity(frame.rows());

        for (r, row) in frame.iter_rows().enumerate() {
            let mut words = Vec::with_capacity(frame.columns() + 2);
            words.push(row.left);
            words.extend_from_slice(row.data);
            words.push(row.right);

            let table = cluster(r);
            let mut line = Vec::with_capacity(frame.columns() + 4);
            line.push(START);
            line.extend(words.iter().map(|w| table[*w as usize]));
            line.push(STOP);

            patterns.push(line);
            codewords.push(words);
        }

        Self { patterns, codewords, columns: frame.columns(), level: frame.level() }
    }

    pub fn rows(&self) -> usize { self.patterns.len() }

    /// Data columns, without indicators.
    pub fn columns(&self) -> usize { self.columns }

    pub fn level(&self) -> u8 { self.level }

    /// Width of a row in modules.
    pub fn width(&self) -> usize { PATTERN_LEN * (self.columns + 3) + STOP_LEN }

    /// Patterns of each row: 17 bits each, the last one the 18 bit stop pattern.
    pub fn patterns(&self) -> &[Vec<u32>] { &self.patterns }

    /// High-level codewords of each row, indicators included.
    pub fn codewords(&self) -> &[Vec<u16>] { &self.codewords }

    /// Whether the module at column `x` of row `y` is a bar. Modules outside the
    /// symbol are spaces.
    pub fn get(&self, x: usize, y: usize) -> bool {
        let Some(row) = self.patterns.get(y) else { return false };
        if x >= self.width() {
            return false;
        }
        let stop_at = PATTERN_LEN * (self.columns + 3);

        if x < stop_at {
            row[x / PATTERN_LEN] >> (PATTERN_LEN - 1 - x % PATTERN_LEN) & 1 != 0
        } else {
            row[row.len() - 1] >> (STOP_LEN - 1 - (x - stop_at)) & 1 != 0
        }
    }

    /// All modules, one `Vec` per row.
    pub fn modules(&self) -> Vec<Vec<bool>> {
        (0..self.rows())
            .map(|y| (0..self.width()).map(|x| self.get(x, y)).collect())
            .collect()
    }
}

impl core::fmt::Display for Symbol {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "\x1b[38;5;255m")?;
        writeln!(f, "{:█<1$}", "", self.width() + 4)?;

        for y in 0..self.rows() {
            // two lines per row keep the bars taller than wide
            for _ in 0..2 {
                write!(f, "\x1b[38;5;255m██")?;
                for x in 0..self.width() {
                    write!(f, "\x1b[38;5;{}m█", if self.get(x, y) { "232" } else { "255" })?;
                }
                writeln!(f, "\x1b[38;5;255m██")?;
            }
        }

        writeln!(f, "{:█<1$}", "", self.width() + 4)?;
        write!(f, "\x1b[0m")
    }
}

#[test]
fn test_from_frame() {
    let frame = structure(&[1, 2, 3, 4], 3, 2, None).unwrap();
    let symbol = Symbol::from_frame(&frame);

    assert_eq!(symbol.rows(), 5);
    assert_eq!(symbol.width(), 17 * 7 + 1);

    for (r, (line, words)) in symbol.patterns().iter().zip(symbol.codewords()).enumerate() {
        let row = frame.row(r);
        assert_eq!(line.len(), 3 + 4);
        assert_eq!(words.len(), 3 + 2);
        assert_eq!(words[0], row.left);
        assert_eq!(&words[1..4], row.data);
        assert_eq!(words[4], row.right);

        assert_eq!(line[0], START);
        assert_eq!(line[6], STOP);
        for (p, w) in line[1..6].iter().zip(words) {
            assert_eq!(*p, cluster(r)[*w as usize]);
        }
    }
}

#[test]
fn test_modules() {
    let frame = structure(&[], 1, 0, None).unwrap();
    let symbol = Symbol::from_frame(&frame);
    let modules = symbol.modules();

    assert_eq!(modules.len(), 3);
    for (y, row) in modules.iter().enumerate() {
        assert_eq!(row.len(), 17 * 5 + 1);

        // start pattern 81111113
        assert!(row[..8].iter().all(|m| *m));
        assert_eq!(&row[8..17], [false, true, false, true, false, true, false, false, false]);

        // every codeword begins with a bar and ends with a space
        for c in 1..4 {
            assert!(row[c * 17]);
            assert!(!row[c * 17 + 16], "row {y}, codeword {c}");
        }

        // stop pattern 711311121
        assert!(row[68..75].iter().all(|m| *m));
        assert!(row[85]);
        assert!(!row[84]);
    }
}

#[test]
fn test_get_outside() {
    let symbol = Symbol::from_frame(&structure(&[], 1, 0, None).unwrap());

    assert!(symbol.get(symbol.width() - 1, 2));
    assert!(!symbol.get(symbol.width(), 0));
    assert!(!symbol.get(usize::MAX, 0));
    assert!(!symbol.get(0, symbol.rows()));
    assert!(!symbol.get(0, usize::MAX));
}

#[test]
fn test_display() {
    let symbol = Symbol::from_frame(&structure(&[], 1, 0, None).unwrap());
    let text = symbol.to_string();

    assert_eq!(text.lines().filter(|l| l.contains('█')).count(), 3 * 2 + 2);
    assert!(text.ends_with("\x1b[0m"));
}
