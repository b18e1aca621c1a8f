use crate::{compact::PADDING, err_corr::{ec_count, generate_ec, MAX_LEVEL}, Error};

pub const MIN_COLUMNS: usize = 1;
pub const MAX_COLUMNS: usize = 30;
pub const MIN_ROWS: usize = 3;
pub const MAX_ROWS: usize = 90;

/// Largest value of the length descriptor.
pub const MAX_LENGTH: usize = 928;

/// The complete codeword stream of a symbol: length descriptor, data, padding and
/// error correction, laid out `columns` codewords per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    codewords: Vec<u16>,
    columns: usize,
    level: u8,
    padding: usize,
}

/// A row of the frame with its indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    pub left: u16,
    pub data: &'a [u16],
    pub right: u16,
}

impl Frame {
    pub fn rows(&self) -> usize { self.codewords.len() / self.columns }

    pub fn columns(&self) -> usize { self.columns }

    pub fn level(&self) -> u8 { self.level }

    /// Value of the length descriptor.
    pub fn length(&self) -> usize { self.codewords[0] as usize }

    pub fn padding(&self) -> usize { self.padding }

    pub fn codewords(&self) -> &[u16] { &self.codewords }

    pub fn ec_codewords(&self) -> &[u16] { &self.codewords[self.length()..] }

    pub fn row(&self, r: usize) -> Row<'_> {
        let (left, right) = row_indicators(r, self.rows(), self.columns, self.level);

        Row {
            left,
            data: &self.codewords[r * self.columns..(r + 1) * self.columns],
            right,
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows()).map(|r| self.row(r))
    }
}

pub fn validate(columns: usize, level: u8) -> Result<(), Error> {
    if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&columns) {
        return Err(Error::InvalidColumns { columns });
    }
    if level > MAX_LEVEL {
        return Err(Error::InvalidSecurityLevel { level });
    }

    Ok(())
}

fn check_rows(rows: usize) -> Result<(), Error> {
    if rows < MIN_ROWS {
        Err(Error::TooFewRows { rows })
    } else if rows > MAX_ROWS {
        Err(Error::TooManyRows { rows })
    } else {
        Ok(())
    }
}

/// Frames `data` (compacted codewords) into `columns` codewords per row, padding to
/// `force_rows` rows when given.
pub fn structure(
    data: &[u16],
    columns: usize,
    level: u8,
    force_rows: Option<usize>,
) -> Result<Frame, Error> {
    validate(columns, level)?;

    let ec = ec_count(level);
    let needed = data.len() + ec + 1;

    let padding = match force_rows {
        Some(rows) => {
            check_rows(rows)?;
            let capacity = rows * columns;
            if needed > capacity {
                return Err(Error::RowsTooSmall { rows, needed: needed.div_ceil(columns) });
            }
            capacity - needed
        }
        None => (columns - needed % columns) % columns,
    };

    let length = data.len() + padding + 1;
    if length > MAX_LENGTH {
        return Err(Error::DataTooLong { length });
    }
    check_rows((length + ec) / columns)?;

    let mut codewords = Vec::with_capacity(length + ec);
    codewords.push(length as u16);
    codewords.extend_from_slice(data);
    codewords.resize(length, PADDING);

    let ec_words = generate_ec(&codewords, level)?;
    codewords.extend(ec_words);

    Ok(Frame { codewords, columns, level, padding })
}

/// Left and right indicator codewords of row `r`.
pub fn row_indicators(r: usize, rows: usize, columns: usize, level: u8) -> (u16, u16) {
    let base = 30 * (r / 3);
    let row_info = (rows - 1) / 3;
    let level_info = 3 * level as usize + (rows - 1) % 3;
    let column_info = columns - 1;

    let (left, right) = match r % 3 {
        0 => (row_info, column_info),
        1 => (level_info, row_info),
        _ => (column_info, level_info),
    };

    ((base + left) as u16, (base + right) as u16)
}

#[test]
fn test_row_indicators() {
    // 10 rows, 4 columns, level 3
    assert_eq!(row_indicators(0, 10, 4, 3), (3, 3));
    assert_eq!(row_indicators(1, 10, 4, 3), (9, 3));
    assert_eq!(row_indicators(2, 10, 4, 3), (3, 9));
    assert_eq!(row_indicators(3, 10, 4, 3), (33, 33));
    assert_eq!(row_indicators(9, 10, 4, 3), (93, 93));

    // largest symbol stays within the codeword range
    assert_eq!(row_indicators(89, 90, 30, 8), (29 * 30 + 29, 29 * 30 + 26));
}

#[test]
fn test_structure() {
    let data = [1, 2, 3, 4];
    let frame = structure(&data, 3, 2, None).unwrap();

    assert_eq!(frame.padding(), 2);
    assert_eq!(frame.length(), 7);
    assert_eq!(frame.rows(), 5);
    assert_eq!(frame.codewords().len(), 7 + 8);
    assert_eq!(&frame.codewords()[..7], [7, 1, 2, 3, 4, 900, 900]);
    assert_eq!(frame.ec_codewords(), generate_ec(&frame.codewords()[..7], 2).unwrap());

    let rows = frame.iter_rows().collect::<Vec<_>>();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r.data.len() == 3));
    assert_eq!(rows[4].data, &frame.codewords()[12..]);
    assert_eq!((rows[4].left, rows[4].right), row_indicators(4, 5, 3, 2));
}

#[test]
fn test_forced_rows() {
    let frame = structure(&[1, 2, 3], 2, 0, Some(10)).unwrap();
    assert_eq!(frame.rows(), 10);
    assert_eq!(frame.length(), 18);
    assert_eq!(frame.padding(), 14);

    assert_eq!(
        structure(&[1; 20], 2, 0, Some(10)),
        Err(Error::RowsTooSmall { rows: 10, needed: 12 }),
    );
    assert_eq!(structure(&[1], 2, 0, Some(2)), Err(Error::TooFewRows { rows: 2 }));
    assert_eq!(structure(&[1], 2, 0, Some(91)), Err(Error::TooManyRows { rows: 91 }));
}

#[test]
fn test_limits() {
    assert_eq!(structure(&[], 0, 0, None), Err(Error::InvalidColumns { columns: 0 }));
    assert_eq!(structure(&[], 31, 0, None), Err(Error::InvalidColumns { columns: 31 }));
    assert_eq!(structure(&[], 2, 9, None), Err(Error::InvalidSecurityLevel { level: 9 }));

    assert_eq!(structure(&[], 1, 0, None).map(|f| f.rows()), Ok(3));
    assert_eq!(structure(&[], 2, 0, None), Err(Error::TooFewRows { rows: 2 }));
    assert_eq!(structure(&[0; 300], 1, 0, None), Err(Error::TooManyRows { rows: 303 }));
    assert_eq!(structure(&[0; 928], 30, 0, None), Err(Error::DataTooLong { length: 958 }));
    assert_eq!(structure(&[0; 927], 30, 0, None).map(|f| f.length()), Ok(928));
    assert_eq!(structure(&[0; 927], 30, 1, None), Err(Error::DataTooLong { length: 956 }));
    assert!(structure(&[0; 800], 30, 5, None).is_ok());
}
