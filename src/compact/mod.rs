//! High-level encoding: text, byte and numeric compaction.

mod text;

pub use text::Submode;

use crate::tables::is_text;

pub const TEXT_LATCH: u16 = 900;
pub const BYTE_LATCH: u16 = 901;
pub const NUMERIC_LATCH: u16 = 902;
pub const BYTE_SHIFT: u16 = 913;
pub const BYTE_LATCH_6: u16 = 924;

/// Padding codeword, the same value as [`TEXT_LATCH`].
pub const PADDING: u16 = 900;

/// Most digits compacted into one base 900 number.
pub const NUMERIC_CHUNK: usize = 44;

/// Thresholds steering the choice of compaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compaction {
    /// Shortest digit run worth a numeric latch.
    pub numeric_threshold: usize,
    /// Shortest text run worth leaving byte compaction for.
    pub text_threshold: usize,
    /// Compact everything as bytes.
    pub force_binary: bool,
}

impl Default for Compaction {
    fn default() -> Self {
        Self { numeric_threshold: 13, text_threshold: 5, force_binary: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Mode {
    Text, Bytes, Numeric
}

/// A run of input compacted in a single mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub mode: Mode,
    pub data: &'a [u8],
}

impl Compaction {
    /// Splits `data` into mode runs.
    pub fn chunks<'a>(&self, data: &'a [u8]) -> Vec<Chunk<'a>> {
        let mut chunks = Vec::new();
        if data.is_empty() {
            return chunks;
        }
        if self.force_binary {
            chunks.push(Chunk { mode: Mode::Bytes, data });
            return chunks;
        }

        let mut rest_start = 0;
        for (start, end) in runs(data, 0, data.len(), |b| b.is_ascii_digit()) {
            if end - start >= self.numeric_threshold.max(1) {
                self.split_text(data, rest_start, start, &mut chunks);
                chunks.push(Chunk { mode: Mode::Numeric, data: &data[start..end] });
                rest_start = end;
            }
        }
        self.split_text(data, rest_start, data.len(), &mut chunks);

        chunks
    }

    fn split_text<'a>(&self, data: &'a [u8], from: usize, to: usize, chunks: &mut Vec<Chunk<'a>>) {
        if from == to {
            return;
        }

        let text_runs = runs(data, from, to, is_text);
        let whole = text_runs.len() == 1 && text_runs[0] == (from, to);

        let mut bytes_start = from;
        for (start, end) in text_runs {
            if whole || end - start >= self.text_threshold {
                if bytes_start < start {
                    chunks.push(Chunk { mode: Mode::Bytes, data: &data[bytes_start..start] });
                }
                chunks.push(Chunk { mode: Mode::Text, data: &data[start..end] });
                bytes_start = end;
            }
        }
        if bytes_start < to {
            chunks.push(Chunk { mode: Mode::Bytes, data: &data[bytes_start..to] });
        }
    }
}

/// Maximal runs of bytes matching `pred` within `data[from..to]`.
fn runs(data: &[u8], from: usize, to: usize, pred: impl Fn(u8) -> bool) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for i in from..to {
        match (pred(data[i]), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, to));
    }

    runs
}

/// Compacts `data` with the default thresholds.
pub fn compact(data: &[u8]) -> Vec<u16> {
    compact_with(data, &Compaction::default())
}

/// Compacts `data` into high-level codewords, without length descriptor, padding or
/// error correction.
pub fn compact_with(data: &[u8], options: &Compaction) -> Vec<u16> {
    let chunks = options.chunks(data);

    let mut out = Vec::with_capacity(data.len());
    let mut mode = Mode::Text;
    let mut submode = Submode::Alpha;

    for (i, chunk) in chunks.iter().enumerate() {
        match chunk.mode {
            Mode::Text => {
                if mode != Mode::Text {
                    out.push(TEXT_LATCH);
                    mode = Mode::Text;
                    submode = Submode::Alpha;
                }

                let before_shift = chunks
                    .get(i + 1)
                    .is_some_and(|next| next.mode == Mode::Bytes && next.data.len() == 1);
                text::encode_text(chunk.data, &mut submode, before_shift, &mut out);
            }
            Mode::Bytes if mode == Mode::Text && chunk.data.len() == 1 => {
                out.push(BYTE_SHIFT);
                out.push(chunk.data[0] as u16);
            }
            Mode::Bytes => {
                mode = Mode::Bytes;
                encode_bytes(chunk.data, &mut out);
            }
            Mode::Numeric => {
                mode = Mode::Numeric;
                encode_numeric(chunk.data, &mut out);
            }
        }
    }

    out
}

/// Byte compaction: a latch, five codewords per six bytes, then one codeword per
/// remaining byte.
pub fn encode_bytes(data: &[u8], out: &mut Vec<u16>) {
    out.push(if data.len() % 6 == 0 { BYTE_LATCH_6 } else { BYTE_LATCH });

    let mut iter = data.chunks_exact(6);
    for group in &mut iter {
        let mut n = group.iter().fold(0_u64, |n, b| n << 8 | *b as u64);

        let mut words = [0_u16; 5];
        for w in words.iter_mut().rev() {
            *w = (n % 900) as u16;
            n /= 900;
        }
        out.extend_from_slice(&words);
    }

    out.extend(iter.remainder().iter().map(|b| *b as u16));
}

#[test]
fn test_bytes() {
    let mut out = Vec::new();
    encode_bytes(&[0, 1, 2, 3, 4, 5], &mut out);
    assert_eq!(out, [924, 0, 5, 844, 88, 165]);

    let mut out = Vec::new();
    encode_bytes(b"alcool", &mut out);
    assert_eq!(out, [924, 163, 238, 432, 766, 244]);

    let mut out = Vec::new();
    encode_bytes(b"alcoolique", &mut out);
    assert_eq!(out, [901, 163, 238, 432, 766, 244, 105, 113, 117, 101]);
}

/// Divides the decimal number `digits` (most significant first) by `divisor`,
/// returning the quotient without leading zeros and the remainder.
fn long_div(digits: &[u8], divisor: u32) -> (Vec<u8>, u32) {
    let mut quotient = Vec::with_capacity(digits.len());
    let mut rem = 0;

    for d in digits.iter() {
        let cur = rem * 10 + *d as u32;
        let q = (cur / divisor) as u8;
        if q != 0 || !quotient.is_empty() {
            quotient.push(q);
        }
        rem = cur % divisor;
    }

    (quotient, rem)
}

#[test]
fn test_long_div() {
    assert_eq!(long_div(&[1, 8, 0, 1], 900), (vec![2], 1));
    assert_eq!(long_div(&[8, 9, 9], 900), (vec![], 899));
    assert_eq!(long_div(&[1, 0, 0, 0, 0, 0, 0], 900), (vec![1, 1, 1, 1], 100));
}

/// Numeric compaction: a latch, then each group of up to 44 digits, prefixed with a
/// `1`, written in base 900.
pub fn encode_numeric(digits: &[u8], out: &mut Vec<u16>) {
    out.push(NUMERIC_LATCH);

    for group in digits.chunks(NUMERIC_CHUNK) {
        let mut n = Vec::with_capacity(group.len() + 1);
        n.push(1);
        n.extend(group.iter().map(|d| d - b'0'));

        let mut words = Vec::with_capacity(group.len() / 3 + 1);
        while !n.is_empty() {
            let (q, r) = long_div(&n, 900);
            words.push(r as u16);
            n = q;
        }

        out.extend(words.iter().rev());
    }
}

#[test]
fn test_numeric() {
    let mut out = Vec::new();
    encode_numeric(b"000213298174000", &mut out);
    assert_eq!(out, [902, 1, 624, 434, 632, 282, 200]);

    let mut out = Vec::new();
    encode_numeric(b"123456789012345", &mut out);
    assert_eq!(out, [902, 1, 812, 292, 890, 124, 745]);

    // 45 digits split into 44 + 1
    let mut out = Vec::new();
    encode_numeric(&[b'9'; 45], &mut out);
    assert_eq!(out.len(), 1 + 15 + 1);
    assert_eq!(out[16], 19);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ALPHA, LOWER, MIXED, PUNCT};

    fn mul_add(digits: &mut Vec<u8>, mul: u32, add: u32) {
        let mut carry = add;
        for d in digits.iter_mut() {
            let v = *d as u32 * mul + carry;
            *d = (v % 10) as u8;
            carry = v / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }

    /// Inverse of [`compact`], enough to read back everything it produces.
    fn decompact(words: &[u16]) -> Vec<u8> {
        let alphabets = [ALPHA, LOWER, MIXED, PUNCT];

        let mut out = Vec::new();
        let mut submode = Submode::Alpha;
        let mut shift = None;
        let mut i = 0;

        while i < words.len() {
            let segment_end = |from: usize| {
                words[from..].iter().position(|w| *w >= 900).map_or(words.len(), |p| from + p)
            };

            match words[i] {
                TEXT_LATCH => {
                    submode = Submode::Alpha;
                    shift = None;
                    i += 1;
                }
                BYTE_SHIFT => {
                    out.push(words[i + 1] as u8);
                    i += 2;
                }
                latch @ (BYTE_LATCH | BYTE_LATCH_6) => {
                    let end = segment_end(i + 1);
                    let segment = &words[i + 1..end];
                    let groups = match latch {
                        BYTE_LATCH_6 => segment.len() / 5,
                        _ => segment.len().saturating_sub(1) / 5,
                    };

                    for g in segment[..groups * 5].chunks(5) {
                        let n = g.iter().fold(0_u64, |n, w| n * 900 + *w as u64);
                        out.extend_from_slice(&n.to_be_bytes()[2..]);
                    }
                    out.extend(segment[groups * 5..].iter().map(|w| *w as u8));
                    i = end;
                }
                NUMERIC_LATCH => {
                    let end = segment_end(i + 1);
                    for g in words[i + 1..end].chunks(15) {
                        let mut digits = vec![0];
                        for w in g {
                            mul_add(&mut digits, 900, *w as u32);
                        }
                        digits.pop();
                        out.extend(digits.iter().rev().map(|d| d + b'0'));
                    }
                    i = end;
                }
                w => {
                    for v in [w / 30, w % 30] {
                        let active = shift.take().unwrap_or(submode);
                        match (active, v) {
                            (Submode::Alpha, 27) | (Submode::Mixed, 27) => submode = Submode::Lower,
                            (Submode::Alpha, 28) | (Submode::Lower, 28) => submode = Submode::Mixed,
                            (Submode::Mixed, 28) | (Submode::Punct, 29) => submode = Submode::Alpha,
                            (Submode::Mixed, 25) => submode = Submode::Punct,
                            (Submode::Lower, 27) => shift = Some(Submode::Alpha),
                            (_, 29) => shift = Some(Submode::Punct),
                            (s, v) => out.push(alphabets[s as usize][v as usize]),
                        }
                    }
                    i += 1;
                }
            }
        }

        out
    }

    fn modes<'a>(data: &'a [u8], options: &Compaction) -> Vec<(Mode, &'a [u8])> {
        options.chunks(data).into_iter().map(|c| (c.mode, c.data)).collect()
    }

    #[test]
    fn test_chunks() {
        let o = Compaction::default();

        assert!(modes(b"", &o).is_empty());
        assert_eq!(modes(b"HELLO WORLD", &o), [(Mode::Text, &b"HELLO WORLD"[..])]);
        assert_eq!(modes(b"AB", &o), [(Mode::Text, &b"AB"[..])]);
        assert_eq!(modes(b"1234567890123", &o), [(Mode::Numeric, &b"1234567890123"[..])]);
        assert_eq!(modes(b"123456789012", &o), [(Mode::Text, &b"123456789012"[..])]);
        assert_eq!(modes(&[0, 1, 2, 3, 4, 5], &o), [(Mode::Bytes, &[0, 1, 2, 3, 4, 5][..])]);
        assert_eq!(modes(b"ab\x01\x02cd", &o), [(Mode::Bytes, &b"ab\x01\x02cd"[..])]);
        assert_eq!(modes(b"Hello\0World", &o), [
            (Mode::Text, &b"Hello"[..]),
            (Mode::Bytes, &b"\0"[..]),
            (Mode::Text, &b"World"[..]),
        ]);
        assert_eq!(modes(b"ID 12345678901234 OK", &o), [
            (Mode::Text, &b"ID "[..]),
            (Mode::Numeric, &b"12345678901234"[..]),
            (Mode::Text, &b" OK"[..]),
        ]);

        let tuned = Compaction { numeric_threshold: 4, text_threshold: 2, ..o };
        assert_eq!(modes(b"ab\x01\x021234", &tuned), [
            (Mode::Text, &b"ab"[..]),
            (Mode::Bytes, &b"\x01\x02"[..]),
            (Mode::Numeric, &b"1234"[..]),
        ]);

        let binary = Compaction { force_binary: true, ..o };
        assert_eq!(modes(b"HELLO", &binary), [(Mode::Bytes, &b"HELLO"[..])]);
    }

    #[test]
    fn test_compact_modes() {
        let digits = compact(b"123456789012345");
        assert_eq!(digits[0], NUMERIC_LATCH);
        assert!(!digits.contains(&BYTE_LATCH) && !digits.contains(&BYTE_LATCH_6));

        let upper = compact(b"THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG");
        assert!(upper.iter().all(|w| *w < 900));

        let binary: Vec<u8> = (0..=255).rev().collect();
        let words = compact(&binary);
        assert!(words.contains(&BYTE_LATCH) || words.contains(&BYTE_LATCH_6));

        assert_eq!(compact(&[0, 1, 2, 3, 4, 5]), [924, 0, 5, 844, 88, 165]);
        assert!(compact(b"").is_empty());
    }

    #[test]
    fn test_byte_shift() {
        let words = compact(b"ABCDEF\x80GHIJK");
        assert_eq!(words, [
            1, 2 * 30 + 3, 4 * 30 + 5, BYTE_SHIFT, 0x80, 6 * 30 + 7, 8 * 30 + 9, 10 * 30 + 29,
        ]);

        // the odd pair before the shift latches to lower, which the following text keeps
        let words = compact(b"ABCDE\x80fghij");
        assert_eq!(words, [
            1, 2 * 30 + 3, 4 * 30 + 27, BYTE_SHIFT, 0x80, 5 * 30 + 6, 7 * 30 + 8, 9 * 30 + 29,
        ]);
    }

    #[test]
    fn test_latches() {
        let words = compact(b"\x01\x02\x03ABCDEF");
        assert_eq!(words, [BYTE_LATCH, 1, 2, 3, TEXT_LATCH, 1, 2 * 30 + 3, 4 * 30 + 5]);

        let words = compact(b"ABCDE12345678901234");
        assert_eq!(&words[..4], [1, 2 * 30 + 3, 4 * 30 + 29, NUMERIC_LATCH]);
    }

    #[test]
    fn test_round_trip() {
        let samples: [&[u8]; 12] = [
            b"",
            b"A",
            b"HELLO WORLD",
            b"Hello, World!",
            b"The quick brown fox jumps over the lazy dog. 0123456789",
            b"mixed;Punctuation<>[]{}~ and CR\r\nLF",
            b"0000000000000000000000000000000000000000000000000001",
            b"Invoice 2024-0001: 12345678901234567890 EUR",
            b"caf\xc3\xa9 na\xc3\xafve r\xc3\xa9sum\xc3\xa9",
            b"\x00\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b",
            b"aB;cD\x7fzZ\x7f\x7f\x7f|9",
            &[0xff; 37],
        ];

        for data in samples {
            for options in [
                Compaction::default(),
                Compaction { force_binary: true, ..Compaction::default() },
                Compaction { numeric_threshold: 2, text_threshold: 1, force_binary: false },
            ] {
                let words = compact_with(data, &options);
                assert!(words.iter().all(|w| *w < 929));
                let shown = String::from_utf8_lossy(data);
                assert_eq!(decompact(&words), data, "{shown:?} with {options:?}");
            }
        }
    }

    #[test]
    fn test_round_trip_mixed() {
        // xorshift, so every run sees the same inputs
        let mut state = 0x9e37_79b9_7f4a_7c15_u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };

        for _ in 0..2000 {
            let len = (next() % 120) as usize;
            let data: Vec<u8> = (0..len)
                .map(|_| match next() % 4 {
                    0 => b'0' + (next() % 10) as u8,
                    1 => b"aZ ;,.\r\n\t~Q"[(next() % 11) as usize],
                    2 => 0x20 + (next() % 95) as u8,
                    _ => next() as u8,
                })
                .collect();
            let options = match next() % 3 {
                0 => Compaction::default(),
                1 => Compaction {
                    numeric_threshold: (next() % 20) as usize,
                    text_threshold: (next() % 10) as usize,
                    force_binary: false,
                },
                _ => Compaction { force_binary: true, ..Compaction::default() },
            };

            let words = compact_with(&data, &options);
            assert!(words.iter().all(|w| *w < 929));
            assert_eq!(decompact(&words), data, "{data:?} with {options:?}");
        }
    }
}
