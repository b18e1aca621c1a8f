use crate::tables::{is_text, ABSENT, TEXT_CLASSES};

/// Text compaction sub-alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Submode {
    Alpha, Lower, Mixed, Punct
}

const LL: u8 = 27;
const AS: u8 = 27;
const ML: u8 = 28;
const AL: u8 = 28;
const PL: u8 = 25;
const PS: u8 = 29;
const PUNCT_AL: u8 = 29;

/// Text value used to complete an odd pair.
pub const PAD: u8 = PS;

impl Submode {
    const ALL: [Submode; 4] = [Submode::Alpha, Submode::Lower, Submode::Mixed, Submode::Punct];

    /// Value of `b` in this sub-alphabet.
    pub fn value(self, b: u8) -> Option<u8> {
        let v = TEXT_CLASSES[b as usize][self as usize];
        (v != ABSENT).then_some(v)
    }

    /// First sub-alphabet holding the text byte `b`.
    fn first_containing(b: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.value(b).is_some())
            .unwrap_or(Submode::Punct)
    }

    fn latch(self, to: Self) -> &'static [u8] {
        use Submode::*;

        match (self, to) {
            (Alpha, Lower) => &[LL],
            (Alpha, Mixed) => &[ML],
            (Alpha, Punct) => &[ML, PL],
            (Lower, Alpha) => &[ML, AL],
            (Lower, Mixed) => &[ML],
            (Lower, Punct) => &[ML, PL],
            (Mixed, Alpha) => &[AL],
            (Mixed, Lower) => &[LL],
            (Mixed, Punct) => &[PL],
            (Punct, Alpha) => &[PUNCT_AL],
            (Punct, Lower) => &[PUNCT_AL, LL],
            (Punct, Mixed) => &[PUNCT_AL, ML],
            _ => &[],
        }
    }

    /// One-character shift into `to`, if the symbology has one.
    fn shift(self, to: Self) -> Option<u8> {
        match (self, to) {
            (Submode::Lower, Submode::Alpha) => Some(AS),
            (Submode::Punct, Submode::Punct) => None,
            (_, Submode::Punct) => Some(PS),
            _ => None,
        }
    }

    /// Single-value latch completing an odd pair, and the sub-alphabet it leaves active.
    fn pad_latch(self) -> (u8, Self) {
        match self {
            Submode::Alpha => (LL, Submode::Lower),
            Submode::Lower => (ML, Submode::Mixed),
            Submode::Mixed => (AL, Submode::Alpha),
            Submode::Punct => (PUNCT_AL, Submode::Alpha),
        }
    }
}

/// Text values of `data`, starting in (and updating) `submode`.
///
/// Every byte of `data` must be text, see [`is_text`].
pub fn text_values(data: &[u8], submode: &mut Submode) -> Vec<u8> {
    let mut values = Vec::with_capacity(data.len() + data.len() / 4);

    for (i, b) in data.iter().copied().enumerate() {
        if let Some(v) = submode.value(b) {
            values.push(v);
            continue;
        }

        debug_assert!(is_text(b), "{b:#04x} is not a text byte");
        let target = Submode::first_containing(b);
        let v = TEXT_CLASSES[b as usize][target as usize];
        let next_stays = data.get(i + 1).is_none_or(|n| submode.value(*n).is_some());

        match submode.shift(target) {
            Some(shift) if next_stays => values.push(shift),
            _ => {
                values.extend_from_slice(submode.latch(target));
                *submode = target;
            }
        }
        values.push(v);
    }

    values
}

/// Appends the text compaction of `data` to `out`.
///
/// An odd value count is completed with [`PAD`], unless `before_shift` is set: the
/// run is then followed by a byte shift and the sub-alphabet must stay well defined,
/// so a single-value latch completes the pair instead.
pub fn encode_text(data: &[u8], submode: &mut Submode, before_shift: bool, out: &mut Vec<u16>) {
    let mut values = text_values(data, submode);

    if values.len() % 2 == 1 {
        if before_shift {
            let (latch, next) = submode.pad_latch();
            values.push(latch);
            *submode = next;
        } else {
            values.push(PAD);
            if *submode == Submode::Punct {
                *submode = Submode::Alpha;
            }
        }
    }

    out.extend(values.chunks_exact(2).map(|p| p[0] as u16 * 30 + p[1] as u16));
}

#[test]
fn test_text_values() {
    let mut s = Submode::Alpha;
    assert_eq!(text_values(b"HELLO WORLD", &mut s), [7, 4, 11, 11, 14, 26, 22, 14, 17, 11, 3]);
    assert_eq!(s, Submode::Alpha);

    // latch to lower, then back through mixed
    let mut s = Submode::Alpha;
    assert_eq!(text_values(b"Abc DE", &mut s), [0, 27, 1, 2, 26, 28, 28, 3, 4]);
    assert_eq!(s, Submode::Alpha);

    // a lone capital inside lowercase text is shifted
    let mut s = Submode::Lower;
    assert_eq!(text_values(b"aBc", &mut s), [0, 27, 1, 2]);
    assert_eq!(s, Submode::Lower);

    // a lone punctuation mark is shifted, a run is latched
    let mut s = Submode::Alpha;
    assert_eq!(text_values(b"A;B", &mut s), [0, 29, 0, 1]);
    assert_eq!(s, Submode::Alpha);
    let mut s = Submode::Alpha;
    assert_eq!(text_values(b"A;<", &mut s), [0, 28, 25, 0, 1]);
    assert_eq!(s, Submode::Punct);

    let mut s = Submode::Alpha;
    assert_eq!(text_values(b"12.5", &mut s), [28, 1, 2, 17, 5]);
    assert_eq!(s, Submode::Mixed);

}

#[test]
fn test_encode_text() {
    let mut out = Vec::new();
    let mut s = Submode::Alpha;
    encode_text(b"HELLO WORLD", &mut s, false, &mut out);
    assert_eq!(out, [
        7 * 30 + 4, 11 * 30 + 11, 14 * 30 + 26, 22 * 30 + 14, 17 * 30 + 11, 3 * 30 + 29,
    ]);

    let mut out = Vec::new();
    let mut s = Submode::Alpha;
    encode_text(b"ABC", &mut s, true, &mut out);
    assert_eq!(out, [1, 2 * 30 + 27]);
    assert_eq!(s, Submode::Lower);

    let mut out = Vec::new();
    let mut s = Submode::Alpha;
    encode_text(b"ABCD", &mut s, true, &mut out);
    assert_eq!(out, [1, 2 * 30 + 3]);
    assert_eq!(s, Submode::Alpha);
}

#[test]
fn test_every_text_byte() {
    // each text byte alone and after every sub-alphabet gets a value in range
    for b in (0..=255).filter(|b| is_text(*b)) {
        for start in Submode::ALL {
            let mut s = start;
            let values = text_values(&[b, b], &mut s);
            assert!(values.iter().all(|v| *v < 30), "{b:#04x} from {start:?}");
            assert_eq!(s.value(b), Some(values[values.len() - 1]));

            let mut out = Vec::new();
            let mut s = start;
            encode_text(&[b], &mut s, false, &mut out);
            assert!(!out.is_empty() && out.iter().all(|w| *w < 900));
        }
    }
}
