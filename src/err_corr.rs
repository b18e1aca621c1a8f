use crate::Error;

include!(concat!(env!("OUT_DIR"), "/rs_tables.rs"));

const PRIME: u32 = 929;

/// Highest supported security level.
pub const MAX_LEVEL: u8 = 8;

/// Number of check codewords added at `level`.
pub const fn ec_count(level: u8) -> usize {
    2 << level as usize
}

/// Generator polynomial of `level`, constant term first.
pub fn generator(level: u8) -> Result<&'static [u16], Error> {
    GEN_COEFF
        .get(level as usize)
        .copied()
        .ok_or(Error::InvalidSecurityLevel { level })
}

/// Computes the Reed-Solomon check codewords of `words` over GF(929).
pub fn generate_ec(words: &[u16], level: u8) -> Result<Vec<u16>, Error> {
    let coeff = generator(level)?;
    let count = ec_count(level);
    let mut acc = vec![0_u32; count];

    for w in words.iter() {
        let t = (*w as u32 + acc[count - 1]) % PRIME;

        for j in (1..count).rev() {
            acc[j] = (acc[j - 1] + PRIME - t * coeff[j] as u32 % PRIME) % PRIME;
        }
        acc[0] = (PRIME - t * coeff[0] as u32 % PRIME) % PRIME;
    }

    Ok(acc.iter().rev().map(|a| ((PRIME - a) % PRIME) as u16).collect())
}

#[cfg(test)]
const SAMPLE: [u16; 16] = [
    16, 902, 1, 278, 827, 900, 295, 902, 2, 326, 823, 544, 900, 149, 900, 900,
];

#[test]
fn test_generators() {
    assert_eq!(GEN_COEFF.len(), 9);
    for (level, g) in GEN_COEFF.iter().enumerate() {
        assert_eq!(g.len(), ec_count(level as u8) + 1);
        assert_eq!(g.last(), Some(&1));
        assert!(g.iter().all(|c| (*c as u32) < PRIME));
    }

    assert_eq!(GEN_COEFF[0], &[27, 917, 1]);
    assert_eq!(GEN_COEFF[1], &[522, 568, 723, 809, 1]);
    assert_eq!(&GEN_COEFF[3][..4], &[274, 562, 232, 755]);
    assert_eq!(&GEN_COEFF[8][..4], &[352, 77, 373, 504]);

    let checksum = GEN_COEFF
        .iter()
        .flat_map(|g| g.iter())
        .fold(0_u64, |h, c| h.wrapping_mul(31).wrapping_add(*c as u64));
    assert_eq!(checksum, 0x77a9232b9e208877);
}

#[test]
fn test_generate_ec() {
    assert_eq!(generate_ec(&SAMPLE, 0).unwrap(), [156, 765]);
    assert_eq!(generate_ec(&SAMPLE, 1).unwrap(), [168, 875, 63, 355]);
    assert_eq!(generate_ec(&SAMPLE, 2).unwrap(), [628, 715, 393, 299, 863, 601, 169, 708]);
    assert_eq!(generate_ec(&SAMPLE, 3).unwrap(), [
        232, 176, 793, 616, 476, 406, 855, 445, 84, 518, 522, 721, 607, 2, 42, 578,
    ]);
    assert_eq!(generate_ec(&SAMPLE, 4).unwrap(), [
        281, 156, 276, 668, 44, 252, 877, 30, 549, 856, 773, 639, 420, 330, 693, 329,
        283, 723, 480, 482, 102, 925, 535, 892, 374, 472, 837, 331, 343, 608, 390, 364,
    ]);
}

#[test]
fn test_syndromes() {
    for level in 0..=MAX_LEVEL {
        let mut full = SAMPLE.to_vec();
        full.extend(generate_ec(&SAMPLE, level).unwrap());
        assert_eq!(full.len(), SAMPLE.len() + ec_count(level));

        // every power of 3 up to the code's degree is a root
        for j in 1..=ec_count(level) as u32 {
            let mut root = 1;
            for _ in 0..j {
                root = root * 3 % PRIME;
            }
            let value = full.iter().fold(0, |v, c| (v * root + *c as u32) % PRIME);
            assert_eq!(value, 0, "level {level}, root 3^{j}");
        }
    }
}

#[test]
fn test_invalid_level() {
    assert_eq!(generate_ec(&SAMPLE, 9), Err(Error::InvalidSecurityLevel { level: 9 }));
}
