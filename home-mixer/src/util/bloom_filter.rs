//! A read-only bloom filter over previously-seen post ids, carried to us
//! pre-built inside a [`candidate_pipeline::types::BloomFilterEntry`].
//!
//! Membership uses double hashing, `h_i = (h1 + i*h2) mod num_bits` for `i`
//! in `0..num_hashes`, where `h1` and `h2` are independent FNV-1a-64 hashes
//! of the post id's bytes: `h1` over the little-endian encoding, `h2` over
//! the big-endian encoding with an extra 4-byte salt mixed in afterwards.
//! This exact scheme (not just "two independent hashes") matters because
//! filter entries are built by an external ranking collaborator and must
//! decode the way that producer encoded them.

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;
const HASH_TWO_SALT: [u8; 4] = [0x42, 0x5A, 0x7E, 0x1C];

pub const DEFAULT_NUM_HASHES: u32 = 7;

#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u8>,
    num_bits: usize,
    num_hashes: u32,
}

impl BloomFilter {
    /// Builds a filter view over a serialized bit array. Returns `None` for
    /// empty data, which carries no membership information.
    pub fn from_entry(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        Some(Self {
            bits: data.to_vec(),
            num_bits: data.len() * 8,
            num_hashes: DEFAULT_NUM_HASHES,
        })
    }

    /// An all-zero filter of the given bit length, for tests.
    pub fn empty(num_bits: usize, num_hashes: u32) -> Self {
        Self {
            bits: vec![0u8; num_bits.div_ceil(8)],
            num_bits,
            num_hashes,
        }
    }

    pub fn insert(&mut self, post_id: i64) {
        for idx in self.bit_indices(post_id) {
            self.bits[idx / 8] |= 1 << (idx % 8);
        }
    }

    /// The serialized bit array, suitable for round-tripping through a
    /// [`candidate_pipeline::types::BloomFilterEntry`].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.clone()
    }

    pub fn may_contain(&self, post_id: i64) -> bool {
        self.bit_indices(post_id)
            .all(|idx| self.bits[idx / 8] & (1 << (idx % 8)) != 0)
    }

    fn bit_indices(&self, post_id: i64) -> impl Iterator<Item = usize> + '_ {
        let (h1, h2) = Self::hash(post_id, self.num_bits as u64);
        let num_bits = self.num_bits as u64;
        (0..self.num_hashes).map(move |i| (h1.wrapping_add(i as u64 * h2) % num_bits) as usize)
    }

    fn hash(post_id: i64, num_bits: u64) -> (u64, u64) {
        let le = post_id.to_le_bytes();
        let be = post_id.to_be_bytes();

        let h1 = fnv1a_64(&le);
        let h2 = fnv1a_64_extend(&be, &HASH_TWO_SALT);

        (h1 % num_bits, h2 % num_bits)
    }
}

fn fnv1a_64(data: &[u8]) -> u64 {
    fnv1a_64_extend(data, &[])
}

fn fnv1a_64_extend(data: &[u8], extra: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data.iter().chain(extra) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Optimal bit-array size and hash count for `n` inserted items at a target
/// false-positive rate `p`. Not required by any stage, but a natural
/// companion to `from_entry` for callers building filters upstream.
pub fn calculate_optimal_parameters(n: usize, p: f64) -> (usize, u32) {
    if n == 0 || !(0.0..1.0).contains(&p) {
        return (1024 * 8, 7);
    }
    let n = n as f64;
    let num_bits = (-(n * p.ln()) / (std::f64::consts::LN_2.powi(2))).ceil() as usize;
    let num_hashes = ((num_bits as f64 / n) * std::f64::consts::LN_2).ceil().max(1.0) as u32;
    (num_bits.max(64), num_hashes.min(32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_data_has_no_filter() {
        assert!(BloomFilter::from_entry(&[]).is_none());
    }

    #[test]
    fn inserted_ids_are_found() {
        let mut filter = BloomFilter::empty(1024, DEFAULT_NUM_HASHES);
        filter.insert(42);
        filter.insert(1337);
        assert!(filter.may_contain(42));
        assert!(filter.may_contain(1337));
    }

    #[test]
    fn absent_ids_are_usually_not_found() {
        let mut filter = BloomFilter::empty(4096, DEFAULT_NUM_HASHES);
        for id in 0..50 {
            filter.insert(id);
        }
        assert!(!filter.may_contain(999_999));
    }

    #[test]
    fn the_two_internal_hashes_are_independent() {
        // h1 (little-endian) and h2 (big-endian + salt) must differ for a
        // non-palindromic id, or double hashing degenerates to single hashing.
        let (h1, h2) = BloomFilter::hash(12345, 4096);
        assert_ne!(h1, h2);
    }

    #[test]
    fn optimal_parameters_scale_with_n() {
        let (bits_small, _) = calculate_optimal_parameters(100, 0.01);
        let (bits_large, _) = calculate_optimal_parameters(10_000, 0.01);
        assert!(bits_large > bits_small);
    }
}
