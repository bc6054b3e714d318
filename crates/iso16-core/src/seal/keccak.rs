//! Keccak-f\[1600\] permutation and the SHA3-256 sponge.
//!
//! The state is 25 little-endian 64-bit lanes, indexed `x + 5 * y`.
//! SHA3-256 absorbs 136-byte blocks, pads with `0x06 .. 0x80`, and squeezes
//! the first 32 bytes of the state.

/// Number of 64-bit lanes in the Keccak state.
pub const LANES: usize = 25;

/// Number of permutation rounds.
pub const ROUNDS: usize = 24;

/// SHA3-256 absorption rate in bytes.
pub const RATE: usize = 136;

/// SHA3-256 digest length in bytes.
pub const DIGEST_LEN: usize = 32;

/// Domain separation byte appended after the message.
const DOMAIN_PAD: u8 = 0x06;

/// Bit set in the last byte of the final block.
const FINAL_PAD: u8 = 0x80;

/// Iota round constants.
const ROUND_CONSTANTS: [u64; ROUNDS] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808a,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808b,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008a,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000a,
    0x0000_0000_8000_808b,
    0x8000_0000_0000_008b,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800a,
    0x8000_0000_8000_000a,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

/// Rho rotation offsets, in pi traversal order.
const RHO_OFFSETS: [u32; ROUNDS] = [
    1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44,
];

/// Pi traversal order starting from lane 1.
const PI_LANES: [usize; ROUNDS] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

/// Applies the full 24-round Keccak-f\[1600\] permutation in place.
pub fn keccak_f1600(state: &mut [u64; LANES]) {
    for round_constant in ROUND_CONSTANTS {
        // theta
        let mut columns = [0u64; 5];
        for (x, column) in columns.iter_mut().enumerate() {
            *column = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        for x in 0..5 {
            let d = columns[(x + 4) % 5] ^ columns[(x + 1) % 5].rotate_left(1);
            for y in (0..LANES).step_by(5) {
                state[y + x] ^= d;
            }
        }

        // rho and pi
        let mut carried = state[1];
        for (&lane, &offset) in PI_LANES.iter().zip(RHO_OFFSETS.iter()) {
            let displaced = state[lane];
            state[lane] = carried.rotate_left(offset);
            carried = displaced;
        }

        // chi
        for y in (0..LANES).step_by(5) {
            let row = [state[y], state[y + 1], state[y + 2], state[y + 3], state[y + 4]];
            for x in 0..5 {
                state[y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // iota
        state[0] ^= round_constant;
    }
}

/// Incremental SHA3-256 hasher.
///
/// ```
/// use iso16_core::seal::keccak::Sha3_256;
///
/// let mut hasher = Sha3_256::new();
/// hasher.update(b"a");
/// hasher.update(b"bc");
/// assert_eq!(hasher.finalize(), Sha3_256::digest(b"abc"));
/// ```
#[derive(Clone)]
pub struct Sha3_256 {
    state: [u64; LANES],
    buffer: [u8; RATE],
    buffered: usize,
}

impl Sha3_256 {
    /// Creates a hasher with an all-zero state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: [0; LANES],
            buffer: [0; RATE],
            buffered: 0,
        }
    }

    /// Absorbs `data`.
    pub fn update(&mut self, data: &[u8]) {
        let mut input = data;

        if self.buffered > 0 {
            let take = (RATE - self.buffered).min(input.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&input[..take]);
            self.buffered += take;
            input = &input[take..];
            if self.buffered < RATE {
                return;
            }
            let block = self.buffer;
            self.absorb_block(&block);
            self.buffered = 0;
        }

        let mut blocks = input.chunks_exact(RATE);
        for block in &mut blocks {
            self.absorb_block(block);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Pads the pending input and returns the digest.
    #[must_use]
    pub fn finalize(mut self) -> [u8; DIGEST_LEN] {
        let mut block = [0u8; RATE];
        block[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
        block[self.buffered] ^= DOMAIN_PAD;
        block[RATE - 1] ^= FINAL_PAD;
        self.absorb_block(&block);

        let mut digest = [0u8; DIGEST_LEN];
        for (out, lane) in digest.chunks_exact_mut(8).zip(self.state.iter()) {
            out.copy_from_slice(&lane.to_le_bytes());
        }
        digest
    }

    /// One-shot digest of `data`.
    #[must_use]
    pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    fn absorb_block(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), RATE);
        for (lane, chunk) in self.state.iter_mut().zip(block.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *lane ^= u64::from_le_bytes(bytes);
        }
        keccak_f1600(&mut self.state);
    }
}

impl Default for Sha3_256 {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sha3_256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha3_256")
            .field("buffered", &self.buffered)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_digest(data: &[u8]) -> String {
        hex::encode(Sha3_256::digest(data))
    }

    #[test]
    fn empty_message() {
        assert_eq!(
            hex_digest(b""),
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a"
        );
    }

    #[test]
    fn abc() {
        assert_eq!(
            hex_digest(b"abc"),
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532"
        );
    }

    #[test]
    fn two_hundred_a3_bytes() {
        assert_eq!(
            hex_digest(&[0xa3; 200]),
            "79f38adec5c20307a98ef76e8324afbfd46cfd81b22e3973c65fa1bd9de31787"
        );
    }

    #[test]
    fn rate_boundaries() {
        // One byte short of a block puts both pad bits in the same byte.
        assert_eq!(
            hex_digest(&[b'a'; RATE - 1]),
            "8094bb53c44cfb1e67b7c30447f9a1c33696d2463ecc1d9c92538913392843c9"
        );
        assert_eq!(
            hex_digest(&[b'a'; RATE]),
            "3fc5559f14db8e453a0a3091edbd2bc25e11528d81c66fa570a4efdcc2695ee1"
        );
        assert_eq!(
            hex_digest(&[b'a'; RATE + 1]),
            "f8d6846cedd2ccfadf15c5879ef95af724d799eed7391fb1c91f95344e738614"
        );
    }

    #[test]
    fn chunked_updates_match_one_shot() {
        let data: Vec<u8> = (0..=255u8).cycle().take(3 * RATE + 17).collect();
        let expected = Sha3_256::digest(&data);
        for chunk in [1, 7, RATE - 1, RATE, RATE + 1, 500] {
            let mut hasher = Sha3_256::new();
            for piece in data.chunks(chunk) {
                hasher.update(piece);
            }
            assert_eq!(hasher.finalize(), expected, "chunk size {chunk}");
        }
    }

    #[test]
    fn permutation_of_zero_state_is_not_identity() {
        let mut state = [0u64; LANES];
        keccak_f1600(&mut state);
        assert_eq!(state[0], 0xf125_8f79_40e1_dde7);
    }
}
