use super::interface::{PseudoStream, jump_by_polynomial};
use rand::RngCore;

/// Jump polynomial equivalent to 2^128 xoshiro256++ steps.
pub const XOSHIRO_JUMP: [u64; 4] = [
    0x180e_c6d3_3cfd_0aba,
    0xd5a6_1266_f0c9_392c,
    0xa958_2618_e03f_c9aa,
    0x39ab_dc45_29b1_661c,
];

/// The 256-bit state of one xoshiro256++ stream.
///
/// A slower, larger-state alternative to [`StreamState`]. Like it, this is
/// **not** a cryptographically secure generator.
///
/// Output words are serialized little-endian. The low bytes of each output
/// are the weakest, so a partially consumed final word contributes only its
/// high-order bytes, still in ascending significance.
///
/// [`StreamState`]: crate::StreamState
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Xoshiro256PlusPlus {
    s: [u64; 4],
}

impl Xoshiro256PlusPlus {
    /// Creates a state from its four words.
    pub const fn new(s: [u64; 4]) -> Self {
        Self { s }
    }
}

impl PseudoStream for Xoshiro256PlusPlus {
    type Words = [u64; 4];

    const ZERO: Self = Self::new([0; 4]);
    const NAME: &'static str = "xoshiro256++";

    fn from_words(words: Self::Words) -> Self {
        Self::new(words)
    }

    fn words(&self) -> Self::Words {
        self.s
    }

    #[inline]
    fn step(&mut self) -> u64 {
        let s = &mut self.s;
        let result = s[0].wrapping_add(s[3]).rotate_left(23).wrapping_add(s[0]);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        result
    }

    fn jump(&mut self) {
        jump_by_polynomial(self, &XOSHIRO_JUMP);
    }

    fn emit_word(word: u64) -> [u8; 8] {
        word.to_le_bytes()
    }

    fn emit_partial(word: u64, dest: &mut [u8]) {
        let bytes = word.to_le_bytes();
        dest.copy_from_slice(&bytes[bytes.len() - dest.len()..]);
    }
}

impl RngCore for Xoshiro256PlusPlus {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        crate::fill_bytes(self, dest);
    }
}
