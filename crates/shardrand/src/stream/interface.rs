use core::fmt;

/// A fixed-size pseudorandom stream that can be advanced one step at a time
/// and jumped far ahead in its period.
///
/// Implementations are **not** cryptographically secure. They are meant for
/// scratch buffers, simulation noise and other places where speed and
/// statistical quality matter but unpredictability does not.
///
/// The state is a small array of 64-bit words (`Words`). The all-zero state is
/// a fixed point of every implementation and must never be stepped; the
/// registry guarantees this by seeding every slot before it can be checked
/// out.
pub trait PseudoStream: Copy + Send + Eq + fmt::Debug {
    /// The raw state words.
    type Words: AsRef<[u64]> + AsMut<[u64]> + Default + Copy + fmt::Debug;

    /// The all-zero (degenerate) state.
    const ZERO: Self;

    /// Short algorithm name used in diagnostics.
    const NAME: &'static str;

    /// Builds a stream from raw state words.
    fn from_words(words: Self::Words) -> Self;

    /// Returns the raw state words.
    fn words(&self) -> Self::Words;

    /// Advances the state by one transition and returns its 64-bit output.
    fn step(&mut self) -> u64;

    /// Advances the state by the algorithm's fixed jump distance.
    fn jump(&mut self);

    /// Returns `true` if every state word is zero.
    fn is_zero(&self) -> bool {
        self.words().as_ref().iter().all(|&w| w == 0)
    }

    /// Serializes one full output word.
    ///
    /// The default is big-endian (most significant byte first).
    fn emit_word(word: u64) -> [u8; 8] {
        word.to_be_bytes()
    }

    /// Writes the bytes of a final, partially consumed output word.
    ///
    /// `dest` is shorter than a full word. The default takes the trailing
    /// (least significant) bytes of the big-endian encoding.
    fn emit_partial(word: u64, dest: &mut [u8]) {
        let bytes = word.to_be_bytes();
        dest.copy_from_slice(&bytes[bytes.len() - dest.len()..]);
    }
}

/// Applies a jump polynomial to `state`.
///
/// For each bit of `poly` (least significant first), the current state is
/// XOR-accumulated when the bit is set, then the state is stepped once. The
/// accumulator becomes the new state.
pub(crate) fn jump_by_polynomial<S: PseudoStream>(state: &mut S, poly: &[u64]) {
    let mut acc = S::Words::default();
    for &word in poly {
        for bit in 0..u64::BITS {
            if word & (1 << bit) != 0 {
                let current = state.words();
                for (a, s) in acc.as_mut().iter_mut().zip(current.as_ref()) {
                    *a ^= s;
                }
            }
            state.step();
        }
    }
    *state = S::from_words(acc);
}
