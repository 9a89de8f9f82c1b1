use super::interface::{PseudoStream, jump_by_polynomial};
use rand::RngCore;

/// Jump polynomial equivalent to 2^64 calls to [`transition`].
pub const JUMP: [u64; 2] = [0x8a5c_d789_635d_2dff, 0x121f_d215_5c47_2f96];

/// The 128-bit state of one xorshift128+ stream.
///
/// xorshift128+ is fast and passes BigCrush, but it is **not**
/// cryptographically secure: its output is linear over GF(2) apart from the
/// final addition and the full state can be recovered from a handful of
/// outputs. Never use it for keys, nonces, tokens or any other secret.
///
/// # Example
/// ```
/// use shardrand::{PseudoStream, StreamState};
///
/// let mut state = StreamState::new(1, 2);
/// assert_eq!(state.step(), 0x80_0025);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamState {
    /// First state word.
    pub s0: u64,
    /// Second state word.
    pub s1: u64,
}

/// Alias naming the algorithm behind [`StreamState`].
pub type XorShift128Plus = StreamState;

impl StreamState {
    /// Creates a state from its two words.
    ///
    /// The caller must not step a state where both words are zero.
    pub const fn new(s0: u64, s1: u64) -> Self {
        Self { s0, s1 }
    }
}

/// Advances `state` by one xorshift128+ step.
///
/// Returns the new state and the step's 64-bit output.
pub const fn transition(state: StreamState) -> (StreamState, u64) {
    let mut s1 = state.s0;
    let s0 = state.s1;
    s1 ^= s1 << 23;
    let next = StreamState {
        s0,
        s1: s1 ^ s0 ^ (s1 >> 18) ^ (s0 >> 5),
    };
    (next, next.s1.wrapping_add(s0))
}

/// Returns `state` advanced by 2^64 steps.
///
/// Costs 128 transitions. Used to space per-unit streams apart at seeding
/// time, never on the byte generation path.
pub fn jump(state: StreamState) -> StreamState {
    let mut state = state;
    jump_by_polynomial(&mut state, &JUMP);
    state
}

impl PseudoStream for StreamState {
    type Words = [u64; 2];

    const ZERO: Self = Self::new(0, 0);
    const NAME: &'static str = "xorshift128+";

    fn from_words(words: Self::Words) -> Self {
        Self::new(words[0], words[1])
    }

    fn words(&self) -> Self::Words {
        [self.s0, self.s1]
    }

    #[inline]
    fn step(&mut self) -> u64 {
        let (next, out) = transition(*self);
        *self = next;
        out
    }

    fn jump(&mut self) {
        jump_by_polynomial(self, &JUMP);
    }
}

impl RngCore for StreamState {
    fn next_u32(&mut self) -> u32 {
        // The upper half carries the better bits for `+` scramblers.
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        crate::fill_bytes(self, dest);
    }
}
