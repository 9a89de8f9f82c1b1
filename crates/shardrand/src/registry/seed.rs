use crate::{EntropySource, PseudoStream, TimeSource};

/// Fixed seed used when both the entropy source and the clock read zero.
///
/// The ASCII bytes of `"improbable seed\0"`, read as two little-endian words.
pub const FALLBACK_SEED: [u64; 2] = [
    u64::from_le_bytes(*b"improbab"),
    u64::from_le_bytes(*b"le seed\0"),
];

/// Where the root seed of a registry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedOrigin {
    /// The entropy source produced a usable (non-zero) seed.
    Entropy,
    /// The entropy source returned all zeroes; the seed was derived from the
    /// clock reading and its bitwise complement.
    Clock,
    /// Both the entropy source and the clock read zero; [`FALLBACK_SEED`] was
    /// used.
    Literal,
}

/// Derives a non-zero root seed for streams of type `S`.
///
/// Entropy bytes are read as little-endian words so a given entropy buffer
/// yields the same root seed on every platform. If every word is zero the
/// clock is consulted (`[now, !now, 0, ..]`), and if the clock also reads zero
/// the literal [`FALLBACK_SEED`] fills the first two words.
pub fn derive_root_seed<S, E, T>(entropy: &E, clock: &T) -> (S, SeedOrigin)
where
    S: PseudoStream,
    E: EntropySource + ?Sized,
    T: TimeSource<u64> + ?Sized,
{
    let mut words = S::Words::default();
    let mut raw = vec![0u8; words.as_ref().len() * size_of::<u64>()];
    entropy.fill_entropy(&mut raw);

    for (word, chunk) in words.as_mut().iter_mut().zip(raw.chunks_exact(size_of::<u64>())) {
        *word = chunk
            .iter()
            .rev()
            .fold(0, |acc, &byte| (acc << 8) | u64::from(byte));
    }

    if !S::from_words(words).is_zero() {
        return (S::from_words(words), SeedOrigin::Entropy);
    }

    let now = clock.current_millis();
    let fallback = words.as_mut();
    let origin = if now != 0 {
        fallback[0] = now;
        fallback[1] = !now;
        SeedOrigin::Clock
    } else {
        fallback[..FALLBACK_SEED.len()].copy_from_slice(&FALLBACK_SEED);
        SeedOrigin::Literal
    };

    #[cfg(feature = "tracing")]
    tracing::warn!(
        generator = S::NAME,
        ?origin,
        seed = %words
            .as_ref()
            .iter()
            .map(|w| format!("{w:016x}"))
            .collect::<String>(),
        "entropy source returned 0 when generating the root seed; using fallback seed"
    );

    (S::from_words(words), origin)
}
