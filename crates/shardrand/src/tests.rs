use crate::{
    Backoff, ClientSink, CopyFault, EntropySource, Error, PseudoStream, Result, RetryPolicy,
    ScratchAllocator, SeedOrigin, SliceSink, StreamState, SystemAllocator, TimeSource,
    UnitRegistry, WORD_BYTES, WriterSink, Xoshiro256PlusPlus, deliver, fill_bytes, jump,
    pin_current_unit, random_get_pseudo_bytes, transfer,
};
use core::cell::Cell;
use std::collections::HashSet;
use std::io::{self, Write};
use std::thread::scope;

const ROOT: StreamState = StreamState::new(0x9e37_79b9_7f4a_7c15, 0xbf58_476d_1ce4_e5b9);

struct BytesEntropy([u8; 16]);

impl EntropySource for BytesEntropy {
    fn fill_entropy(&self, dest: &mut [u8]) {
        for (d, s) in dest.iter_mut().zip(self.0.iter().cycle()) {
            *d = *s;
        }
    }
}

struct MockTime {
    millis: u64,
}

impl TimeSource<u64> for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Counts allocation requests and forwards them to the system allocator.
#[derive(Default)]
struct CountingAllocator {
    calls: Cell<usize>,
}

impl ScratchAllocator for CountingAllocator {
    fn try_alloc<T>(&self, len: usize) -> Result<Vec<T>> {
        self.calls.set(self.calls.get() + 1);
        SystemAllocator.try_alloc(len)
    }
}

struct FailingAllocator;

impl ScratchAllocator for FailingAllocator {
    fn try_alloc<T>(&self, len: usize) -> Result<Vec<T>> {
        Err(Error::AllocationFailure { requested: len })
    }
}

/// A client that accepts at most `per_call` bytes per copy.
struct TrickleSink {
    buf: Vec<u8>,
    per_call: usize,
    calls: usize,
}

impl TrickleSink {
    fn new(len: usize, per_call: usize) -> Self {
        Self {
            buf: vec![0; len],
            per_call,
            calls: 0,
        }
    }
}

impl ClientSink for TrickleSink {
    fn check_access(&self, len: usize) -> Result<()> {
        if len > self.buf.len() {
            return Err(Error::AccessFault {
                requested: len,
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    fn copy_from(&mut self, offset: usize, src: &[u8]) -> Result<usize, CopyFault> {
        self.calls += 1;
        let n = src.len().min(self.per_call);
        self.buf[offset..offset + n].copy_from_slice(&src[..n]);
        Ok(n)
    }
}

/// A client whose destination is never writable.
#[derive(Default)]
struct UnmappedSink {
    copies: usize,
}

impl ClientSink for UnmappedSink {
    fn check_access(&self, len: usize) -> Result<()> {
        Err(Error::AccessFault {
            requested: len,
            available: 0,
        })
    }

    fn copy_from(&mut self, _offset: usize, _src: &[u8]) -> Result<usize, CopyFault> {
        self.copies += 1;
        Err(CopyFault::new(io::ErrorKind::PermissionDenied))
    }
}

/// A client that alternates between no progress and a one-byte copy.
struct StutterSink {
    buf: Vec<u8>,
    stall_next: bool,
}

impl ClientSink for StutterSink {
    fn check_access(&self, _len: usize) -> Result<()> {
        Ok(())
    }

    fn copy_from(&mut self, offset: usize, src: &[u8]) -> Result<usize, CopyFault> {
        self.stall_next = !self.stall_next;
        if !self.stall_next {
            return Ok(0);
        }
        self.buf[offset] = src[0];
        Ok(1)
    }
}

/// A client that never makes progress.
#[derive(Default)]
struct StuckSink {
    attempts: u32,
}

impl ClientSink for StuckSink {
    fn check_access(&self, _len: usize) -> Result<()> {
        Ok(())
    }

    fn copy_from(&mut self, _offset: usize, _src: &[u8]) -> Result<usize, CopyFault> {
        self.attempts += 1;
        Ok(0)
    }
}

/// A client that faults after accepting `limit` bytes.
struct FaultAfter {
    limit: usize,
    taken: usize,
}

impl ClientSink for FaultAfter {
    fn check_access(&self, _len: usize) -> Result<()> {
        Ok(())
    }

    fn copy_from(&mut self, _offset: usize, src: &[u8]) -> Result<usize, CopyFault> {
        if self.taken >= self.limit {
            return Err(CopyFault::new(io::ErrorKind::BrokenPipe));
        }
        let n = src.len().min(self.limit - self.taken);
        self.taken += n;
        Ok(n)
    }
}

/// An `io::Write` that accepts at most `per_call` bytes per write and is
/// interrupted before every successful write.
struct ChoppyWriter {
    out: Vec<u8>,
    per_call: usize,
    interrupt_next: bool,
    interrupts: usize,
}

impl ChoppyWriter {
    fn new(per_call: usize) -> Self {
        Self {
            out: Vec::new(),
            per_call,
            interrupt_next: true,
            interrupts: 0,
        }
    }
}

impl Write for ChoppyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.interrupt_next {
            self.interrupt_next = false;
            self.interrupts += 1;
            return Err(io::ErrorKind::Interrupted.into());
        }
        self.interrupt_next = true;
        let n = buf.len().min(self.per_call);
        self.out.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn seeded(units: usize) -> UnitRegistry<StreamState> {
    let mut registry = UnitRegistry::init(units).unwrap();
    registry.seed_from_root(ROOT).unwrap();
    registry
}

/// Bytes a bulk transfer of `len` produces from `state`.
fn expected_transfer(state: StreamState, len: usize) -> Vec<u8> {
    let mut state = state;
    let mut scratch = vec![0u8; len.next_multiple_of(WORD_BYTES)];
    fill_bytes(&mut state, &mut scratch);
    scratch.truncate(len);
    scratch
}

fn fast_retry(max_stalls: u32) -> RetryPolicy {
    RetryPolicy::new(max_stalls, Backoff::Spin)
}

#[test]
fn unit_seeds_are_cumulative_jumps_of_the_root() {
    let registry = seeded(8);
    let mut expected = ROOT;
    for unit in 0..registry.units() {
        expected = jump(expected);
        assert_eq!(*registry.checkout(unit).unwrap(), expected, "unit {unit}");
    }
}

#[test]
fn seed_from_entropy_matches_explicit_root() {
    let mut entropy = [0u8; 16];
    entropy[..8].copy_from_slice(&ROOT.s0.to_le_bytes());
    entropy[8..].copy_from_slice(&ROOT.s1.to_le_bytes());

    let mut registry = UnitRegistry::<StreamState>::init(4).unwrap();
    let origin = registry.seed(&BytesEntropy(entropy), &MockTime { millis: 0 });
    assert_eq!(origin, SeedOrigin::Entropy);

    let reference = seeded(4);
    for unit in 0..4 {
        assert_eq!(*registry.checkout(unit).unwrap(), *reference.checkout(unit).unwrap());
    }
}

#[test]
fn zero_entropy_seeds_from_clock_then_literal() {
    let mut registry = UnitRegistry::<StreamState>::init(2).unwrap();
    let origin = registry.seed(&BytesEntropy([0; 16]), &MockTime { millis: 1_000 });
    assert_eq!(origin, SeedOrigin::Clock);
    assert_eq!(
        *registry.checkout(0).unwrap(),
        jump(StreamState::new(1_000, !1_000))
    );

    let mut registry = UnitRegistry::<StreamState>::init(2).unwrap();
    let origin = registry.seed(&BytesEntropy([0; 16]), &MockTime { millis: 0 });
    assert_eq!(origin, SeedOrigin::Literal);
    for unit in 0..2 {
        assert!(!registry.checkout(unit).unwrap().is_zero());
    }
}

#[test]
fn unit_streams_are_pairwise_distinct() {
    let registry = seeded(16);
    let mut seen = HashSet::new();
    for unit in 0..registry.units() {
        let mut buf = [0u8; 32];
        fill_bytes(&mut *registry.checkout(unit).unwrap(), &mut buf);
        assert!(seen.insert(buf), "unit {unit} repeated another unit's output");
    }
}

#[test]
fn fill_is_reproducible_across_registries() {
    let a = seeded(4);
    let b = seeded(4);
    for len in [0usize, 1, 7, 8, 9, 1_000] {
        let mut out_a = vec![0u8; len];
        let mut out_b = vec![0u8; len];
        fill_bytes(&mut *a.checkout(3).unwrap(), &mut out_a);
        fill_bytes(&mut *b.checkout(3).unwrap(), &mut out_b);
        assert_eq!(out_a, out_b, "len {len}");
    }
}

#[test]
fn fill_advances_the_stored_state() {
    let registry = seeded(1);
    let before = *registry.checkout(0).unwrap();

    let mut first = [0u8; 8];
    let mut second = [0u8; 8];
    fill_bytes(&mut *registry.checkout(0).unwrap(), &mut first);
    fill_bytes(&mut *registry.checkout(0).unwrap(), &mut second);

    assert_ne!(first, second);
    assert_ne!(*registry.checkout(0).unwrap(), before);
}

#[test]
fn random_get_pseudo_bytes_uses_the_pinned_unit() {
    pin_current_unit(5);
    let registry = seeded(4);
    let mut out = [0u8; 40];
    random_get_pseudo_bytes(&registry, &mut out).unwrap();

    // 5 % 4 == 1
    let mut expected = [0u8; 40];
    let mut unit1 = jump(jump(ROOT));
    fill_bytes(&mut unit1, &mut expected);
    assert_eq!(out, expected);
}

#[test]
fn checkout_rejects_unknown_units() {
    let registry = seeded(2);
    assert_eq!(
        registry.checkout(2).err(),
        Some(Error::UnitOutOfRange { unit: 2, units: 2 })
    );
}

#[test]
fn checkout_requires_seeding() {
    let registry = UnitRegistry::<StreamState>::init(2).unwrap();
    assert!(!registry.is_seeded());
    assert_eq!(registry.checkout(0).err(), Some(Error::Unseeded));
    registry.teardown();
}

#[test]
fn zero_root_is_rejected_without_seeding() {
    let mut registry = UnitRegistry::<StreamState>::init(2).unwrap();
    let err = registry.seed_from_root(StreamState::ZERO).unwrap_err();
    assert_eq!(err, Error::ZeroSeed);
    assert_eq!(err.errno(), crate::EINVAL);
    assert!(!registry.is_seeded());
    assert_eq!(registry.checkout(0).err(), Some(Error::Unseeded));

    let mut wide = UnitRegistry::<Xoshiro256PlusPlus>::init(1).unwrap();
    assert_eq!(
        wide.seed_from_root(Xoshiro256PlusPlus::ZERO),
        Err(Error::ZeroSeed)
    );
}

#[test]
fn init_surfaces_allocation_failure() {
    assert_eq!(
        UnitRegistry::<StreamState>::init_in(4, &FailingAllocator).err(),
        Some(Error::AllocationFailure { requested: 4 })
    );
    assert_eq!(
        UnitRegistry::<StreamState>::init(0).err(),
        Some(Error::InvalidUnitCount)
    );
}

#[test]
fn transfer_delivers_exact_lengths_one_byte_at_a_time() {
    for len in [0usize, 1, 4095, 4096, 4097] {
        pin_current_unit(0);
        let registry = seeded(1);
        let mut sink = TrickleSink::new(len, 1);

        let delivered =
            transfer(&registry, &mut sink, len, &SystemAllocator, &fast_retry(0)).unwrap();

        assert_eq!(delivered, len);
        assert_eq!(sink.calls, len);
        assert_eq!(sink.buf, expected_transfer(jump(ROOT), len), "len {len}");
    }
}

#[test]
fn transfer_fills_whole_words_then_truncates() {
    pin_current_unit(0);
    let registry = seeded(1);
    let mut buf = [0u8; 13];
    let delivered = transfer(
        &registry,
        &mut SliceSink::new(&mut buf),
        13,
        &SystemAllocator,
        &RetryPolicy::default(),
    )
    .unwrap();
    assert_eq!(delivered, 13);
    assert_eq!(buf.to_vec(), expected_transfer(jump(ROOT), 13));

    // Two whole words were consumed.
    let mut expected = jump(ROOT);
    expected.step();
    expected.step();
    assert_eq!(*registry.checkout(0).unwrap(), expected);
}

#[test]
fn transfer_to_inaccessible_destination_allocates_nothing() {
    let registry = seeded(1);
    let before = *registry.checkout(0).unwrap();
    let alloc = CountingAllocator::default();
    let mut sink = UnmappedSink::default();

    let err = transfer(&registry, &mut sink, 64, &alloc, &RetryPolicy::default()).unwrap_err();

    assert_eq!(
        err,
        Error::AccessFault {
            requested: 64,
            available: 0
        }
    );
    assert_eq!(alloc.calls.get(), 0);
    assert_eq!(sink.copies, 0);
    assert_eq!(*registry.checkout(0).unwrap(), before);
}

#[test]
fn transfer_allocation_failure_does_no_partial_work() {
    let registry = seeded(1);
    let before = *registry.checkout(0).unwrap();
    let mut sink = TrickleSink::new(100, 100);

    let err = transfer(
        &registry,
        &mut sink,
        100,
        &FailingAllocator,
        &RetryPolicy::default(),
    )
    .unwrap_err();

    assert_eq!(err, Error::AllocationFailure { requested: 104 });
    assert_eq!(sink.calls, 0);
    assert_eq!(*registry.checkout(0).unwrap(), before);
}

#[test]
fn transfer_through_short_interrupted_writes() {
    pin_current_unit(0);
    let registry = seeded(1);
    let mut sink = WriterSink::new(ChoppyWriter::new(5));

    // No stall is tolerated, so every interrupt must be retried in place.
    let delivered =
        transfer(&registry, &mut sink, 4097, &SystemAllocator, &fast_retry(0)).unwrap();
    assert_eq!(delivered, 4097);

    let writer = sink.into_inner();
    assert_eq!(writer.interrupts, 4097_usize.div_ceil(5));
    assert_eq!(writer.out, expected_transfer(jump(ROOT), 4097));
}

#[test]
fn deliver_rides_through_intermittent_stalls() {
    let src: Vec<u8> = (0..=255).collect();
    let mut sink = StutterSink {
        buf: vec![0; src.len()],
        stall_next: true,
    };
    let delivered = deliver(&mut sink, &src, &fast_retry(1)).unwrap();
    assert_eq!(delivered, src.len());
    assert_eq!(sink.buf, src);
}

#[test]
fn deliver_gives_up_on_a_stuck_client() {
    let mut sink = StuckSink::default();
    let err = deliver(&mut sink, &[1, 2, 3], &fast_retry(4)).unwrap_err();
    assert_eq!(
        err,
        Error::CopyStalled {
            delivered: 0,
            requested: 3
        }
    );
    assert_eq!(sink.attempts, 5);
}

#[test]
fn deliver_surfaces_client_faults() {
    let mut sink = FaultAfter { limit: 10, taken: 0 };
    let err = deliver(&mut sink, &[0u8; 32], &fast_retry(0)).unwrap_err();
    assert_eq!(
        err,
        Error::CopyFault {
            delivered: 10,
            kind: io::ErrorKind::BrokenPipe
        }
    );
}

#[test]
fn threads_on_distinct_units_never_share_a_stream() {
    const UNITS: usize = 8;
    let registry = seeded(UNITS);

    let outputs: Vec<Vec<u8>> = scope(|s| {
        let handles: Vec<_> = (0..UNITS)
            .map(|unit| {
                let registry = &registry;
                s.spawn(move || {
                    pin_current_unit(unit);
                    let mut out = vec![0u8; 4096];
                    for chunk in out.chunks_mut(512) {
                        random_get_pseudo_bytes(registry, chunk).unwrap();
                    }
                    out
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut state = ROOT;
    for (unit, out) in outputs.iter().enumerate() {
        state = jump(state);
        let mut stream = state;
        let mut expected = vec![0u8; out.len()];
        fill_bytes(&mut stream, &mut expected);
        assert_eq!(*out, expected, "unit {unit}");
    }
}

#[test]
fn shared_unit_serializes_checkouts() {
    let registry = seeded(1);
    let total: usize = scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = &registry;
                s.spawn(move || {
                    let mut produced = 0;
                    for _ in 0..100 {
                        let mut buf = [0u8; 64];
                        random_get_pseudo_bytes(registry, &mut buf).unwrap();
                        produced += buf.len();
                    }
                    produced
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });
    assert_eq!(total, 4 * 100 * 64);

    // 400 fills of 8 words each, in some order, from one stream.
    let mut expected = jump(ROOT);
    for _ in 0..400 * 8 {
        expected.step();
    }
    assert_eq!(*registry.checkout(0).unwrap(), expected);
}

#[test]
fn xoshiro_registry_seeds_with_its_own_jump() {
    let root = Xoshiro256PlusPlus::new([1, 2, 3, 4]);
    let mut registry = UnitRegistry::<Xoshiro256PlusPlus>::init(3).unwrap();
    registry.seed_from_root(root).unwrap();

    let mut expected = root;
    for unit in 0..3 {
        expected.jump();
        assert_eq!(*registry.checkout(unit).unwrap(), expected);
    }
}
