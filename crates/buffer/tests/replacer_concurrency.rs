// ==============================================
// REPLACER CONCURRENCY TESTS (integration)
// ==============================================
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustdb_buffer::{AccessType, FrameId, LrukReplacer, Replacer};
use serial_test::serial;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
#[serial]
fn test_concurrent_access_and_evict() {
    init_logger();
    let num_threads = 8;
    let frames_per_thread = 200;
    let replacer = Arc::new(LrukReplacer::new(num_threads * frames_per_thread, 2));

    // Each thread owns a disjoint range of frames, so every frame it unpins
    // is either still evictable or evicted by exactly one thread.
    let evicted = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let replacer = Arc::clone(&replacer);
            let evicted = Arc::clone(&evicted);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(thread_id as u64);
                let base = thread_id * frames_per_thread;
                for i in 0..frames_per_thread {
                    let frame_id = base + i;
                    let accesses = rng.random_range(1..4);
                    for _ in 0..accesses {
                        replacer.record_access(frame_id, AccessType::Lookup);
                    }
                    replacer.set_evictable(frame_id, true);
                    if i % 5 == 0 && replacer.evict().is_some() {
                        evicted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = num_threads * frames_per_thread;
    let evicted = evicted.load(Ordering::SeqCst);
    assert_eq!(total - evicted, replacer.evictable_count());
    assert_eq!(total - evicted, replacer.tracked_count());
    assert!(replacer.check_invariants().is_ok());
}

#[test]
#[serial]
fn test_concurrent_drain_evicts_each_frame_once() {
    init_logger();
    let total: usize = 2000;
    let replacer = Arc::new(LrukReplacer::new(total, 3));
    for frame_id in 0..total {
        replacer.record_access(frame_id, AccessType::Scan);
        replacer.set_evictable(frame_id, true);
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let replacer = Arc::clone(&replacer);
            thread::spawn(move || {
                let mut mine = Vec::new();
                while let Some(frame_id) = replacer.evict() {
                    mine.push(frame_id);
                }
                mine
            })
        })
        .collect();

    let mut drained: Vec<FrameId> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    drained.sort_unstable();
    assert_eq!((0..total).collect::<Vec<_>>(), drained);
    assert_eq!(0, replacer.evictable_count());
    assert_eq!(None, replacer.evict());
}

#[test]
#[serial]
fn test_pinned_frames_survive_concurrent_eviction() {
    init_logger();
    let replacer = Arc::new(LrukReplacer::new(512, 2));
    let pinned: Vec<FrameId> = (0..512).filter(|f| f % 4 == 0).collect();
    for frame_id in 0..512 {
        replacer.record_access(frame_id, AccessType::Unknown);
        if frame_id % 4 != 0 {
            replacer.set_evictable(frame_id, true);
        }
    }

    let handles: Vec<_> = (0..4)
        .map(|seed| {
            let replacer = Arc::clone(&replacer);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut evicted = Vec::new();
                for _ in 0..200 {
                    if rng.random_bool(0.5) {
                        if let Some(frame_id) = replacer.evict() {
                            evicted.push(frame_id);
                        }
                    } else {
                        let frame_id = rng.random_range(0..512usize);
                        replacer.record_access(frame_id, AccessType::Lookup);
                    }
                }
                evicted
            })
        })
        .collect();

    for handle in handles {
        for frame_id in handle.join().unwrap() {
            assert_ne!(0, frame_id % 4, "pinned frame {frame_id} was evicted");
        }
    }

    for frame_id in pinned {
        assert_eq!(Some(false), replacer.is_evictable(frame_id));
        assert!(replacer.remove(frame_id).is_err());
    }
    assert!(replacer.check_invariants().is_ok());
}
