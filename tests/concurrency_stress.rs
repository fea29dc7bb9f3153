//! Concurrent readers/writers stress tests for both cache wrappers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use taxocache::{
    CategoryPath, CompleteTaxonomyCache, LruKeyPolicy, LruTaxonomyCache, TaxonomyWriterCache,
    INVALID_ORDINAL,
};

fn label(writer: usize, i: usize) -> CategoryPath {
    let dim = format!("writer{}", writer);
    let name = i.to_string();
    CategoryPath::new(&[dim.as_str(), name.as_str()])
}

#[test]
fn test_complete_cache_concurrent_writers_and_readers() {
    let cache = Arc::new(CompleteTaxonomyCache::new(64, 0.15, 3));
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 500;

    let handles: Vec<_> = (0..WRITERS + 4)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                if thread_id < WRITERS {
                    // Writer thread: disjoint labels, pre-agreed ordinals.
                    for i in 0..PER_WRITER {
                        let ordinal = (thread_id * PER_WRITER + i) as i32;
                        cache.put(&label(thread_id, i), ordinal).unwrap();
                    }
                } else {
                    // Reader thread: hammer random lookups; a hit must carry
                    // the pre-agreed ordinal.
                    for _ in 0..2000 {
                        let writer = rand::random::<usize>() % WRITERS;
                        let i = rand::random::<usize>() % PER_WRITER;
                        let got = cache.get(&label(writer, i)).unwrap();
                        let expected = (writer * PER_WRITER + i) as i32;
                        assert!(got == expected || got == INVALID_ORDINAL);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Every write is visible afterwards.
    for writer in 0..WRITERS {
        for i in 0..PER_WRITER {
            assert_eq!(
                cache.get(&label(writer, i)).unwrap(),
                (writer * PER_WRITER + i) as i32
            );
        }
    }
}

#[test]
fn test_partial_cache_never_left_over_capacity() {
    const CAPACITY: usize = 128;
    let cache = Arc::new(LruTaxonomyCache::new(CAPACITY, LruKeyPolicy::ExactLabel));
    let evictions = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            let evictions = Arc::clone(&evictions);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    if cache.put(&label(thread_id, i), i as i32).unwrap() {
                        evictions.fetch_add(1, Ordering::Relaxed);
                    }
                    let _ = cache.get(&label(thread_id, i / 2)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // put makes room before returning, so the cache can never be observed
    // over capacity, and 8000 inserts into 128 slots must have evicted.
    assert!(cache.len() <= CAPACITY);
    assert!(evictions.load(Ordering::Relaxed) > 0);
}

#[test]
fn test_contract_shared_across_threads_as_trait_object() {
    let cache: Arc<dyn TaxonomyWriterCache> = Arc::new(CompleteTaxonomyCache::default());

    let handles: Vec<_> = (0..4)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for i in 0..100 {
                    let ordinal = (thread_id * 100 + i) as i32;
                    cache.put(&label(thread_id, i), ordinal).unwrap();
                    assert_eq!(cache.get(&label(thread_id, i)).unwrap(), ordinal);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
