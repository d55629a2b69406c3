#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use wheelcache::builder::WheelCacheBuilder;
use wheelcache::cache::WheelCacheCore;
use wheelcache::time::ManualClock;

// Fuzz arbitrary operation sequences on the full cache
//
// Drives set / get / has / delete / clear / advance with a manual clock and
// a small capacity so LRU eviction, TTL expiry, and slot reuse all fire.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let clock = ManualClock::new();
    let mut cache: WheelCacheCore<u8, u32> = match WheelCacheBuilder::new(16)
        .tick_ms(10)
        .wheel_size(8)
        .budget_per_tick(4)
        .clock(Arc::new(clock.clone()))
        .try_build_core()
    {
        Ok(cache) => cache,
        Err(_) => return,
    };

    let mut idx = 0;
    while idx + 2 < data.len() {
        let op = data[idx] % 6;
        let key = data[idx + 1] % 32;
        let arg = u64::from(data[idx + 2]);

        match op {
            0 => {
                cache.set(key, arg as u32, arg * 3);
                if arg > 0 {
                    // A fresh write is immediately visible.
                    assert!(cache.has(&key));
                }
            }
            1 => {
                let _ = cache.get(&key);
            }
            2 => {
                let _ = cache.has(&key);
            }
            3 => {
                let was_there = cache.has(&key);
                assert_eq!(cache.delete(&key), was_there);
                assert!(!cache.has(&key));
            }
            4 => {
                clock.advance(arg);
                let mut rounds = 0;
                while !cache.advance_to_now() {
                    rounds += 1;
                    assert!(rounds < 10_000, "advance failed to make progress");
                }
            }
            5 => {
                cache.clear();
                assert!(cache.is_empty());
            }
            _ => unreachable!(),
        }

        assert!(cache.len() <= cache.max_entries());
        #[cfg(debug_assertions)]
        cache.debug_validate_invariants();

        idx += 3;
    }
});
