#![no_main]

use libfuzzer_sys::fuzz_target;
use wheelcache::ds::entry_arena::{EntryArena, BUCKET_NONE, NIL};
use wheelcache::ds::timer_wheel::TimerWheel;

// Fuzz arbitrary operation sequences on TimerWheel
//
// Random schedule / unlink / advance interleavings over a shared arena.
// Expired slots are freed from the callback, mirroring how the cache
// coordinator recycles them.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut arena: EntryArena<u32, u32> = match EntryArena::try_with_initial_cap(128, 4) {
        Ok(arena) => arena,
        Err(_) => return,
    };
    let mut wheel = match TimerWheel::try_new(16, 8, 0) {
        Ok(wheel) => wheel,
        Err(_) => return,
    };
    let mut scheduled: Vec<i32> = Vec::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 4;
        let value = u64::from(data[idx + 1]);

        match op {
            0 => {
                // alloc + schedule somewhere in the near or far future
                if let Ok(id) = arena.alloc_id() {
                    if id != NIL {
                        arena.set_entry(id, id as u32, 0).unwrap();
                        let expire = wheel.now_tick() + 1 + (value % 64);
                        wheel.schedule(&mut arena, id, expire).unwrap();
                        scheduled.push(id);
                    }
                }
            }
            1 => {
                // reschedule an existing entry
                if !scheduled.is_empty() {
                    let id = scheduled[(value as usize) % scheduled.len()];
                    let expire = wheel.now_tick() + 1 + (value % 64);
                    wheel.schedule(&mut arena, id, expire).unwrap();
                }
            }
            2 => {
                // unlink (possibly already unscheduled) and free
                if !scheduled.is_empty() {
                    let pick = (value as usize) % scheduled.len();
                    let id = scheduled.swap_remove(pick);
                    wheel.unlink(&mut arena, id);
                    assert_eq!(arena.wheel_bucket(id), BUCKET_NONE);
                    arena.free_id(id).unwrap();
                }
            }
            3 => {
                // bounded advance; the callback recycles expired slots
                let target = wheel.now_tick() + (value % 32);
                let mut expired = Vec::new();
                wheel.advance_to_tick(&mut arena, target, |arena, id| {
                    assert_eq!(arena.wheel_bucket(id), BUCKET_NONE);
                    expired.push(id);
                });
                for id in expired {
                    arena.free_id(id).unwrap();
                    scheduled.retain(|&s| s != id);
                }
                // Scheduling at or before the processed tick must fail.
                if let Ok(id) = arena.alloc_id() {
                    if id != NIL {
                        arena.set_entry(id, 0, 0).unwrap();
                        assert!(wheel.schedule(&mut arena, id, wheel.now_tick()).is_err());
                        arena.free_id(id).unwrap();
                    }
                }
            }
            _ => unreachable!(),
        }

        #[cfg(debug_assertions)]
        {
            arena.debug_validate_invariants();
            wheel.debug_validate_invariants(&arena);
        }

        idx += 2;
    }
});
