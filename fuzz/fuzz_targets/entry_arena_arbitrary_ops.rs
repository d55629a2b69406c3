#![no_main]

use libfuzzer_sys::fuzz_target;
use wheelcache::ds::entry_arena::{EntryArena, NIL};

// Fuzz arbitrary operation sequences on EntryArena
//
// Tests random sequences of alloc, set_entry, free, and accessor operations,
// checking the liveness accounting after every step.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut arena: EntryArena<u32, u32> = match EntryArena::try_with_initial_cap(256, 2) {
        Ok(arena) => arena,
        Err(_) => return,
    };
    let mut live_ids = Vec::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 5;
        let value = u32::from(data[idx + 1]);

        match op {
            0 => {
                // alloc + set_entry
                let id = arena.alloc_id().unwrap();
                if id != NIL {
                    arena.set_entry(id, value, value).unwrap();
                    assert_eq!(arena.key(id), Some(&value));
                    assert!(arena.is_live(id));
                    live_ids.push(id);
                }
            }
            1 => {
                // free
                if !live_ids.is_empty() {
                    let pick = (value as usize) % live_ids.len();
                    let id = live_ids.swap_remove(pick);
                    let before = arena.live_count();
                    arena.free_id(id).unwrap();
                    assert_eq!(arena.live_count(), before - 1);
                    assert!(!arena.is_live(id));
                    // A second free must be rejected.
                    assert!(arena.free_id(id).is_err());
                }
            }
            2 => {
                // read accessors
                if !live_ids.is_empty() {
                    let id = live_ids[(value as usize) % live_ids.len()];
                    assert!(arena.key(id).is_some());
                    assert!(arena.value(id).is_some());
                }
            }
            3 => {
                // out-of-range ids are rejected, never panicking
                let bogus = arena.cap() as i32 + (value as i32 % 8);
                assert!(arena.set_entry(bogus, 0, 0).is_err());
                assert!(arena.free_id(-1).is_err());
            }
            4 => {
                // accounting
                assert_eq!(arena.live_count(), live_ids.len());
                assert!(arena.size_allocated() <= arena.cap());
                assert!(arena.cap() <= arena.max_entries());
            }
            _ => unreachable!(),
        }

        #[cfg(debug_assertions)]
        arena.debug_validate_invariants();

        idx += 2;
    }
});
