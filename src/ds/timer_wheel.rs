//! Single-level hashed timer wheel with an overflow list.
//!
//! Expiry ticks hash into a power-of-two ring of bucket lists
//! (`bucket = tick & mask`). Expiries beyond the wheel's horizon wait in an
//! unsorted overflow list and are re-homed into buckets as the wheel catches
//! up. All lists are intrusive: links live in the [`EntryArena`]'s
//! `wheel_next`/`wheel_prev`/`wheel_bucket` columns.
//!
//! ## Architecture
//!
//! ```text
//!   bucket_heads (wheel_size = 8, mask = 7)
//!   ┌────┬────┬────┬────┬────┬────┬────┬────┐
//!   │ b0 │ b1 │ b2 │ b3 │ b4 │ b5 │ b6 │ b7 │      overflow_head
//!   └─┬──┴────┴────┴─┬──┴────┴────┴────┴────┘           │
//!     ▼              ▼                                  ▼
//!   [id_3]         [id_7] ◄──► [id_1]                 [id_9] ◄──► [id_5]
//!   tick 16        tick 11     tick 3                 tick 803    tick 91
//!
//!   advance one tick:
//!     1. drain overflow entries whose expiry is now within the horizon
//!     2. walk bucket (now_tick & mask): expire due entries, re-home
//!        wrapped-around stragglers (guardrail)
//! ```
//!
//! ## Advancement contract
//!
//! `advance_to_tick` walks one tick at a time and shares a single work
//! budget between overflow draining and bucket processing. When the budget
//! runs out the call returns `false` and remembers the target; the next call
//! resumes toward `max(new target, remembered target)`. Entries left behind
//! in a partially processed bucket are picked up the next time the wheel's
//! hand passes that bucket.
//!
//! Two expiry ticks a multiple of `wheel_size` apart share a bucket. The
//! guardrail during bucket processing relocates any visited entry that is
//! not yet due and hashed elsewhere, so wrapped-around entries are never
//! expired early.
//!
//! The expiration callback receives the arena and the already-unlinked slot
//! id; index/recency/arena cleanup is the callback's job.
//!
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::entry_arena::{EntryArena, BUCKET_NONE, BUCKET_OVERFLOW, NIL};
use crate::error::{ConfigError, CoreError};

/// Hashed timer wheel threaded through an [`EntryArena`].
#[derive(Debug)]
pub struct TimerWheel {
    wheel_size: usize,
    wheel_mask: u64,
    horizon_ticks: u64,
    now_tick: u64,
    bucket_heads: Vec<i32>,
    overflow_head: i32,
    overflow_count_approx: usize,
    budget_per_tick: usize,
    pending_target_tick: Option<u64>,
}

impl TimerWheel {
    /// Creates a wheel of `wheel_size` buckets (power of two, at least 2)
    /// whose advances each perform at most `budget_per_tick` units of work,
    /// starting at `start_tick`.
    pub fn try_new(
        wheel_size: usize,
        budget_per_tick: usize,
        start_tick: u64,
    ) -> Result<Self, ConfigError> {
        if wheel_size < 2 || !wheel_size.is_power_of_two() {
            return Err(ConfigError::new(format!(
                "wheel_size must be a power of two >= 2, got {}",
                wheel_size
            )));
        }
        if budget_per_tick == 0 {
            return Err(ConfigError::new("budget_per_tick must be positive"));
        }
        Ok(Self {
            wheel_size,
            wheel_mask: (wheel_size - 1) as u64,
            horizon_ticks: wheel_size as u64,
            now_tick: start_tick,
            bucket_heads: vec![NIL; wheel_size],
            overflow_head: NIL,
            overflow_count_approx: 0,
            budget_per_tick,
            pending_target_tick: None,
        })
    }

    /// Latest fully or partially processed tick.
    #[inline]
    pub fn now_tick(&self) -> u64 {
        self.now_tick
    }

    /// Number of buckets in the ring.
    #[inline]
    pub fn wheel_size(&self) -> usize {
        self.wheel_size
    }

    /// Ticks the ring can address directly; farther expiries go to overflow.
    #[inline]
    pub fn horizon_ticks(&self) -> u64 {
        self.horizon_ticks
    }

    /// Approximate number of entries waiting in the overflow list.
    #[inline]
    pub fn overflow_len_approx(&self) -> usize {
        self.overflow_count_approx
    }

    /// Target remembered from a budget-exhausted advance, if any.
    #[inline]
    pub fn pending_target_tick(&self) -> Option<u64> {
        self.pending_target_tick
    }

    /// Schedules `id` to expire at `expire_tick`, unlinking it first if it is
    /// already scheduled.
    ///
    /// Fails with `ScheduleInPast` when `expire_tick <= now_tick`; callers
    /// must only request future ticks.
    pub fn schedule<K, V>(
        &mut self,
        arena: &mut EntryArena<K, V>,
        id: i32,
        expire_tick: u64,
    ) -> Result<(), CoreError> {
        if expire_tick <= self.now_tick {
            return Err(CoreError::ScheduleInPast {
                expire_tick,
                now_tick: self.now_tick,
            });
        }

        self.unlink(arena, id);
        arena.expires_tick[id as usize] = expire_tick;

        if expire_tick - self.now_tick > self.horizon_ticks {
            self.attach(arena, id, BUCKET_OVERFLOW);
        } else {
            self.attach(arena, id, (expire_tick & self.wheel_mask) as i32);
        }
        Ok(())
    }

    /// Removes `id` from whichever list holds it. No-op when unscheduled.
    pub fn unlink<K, V>(&mut self, arena: &mut EntryArena<K, V>, id: i32) {
        if arena.wheel_bucket[id as usize] == BUCKET_NONE {
            return;
        }
        self.detach(arena, id);
    }

    /// Advances the wheel to the current tick of the supplied target,
    /// invoking `on_expire` for every due entry.
    ///
    /// Returns `true` when fully caught up, `false` when the work budget ran
    /// out first (the effective target is remembered for the next call).
    pub fn advance_to_tick<K, V, F>(
        &mut self,
        arena: &mut EntryArena<K, V>,
        target_tick: u64,
        mut on_expire: F,
    ) -> bool
    where
        F: FnMut(&mut EntryArena<K, V>, i32),
    {
        let effective = match self.pending_target_tick {
            Some(pending) => pending.max(target_tick),
            None => target_tick,
        };

        let mut budget = self.budget_per_tick;
        while self.now_tick < effective {
            if budget == 0 {
                self.pending_target_tick = Some(effective);
                return false;
            }
            self.now_tick += 1;
            if !self.drain_overflow(arena, &mut budget, &mut on_expire)
                || !self.process_current_bucket(arena, &mut budget, &mut on_expire)
            {
                self.pending_target_tick = Some(effective);
                return false;
            }
        }

        self.pending_target_tick = None;
        true
    }

    /// Walks the overflow list, expiring due entries and re-homing entries
    /// that fell within the horizon. Every examined slot costs one unit of
    /// budget. Returns `false` when the budget ran out mid-walk.
    fn drain_overflow<K, V, F>(
        &mut self,
        arena: &mut EntryArena<K, V>,
        budget: &mut usize,
        on_expire: &mut F,
    ) -> bool
    where
        F: FnMut(&mut EntryArena<K, V>, i32),
    {
        let mut cur = self.overflow_head;
        while cur != NIL {
            if *budget == 0 {
                return false;
            }
            let id = cur;
            // Capture before any relink; the walk must survive mutation.
            cur = arena.wheel_next[id as usize];

            let expires = arena.expires_tick[id as usize];
            if expires.saturating_sub(self.now_tick) <= self.horizon_ticks {
                self.detach(arena, id);
                if expires <= self.now_tick {
                    on_expire(arena, id);
                } else {
                    self.attach(arena, id, (expires & self.wheel_mask) as i32);
                }
            }
            *budget -= 1;
        }
        true
    }

    /// Walks the bucket addressed by the current tick. Due entries are
    /// expired; a not-yet-due entry that hashes elsewhere (wrap-around
    /// straggler) is relocated to its correct bucket. Every visited entry
    /// costs one unit of budget.
    fn process_current_bucket<K, V, F>(
        &mut self,
        arena: &mut EntryArena<K, V>,
        budget: &mut usize,
        on_expire: &mut F,
    ) -> bool
    where
        F: FnMut(&mut EntryArena<K, V>, i32),
    {
        let bucket = (self.now_tick & self.wheel_mask) as i32;
        let mut cur = self.bucket_heads[bucket as usize];
        while cur != NIL {
            if *budget == 0 {
                return false;
            }
            let id = cur;
            cur = arena.wheel_next[id as usize];

            let expires = arena.expires_tick[id as usize];
            if expires <= self.now_tick {
                self.detach(arena, id);
                on_expire(arena, id);
            } else {
                let correct = (expires & self.wheel_mask) as i32;
                if correct != bucket {
                    self.detach(arena, id);
                    self.attach(arena, id, correct);
                }
            }
            *budget -= 1;
        }
        true
    }

    /// Links `id` at the head of `bucket` (a ring index or
    /// [`BUCKET_OVERFLOW`]) and records the membership.
    fn attach<K, V>(&mut self, arena: &mut EntryArena<K, V>, id: i32, bucket: i32) {
        let i = id as usize;
        let head = if bucket == BUCKET_OVERFLOW {
            self.overflow_head
        } else {
            self.bucket_heads[bucket as usize]
        };

        arena.wheel_prev[i] = NIL;
        arena.wheel_next[i] = head;
        if head != NIL {
            arena.wheel_prev[head as usize] = id;
        }
        arena.wheel_bucket[i] = bucket;

        if bucket == BUCKET_OVERFLOW {
            self.overflow_head = id;
            self.overflow_count_approx += 1;
        } else {
            self.bucket_heads[bucket as usize] = id;
        }
    }

    /// Splices `id` out of its current list and clears its wheel columns.
    /// Requires the slot to be linked.
    fn detach<K, V>(&mut self, arena: &mut EntryArena<K, V>, id: i32) {
        let i = id as usize;
        let bucket = arena.wheel_bucket[i];
        debug_assert_ne!(bucket, BUCKET_NONE, "detach of unscheduled slot");

        let prev = arena.wheel_prev[i];
        let next = arena.wheel_next[i];
        if prev != NIL {
            arena.wheel_next[prev as usize] = next;
        } else if bucket == BUCKET_OVERFLOW {
            self.overflow_head = next;
        } else {
            self.bucket_heads[bucket as usize] = next;
        }
        if next != NIL {
            arena.wheel_prev[next as usize] = prev;
        }

        if bucket == BUCKET_OVERFLOW {
            self.overflow_count_approx = self.overflow_count_approx.saturating_sub(1);
        }

        arena.wheel_next[i] = NIL;
        arena.wheel_prev[i] = NIL;
        arena.wheel_bucket[i] = BUCKET_NONE;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants<K, V>(&self, arena: &EntryArena<K, V>) {
        let mut linked = 0usize;

        let check_list = |head: i32, bucket: i32| {
            let mut count = 0usize;
            let mut prev = NIL;
            let mut cur = head;
            while cur != NIL {
                let i = cur as usize;
                assert_eq!(arena.wheel_bucket[i], bucket, "membership column mismatch");
                assert_eq!(arena.wheel_prev[i], prev, "prev link mismatch");
                prev = cur;
                cur = arena.wheel_next[i];
                count += 1;
                assert!(count <= arena.size_allocated(), "cycle in wheel list");
            }
            count
        };

        for (b, &head) in self.bucket_heads.iter().enumerate() {
            linked += check_list(head, b as i32);
        }
        let overflow = check_list(self.overflow_head, BUCKET_OVERFLOW);
        linked += overflow;
        assert_eq!(overflow, self.overflow_count_approx);

        // Every slot claiming membership must actually be reachable.
        let claiming = (0..arena.size_allocated() as i32)
            .filter(|&id| arena.wheel_bucket[id as usize] != BUCKET_NONE)
            .count();
        assert_eq!(claiming, linked);
    }
}
