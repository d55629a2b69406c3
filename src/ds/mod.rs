pub mod entry_arena;
pub mod lru_list;
pub mod timer_wheel;

pub use entry_arena::{EntryArena, BUCKET_NONE, BUCKET_OVERFLOW, NIL};
pub use lru_list::LruList;
pub use timer_wheel::TimerWheel;
