//! Schedule generation: ceremony-time parsing, the two day-of strategies,
//! and the sorted, rendered item list.

pub mod clock;
pub mod generator;
pub mod item;

pub use clock::{ceremony_anchor, parse_clock_time, render_clock};
pub use generator::{PlannedSlot, family_formals_minutes, generate, plan_day};
pub use item::{GenerationParameters, ScheduleInputs, ScheduleItem};
