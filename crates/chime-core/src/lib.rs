//! # Chime Core Library
//!
//! Next-reminder resolution for calendar events and the one-shot alarm chain
//! that keeps exactly one wake-up pending per event.
//!
//! ## Features
//!
//! - **Fixed-Period Recurrence**: Daily, weekly and biweekly series stepped in
//!   epoch seconds, honoring skipped occurrences
//! - **Calendar Recurrence**: Monthly and yearly series stepped on the civil
//!   calendar of an IANA timezone, clamping short months without drift
//! - **Multiple Reminders**: Every offset competes; the earliest fire time wins
//! - **Repeat Limits**: Series stop reminding once their cutoff is reached
//! - **One-Shot Scheduling**: Only the next reminder is ever scheduled; each
//!   wake-up computes its successor
//!
//! ## Core Modules
//!
//! - [`models`]: Events, repeat intervals and scheduling requests
//! - [`recurrence`]: Per-offset occurrence stepping
//! - [`reminder`]: Reduction to the single next fire time
//! - [`scheduler`]: Clocks, timer services and the alarm boundary
//! - [`service`]: Event lookup, notification and the rescheduling chain
//! - [`text`]: Display strings for lead times and repetition
//! - [`timezone`]: Timezone utilities
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chime_core::{
//!     models::{Event, RepeatInterval},
//!     reminder::{NextReminderResolver, ReminderConfig, Resolution},
//! };
//!
//! let event = Event {
//!     id: 1,
//!     title: "Standup".to_string(),
//!     start_ts: 1_750_000_000,
//!     repeat_interval: RepeatInterval::Day,
//!     reminders: vec![10, 60],
//!     ..Default::default()
//! };
//!
//! let resolver = NextReminderResolver::new(ReminderConfig::default());
//! match resolver.resolve_at(&event, 1_750_000_000 - 86_400) {
//!     Resolution::Due(request) => println!("fire at {}", request.fire_at),
//!     Resolution::NoReminderDue(reason) => println!("nothing due: {}", reason),
//! }
//! ```

pub mod error;
pub mod models;
pub mod recurrence;
pub mod reminder;
pub mod scheduler;
pub mod service;
pub mod text;
pub mod timezone;
