//! Deterministic virtual-time lab for testing sequences.
//!
//! The lab provides:
//!
//! - A virtual clock that only moves when driven ([`VirtualTimeScheduler`])
//! - Hot and cold test sources that record their subscription windows
//! - A recording [`TestObserver`]
//! - A standard create / subscribe / dispose timeline ([`VirtualTimeScheduler::start`])
//!
//! ```
//! use pushflow::lab::{on_completed, on_next, subscribed, VirtualTimeScheduler};
//!
//! let vts = VirtualTimeScheduler::new();
//! let xs = vts.create_cold_observable(vec![on_next(10, 1), on_completed(20)]);
//! let seq = xs.seq();
//! let res = vts.start(move || seq.map(|x| x * 2)).unwrap();
//! assert_eq!(res.messages(), vec![on_next(210, 2), on_completed(220)]);
//! assert_eq!(xs.subscriptions(), vec![subscribed(200, 220)]);
//! ```

pub mod config;
mod cold;
mod harness;
mod hot;
mod observer;
mod recorded;
mod virtual_time;

pub use cold::ColdObservable;
pub use config::LabConfig;
pub use hot::HotObservable;
pub use observer::TestObserver;
pub use recorded::{
    on_completed, on_error, on_next, subscribed, subscribed_open, Recorded, SubscriptionWindow,
};
pub use virtual_time::{ClockState, VirtualTimeScheduler};
