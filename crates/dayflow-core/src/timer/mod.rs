mod service;

pub use service::{TimerService, TimerSession, TimerSnapshot, TimerState};
