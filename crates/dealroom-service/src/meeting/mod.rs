//! Meeting response and reschedule services.

pub mod service;

pub use service::{MeetingService, RescheduleOutcome, UpdateResponseOutcome};
