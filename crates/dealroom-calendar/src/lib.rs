//! # dealroom-calendar
//!
//! Google Calendar implementation of the [`CalendarProvider`] trait:
//! watch-channel registration/teardown, event listing for reconciliation,
//! attendee patching, and OAuth access-token refresh.
//!
//! [`CalendarProvider`]: dealroom_core::traits::CalendarProvider

pub mod google;

pub use google::GoogleCalendarProvider;
