//! Calendar connection entities.

pub mod connection;

pub use connection::{CalendarConnection, CalendarInList};
