//! Meeting and participant entities.

pub mod model;
pub mod participant;

pub use model::Meeting;
pub use participant::{MeetingParticipant, ResponseStatus};
