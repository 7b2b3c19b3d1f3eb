// Export components
pub mod brief;
pub mod google_calendar;
pub mod google_sheets;
pub mod meeting_watch;
pub mod oauth;

pub use brief::{BriefGenerator, BriefRequest, PrepBrief};
pub use google_calendar::{Meeting, MeetingSource};
pub use google_sheets::{ContactNote, ContactNotes, ContactSource};
pub use meeting_watch::{MeetingSnapshot, MeetingWatch};
