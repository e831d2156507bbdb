//! The derived cache views.

mod announcement;
mod featured_speaker;

pub use announcement::{ANNOUNCEMENT_PREFIX, AnnouncementView, NEARLY_SOLD_OUT_SEATS};
pub use featured_speaker::FeaturedSpeakerView;
