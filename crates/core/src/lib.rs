pub mod meeting;
pub mod types;

pub use meeting::{FileEntry, MeetingRecord, MeetingUpdate, public_path_for};
pub use types::{BlobName, MeetingId};
