use serde::{Deserialize, Serialize};

use crate::types::BlobName;

/// Derive the public viewing path for a blob.
///
/// The path is stable for the lifetime of the blob: clients store it inside
/// meeting records and the view route resolves it back to the blob name.
#[must_use]
pub fn public_path_for(blob_name: &BlobName) -> String {
    format!("/view/{blob_name}")
}

/// One document attached to a meeting.
///
/// Owned exclusively by its parent [`MeetingRecord`]; `blob_name` is the join
/// key to the physical bytes in the blob area and is never handed out as the
/// viewing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Human-facing name shown in the document list.
    pub display_name: String,
    /// Free-form classification tag.
    pub category: String,
    /// Externally addressable path used to stream the file for viewing.
    pub public_path: String,
    /// Name of the bytes in the blob area; used for physical deletion.
    pub blob_name: BlobName,
}

impl FileEntry {
    /// Build an entry for a freshly staged blob.
    ///
    /// `display_name` falls back to the original uploaded name when no
    /// override is supplied; `public_path` is derived from the blob name.
    #[must_use]
    pub fn new(
        blob_name: BlobName,
        original_name: &str,
        display_name_override: Option<&str>,
        category: impl Into<String>,
    ) -> Self {
        let display_name = display_name_override
            .filter(|name| !name.is_empty())
            .unwrap_or(original_name)
            .to_owned();
        Self {
            display_name,
            category: category.into(),
            public_path: public_path_for(&blob_name),
            blob_name,
        }
    }
}

/// One meeting and its attached documents.
///
/// The meeting id is the key under which the record is stored in the
/// aggregate, not a field of the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub title: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub location: String,
    /// Attached documents in attachment order.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl Default for MeetingRecord {
    fn default() -> Self {
        Self {
            title: "New meeting".to_owned(),
            time: String::new(),
            members: String::new(),
            location: String::new(),
            files: Vec::new(),
        }
    }
}

/// Partial update for meeting metadata.
///
/// Only the four info fields are representable; `files` and the id cannot be
/// replaced through this type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeetingUpdate {
    pub title: Option<String>,
    pub time: Option<String>,
    pub members: Option<String>,
    pub location: Option<String>,
}

impl MeetingUpdate {
    /// Merge the supplied fields into `record`, leaving the rest untouched.
    pub fn apply_to(&self, record: &mut MeetingRecord) {
        if let Some(ref title) = self.title {
            record.title = title.clone();
        }
        if let Some(ref time) = self.time {
            record.time = time.clone();
        }
        if let Some(ref members) = self.members {
            record.members = members.clone();
        }
        if let Some(ref location) = self.location {
            record.location = location.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_entry_uses_override_when_present() {
        let entry = FileEntry::new(
            BlobName::new("abc123"),
            "report.pdf",
            Some("Q3 report"),
            "finance",
        );
        assert_eq!(entry.display_name, "Q3 report");
        assert_eq!(entry.public_path, "/view/abc123");
    }

    #[test]
    fn file_entry_falls_back_to_original_name() {
        let entry = FileEntry::new(BlobName::new("abc123"), "report.pdf", None, "finance");
        assert_eq!(entry.display_name, "report.pdf");

        let entry = FileEntry::new(BlobName::new("abc123"), "report.pdf", Some(""), "finance");
        assert_eq!(entry.display_name, "report.pdf");
    }

    #[test]
    fn update_merges_only_supplied_fields() {
        let mut record = MeetingRecord {
            title: "Kickoff".into(),
            time: "10:00".into(),
            members: "Alice, Bob".into(),
            location: "Room 4".into(),
            files: vec![FileEntry::new(
                BlobName::new("blob-1"),
                "agenda.pdf",
                None,
                "agenda",
            )],
        };

        MeetingUpdate {
            title: Some("Kickoff v2".into()),
            ..MeetingUpdate::default()
        }
        .apply_to(&mut record);

        assert_eq!(record.title, "Kickoff v2");
        assert_eq!(record.time, "10:00");
        assert_eq!(record.members, "Alice, Bob");
        assert_eq!(record.location, "Room 4");
        assert_eq!(record.files.len(), 1);
    }

    #[test]
    fn record_serde_tolerates_missing_optional_fields() {
        let record: MeetingRecord = serde_json::from_str(r#"{"title": "Standup"}"#).unwrap();
        assert_eq!(record.title, "Standup");
        assert!(record.files.is_empty());
    }

    #[test]
    fn file_entry_serde_uses_camel_case() {
        let entry = FileEntry::new(BlobName::new("abc123"), "notes.pdf", None, "notes");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"displayName\""));
        assert!(json.contains("\"publicPath\""));
        assert!(json.contains("\"blobName\""));
    }
}
