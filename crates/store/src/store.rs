use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use huddle_blob::BlobStore;
use huddle_core::{BlobName, FileEntry, MeetingId, MeetingRecord, MeetingUpdate};

use crate::error::StoreError;

/// Number of characters in a generated meeting id.
const MEETING_ID_LEN: usize = 8;

/// The persisted aggregate: every meeting, keyed by id.
///
/// The whole aggregate is the unit of persistence; every mutation reads it in
/// full and rewrites it in full.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub meetings: BTreeMap<MeetingId, MeetingRecord>,
}

/// One blob the cascade failed to remove.
#[derive(Debug, Clone, Serialize)]
pub struct BlobCleanupFailure {
    pub blob_name: BlobName,
    pub reason: String,
}

/// Outcome of a best-effort blob cascade.
///
/// The enclosing metadata operation succeeds regardless of what lands in
/// `failures`; callers that care (operators, tests) can assert on both parts
/// independently.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Blobs physically removed.
    pub deleted: Vec<BlobName>,
    /// Blobs that could not be removed, with the reason.
    pub failures: Vec<BlobCleanupFailure>,
}

impl CleanupReport {
    fn record(&mut self, name: &BlobName, outcome: Result<bool, huddle_blob::BlobError>) {
        match outcome {
            Ok(true) => self.deleted.push(name.clone()),
            Ok(false) => debug!(blob = %name, "blob already absent during cleanup"),
            Err(e) => {
                warn!(blob = %name, error = %e, "blob cleanup failed");
                self.failures.push(BlobCleanupFailure {
                    blob_name: name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// The meeting document store.
///
/// Owns the serialized aggregate file and the blob lifecycle. Every mutating
/// operation runs one load-mutate-save cycle under an internal mutex, so
/// concurrent admin actions cannot interleave and drop each other's updates.
/// Saves go through a temp file plus rename, so a failed save never leaves a
/// half-written aggregate behind.
pub struct DocumentStore {
    path: PathBuf,
    blobs: Arc<dyn BlobStore>,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Open a store persisting to `path`, owning blobs in `blobs`.
    ///
    /// The aggregate file is not created until the first mutation; a missing
    /// file reads as the empty aggregate.
    pub fn new(path: impl Into<PathBuf>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            path: path.into(),
            blobs,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a new meeting with default fields and return its fresh id.
    ///
    /// Id creation and persistence are one atomic step: the id is only handed
    /// out once the record holding it is durably saved.
    pub async fn create_meeting(&self) -> Result<MeetingId, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;

        let id = generate_meeting_id(&data);
        data.meetings.insert(id.clone(), MeetingRecord::default());

        self.persist(&data).await?;
        debug!(meeting = %id, "meeting created");
        Ok(id)
    }

    /// Fetch one meeting record. Read-only; takes no lock.
    pub async fn fetch(&self, id: &MeetingId) -> Result<MeetingRecord, StoreError> {
        let data = self.load().await?;
        data.meetings
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::MeetingNotFound(id.clone()))
    }

    /// Every record with its id attached, in stable key order.
    pub async fn list_all(&self) -> Result<Vec<(MeetingId, MeetingRecord)>, StoreError> {
        let data = self.load().await?;
        Ok(data.meetings.into_iter().collect())
    }

    /// Merge the supplied metadata fields into an existing record.
    pub async fn update_info(
        &self,
        id: &MeetingId,
        update: MeetingUpdate,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;

        let record = data
            .meetings
            .get_mut(id)
            .ok_or_else(|| StoreError::MeetingNotFound(id.clone()))?;
        update.apply_to(record);

        self.persist(&data).await
    }

    /// Delete a meeting, cascading to every blob its files reference.
    ///
    /// Blob removal is best-effort: individual failures land in the returned
    /// [`CleanupReport`] and do not abort the metadata delete.
    pub async fn delete_meeting(&self, id: &MeetingId) -> Result<CleanupReport, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;

        let record = data
            .meetings
            .remove(id)
            .ok_or_else(|| StoreError::MeetingNotFound(id.clone()))?;

        let mut report = CleanupReport::default();
        for entry in &record.files {
            report.record(&entry.blob_name, self.blobs.delete(&entry.blob_name).await);
        }

        self.persist(&data).await?;
        debug!(
            meeting = %id,
            blobs_deleted = report.deleted.len(),
            blobs_failed = report.failures.len(),
            "meeting deleted"
        );
        Ok(report)
    }

    /// Register an already-staged blob as a document of the meeting.
    ///
    /// The byte transfer is assumed complete before this runs; the entry is
    /// appended after any existing files and blob existence is not
    /// re-validated here.
    pub async fn attach_file(
        &self,
        id: &MeetingId,
        blob_name: BlobName,
        original_name: &str,
        display_name_override: Option<&str>,
        category: &str,
    ) -> Result<FileEntry, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;

        let record = data
            .meetings
            .get_mut(id)
            .ok_or_else(|| StoreError::MeetingNotFound(id.clone()))?;
        let entry = FileEntry::new(blob_name, original_name, display_name_override, category);
        record.files.push(entry.clone());

        self.persist(&data).await?;
        Ok(entry)
    }

    /// Remove the file entry matching `blob_name` and delete its blob.
    ///
    /// A blob name with no matching entry is a metadata no-op, not an error;
    /// physical deletion is still attempted. Metadata is the source of truth
    /// for whether the file is attached, so blob deletion failures are
    /// reported but never roll the removal back.
    pub async fn detach_file(
        &self,
        id: &MeetingId,
        blob_name: &BlobName,
    ) -> Result<CleanupReport, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;

        let record = data
            .meetings
            .get_mut(id)
            .ok_or_else(|| StoreError::MeetingNotFound(id.clone()))?;

        let before = record.files.len();
        record.files.retain(|entry| entry.blob_name != *blob_name);
        let changed = record.files.len() != before;

        let mut report = CleanupReport::default();
        report.record(blob_name, self.blobs.delete(blob_name).await);

        if changed {
            self.persist(&data).await?;
        }
        Ok(report)
    }

    /// Report blobs present in the blob area but referenced by no record.
    ///
    /// Reconciliation only: nothing is deleted. An empty result means the
    /// no-dangling-metadata invariant holds in the other direction too.
    pub async fn sweep_orphans(&self) -> Result<Vec<BlobName>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let data = self.load().await?;

        let referenced: BTreeSet<&BlobName> = data
            .meetings
            .values()
            .flat_map(|record| record.files.iter().map(|entry| &entry.blob_name))
            .collect();

        let present = self
            .blobs
            .list()
            .await
            .map_err(|e| StoreError::Persistence(format!("failed to list blob area: {e}")))?;

        Ok(present
            .into_iter()
            .filter(|name| !referenced.contains(name))
            .collect())
    }

    async fn load(&self) -> Result<StoreData, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreData::default());
            }
            Err(e) => {
                return Err(StoreError::Persistence(format!(
                    "failed to read aggregate {}: {e}",
                    self.path.display()
                )));
            }
        };

        serde_json::from_str(&raw).map_err(|e| {
            StoreError::Persistence(format!(
                "failed to parse aggregate {}: {e}",
                self.path.display()
            ))
        })
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Persistence(format!("failed to prepare {}: {e}", parent.display())))?;
        }

        let payload = serde_json::to_vec_pretty(data)
            .map_err(|e| StoreError::Persistence(format!("failed to encode aggregate: {e}")))?;

        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|e| StoreError::Persistence(format!("failed to write aggregate: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StoreError::Persistence(format!("failed to finalize aggregate: {e}")))
    }
}

/// Generate a short URL-safe id not already a key in `data`.
///
/// Collisions are re-checked against the live aggregate rather than assumed
/// improbable; on a hit the id is simply regenerated.
fn generate_meeting_id(data: &StoreData) -> MeetingId {
    loop {
        let raw = Uuid::new_v4().simple().to_string();
        let id = MeetingId::new(&raw[..MEETING_ID_LEN]);
        if !data.meetings.contains_key(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use huddle_blob::FsBlobStore;

    struct Fixture {
        _dir: tempfile::TempDir,
        blobs: Arc<FsBlobStore>,
        store: Arc<DocumentStore>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let blobs = Arc::new(FsBlobStore::new(dir.path().join("uploads")).unwrap());
        let store = Arc::new(DocumentStore::new(
            dir.path().join("meetings.json"),
            blobs.clone(),
        ));
        Fixture {
            _dir: dir,
            blobs,
            store,
        }
    }

    async fn stage(blobs: &FsBlobStore, content: &'static [u8]) -> BlobName {
        blobs.stage("upload.pdf", Bytes::from_static(content)).await.unwrap()
    }

    #[tokio::test]
    async fn create_returns_fresh_ids() {
        let fx = fixture();
        let a = fx.store.create_meeting().await.unwrap();
        let b = fx.store.create_meeting().await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), MEETING_ID_LEN);

        let record = fx.store.fetch(&a).await.unwrap();
        assert_eq!(record, MeetingRecord::default());
    }

    #[tokio::test]
    async fn concurrent_creates_never_collide() {
        let fx = fixture();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = fx.store.clone();
            handles.push(tokio::spawn(async move { store.create_meeting().await }));
        }

        let mut ids = BTreeSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(fx.store.list_all().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn fetch_unknown_id_is_not_found() {
        let fx = fixture();
        let err = fx.store.fetch(&MeetingId::new("missing1")).await.unwrap_err();
        assert!(matches!(err, StoreError::MeetingNotFound(_)));
    }

    #[tokio::test]
    async fn update_info_touches_only_supplied_fields() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();

        fx.store
            .update_info(
                &id,
                MeetingUpdate {
                    title: Some("Sprint review".into()),
                    ..MeetingUpdate::default()
                },
            )
            .await
            .unwrap();

        let record = fx.store.fetch(&id).await.unwrap();
        assert_eq!(record.title, "Sprint review");
        assert_eq!(record.time, "");
        assert_eq!(record.members, "");
        assert_eq!(record.location, "");
        assert!(record.files.is_empty());
    }

    #[tokio::test]
    async fn update_info_unknown_id_is_not_found() {
        let fx = fixture();
        let err = fx
            .store
            .update_info(&MeetingId::new("missing1"), MeetingUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MeetingNotFound(_)));
    }

    #[tokio::test]
    async fn attach_detach_sequence_keeps_attachment_order() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();

        let a = stage(&fx.blobs, b"a").await;
        let b = stage(&fx.blobs, b"b").await;
        let c = stage(&fx.blobs, b"c").await;
        for (blob, name) in [(&a, "a.pdf"), (&b, "b.pdf"), (&c, "c.pdf")] {
            fx.store
                .attach_file(&id, blob.clone(), name, None, "docs")
                .await
                .unwrap();
        }

        fx.store.detach_file(&id, &b).await.unwrap();

        let record = fx.store.fetch(&id).await.unwrap();
        let names: Vec<&BlobName> = record.files.iter().map(|f| &f.blob_name).collect();
        assert_eq!(names, vec![&a, &c]);
    }

    #[tokio::test]
    async fn round_trip_detach_first_of_two() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();

        let first = stage(&fx.blobs, b"first").await;
        let second = stage(&fx.blobs, b"second").await;
        fx.store
            .attach_file(&id, first.clone(), "first.pdf", None, "agenda")
            .await
            .unwrap();
        fx.store
            .attach_file(&id, second.clone(), "second.pdf", Some("Minutes"), "notes")
            .await
            .unwrap();

        fx.store.detach_file(&id, &first).await.unwrap();

        let record = fx.store.fetch(&id).await.unwrap();
        assert_eq!(record.files.len(), 1);
        let entry = &record.files[0];
        assert_eq!(entry.display_name, "Minutes");
        assert_eq!(entry.category, "notes");
        assert_eq!(entry.public_path, format!("/view/{second}"));
        assert_eq!(entry.blob_name, second);
        assert!(!fx.blobs.exists(&first).await.unwrap());
        assert!(fx.blobs.exists(&second).await.unwrap());
    }

    #[tokio::test]
    async fn detach_unmatched_blob_is_metadata_noop_but_deletes_bytes() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();
        let attached = stage(&fx.blobs, b"attached").await;
        fx.store
            .attach_file(&id, attached.clone(), "kept.pdf", None, "docs")
            .await
            .unwrap();

        // Staged but never registered in metadata.
        let stray = stage(&fx.blobs, b"stray").await;
        let report = fx.store.detach_file(&id, &stray).await.unwrap();

        assert_eq!(report.deleted, vec![stray.clone()]);
        assert!(!fx.blobs.exists(&stray).await.unwrap());
        let record = fx.store.fetch(&id).await.unwrap();
        assert_eq!(record.files.len(), 1);
    }

    #[tokio::test]
    async fn delete_meeting_cascades_to_blobs() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();
        let a = stage(&fx.blobs, b"a").await;
        let b = stage(&fx.blobs, b"b").await;
        fx.store
            .attach_file(&id, a.clone(), "a.pdf", None, "docs")
            .await
            .unwrap();
        fx.store
            .attach_file(&id, b.clone(), "b.pdf", None, "docs")
            .await
            .unwrap();

        let report = fx.store.delete_meeting(&id).await.unwrap();
        assert_eq!(report.deleted.len(), 2);
        assert!(report.failures.is_empty());
        assert!(!fx.blobs.exists(&a).await.unwrap());
        assert!(!fx.blobs.exists(&b).await.unwrap());

        let err = fx.store.fetch(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::MeetingNotFound(_)));
    }

    #[tokio::test]
    async fn delete_unknown_meeting_is_not_found() {
        let fx = fixture();
        let err = fx
            .store
            .delete_meeting(&MeetingId::new("missing1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MeetingNotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_updates_on_different_meetings_both_land() {
        let fx = fixture();
        let a = fx.store.create_meeting().await.unwrap();
        let b = fx.store.create_meeting().await.unwrap();

        let store_a = fx.store.clone();
        let id_a = a.clone();
        let task_a = tokio::spawn(async move {
            store_a
                .update_info(
                    &id_a,
                    MeetingUpdate {
                        title: Some("Meeting A".into()),
                        ..MeetingUpdate::default()
                    },
                )
                .await
        });
        let store_b = fx.store.clone();
        let id_b = b.clone();
        let task_b = tokio::spawn(async move {
            store_b
                .update_info(
                    &id_b,
                    MeetingUpdate {
                        title: Some("Meeting B".into()),
                        ..MeetingUpdate::default()
                    },
                )
                .await
        });
        task_a.await.unwrap().unwrap();
        task_b.await.unwrap().unwrap();

        assert_eq!(fx.store.fetch(&a).await.unwrap().title, "Meeting A");
        assert_eq!(fx.store.fetch(&b).await.unwrap().title, "Meeting B");
    }

    #[tokio::test]
    async fn concurrent_updates_on_same_meeting_do_not_corrupt() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = fx.store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update_info(
                        &id,
                        MeetingUpdate {
                            title: Some(format!("Title {i}")),
                            members: Some(format!("Team {i}")),
                            ..MeetingUpdate::default()
                        },
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // The final state is one writer's merge, never a mixture.
        let record = fx.store.fetch(&id).await.unwrap();
        let title_n = record.title.strip_prefix("Title ").unwrap();
        let members_n = record.members.strip_prefix("Team ").unwrap();
        assert_eq!(title_n, members_n);
    }

    #[tokio::test]
    async fn corrupt_aggregate_surfaces_persistence_error() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();

        let path = fx._dir.path().join("meetings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = fx.store.fetch(&id).await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        let err = fx.store.create_meeting().await.unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));

        // The broken file is left for the operator, not clobbered.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn sweep_reports_exactly_the_unreferenced_blobs() {
        let fx = fixture();
        let id = fx.store.create_meeting().await.unwrap();
        let kept = stage(&fx.blobs, b"kept").await;
        fx.store
            .attach_file(&id, kept.clone(), "kept.pdf", None, "docs")
            .await
            .unwrap();
        let orphan = stage(&fx.blobs, b"orphan").await;

        let orphans = fx.store.sweep_orphans().await.unwrap();
        assert_eq!(orphans, vec![orphan]);
    }

    #[tokio::test]
    async fn aggregate_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = Arc::new(FsBlobStore::new(dir.path().join("uploads")).unwrap());
        let path = dir.path().join("meetings.json");

        let id = {
            let store = DocumentStore::new(&path, blobs.clone());
            let id = store.create_meeting().await.unwrap();
            store
                .update_info(
                    &id,
                    MeetingUpdate {
                        location: Some("Room 12".into()),
                        ..MeetingUpdate::default()
                    },
                )
                .await
                .unwrap();
            id
        };

        let reopened = DocumentStore::new(&path, blobs);
        let record = reopened.fetch(&id).await.unwrap();
        assert_eq!(record.location, "Room 12");
    }
}
