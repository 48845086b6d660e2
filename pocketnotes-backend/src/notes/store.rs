//! NoteStore — ordered notes collection mirrored to a JSON document
//!
//! Holds the full list in memory (newest-created-first) and re-serializes
//! the whole collection to `notes.json` after every mutation. The caller
//! sees storage updated before the operation returns.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

/// A single user-authored note entry.
///
/// Field names stay camelCase on the wire so the stored document matches
/// what the web client reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Milliseconds since epoch, immutable after creation
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Milliseconds since epoch, refreshed on every edit
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

/// Form data for creating or updating a note.
///
/// `image_url` carries an already-encoded data URL; `None` on update means
/// "keep the existing image".
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// NoteStore wrapping the on-disk JSON document
pub struct NoteStore {
    path: PathBuf,
    notes: Mutex<Vec<Note>>,
}

impl NoteStore {
    /// Open the store, loading any previously persisted collection.
    ///
    /// A missing or unparsable file falls back to an empty collection —
    /// there is no schema versioning, so a corrupt document is logged and
    /// abandoned rather than surfaced to the user.
    pub fn new(path: PathBuf) -> Self {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let notes = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<Note>>(&raw) {
                Ok(notes) => notes,
                Err(e) => {
                    log::warn!(
                        "[NOTES] Store file {} is unparsable ({}), starting empty",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                log::warn!(
                    "[NOTES] Failed to read store file {} ({}), starting empty",
                    path.display(),
                    e
                );
                Vec::new()
            }
        };

        log::info!("[NOTES] Loaded {} note(s) from {}", notes.len(), path.display());

        Self {
            path,
            notes: Mutex::new(notes),
        }
    }

    /// Snapshot of the collection, newest-created-first
    pub fn list(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    /// Look up a note by id; O(n) scan, no index
    pub fn get(&self, id: &str) -> Option<Note> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .find(|note| note.id == id)
            .cloned()
    }

    /// Create a note from form data and prepend it to the collection
    pub fn create(&self, draft: NoteDraft) -> io::Result<Note> {
        let timestamp = Utc::now().timestamp_millis();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            content: draft.content,
            image_url: draft.image_url,
            created_at: timestamp,
            updated_at: timestamp,
        };

        let mut notes = self.notes.lock().unwrap();
        notes.insert(0, note.clone());
        self.persist(&notes)?;

        Ok(note)
    }

    /// Update an existing note in place; `Ok(None)` when the id is unknown.
    ///
    /// The image is replaced only when the draft carries a new one,
    /// otherwise the prior value is retained. `id` and `created_at` never
    /// change and the entry keeps its position in the collection.
    pub fn update(&self, id: &str, draft: NoteDraft) -> io::Result<Option<Note>> {
        let mut notes = self.notes.lock().unwrap();

        let Some(index) = notes.iter().position(|note| note.id == id) else {
            return Ok(None);
        };

        let existing = &notes[index];
        // The millisecond clock may not tick between two mutations, but an
        // edit must still be observably newer than what it replaced.
        let updated_at = Utc::now()
            .timestamp_millis()
            .max(existing.updated_at + 1);

        let updated = Note {
            id: existing.id.clone(),
            title: draft.title,
            content: draft.content,
            image_url: draft.image_url.or_else(|| existing.image_url.clone()),
            created_at: existing.created_at,
            updated_at,
        };

        notes[index] = updated.clone();
        self.persist(&notes)?;

        Ok(Some(updated))
    }

    /// Remove a note by id; returns whether anything was removed
    pub fn delete(&self, id: &str) -> io::Result<bool> {
        let mut notes = self.notes.lock().unwrap();

        let before = notes.len();
        notes.retain(|note| note.id != id);
        if notes.len() == before {
            return Ok(false);
        }

        self.persist(&notes)?;
        Ok(true)
    }

    /// Serialize the full collection to disk.
    ///
    /// Writes a sibling temp file and renames it over the store document,
    /// so a crash mid-write cannot truncate the store. Concurrent processes
    /// are still last-writer-wins; that is an accepted limitation.
    fn persist(&self, notes: &[Note]) -> io::Result<()> {
        let raw = serde_json::to_vec(notes)?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &raw)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            image_url: None,
        }
    }

    #[test]
    fn test_create_on_empty_collection() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        let note = store.create(draft("A", "B")).expect("Failed to create note");

        let notes = store.list();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "A");
        assert_eq!(notes[0].content, "B");
        assert!(notes[0].image_url.is_none());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_create_prepends_with_unique_ids() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        let first = store.create(draft("first", "")).unwrap();
        let second = store.create(draft("second", "")).unwrap();
        let third = store.create(draft("third", "")).unwrap();

        let notes = store.list();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec![third.id.as_str(), second.id.as_str(), first.id.as_str()]);

        assert_ne!(first.id, second.id);
        assert_ne!(second.id, third.id);
        assert_ne!(first.id, third.id);
    }

    #[test]
    fn test_update_refreshes_updated_at_only() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        let note = store.create(draft("A", "B")).unwrap();
        let updated = store
            .update(&note.id, draft("C", "D"))
            .unwrap()
            .expect("note should exist");

        assert_eq!(updated.id, note.id);
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at > note.updated_at);
        assert!(updated.created_at <= updated.updated_at);

        let fetched = store.get(&note.id).expect("note should be fetchable");
        assert_eq!(fetched.title, "C");
        assert_eq!(fetched.content, "D");
    }

    #[test]
    fn test_update_unknown_id_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        store.create(draft("A", "B")).unwrap();
        let before = store.list();

        let result = store.update("no-such-id", draft("X", "Y")).unwrap();
        assert!(result.is_none());
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_update_without_new_image_retains_previous() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        let note = store
            .create(NoteDraft {
                title: "pic".to_string(),
                content: "".to_string(),
                image_url: Some("data:image/png;base64,AAAA".to_string()),
            })
            .unwrap();

        let updated = store.update(&note.id, draft("pic", "edited")).unwrap().unwrap();
        assert_eq!(updated.image_url.as_deref(), Some("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_update_with_new_image_replaces_it() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        let note = store
            .create(NoteDraft {
                title: "pic".to_string(),
                content: "".to_string(),
                image_url: Some("data:image/png;base64,AAAA".to_string()),
            })
            .unwrap();

        let updated = store
            .update(
                &note.id,
                NoteDraft {
                    title: "pic".to_string(),
                    content: "".to_string(),
                    image_url: Some("data:image/jpeg;base64,BBBB".to_string()),
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.image_url.as_deref(), Some("data:image/jpeg;base64,BBBB"));
    }

    #[test]
    fn test_delete_removes_exactly_one_entry() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        let a = store.create(draft("a", "")).unwrap();
        let b = store.create(draft("b", "")).unwrap();
        let c = store.create(draft("c", "")).unwrap();

        assert!(store.delete(&b.id).unwrap());

        let ids: Vec<String> = store.list().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
    }

    #[test]
    fn test_delete_unknown_id_is_a_no_op() {
        let dir = tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.json"));

        store.create(draft("a", "")).unwrap();
        assert!(!store.delete("no-such-id").unwrap());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_round_trip_reload_reproduces_collection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let store = NoteStore::new(path.clone());
        store
            .create(NoteDraft {
                title: "with image".to_string(),
                content: "body".to_string(),
                image_url: Some("data:image/png;base64,AAAA".to_string()),
            })
            .unwrap();
        store.create(draft("plain", "text")).unwrap();
        let original = store.list();

        let reloaded = NoteStore::new(path);
        assert_eq!(reloaded.list(), original);
    }

    #[test]
    fn test_corrupt_store_file_falls_back_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "{not valid json").unwrap();

        let store = NoteStore::new(path);
        assert!(store.list().is_empty());

        // The store must still accept writes afterwards
        store.create(draft("fresh", "start")).unwrap();
        assert_eq!(store.list().len(), 1);
    }
}
