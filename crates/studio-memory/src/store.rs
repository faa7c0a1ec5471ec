use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use studio_core::{Category, StudioError};
use tracing::{debug, info, warn};

use crate::snippet::{
    DUPLICATE_OVERLAP, MIN_CONTENT_CHARS, MIN_SCORE_THRESHOLD, MemorySnippet, READ_WINDOW,
    content_hash, prune, score_content, token_overlap,
};

/// Per-user ranked store of memory snippets.
///
/// The whole store is one JSON document `{ user_id: { "memories": [...] } }`.
/// Every mutation re-applies the bound and rewrites the document while the
/// lock is held. The in-memory record only changes once the write succeeds.
pub struct MemoryStore {
    path: Option<PathBuf>,
    users: Mutex<HashMap<String, Vec<MemorySnippet>>>,
}

#[derive(Serialize)]
struct UserRecordRef<'a> {
    memories: &'a [MemorySnippet],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Legacy(Vec<String>),
    Current { memories: Vec<MemorySnippet> },
}

/// Summary of one user's memories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub count: usize,
    pub avg_score: f64,
    pub categories: BTreeMap<Category, usize>,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl MemoryStore {
    /// Open the store backed by `path`. A missing, unreadable, or corrupt file
    /// yields an empty store.
    pub fn open(path: &Path) -> Self {
        info!(?path, "opening memory store");
        Self {
            users: Mutex::new(load_users(path)),
            path: Some(path.to_path_buf()),
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store a candidate snippet. Returns `Ok(false)` when the candidate is
    /// too short, duplicates an existing snippet, or scores below the floor.
    pub fn save(
        &self,
        user_id: &str,
        content: &str,
        category: Category,
        score: Option<f64>,
    ) -> studio_core::Result<bool> {
        let content = content.trim();
        if content.chars().count() < MIN_CONTENT_CHARS {
            debug!(user = %user_id, "memory candidate too short");
            return Ok(false);
        }

        let hash = content_hash(content);
        let mut users = self.users.lock();

        if let Some(existing) = users.get(user_id) {
            let duplicate = existing.iter().any(|m| {
                m.content_hash == hash || token_overlap(&m.content, content) >= DUPLICATE_OVERLAP
            });
            if duplicate {
                debug!(user = %user_id, %hash, "memory candidate duplicates a stored snippet");
                return Ok(false);
            }
        }

        let score = score
            .unwrap_or_else(|| score_content(content, category))
            .clamp(1.0, 5.0);
        if score < MIN_SCORE_THRESHOLD {
            debug!(user = %user_id, score, "memory candidate scored below threshold");
            return Ok(false);
        }

        let mut updated = users.get(user_id).cloned().unwrap_or_default();
        updated.push(MemorySnippet::new(content, score, category));
        prune(&mut updated);

        self.persist(&users, user_id, Some(updated.as_slice()))?;
        users.insert(user_id.to_string(), updated);
        info!(user = %user_id, %category, score, "memory saved");
        Ok(true)
    }

    /// Up to five highest-scoring snippets, newline-joined. With a category,
    /// only snippets in that category or `general` are considered.
    pub fn get(&self, user_id: &str, category: Option<Category>) -> String {
        let users = self.users.lock();
        let Some(memories) = users.get(user_id) else {
            return String::new();
        };

        let mut selected: Vec<&MemorySnippet> = memories
            .iter()
            .filter(|m| match category {
                Some(c) => m.category == c || m.category == Category::General,
                None => true,
            })
            .collect();
        selected.sort_by(|a, b| b.score.total_cmp(&a.score));

        selected
            .iter()
            .take(READ_WINDOW)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every snippet held for the user, highest score first.
    pub fn all(&self, user_id: &str) -> Vec<MemorySnippet> {
        let mut memories = self.users.lock().get(user_id).cloned().unwrap_or_default();
        memories.sort_by(|a, b| b.score.total_cmp(&a.score));
        memories
    }

    /// Users with at least one stored snippet.
    pub fn users(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .users
            .lock()
            .iter()
            .filter(|(_, m)| !m.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Rescore a snippet by hash. The new score is clamped to `[1, 5]`; if it
    /// falls below the floor the snippet is pruned.
    pub fn update_score(
        &self,
        user_id: &str,
        hash: &str,
        new_score: f64,
    ) -> studio_core::Result<bool> {
        let mut users = self.users.lock();
        let Some(mut updated) = users.get(user_id).cloned() else {
            return Ok(false);
        };
        let Some(snippet) = updated.iter_mut().find(|m| m.content_hash == hash) else {
            return Ok(false);
        };

        snippet.score = new_score.clamp(1.0, 5.0);
        prune(&mut updated);
        self.persist(&users, user_id, Some(updated.as_slice()))?;
        users.insert(user_id.to_string(), updated);
        Ok(true)
    }

    pub fn delete(&self, user_id: &str, hash: &str) -> studio_core::Result<bool> {
        let mut users = self.users.lock();
        let Some(mut updated) = users.get(user_id).cloned() else {
            return Ok(false);
        };
        let before = updated.len();
        updated.retain(|m| m.content_hash != hash);
        if updated.len() == before {
            return Ok(false);
        }

        prune(&mut updated);
        self.persist(&users, user_id, Some(updated.as_slice()))?;
        users.insert(user_id.to_string(), updated);
        Ok(true)
    }

    pub fn clear_user(&self, user_id: &str) -> studio_core::Result<bool> {
        let mut users = self.users.lock();
        if !users.contains_key(user_id) {
            return Ok(false);
        }
        self.persist(&users, user_id, None)?;
        users.remove(user_id);
        info!(user = %user_id, "memories cleared");
        Ok(true)
    }

    pub fn stats(&self, user_id: &str) -> MemoryStats {
        let users = self.users.lock();
        let memories = users.get(user_id).map(Vec::as_slice).unwrap_or_default();

        let mut categories = BTreeMap::new();
        for m in memories {
            *categories.entry(m.category).or_insert(0) += 1;
        }
        let avg_score = if memories.is_empty() {
            0.0
        } else {
            memories.iter().map(|m| m.score).sum::<f64>() / memories.len() as f64
        };

        MemoryStats {
            count: memories.len(),
            avg_score,
            categories,
            oldest: memories.iter().map(|m| m.created_at).min(),
            newest: memories.iter().map(|m| m.created_at).max(),
        }
    }

    /// Rewrite the backing file via a temp file and rename, with `user_id`'s
    /// record replaced by `memories` (or removed when `None`).
    fn persist(
        &self,
        users: &HashMap<String, Vec<MemorySnippet>>,
        user_id: &str,
        memories: Option<&[MemorySnippet]>,
    ) -> studio_core::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut document: BTreeMap<&str, UserRecordRef<'_>> = users
            .iter()
            .filter(|(id, _)| id.as_str() != user_id)
            .map(|(id, memories)| (id.as_str(), UserRecordRef { memories }))
            .collect();
        if let Some(memories) = memories {
            document.insert(user_id, UserRecordRef { memories });
        }
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StudioError::Memory(format!("{}: {e}", parent.display())))?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| StudioError::Memory(format!("{}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| StudioError::Memory(format!("{}: {e}", path.display())))?;
        Ok(())
    }
}

fn load_users(path: &Path) -> HashMap<String, Vec<MemorySnippet>> {
    if !path.exists() {
        return HashMap::new();
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(?path, error = %e, "memory file unreadable, starting empty");
            return HashMap::new();
        }
    };
    let document: HashMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(?path, error = %e, "memory file corrupt, starting empty");
            return HashMap::new();
        }
    };

    let mut users = HashMap::new();
    for (user_id, value) in document {
        let mut memories = match serde_json::from_value::<StoredUser>(value) {
            Ok(StoredUser::Current { memories }) => memories,
            Ok(StoredUser::Legacy(items)) => {
                info!(user = %user_id, count = items.len(), "upgrading legacy memory record");
                items
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(MemorySnippet::legacy)
                    .collect()
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "skipping unreadable memory record");
                continue;
            }
        };
        for m in memories.iter_mut().filter(|m| m.content_hash.is_empty()) {
            m.content_hash = content_hash(&m.content);
        }
        prune(&mut memories);
        users.insert(user_id, memories);
    }
    users
}
