//! Ordered log of node completions.
//!
//! Two replicas that ran the same session agree on every entry, so comparing
//! [`Transcript::digest`] values is enough to detect divergence.

use behavior_tree::{CompletionRecord, NodeId, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::entity::ActorId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub actor: ActorId,
    pub node: NodeId,
    pub name: String,
    pub outcome: Outcome,
    pub data: Value,
    pub at: u64,
    pub root: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, actor: ActorId, record: &CompletionRecord) {
        self.entries.push(TranscriptEntry {
            actor,
            node: record.node,
            name: record.name.clone(),
            outcome: record.outcome,
            data: record.data.clone(),
            at: record.at,
            root: record.root,
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Completions of tree roots only.
    pub fn roots(&self) -> impl Iterator<Item = &TranscriptEntry> + '_ {
        self.entries.iter().filter(|entry| entry.root)
    }

    /// Completions recorded for `actor`, in order.
    pub fn for_actor(&self, actor: ActorId) -> impl Iterator<Item = &TranscriptEntry> + '_ {
        self.entries.iter().filter(move |entry| entry.actor == actor)
    }

    /// SHA-256 over the entries in recording order.
    pub fn digest(&self) -> [u8; 32] {
        digest_all(&self.entries)
    }

    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

/// Hashed in place of an item bincode cannot encode.
const UNENCODABLE: &[u8] = b"\xffunencodable";

/// Hashes each item's bincode encoding in sequence order.
pub(crate) fn digest_all<T: Serialize>(items: impl IntoIterator<Item = T>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for (index, item) in items.into_iter().enumerate() {
        match bincode::serialize(&item) {
            Ok(bytes) => hasher.update(&bytes),
            Err(err) => {
                warn!("Digest item {} could not be encoded: {}", index, err);
                hasher.update(UNENCODABLE);
            }
        }
    }
    hasher.finalize().into()
}
