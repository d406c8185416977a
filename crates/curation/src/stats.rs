use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Entry, EntryKind};

pub type Hash32 = [u8; 32];

/// Entries scoring below this count as low quality.
pub const LOW_QUALITY_THRESHOLD: u8 = 70;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub entries: u64,
    pub chat_entries: u64,
    pub instruction_entries: u64,
    pub avg_quality_score: f32,
    pub min_quality_score: Option<u8>,
    pub low_quality_entries: u64,
    /// Same payload as an earlier entry.
    pub duplicate_entries: u64,
    /// BLAKE3 of the JSONL export bytes.
    #[serde(with = "hex", rename = "dataset_hash_hex")]
    pub dataset_hash: Hash32,
}

impl DatasetStats {
    pub fn compute(entries: &[Entry], export_bytes: &[u8]) -> Self {
        let mut chat = 0;
        let mut instruction = 0;
        let mut low = 0;
        let mut score_sum: u64 = 0;
        let mut min_score: Option<u8> = None;

        let mut seen = HashSet::<Hash32>::new();
        let mut dupes = 0;

        for e in entries {
            match e.kind {
                EntryKind::Chat => chat += 1,
                EntryKind::Instruction => instruction += 1,
            }
            if e.quality_score < LOW_QUALITY_THRESHOLD {
                low += 1;
            }
            score_sum += e.quality_score as u64;
            min_score = Some(min_score.map_or(e.quality_score, |m| m.min(e.quality_score)));

            // serde_json::Value keeps object keys sorted, so this is key-order independent
            let fp: Hash32 = blake3::hash(e.data.to_string().as_bytes()).into();
            if !seen.insert(fp) {
                dupes += 1;
            }
        }

        let count = entries.len() as u64;
        let avg = if count == 0 { 0.0 } else { score_sum as f32 / count as f32 };

        Self {
            entries: count,
            chat_entries: chat,
            instruction_entries: instruction,
            avg_quality_score: avg,
            min_quality_score: min_score,
            low_quality_entries: low,
            duplicate_entries: dupes,
            dataset_hash: blake3::hash(export_bytes).into(),
        }
    }
}
