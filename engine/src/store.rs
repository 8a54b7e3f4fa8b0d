//! Save slots on disk: `save_slot_<n>.json` and `shop_slot_<n>.json` under one directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::player::Player;
use crate::save::{SaveRecord, Shops, ShopsRecord};

/// Read a text file, honoring a UTF-8/UTF-16 byte-order mark if present.
pub fn read_text_auto(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub slot: u32,
    /// `None` for an empty slot.
    pub player_name: Option<String>,
    pub exp: i32,
    pub item_count: usize,
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    root: PathBuf,
    slot_count: u32,
}

impl SaveStore {
    pub fn new(root: impl Into<PathBuf>, slot_count: u32) -> Self {
        Self { root: root.into(), slot_count }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slot_count(&self) -> u32 {
        self.slot_count
    }

    pub fn slots(&self) -> impl Iterator<Item = u32> {
        1..=self.slot_count
    }

    pub fn save_path(&self, slot: u32) -> PathBuf {
        self.root.join(format!("save_slot_{}.json", slot))
    }

    pub fn shop_path(&self, slot: u32) -> PathBuf {
        self.root.join(format!("shop_slot_{}.json", slot))
    }

    fn check_slot(&self, slot: u32) -> Result<()> {
        anyhow::ensure!(
            (1..=self.slot_count).contains(&slot),
            "slot {} out of range 1..={}",
            slot,
            self.slot_count
        );
        Ok(())
    }

    /// Create the directory and an empty record for every missing slot file.
    pub fn initialize_slots(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create save directory {}", self.root.display()))?;
        for slot in self.slots() {
            let path = self.save_path(slot);
            if !path.exists() {
                write_json(&path, &SaveRecord::empty())?;
            }
        }
        Ok(())
    }

    fn read_record(&self, slot: u32) -> Result<Option<SaveRecord>> {
        self.check_slot(slot)?;
        let path = self.save_path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let text =
            read_text_auto(&path).with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str::<SaveRecord>(&text) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(slot, path = %path.display(), "malformed save file, slot empty: {}", e);
                Ok(None)
            }
        }
    }

    /// Missing file, malformed file or blank player name.
    pub fn is_slot_empty(&self, slot: u32) -> Result<bool> {
        Ok(self.read_record(slot)?.is_none_or(|r| r.is_empty()))
    }

    /// One line per slot; unreadable slots are reported as empty.
    pub fn slot_summaries(&self) -> Vec<SlotSummary> {
        self.slots()
            .map(|slot| match self.read_record(slot) {
                Ok(Some(r)) if !r.is_empty() => SlotSummary {
                    slot,
                    player_name: Some(r.player_name),
                    exp: r.exp,
                    item_count: r.inventory.len(),
                },
                Ok(_) => SlotSummary { slot, player_name: None, exp: 0, item_count: 0 },
                Err(e) => {
                    warn!(slot, "unreadable save slot: {:#}", e);
                    SlotSummary { slot, player_name: None, exp: 0, item_count: 0 }
                }
            })
            .collect()
    }

    /// `Ok(None)` means start a new game. A malformed file counts as empty.
    pub fn load_slot(&self, slot: u32, catalog: &Catalog) -> Result<Option<Player>> {
        match self.read_record(slot)? {
            Some(record) if !record.is_empty() => {
                let player = record.restore_player(catalog);
                info!(slot, player = %player.name, items = player.inventory.len(), "save loaded");
                Ok(Some(player))
            }
            _ => {
                info!(slot, "save slot empty");
                Ok(None)
            }
        }
    }

    pub fn save_slot(&self, slot: u32, player: &Player) -> Result<()> {
        self.check_slot(slot)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create save directory {}", self.root.display()))?;
        write_json(&self.save_path(slot), &SaveRecord::from_player(player))?;
        info!(slot, player = %player.name, "game saved");
        Ok(())
    }

    /// A missing or malformed shop file gives two shops marked for refresh.
    pub fn load_shops(&self, slot: u32, catalog: &Catalog) -> Result<Shops> {
        self.check_slot(slot)?;
        let path = self.shop_path(slot);
        if !path.exists() {
            return Ok(Shops::default());
        }
        let text =
            read_text_auto(&path).with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str::<ShopsRecord>(&text) {
            Ok(record) => Ok(Shops::from_record(&record, catalog)),
            Err(e) => {
                warn!(slot, path = %path.display(), "malformed shop file, restocking: {}", e);
                Ok(Shops::default())
            }
        }
    }

    pub fn save_shops(&self, slot: u32, shops: &Shops) -> Result<()> {
        self.check_slot(slot)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create save directory {}", self.root.display()))?;
        write_json(&self.shop_path(slot), &shops.to_record())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize record")?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}
