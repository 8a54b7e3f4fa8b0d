use thiserror::Error;

use crate::adventure::RunPhase;
use crate::equipment::EquipmentKind;
use crate::inventory::ItemKey;

/// A rejected player action. Whatever raised it left the game state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("no item {0} in the inventory")]
    UnknownItem(ItemKey),
    #[error("no catalog template with id {0}")]
    UnknownTemplate(i32),
    #[error("{name} is already at max level {level}")]
    MaxLevel { name: String, level: u8 },
    #[error("not enough EXP: need {needed}, have {available}")]
    InsufficientExp { needed: i32, available: i32 },
    #[error("over capacity: total weight {weight} exceeds capacity {capacity}")]
    OverCapacity { weight: i32, capacity: i32 },
    #[error("item {key} is not {expected}")]
    WrongKind { key: ItemKey, expected: EquipmentKind },
    #[error("item {0} is already equipped")]
    AlreadyEquipped(ItemKey),
    #[error("item {0} is equipped and cannot be removed")]
    ItemInUse(ItemKey),
    #[error("equip an armor before equipping weapons")]
    ArmorRequired,
    #[error("selection {index} out of range (0..{len})")]
    InvalidSelection { index: usize, len: usize },
    #[error("action not allowed while the run is {0:?}")]
    WrongPhase(RunPhase),
    #[error("no monster data loaded")]
    NoMonsters,
    #[error("no shop is open here")]
    NoShop,
}
