use steelsoul_engine::{GameData, Rarity, builtin_gamedata};

const DATA: &str = r#"{
  "equipments": [
    { "id": 101, "type": "weapon", "name": "Pipe", "rarity": "BROKEN", "level": 2,
      "faction": "Scav", "atk": 10 },
    { "id": 201, "type": "armor", "name": "Coat", "rarity": "mythic", "faction": "Scav",
      "hp": 80, "dodge_rate": 10 },
    { "id": 202, "type": "armor", "name": "No Faction", "hp": 80 },
    { "id": 203, "type": "weapon", "name": "No Atk", "faction": "Scav" },
    { "id": 204, "type": "shield", "name": "Wrong", "faction": "Scav", "hp": 1 },
    { "id": 101, "type": "weapon", "name": "Pipe Mk2", "rarity": "MILITARY", "faction": "Scav",
      "atk": 14, "weight": 6 },
    "garbage"
  ],
  "monsters": [
    { "id": 1, "name": "Rat", "hp": 10, "atk": 2, "exp": 5 },
    { "id": 2, "name": "Broken" }
  ]
}"#;

#[test]
fn loader_skips_bad_entries_and_defaults_fields() {
    let data = GameData::from_json_str(DATA).unwrap();
    let catalog = &data.catalog;
    assert_eq!(catalog.len(), 2);
    assert!(!catalog.contains(202));
    assert!(!catalog.contains(203));
    assert!(!catalog.contains(204));

    // later duplicate wins
    let pipe = catalog.prototype(101).unwrap().as_weapon().unwrap();
    assert_eq!(pipe.name, "Pipe Mk2");
    assert_eq!(pipe.rarity, Rarity::Military);
    assert_eq!(pipe.level, 0);
    assert_eq!(pipe.base.crit_rate, 0);
    assert_eq!(pipe.base.atk_speed, 1);
    assert_eq!(pipe.base.weight, 6);

    // unknown rarity falls back to Standard; capacity defaults to 10
    let coat = catalog.prototype(201).unwrap().as_armor().unwrap();
    assert_eq!(coat.rarity, Rarity::Standard);
    assert_eq!(coat.base.capacity, 10);

    assert_eq!(data.bestiary.len(), 1);
    assert_eq!(data.bestiary.monsters()[0].name, "Rat");
}

#[test]
fn clone_prototype_keeps_name_and_sets_level() {
    let data = GameData::from_json_str(DATA).unwrap();
    let item = data.catalog.clone_prototype(201, 2).unwrap();
    assert_eq!(item.name(), "Coat");
    assert_eq!(item.level(), 2);
    assert_eq!(item.as_armor().unwrap().base.max_hp, 280);
    // the prototype itself never changes
    assert_eq!(data.catalog.prototype(201).unwrap().level(), 0);
    assert!(data.catalog.clone_prototype(999, 1).is_none());
}

#[test]
fn bare_array_is_equipment_only() {
    let data = GameData::from_json_str(
        r#"[{ "id": 7, "type": "weapon", "name": "Stick", "faction": "x", "atk": 1 }]"#,
    )
    .unwrap();
    assert_eq!(data.catalog.len(), 1);
    assert!(data.bestiary.is_empty());
}

#[test]
fn yaml_data_file_loads_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.yaml");
    std::fs::write(
        &path,
        concat!(
            "equipments:\n",
            "  - { id: 5, type: armor, name: Shell, rarity: LEGENDARY, faction: x, hp: 50 }\n",
            "monsters:\n",
            "  - { id: 1, name: Moth, hp: 3, atk: 1, exp: 2 }\n",
        ),
    )
    .unwrap();
    let data = GameData::load(&path).unwrap();
    assert_eq!(data.catalog.prototype(5).unwrap().rarity(), Rarity::Legendary);
    assert_eq!(data.bestiary.len(), 1);
}

#[test]
fn malformed_file_is_an_error_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = GameData::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.json"));
}

#[test]
fn builtin_data_covers_starter_kit_and_all_rarities() {
    let data = builtin_gamedata().unwrap();
    for tid in [201, 203, 101, 102, 103] {
        assert!(data.catalog.contains(tid), "missing starter template {}", tid);
    }
    let pools = data.catalog.ids_by_rarity();
    assert!(pools.iter().all(|p| !p.is_empty()));
    assert!(!data.bestiary.is_empty());
    let ids: Vec<i32> = data.catalog.iter().map(|e| e.template_id()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}
