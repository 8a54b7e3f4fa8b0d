use proptest::prelude::*;
use steelsoul_engine::equipment::{ArmorStats, StatPreview, WeaponStats};
use steelsoul_engine::{Armor, Equipment, Rarity, Weapon};

fn blade(level: u8, base: WeaponStats) -> Equipment {
    Weapon::new(101, "Blade", Rarity::Standard, level, "Militia", base).into()
}

fn vest(level: u8, base: ArmorStats) -> Equipment {
    Armor::new(201, "Vest", Rarity::Broken, level, "Scavengers", base).into()
}

fn factor(level: u8) -> f64 {
    1.0 + 0.2 * (f64::from(level) - 1.0)
}

proptest! {
    #[test]
    fn weapon_stats_follow_level_factor(
        atk in 0i32..500,
        crit in 0i32..120,
        speed in 1i32..10,
        weight in 0i32..50,
        level in 1u8..=3,
    ) {
        let stats = WeaponStats { atk, crit_rate: crit, atk_speed: speed, weight };
        let w = Weapon::new(1, "w", Rarity::Broken, level, "f", stats);
        let f = factor(level);
        prop_assert_eq!(w.atk(), (f64::from(atk) * f).round() as i32);
        prop_assert_eq!(w.crit_rate(), ((f64::from(crit) * f).round() as i32).clamp(0, 100));
        prop_assert_eq!(w.atk_speed(), ((f64::from(speed) / f).round() as i32).max(1));
        prop_assert_eq!(w.weight(), weight);
        prop_assert!((0..=100).contains(&w.crit_rate()));
    }

    #[test]
    fn armor_stats_follow_level_factor(
        hp in 0i32..2000,
        dodge in 0i32..120,
        cap in 0i32..200,
        level in 1u8..=3,
    ) {
        let stats = ArmorStats { max_hp: hp, dodge_rate: dodge, capacity: cap };
        let a = Armor::new(2, "a", Rarity::Broken, level, "f", stats);
        let f = factor(level);
        prop_assert_eq!(a.max_hp(), (f64::from(hp) * f).round() as i32);
        prop_assert_eq!(a.dodge_rate(), ((f64::from(dodge) * f).round() as i32).clamp(0, 100));
        prop_assert_eq!(a.capacity(), (f64::from(cap) * f).round() as i32);
    }
}

#[test]
fn level_up_stops_at_max_level() {
    let mut item = blade(1, WeaponStats { atk: 10, crit_rate: 0, atk_speed: 1, weight: 1 });
    assert!(item.level_up());
    assert!(item.level_up());
    assert_eq!(item.level(), 3);
    assert!(!item.can_level_up());
    assert!(!item.level_up());
    assert_eq!(item.level(), 3);
    assert_eq!(item.preview_next_level(), None);
}

#[test]
fn upgrade_cost_scales_with_rarity() {
    let base = WeaponStats { atk: 1, crit_rate: 0, atk_speed: 1, weight: 1 };
    let table = [
        (Rarity::Broken, 10),
        (Rarity::Standard, 20),
        (Rarity::Military, 30),
        (Rarity::Legendary, 40),
    ];
    for (rarity, cost) in table {
        let item: Equipment = Weapon::new(1, "w", rarity, 1, "f", base).into();
        assert_eq!(item.upgrade_cost(), cost);
    }
}

#[test]
fn preview_shows_next_level_stats() {
    let item = vest(1, ArmorStats { max_hp: 100, dodge_rate: 10, capacity: 50 });
    assert_eq!(
        item.preview_next_level(),
        Some(StatPreview::Armor(ArmorStats { max_hp: 120, dodge_rate: 12, capacity: 60 }))
    );
}

#[test]
fn weapon_clone_adds_half_attack_rounded_down() {
    let item = blade(0, WeaponStats { atk: 15, crit_rate: 5, atk_speed: 2, weight: 4 });
    let copy = item.clone_as("Copy", 2);
    let w = copy.as_weapon().unwrap();
    assert_eq!(w.base.atk, 22);
    assert_eq!(w.base.crit_rate, 5);
    assert_eq!(copy.level(), 2);
    assert_eq!(copy.name(), "Copy");
    assert_eq!(copy.template_id(), 101);
    assert_eq!(copy.rarity(), Rarity::Standard);
}

#[test]
fn armor_clone_adds_hp_and_capacity() {
    let item = vest(0, ArmorStats { max_hp: 60, dodge_rate: 15, capacity: 30 });
    let copy = item.clone_as("Vest", 1);
    let a = copy.as_armor().unwrap();
    assert_eq!(a.base, ArmorStats { max_hp: 260, dodge_rate: 15, capacity: 35 });
}

#[test]
fn combine_is_left_biased_and_capped() {
    let left = blade(1, WeaponStats { atk: 10, crit_rate: 0, atk_speed: 1, weight: 1 });
    let right = blade(2, WeaponStats { atk: 99, crit_rate: 0, atk_speed: 1, weight: 1 });
    let fused = &left + &right;
    assert_eq!(fused.name(), "Enhanced-Blade");
    assert_eq!(fused.level(), 3);
    assert_eq!(fused.as_weapon().unwrap().base.atk, 15);

    let maxed = blade(3, WeaponStats { atk: 10, crit_rate: 0, atk_speed: 1, weight: 1 });
    assert_eq!(maxed.combine(&left).level(), 3);
    // parents untouched
    assert_eq!(left.level(), 1);
}

#[test]
fn power_values() {
    let w = blade(2, WeaponStats { atk: 10, crit_rate: 10, atk_speed: 2, weight: 1 });
    // atk 12, crit 12, speed round(2/1.2)=2 → 12 * 1.06 * 5 * 2
    assert_eq!(w.power(), 127);
    let a = vest(1, ArmorStats { max_hp: 100, dodge_rate: 10, capacity: 50 });
    assert_eq!(a.power(), 10 + 20 + 50 + 5);
}

#[test]
fn describe_renders_actual_stats() {
    let w = blade(2, WeaponStats { atk: 10, crit_rate: 10, atk_speed: 3, weight: 7 });
    insta::assert_snapshot!(w.describe(), @"[Weapon] ATK 12 | CRIT 12% | SPD 3 | WT 7 | Militia");
    let a = vest(3, ArmorStats { max_hp: 100, dodge_rate: 90, capacity: 50 });
    insta::assert_snapshot!(a.describe(), @"[Armor] HP 140 | DODGE 100% | CAP 70 | Scavengers");
    insta::assert_snapshot!(a.to_string(), @"Vest Lv.3/3 (Broken)");
}
