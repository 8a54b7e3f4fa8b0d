use steelsoul_engine::life::*;

fn noop_log(_: String) {}

#[test]
fn damage_floors_at_zero_and_reports_the_drop() {
    let mut h = Health::new(10);
    let mut lines = Vec::new();
    let dropped = apply_damage("Player", &mut h, 25, |l| lines.push(l));
    assert!(dropped);
    assert_eq!(h.hp, 0);
    assert!(h.is_down());
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("[STATE][Player]"));
}

#[test]
fn damage_on_a_downed_target_is_ignored() {
    let mut h = Health { hp: 0, max_hp: 10 };
    assert!(!apply_damage("Player", &mut h, 5, noop_log));
    assert_eq!(h.hp, 0);
}

#[test]
fn partial_damage_keeps_standing() {
    let mut h = Health::new(100);
    assert!(!apply_damage("Player", &mut h, 5, noop_log));
    assert_eq!(h.hp, 95);
    assert_eq!(h.deficit(), 5);
}

#[test]
fn reset_max_heals_to_the_new_maximum() {
    let mut h = Health { hp: 12, max_hp: 60 };
    h.reset_max(120);
    assert_eq!(h, Health::new(120));
    h.hp = 30;
    h.restore_full();
    assert_eq!(h.hp, 120);
}

#[test]
fn negative_damage_is_ignored() {
    let mut h = Health { hp: 40, max_hp: 50 };
    assert!(!apply_damage("Player", &mut h, -30, noop_log));
    assert_eq!(h.hp, 40);
}

#[test]
fn max_hp_is_never_below_one() {
    assert_eq!(Health::new(0), Health { hp: 1, max_hp: 1 });
    let mut h = Health::new(50);
    h.reset_max(-5);
    assert_eq!(h, Health { hp: 1, max_hp: 1 });
    assert!(apply_damage("Player", &mut h, 1, noop_log));
}
