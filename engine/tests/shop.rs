use steelsoul_engine::shop::{BASE_REROLL_FEE, draw_template};
use steelsoul_engine::{Catalog, Dice, GameError, Inventory, Rarity, Shop, builtin_gamedata};

fn catalog() -> Catalog {
    builtin_gamedata().unwrap().catalog
}

#[test]
fn weighted_draw_converges_to_rarity_table() {
    let catalog = catalog();
    let pools = catalog.ids_by_rarity();
    let mut dice = Dice::from_seed(2024);
    let mut counts = [0u32; 4];
    let n = 20_000;
    for _ in 0..n {
        let tid = draw_template(&pools, &mut dice).unwrap();
        let rarity = catalog.prototype(tid).unwrap().rarity();
        counts[rarity.ordinal() as usize] += 1;
    }
    for (rarity, expected) in Rarity::ALL.iter().zip([0.50, 0.30, 0.15, 0.05]) {
        let share = f64::from(counts[rarity.ordinal() as usize]) / f64::from(n);
        assert!((share - expected).abs() < 0.02, "{} share {} vs {}", rarity, share, expected);
    }
}

#[test]
fn refresh_offers_three_distinct_level_one_items() {
    let catalog = catalog();
    let mut shop = Shop::new();
    assert!(shop.needs_refresh());
    let mut dice = Dice::from_seed(1);
    for _ in 0..50 {
        shop.refresh(&catalog, &mut dice);
        let mut ids: Vec<i32> = shop.offers().iter().map(|o| o.item.template_id()).collect();
        assert_eq!(ids.len(), 3);
        ids.dedup();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        for offer in shop.offers() {
            assert_eq!(offer.item.level(), 1);
            assert_eq!(offer.price, 500 * offer.item.rarity().multiplier());
        }
    }
    assert!(!shop.needs_refresh());
}

#[test]
fn refresh_stays_distinct_when_draws_keep_repeating() {
    let catalog = catalog();
    let mut shop = Shop::new();
    // every draw lands on the same Broken template
    let mut dice = Dice::from_scripted(vec![0]);
    shop.refresh(&catalog, &mut dice);
    let mut ids: Vec<i32> = shop.offers().iter().map(|o| o.item.template_id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
}

#[test]
fn tiny_catalog_repeats_offers() {
    let full = catalog();
    let one = Catalog::from_prototypes(full.prototype(101).cloned());
    let mut shop = Shop::new();
    shop.refresh(&one, &mut Dice::from_seed(3));
    assert_eq!(shop.offers().len(), 3);
    assert!(shop.offers().iter().all(|o| o.item.template_id() == 101));

    let empty = Catalog::default();
    shop.refresh(&empty, &mut Dice::from_seed(3));
    assert!(shop.offers().is_empty());
}

#[test]
fn purchase_moves_item_and_charges_price() {
    let catalog = catalog();
    let mut shop = Shop::new();
    shop.refresh(&catalog, &mut Dice::from_seed(5));
    let mut inventory = Inventory::new();
    let offered = shop.offers()[1].clone();

    let mut wallet = offered.price - 1;
    assert_eq!(
        shop.purchase(1, &mut wallet, &mut inventory),
        Err(GameError::InsufficientExp { needed: offered.price, available: offered.price - 1 })
    );
    assert_eq!(shop.offers().len(), 3);
    assert!(inventory.is_empty());

    assert_eq!(
        shop.purchase(7, &mut wallet, &mut inventory),
        Err(GameError::InvalidSelection { index: 7, len: 3 })
    );

    let mut wallet = offered.price + 10;
    let key = shop.purchase(1, &mut wallet, &mut inventory).unwrap();
    assert_eq!(wallet, 10);
    assert_eq!(inventory.get(key), Some(&offered.item));
    assert_eq!(shop.offers().len(), 2);
}

#[test]
fn reroll_fee_doubles_and_resets_on_natural_refresh() {
    let catalog = catalog();
    let mut shop = Shop::new();
    let mut dice = Dice::from_seed(8);
    shop.refresh(&catalog, &mut dice);

    let mut wallet = 120;
    assert_eq!(shop.reroll(&catalog, &mut dice, &mut wallet), Ok(BASE_REROLL_FEE));
    assert_eq!(shop.reroll_fee(), 100);
    assert_eq!(wallet, 70);

    let before = shop.offers().to_vec();
    assert_eq!(
        shop.reroll(&catalog, &mut dice, &mut wallet),
        Err(GameError::InsufficientExp { needed: 100, available: 70 })
    );
    assert_eq!(shop.offers(), before.as_slice());
    assert_eq!(shop.reroll_fee(), 100);
    assert_eq!(wallet, 70);

    shop.mark_needs_refresh();
    assert!(shop.refresh_if_needed(&catalog, &mut dice));
    assert_eq!(shop.reroll_fee(), BASE_REROLL_FEE);
    assert!(!shop.refresh_if_needed(&catalog, &mut dice));
}

#[test]
fn record_round_trip_keeps_offers_and_fee() {
    let catalog = catalog();
    let mut shop = Shop::new();
    let mut dice = Dice::from_seed(13);
    shop.refresh(&catalog, &mut dice);
    let mut wallet = 1000;
    shop.reroll(&catalog, &mut dice, &mut wallet).unwrap();

    let record = shop.to_record();
    let text = serde_json::to_string(&record).unwrap();
    let restored = Shop::from_record(&serde_json::from_str(&text).unwrap(), &catalog);
    assert_eq!(restored.offers(), shop.offers());
    assert_eq!(restored.reroll_fee(), 100);
    assert!(!restored.needs_refresh());
}

#[test]
fn record_levels_are_clamped_before_purchase() {
    use steelsoul_engine::save::{ShopItemRecord, ShopRecord};

    let catalog = catalog();
    let record = ShopRecord {
        needs_refresh: false,
        manual_refresh_cost: 0,
        items: vec![
            ShopItemRecord { equipment_id: 101, equipment_level: 9, price: 1 },
            ShopItemRecord { equipment_id: 202, equipment_level: 0, price: 1 },
        ],
    };
    let mut shop = Shop::from_record(&record, &catalog);
    assert_eq!(shop.reroll_fee(), BASE_REROLL_FEE);
    let levels: Vec<u8> = shop.offers().iter().map(|o| o.item.level()).collect();
    assert_eq!(levels, [3, 1]);

    let mut wallet = 10;
    let mut inventory = Inventory::new();
    let key = shop.purchase(0, &mut wallet, &mut inventory).unwrap();
    let bought = inventory.get(key).unwrap();
    assert_eq!(bought.level(), bought.max_level());
}
