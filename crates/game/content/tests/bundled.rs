use std::io::Write;

use duel_content::ContentFactory;
use duel_core::status::ModifyContext;
use duel_core::{DiceRoll, HeroId, HeroOracle, StatusStacks};

#[test]
fn bundled_content_overlays_builtins() {
    let factory = ContentFactory::bundled();
    let registry = factory.build_registry().unwrap();

    for id in ["chi", "evasive", "burn", "poison", "icewall", "fury", "guard", "rage", "bleed"] {
        assert!(registry.get_status(id).is_some(), "missing {id}");
    }
    assert_eq!(registry.registration_index("chi"), Some(0));
}

#[test]
fn data_modifiers_run_before_builtin_fury() {
    let registry = ContentFactory::bundled().build_registry().unwrap();
    let runtime = registry.runtime();
    let stacks = runtime.set_stacks(&StatusStacks::new(), "fury", 1);
    let stacks = runtime.set_stacks(&stacks, "rage", 1);

    let outcome = runtime.apply_modifiers(
        &stacks,
        ModifyContext {
            base_damage: 4,
            ..ModifyContext::default()
        },
    );

    assert_eq!(outcome.context.base_damage, 7);
    assert_eq!(outcome.logs.len(), 2);
    assert!(outcome.logs[0].starts_with("Rage"));
}

#[test]
fn bundled_heroes_and_config_load() {
    let factory = ContentFactory::bundled();
    let heroes = factory.load_heroes().unwrap();
    let config = factory.load_config().unwrap();

    assert_eq!(heroes.len(), 3);
    let warden = heroes.hero(&HeroId::new("warden")).unwrap();
    assert_eq!(warden.max_hp, 55);

    let roll = DiceRoll::from_faces(&[1, 1, 1, 4, 5]);
    let glacier = heroes.ability_for(&HeroId::new("warden"), &roll).unwrap();
    assert_eq!(glacier.id, "glacier");
    assert_eq!(heroes.defense_for(&HeroId::new("warden"), &roll).base_block, 5);

    assert_eq!(config.pending_buff_lifetime, Some(3));
    assert_eq!(config.starting_hp, 50);
}

#[test]
fn missing_files_fall_back_to_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let factory = ContentFactory::new(dir.path());

    assert_eq!(factory.build_registry().unwrap().len(), 6);
    assert_eq!(factory.load_heroes().unwrap().len(), 2);
    assert_eq!(factory.load_config().unwrap(), duel_core::RulesConfig::default());
}

#[test]
fn malformed_status_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("statuses.ron")).unwrap();
    writeln!(file, "(statuses: [(id: \"x\")])").unwrap();

    let err = ContentFactory::new(dir.path())
        .build_registry()
        .unwrap_err();
    assert!(err.to_string().contains("status catalog"));
}
