use std::fs;

use boss_rush::rpg::save::{SavedBoss, SavedPlayer, SavedWeapon};
use boss_rush::rpg::{SaveDocument, SaveError, SaveStore};
use color_eyre::Result;
mod common;

#[ctor::ctor]
fn _init() { common::init(); }

fn doc() -> SaveDocument {
    SaveDocument {
        player: SavedPlayer {
            name: "Aria".into(),
            health: 80,
            damage: 10,
            weapon: SavedWeapon { name: Some("Scissors".into()), damage_bonus: 4 },
        },
        bosses: vec![SavedBoss { name: "Wyrm".into(), health: 40, damage: 6 }],
    }
}

#[test]
fn load_missing_is_not_found() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = SaveStore::new(tmp.path().join("nope/save.json"));
    let err = store.load().unwrap_err();
    assert!(err.is_not_found());
    assert!(store.try_load()?.is_none());
    Ok(())
}

#[test]
fn delete_missing_succeeds() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = SaveStore::new(tmp.path().join("save.json"));
    store.delete()?;
    store.save(&doc())?;
    assert!(store.exists());
    store.delete()?;
    assert!(!store.exists());
    store.delete()?;
    Ok(())
}

#[test]
fn overwrite_keeps_latest() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = SaveStore::new(tmp.path().join("save.json"));
    store.save(&doc())?;
    let mut second = doc();
    second.player.health = 12;
    second.bosses.clear();
    store.save(&second)?;
    assert_eq!(store.load()?, second);
    // 一時ファイルは残らない
    let leftovers: Vec<_> = fs::read_dir(tmp.path())?.collect::<std::result::Result<_, _>>()?;
    assert_eq!(leftovers.len(), 1);
    Ok(())
}

#[test]
fn garbage_is_corrupt() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("save.json");
    let store = SaveStore::new(&path);

    fs::write(&path, "not json at all")?;
    assert!(matches!(store.load(), Err(SaveError::Corrupt(_))));

    fs::write(&path, r#"{"player": {"name": "Aria", "health": "lots"}, "bosses": []}"#)?;
    assert!(matches!(store.try_load(), Err(SaveError::Corrupt(_))));

    fs::write(&path, r#"{"bosses": []}"#)?;
    assert!(matches!(store.load(), Err(SaveError::Corrupt(_))));
    Ok(())
}

#[test]
fn save_into_file_path_parent_is_io_failure() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let blocker = tmp.path().join("blocker");
    fs::write(&blocker, "i am a file")?;
    let store = SaveStore::new(blocker.join("save.json"));
    assert!(matches!(store.save(&doc()), Err(SaveError::Io { .. })));
    Ok(())
}

#[test]
fn hand_written_save_loads() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("save.json");
    fs::write(
        &path,
        r#"{
  "player": {"name": "Aria", "health": 80, "damage": 10,
             "weapon": {"name": null, "damage_bonus": 0}},
  "bosses": [{"name": "Wyrm", "health": 40, "damage": 6}]
}"#,
    )?;
    let loaded = SaveStore::new(&path).load()?;
    assert_eq!(loaded.player.weapon.name, None);
    assert_eq!(loaded.bosses.len(), 1);
    Ok(())
}
