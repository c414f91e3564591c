use stowage_core::db::{open_db, open_db_in_memory};
use stowage_core::{
    ContainerRecord, ItemRecord, SaveGame, SaveRepoError, SaveRepository, SqliteSaveRepository,
};

fn sample_save(marker: &str) -> SaveGame {
    SaveGame {
        containers: vec![ContainerRecord {
            definition_id: marker.to_string(),
            items: vec![ItemRecord {
                definition_id: "coin".to_string(),
                root_x: 2,
                root_y: 1,
            }],
        }],
        frames: Vec::new(),
    }
}

#[test]
fn put_and_get_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);

    let save = sample_save("chest");
    repo.put_save("slot-1", &save).unwrap();

    let loaded = repo.get_save("slot-1").unwrap().unwrap();
    assert_eq!(loaded, save);
}

#[test]
fn get_unknown_slot_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);
    assert!(repo.get_save("never-written").unwrap().is_none());
}

#[test]
fn put_overwrites_existing_slot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);

    repo.put_save("slot-1", &sample_save("chest")).unwrap();
    repo.put_save("slot-1", &sample_save("footlocker")).unwrap();

    let loaded = repo.get_save("slot-1").unwrap().unwrap();
    assert_eq!(loaded.containers[0].definition_id, "footlocker");
    assert_eq!(repo.list_slots().unwrap(), vec!["slot-1".to_string()]);
}

#[test]
fn blank_slot_names_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);

    let err = repo.put_save("   ", &sample_save("chest")).unwrap_err();
    assert!(matches!(err, SaveRepoError::InvalidSlot));
}

#[test]
fn slot_names_are_stored_trimmed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);

    repo.put_save("  slot-1  ", &sample_save("chest")).unwrap();
    assert!(repo.get_save("slot-1").unwrap().is_some());
    assert_eq!(repo.list_slots().unwrap(), vec!["slot-1".to_string()]);
}

#[test]
fn list_slots_is_sorted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);

    repo.put_save("zulu", &sample_save("chest")).unwrap();
    repo.put_save("alpha", &sample_save("chest")).unwrap();
    repo.put_save("mike", &sample_save("chest")).unwrap();

    assert_eq!(
        repo.list_slots().unwrap(),
        vec!["alpha".to_string(), "mike".to_string(), "zulu".to_string()]
    );
}

#[test]
fn delete_removes_slot_and_unknown_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSaveRepository::new(&conn);

    repo.put_save("slot-1", &sample_save("chest")).unwrap();
    repo.delete_save("slot-1").unwrap();
    assert!(repo.get_save("slot-1").unwrap().is_none());

    let err = repo.delete_save("slot-1").unwrap_err();
    assert!(matches!(err, SaveRepoError::NotFound(slot) if slot == "slot-1"));
}

#[test]
fn opened_database_carries_latest_schema_version() {
    let conn = open_db_in_memory().unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, stowage_core::db::migrations::latest_version());
}

#[test]
fn file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saves.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteSaveRepository::new(&conn);
        repo.put_save("campaign", &sample_save("chest")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteSaveRepository::new(&conn);
    let loaded = repo.get_save("campaign").unwrap().unwrap();
    assert_eq!(loaded, sample_save("chest"));
}
