use drill_core::model::{DrillSettings, DrillSettingsDraft, FuguesSpeed};
use storage::repository::{SettingsRepository, Storage};
use storage::sqlite::SqliteRepository;

fn settings(speed: FuguesSpeed) -> DrillSettings {
    DrillSettingsDraft::with_speed(speed).validate().unwrap()
}

#[tokio::test]
async fn sqlite_starts_without_settings() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_empty?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get_settings().await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_roundtrips_last_used_speed() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_speed?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save_settings(&settings(FuguesSpeed::H4)).await.unwrap();
    repo.save_settings(&settings(FuguesSpeed::H3)).await.unwrap();

    let stored = repo.get_settings().await.unwrap().expect("row");
    assert_eq!(stored.fugues_speed(), FuguesSpeed::H3);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drill_settings")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn unreadable_stored_speed_falls_back_to_fastest_tier() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_garbage?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    sqlx::query("INSERT INTO drill_settings (id, fugues_speed, updated_at) VALUES (1, '9H', '2024-01-01T00:00:00Z')")
        .execute(repo.pool())
        .await
        .unwrap();

    let stored = repo.get_settings().await.unwrap().expect("row");
    assert_eq!(stored.fugues_speed(), FuguesSpeed::H1);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(versions, 1);
}

#[tokio::test]
async fn storage_aggregate_uses_sqlite_backend() {
    let storage = Storage::sqlite("sqlite:file:memdb_aggregate?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.settings.save_settings(&settings(FuguesSpeed::H5)).await.unwrap();
    let stored = storage.settings.get_settings().await.unwrap().unwrap();
    assert_eq!(stored.fugues_speed(), FuguesSpeed::H5);
}
