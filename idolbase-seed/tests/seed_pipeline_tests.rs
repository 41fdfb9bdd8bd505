//! End-to-end seed pipeline tests
//!
//! Each test builds an in-memory database, writes JSON seed documents into a
//! temporary directory, and runs the pipeline against them.

use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;

use idolbase_seed::db::{albums, eras, songs};
use idolbase_seed::seed::{
    EntityResolver, RecordSource, SeedError, SeedPipeline, SeedStage,
};
use idolbase_seed::seed::stages::AlbumsStage;

async fn test_pool() -> SqlitePool {
    // Single connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    idolbase_common::db::create_schema(&pool).await.unwrap();
    pool
}

fn write_doc(dir: &Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(&value).unwrap()).unwrap();
}

fn member(stage_name: &str, lines: &[&str]) -> serde_json::Value {
    json!({
        "stageName": stage_name,
        "realName": format!("Real {stage_name}"),
        "birthday": "1995-12-30",
        "position": "Vocalist",
        "imagePath": format!("/images/members/{stage_name}.jpg"),
        "lineTags": lines,
    })
}

fn song(title: &str, album_title: Option<&str>, member_names: &[&str]) -> serde_json::Value {
    json!({
        "title": title,
        "duration": 240,
        "isTitle": false,
        "language": "Korean",
        "featuringArtist": "",
        "releaseDate": "2016-10-10",
        "releaseType": "album",
        "artist": "BTS",
        "url": format!("https://example.org/{title}"),
        "albumTitle": album_title,
        "memberNames": member_names,
    })
}

fn album(title: &str, artist: &str) -> serde_json::Value {
    json!({
        "title": title,
        "albumType": "STUDIO",
        "releaseDate": "2016-10-10",
        "eraName": "Wings Era",
        "artist": artist,
        "isOfficial": true,
        "coverImagePath": format!("/images/albums/{title}.jpg"),
        "description": "",
        "memberKeys": [],
    })
}

/// Standard fixture: two members, one era, one album with credits, two songs,
/// one music video.
fn write_fixture(dir: &Path) {
    write_doc(
        dir,
        "members.json",
        json!([member("BTS-V", &["VOCAL_LINE"]), member("RM", &["RAP_LINE"])]),
    );
    write_doc(
        dir,
        "eras.json",
        json!([{
            "name": "Wings Era",
            "startDate": "2016-10-01",
            "description": "Second studio album promotions",
        }]),
    );
    write_doc(
        dir,
        "albums.json",
        json!([{
            "title": "Wings",
            "albumType": "STUDIO",
            "releaseDate": "2016-10-10",
            "eraName": "Wings Era",
            "artist": "BTS",
            "isOfficial": true,
            "coverImagePath": "/images/albums/wings.jpg",
            "description": "Second studio album",
            "memberKeys": ["BTS-V", "RM"],
        }]),
    );
    write_doc(
        dir,
        "songs.json",
        json!([
            song("Blood Sweat & Tears", Some("Wings"), &["BTS-V", "RM"]),
            song("Stigma", Some("Wings"), &["BTS-V"]),
        ]),
    );
    write_doc(
        dir,
        "music_videos.json",
        json!([{
            "title": "Blood Sweat & Tears MV",
            "releaseDate": "2016-10-10",
            "videoType": "OFFICIAL",
            "url": "https://example.org/bst-mv",
            "songTitle": "Blood Sweat & Tears",
        }]),
    );
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn full_fixture_seeds_entire_graph() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    let outcome = pipeline.run().await.expect("Pipeline failed");

    assert_eq!(outcome.stages_run, 5);
    assert_eq!(outcome.stages_skipped, 0);
    assert_eq!(outcome.records_created, 7);
    assert_eq!(outcome.records_skipped, 0);
    assert_eq!(outcome.warnings, 0);

    assert_eq!(count(&pool, "members").await, 2);
    assert_eq!(count(&pool, "eras").await, 1);
    assert_eq!(count(&pool, "albums").await, 1);
    assert_eq!(count(&pool, "member_albums").await, 2);
    assert_eq!(count(&pool, "songs").await, 2);
    assert_eq!(count(&pool, "song_members").await, 3);
    assert_eq!(count(&pool, "music_videos").await, 1);

    // Foreign references actually resolved
    let era = eras::load_era_by_name(&pool, "Wings Era").await.unwrap().unwrap();
    let album = albums::load_album_by_title(&pool, "Wings").await.unwrap().unwrap();
    assert_eq!(album.era_id, era.guid);

    let song = songs::load_song_by_title(&pool, "Stigma").await.unwrap().unwrap();
    assert_eq!(song.album_id, Some(album.guid));
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    pipeline.run().await.unwrap();

    let before = (
        count(&pool, "members").await,
        count(&pool, "songs").await,
        count(&pool, "music_videos").await,
    );

    let second = pipeline.run().await.unwrap();
    assert_eq!(second.stages_run, 0);
    assert_eq!(second.stages_skipped, 5);
    assert_eq!(second.records_created, 0);

    let after = (
        count(&pool, "members").await,
        count(&pool, "songs").await,
        count(&pool, "music_videos").await,
    );
    assert_eq!(before, after);
}

#[tokio::test]
async fn unresolved_album_reference_skips_that_song_only() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    write_doc(
        dir.path(),
        "songs.json",
        json!([
            song("Blood Sweat & Tears", Some("Wings"), &[]),
            song("Lost Track", Some("Lost Tapes"), &[]),
            song("Stigma", Some("Wings"), &[]),
        ]),
    );
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    let outcome = pipeline.run().await.expect("Pipeline must not abort");

    assert_eq!(count(&pool, "songs").await, 2);
    assert!(outcome.warnings >= 1);
    assert!(songs::load_song_by_title(&pool, "Lost Track").await.unwrap().is_none());
}

#[tokio::test]
async fn unresolvable_member_credit_drops_association_only() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    write_doc(
        dir.path(),
        "songs.json",
        json!([song("Blood Sweat & Tears", Some("Wings"), &["BTS-V", "Ghost", "RM"])]),
    );
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    let outcome = pipeline.run().await.unwrap();

    let song = songs::load_song_by_title(&pool, "Blood Sweat & Tears")
        .await
        .unwrap()
        .expect("Song must persist despite one bad credit");
    let credited = songs::load_song_member_ids(&pool, song.guid).await.unwrap();
    assert_eq!(credited.len(), 2);
    assert!(outcome.warnings >= 1);
}

#[tokio::test]
async fn duplicate_era_name_keeps_first_occurrence() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    write_doc(
        dir.path(),
        "eras.json",
        json!([
            {"name": "Wings Era", "startDate": "2016-10-01", "description": "first"},
            {"name": "Wings Era", "startDate": "2017-01-01", "description": "second"},
        ]),
    );
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    let outcome = pipeline.run().await.unwrap();

    assert_eq!(count(&pool, "eras").await, 1);
    let era = eras::load_era_by_name(&pool, "Wings Era").await.unwrap().unwrap();
    assert_eq!(era.description, "first");
    assert_eq!(outcome.records_skipped, 1);
    assert!(outcome.warnings >= 1);
}

#[tokio::test]
async fn albums_stage_creates_nothing_without_era_bindings() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let pool = test_pool().await;

    // Run the Albums stage in isolation: with no Eras stage before it, every
    // era reference is unresolved.
    let mut conn = pool.acquire().await.unwrap();
    let mut resolver = EntityResolver::new();
    let source = RecordSource::new(dir.path());

    let report = AlbumsStage
        .run(&source, &mut conn, &mut resolver)
        .await
        .unwrap();

    // Release the pool's only connection before counting
    drop(conn);

    assert_eq!(report.created, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(count(&pool, "albums").await, 0);
}

#[tokio::test]
async fn resumed_run_resolves_against_existing_rows() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    pipeline.run().await.unwrap();

    // Simulate a crash after the Albums stage of a previous run: drop the
    // later stages' rows and run again.
    sqlx::query("DELETE FROM music_videos").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM song_members").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM songs").execute(&pool).await.unwrap();

    let outcome = pipeline.run().await.unwrap();
    assert_eq!(outcome.stages_skipped, 3);
    assert_eq!(outcome.stages_run, 2);

    // Songs recreated in the second run still reference the album persisted
    // by the first run.
    let album = albums::load_album_by_title(&pool, "Wings").await.unwrap().unwrap();
    let song = songs::load_song_by_title(&pool, "Stigma").await.unwrap().unwrap();
    assert_eq!(song.album_id, Some(album.guid));
    assert_eq!(count(&pool, "song_members").await, 3);
    assert_eq!(count(&pool, "music_videos").await, 1);
}

#[tokio::test]
async fn missing_document_aborts_run_before_later_stages() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    std::fs::remove_file(dir.path().join("songs.json")).unwrap();
    let pool = test_pool().await;

    let pipeline = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()));
    let result = pipeline.run().await;

    assert!(matches!(result, Err(SeedError::Source { ref document, .. }) if document == "songs.json"));

    // Earlier stages committed; the aborted stage and everything after it did
    // not run.
    assert_eq!(count(&pool, "members").await, 2);
    assert_eq!(count(&pool, "albums").await, 1);
    assert_eq!(count(&pool, "songs").await, 0);
    assert_eq!(count(&pool, "music_videos").await, 0);
}

#[tokio::test]
async fn reordering_records_within_a_stage_is_harmless() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    write_fixture(dir_a.path());
    write_fixture(dir_b.path());
    write_doc(
        dir_b.path(),
        "songs.json",
        json!([
            song("Stigma", Some("Wings"), &["BTS-V"]),
            song("Blood Sweat & Tears", Some("Wings"), &["BTS-V", "RM"]),
        ]),
    );

    let pool_a = test_pool().await;
    let pool_b = test_pool().await;
    SeedPipeline::new(pool_a.clone(), RecordSource::new(dir_a.path()))
        .run()
        .await
        .unwrap();
    SeedPipeline::new(pool_b.clone(), RecordSource::new(dir_b.path()))
        .run()
        .await
        .unwrap();

    for table in ["songs", "song_members"] {
        assert_eq!(count(&pool_a, table).await, count(&pool_b, table).await);
    }

    let a = songs::load_song_by_title(&pool_a, "Stigma").await.unwrap().unwrap();
    let b = songs::load_song_by_title(&pool_b, "Stigma").await.unwrap().unwrap();
    assert_eq!(a.title, b.title);
    assert_eq!(a.album_id.is_some(), b.album_id.is_some());
}

#[tokio::test]
async fn same_title_different_artist_album_is_persisted() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    write_doc(
        dir.path(),
        "albums.json",
        json!([
            album("Wings", "BTS"),
            album("Wings", "Another Group"),
            album("Wings", "BTS"),
        ]),
    );
    let pool = test_pool().await;

    let outcome = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()))
        .run()
        .await
        .unwrap();

    // Both distinct (title, artist) pairs persist; only the exact duplicate
    // is skipped. The repeated title raises a binding warning.
    assert_eq!(count(&pool, "albums").await, 2);
    assert_eq!(outcome.records_skipped, 1);
    assert!(outcome.warnings >= 1);

    // Songs naming the shared title resolve to the first occurrence
    let first: String =
        sqlx::query_scalar("SELECT guid FROM albums WHERE title = ? AND artist = ?")
            .bind("Wings")
            .bind("BTS")
            .fetch_one(&pool)
            .await
            .unwrap();
    let song = songs::load_song_by_title(&pool, "Stigma").await.unwrap().unwrap();
    assert_eq!(song.album_id.unwrap().to_string(), first);
}

#[tokio::test]
async fn music_videos_sharing_a_title_are_both_persisted() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    write_doc(
        dir.path(),
        "music_videos.json",
        json!([
            {
                "title": "Blood Sweat & Tears",
                "releaseDate": "2016-10-10",
                "videoType": "OFFICIAL",
                "url": "https://example.org/bst-mv",
                "songTitle": "Blood Sweat & Tears",
            },
            {
                "title": "Blood Sweat & Tears",
                "releaseDate": "2016-10-14",
                "videoType": "DANCE_PRACTICE",
                "url": "https://example.org/bst-practice",
                "songTitle": "Blood Sweat & Tears",
            },
        ]),
    );
    let pool = test_pool().await;

    let outcome = SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(count(&pool, "music_videos").await, 2);
    assert_eq!(outcome.records_skipped, 0);
    assert_eq!(outcome.warnings, 0);
}

#[tokio::test]
async fn duplicate_member_album_credit_is_written_once() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    write_doc(
        dir.path(),
        "albums.json",
        json!([{
            "title": "Wings",
            "albumType": "STUDIO",
            "releaseDate": "2016-10-10",
            "eraName": "Wings Era",
            "artist": "BTS",
            "isOfficial": true,
            "coverImagePath": "/images/albums/wings.jpg",
            "description": "",
            "memberKeys": ["BTS-V", "BTS-V"],
        }]),
    );
    let pool = test_pool().await;

    SeedPipeline::new(pool.clone(), RecordSource::new(dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(count(&pool, "member_albums").await, 1);
}
