//! Update checks against a real SQLite store and an in-memory catalog.

mod common;

use std::sync::Arc;
use std::time::Duration;

use animelog::db::{NotificationSink, Store, WatchlistStore};
use animelog::models::anime::{MediaType, RelationKind};
use animelog::models::notification::NotificationKind;
use animelog::models::watchlist::{
    NewTrackedAnime, ShowGroup, TrackedAnime, TrackedAnimeUpdate, WatchStatus,
};
use animelog::services::{UpdateChecker, UpdateSummary};
use common::{FakeSource, record, temp_store};
use tokio_util::sync::CancellationToken;

fn checker(store: &Store, source: Arc<FakeSource>) -> UpdateChecker {
    paced_checker(store, source, Duration::ZERO)
}

fn paced_checker(store: &Store, source: Arc<FakeSource>, interval: Duration) -> UpdateChecker {
    UpdateChecker::new(
        source,
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        interval,
    )
}

fn tracked(
    user_id: &str,
    season_number: i32,
    mal_id: Option<i32>,
    total: Option<i32>,
) -> NewTrackedAnime {
    NewTrackedAnime {
        user_id: user_id.to_string(),
        title: "Show".to_string(),
        episodes_watched: 0,
        total_episodes: total,
        status: WatchStatus::Watching,
        rating: None,
        notes: None,
        cover_image: Some("https://cdn.example/show.jpg".to_string()),
        season_number,
        mal_id,
        ranking: None,
    }
}

fn titled(title: &str, row: NewTrackedAnime) -> NewTrackedAnime {
    NewTrackedAnime {
        title: title.to_string(),
        ..row
    }
}

async fn seed_rows(store: &Store, rows: &[NewTrackedAnime]) -> Vec<TrackedAnime> {
    store.add_tracked(rows).await.expect("failed to insert rows")
}

#[tokio::test]
async fn new_episode_is_reported_once() {
    let store = temp_store().await;
    let rows = seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show").episodes(Some(13)).build(),
    ]));
    let checker = checker(&store, source);
    let cancel = CancellationToken::new();

    let summary = checker.check_user("alice", &cancel).await.expect("check failed");
    assert_eq!(
        summary,
        UpdateSummary {
            episode_updates: 1,
            new_seasons: 0
        }
    );

    let updated = store.get_tracked(&rows[0].id).await.unwrap().unwrap();
    assert_eq!(updated.total_episodes, Some(13));

    let notifications = store.list_notifications("alice").await.unwrap();
    assert_eq!(notifications.len(), 1);
    let n = &notifications[0];
    assert_eq!(n.kind, NotificationKind::EpisodeRelease);
    assert_eq!(n.anime_id.as_deref(), Some(rows[0].id.as_str()));
    assert_eq!(n.episode_number, Some(13));
    assert_eq!(n.message, "Show Season 1 Episode 13 has been released!");
    assert!(!n.read);

    let again = checker.check_user("alice", &cancel).await.expect("check failed");
    assert!(again.is_empty());
    assert_eq!(store.list_notifications("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn new_season_adds_stub_row_and_notification() {
    let store = temp_store().await;
    let rows = seed_rows(
        &store,
        &[
            tracked("alice", 1, Some(1), Some(12)),
            tracked("alice", 2, Some(2), Some(12)),
        ],
    )
    .await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show")
            .aired("2020-01-10")
            .related(RelationKind::Sequel, &[2])
            .build(),
        record(2, "Show Season 2")
            .aired("2021-01-08")
            .related(RelationKind::Prequel, &[1])
            .related(RelationKind::Sequel, &[3, 4, 5])
            .build(),
        record(3, "Show Season 3")
            .aired("2024-10-04")
            .image("https://cdn.example/s3.jpg")
            .build(),
        record(4, "Show: Final Chapter")
            .aired("2023-03-03")
            .episodes(Some(1))
            .media(MediaType::Movie)
            .build(),
        record(5, "Show Season 4")
            .aired("2026-01-01")
            .episodes(None)
            .build(),
    ]));
    let checker = checker(&store, source.clone());
    let cancel = CancellationToken::new();

    let summary = checker.check_user("alice", &cancel).await.expect("check failed");
    assert_eq!(summary.new_seasons, 1);
    assert_eq!(summary.episode_updates, 0);

    let shows = store.list_shows("alice").await.unwrap();
    assert_eq!(shows.len(), 1);
    let numbers: Vec<i32> = shows[0].seasons.iter().map(|s| s.season_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let stub = &shows[0].seasons[2];
    assert_eq!(stub.mal_id, Some(3));
    assert_eq!(stub.episodes_watched, 0);
    assert_eq!(stub.total_episodes, Some(12));
    assert_eq!(stub.status, WatchStatus::Watching);
    assert_eq!(stub.cover_image.as_deref(), Some("https://cdn.example/s3.jpg"));

    let notifications = store.list_notifications("alice").await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::SeasonRelease);
    assert_eq!(notifications[0].season_number, Some(3));
    assert_eq!(notifications[0].anime_id.as_deref(), Some(rows[0].id.as_str()));
    assert_eq!(notifications[0].message, "Show Season 3 has been released!");

    // Tracked seasons with known totals are refreshed, never refetched by the walk.
    let calls = source.calls();
    assert_eq!(calls.iter().filter(|&&id| id == 1).count(), 1);
    assert_eq!(calls.iter().filter(|&&id| id == 2).count(), 1);

    let again = checker.check_user("alice", &cancel).await.expect("check failed");
    assert!(again.is_empty());
    assert_eq!(store.list_tracked("alice").await.unwrap().len(), 3);
}

#[tokio::test]
async fn part_continuation_is_not_a_new_season() {
    let store = temp_store().await;
    seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show")
            .aired("2020-01-10")
            .related(RelationKind::Sequel, &[2])
            .build(),
        record(2, "Show Part 2").aired("2020-07-10").build(),
    ]));

    let summary = checker(&store, source)
        .check_user("alice", &CancellationToken::new())
        .await
        .expect("check failed");

    assert!(summary.is_empty());
    assert!(store.list_notifications("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn upstream_failure_only_skips_the_show() {
    let store = temp_store().await;
    seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    let source = Arc::new(FakeSource::new(Vec::new()).failing_on(&[1]));

    let summary = checker(&store, source)
        .check_user("alice", &CancellationToken::new())
        .await
        .expect("fetch failures are not errors");

    assert!(summary.is_empty());
    let rows = store.list_tracked("alice").await.unwrap();
    assert_eq!(rows[0].total_episodes, Some(12));
}

#[tokio::test]
async fn check_all_visits_only_linked_users() {
    let store = temp_store().await;
    seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    seed_rows(&store, &[tracked("bob", 1, Some(1), Some(10))]).await;
    seed_rows(&store, &[tracked("carol", 1, None, Some(10))]).await;

    let mut users = store.list_tracking_users().await.unwrap();
    users.sort();
    assert_eq!(users, vec!["alice".to_string(), "bob".to_string()]);

    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show").episodes(Some(12)).build(),
    ]));
    let summary = checker(&store, source)
        .check_all(&CancellationToken::new())
        .await
        .expect("check failed");

    assert_eq!(summary.episode_updates, 1);
    assert!(store.list_notifications("alice").await.unwrap().is_empty());
    assert_eq!(store.list_notifications("bob").await.unwrap().len(), 1);
    assert!(store.list_notifications("carol").await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelled_check_stops_early() {
    let store = temp_store().await;
    seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show").episodes(Some(13)).build(),
    ]));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = checker(&store, source.clone()).check_all(&cancel).await;

    assert!(result.is_err());
    assert!(source.calls().is_empty());
    assert!(store.list_notifications("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn untitled_sequel_continues_after_highest_season() {
    let store = temp_store().await;
    seed_rows(
        &store,
        &[
            tracked("alice", 1, Some(1), Some(12)),
            tracked("alice", 2, Some(2), Some(12)),
        ],
    )
    .await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show")
            .aired("2020-01-10")
            .related(RelationKind::Sequel, &[2])
            .build(),
        record(2, "Show Season 2")
            .aired("2021-01-08")
            .related(RelationKind::Sequel, &[3])
            .build(),
        record(3, "Show: Final Arc").aired("2023-07-01").build(),
    ]));

    let summary = checker(&store, source)
        .check_user("alice", &CancellationToken::new())
        .await
        .expect("check failed");

    assert_eq!(summary.new_seasons, 1);
    let shows = store.list_shows("alice").await.unwrap();
    let added = shows[0].seasons.last().unwrap();
    assert_eq!((added.season_number, added.mal_id), (3, Some(3)));

    let notifications = store.list_notifications("alice").await.unwrap();
    assert_eq!(notifications[0].season_number, Some(3));
}

#[tokio::test]
async fn stub_rows_keep_the_show_ranking() {
    let store = temp_store().await;
    let mut first = tracked("alice", 1, Some(1), Some(12));
    first.ranking = Some(1);
    seed_rows(&store, &[first]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show").related(RelationKind::Sequel, &[2]).build(),
        record(2, "Show Season 2").aired("2022-01-01").build(),
    ]));

    checker(&store, source)
        .check_user("alice", &CancellationToken::new())
        .await
        .expect("check failed");

    let rows = store.list_tracked("alice").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.ranking == Some(1)));
}

#[tokio::test]
async fn requests_are_paced_across_shows() {
    let interval = Duration::from_millis(100);
    let store = temp_store().await;
    seed_rows(
        &store,
        &[
            titled("Alpha", tracked("alice", 1, Some(1), Some(12))),
            titled("Beta", tracked("alice", 1, Some(2), Some(12))),
            titled("Gamma", tracked("alice", 1, Some(3), Some(12))),
        ],
    )
    .await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Alpha").build(),
        record(2, "Beta").build(),
        record(3, "Gamma").build(),
    ]));

    paced_checker(&store, source.clone(), interval)
        .check_user("alice", &CancellationToken::new())
        .await
        .expect("check failed");

    assert_eq!(source.calls(), vec![1, 2, 3]);
    let gaps = source.gaps();
    assert!(gaps.iter().all(|&gap| gap >= interval), "gaps: {gaps:?}");
}

#[tokio::test]
async fn requests_are_paced_across_users() {
    let interval = Duration::from_millis(100);
    let store = temp_store().await;
    seed_rows(&store, &[titled("Alpha", tracked("alice", 1, Some(1), Some(12)))]).await;
    seed_rows(&store, &[titled("Beta", tracked("bob", 1, Some(2), Some(12)))]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Alpha").build(),
        record(2, "Beta").build(),
    ]));

    paced_checker(&store, source.clone(), interval)
        .check_all(&CancellationToken::new())
        .await
        .expect("check failed");

    assert_eq!(source.calls().len(), 2);
    let gaps = source.gaps();
    assert!(gaps.iter().all(|&gap| gap >= interval), "gaps: {gaps:?}");
}

/// Reads pass through to the store; every write fails.
struct ReadOnlyStore(Store);

#[async_trait::async_trait]
impl WatchlistStore for ReadOnlyStore {
    async fn create_entries(
        &self,
        _entries: &[NewTrackedAnime],
    ) -> anyhow::Result<Vec<TrackedAnime>> {
        anyhow::bail!("database is locked")
    }

    async fn update_entry(
        &self,
        _id: &str,
        _update: &TrackedAnimeUpdate,
    ) -> anyhow::Result<Option<TrackedAnime>> {
        anyhow::bail!("database is locked")
    }

    async fn list_entries_by_show_title(&self, user_id: &str) -> anyhow::Result<Vec<ShowGroup>> {
        self.0.list_entries_by_show_title(user_id).await
    }

    async fn list_user_ids(&self) -> anyhow::Result<Vec<String>> {
        self.0.list_user_ids().await
    }
}

fn read_only_checker(store: &Store, source: Arc<FakeSource>) -> UpdateChecker {
    let sink: Arc<dyn NotificationSink> = Arc::new(store.clone());
    UpdateChecker::new(
        source,
        Arc::new(ReadOnlyStore(store.clone())),
        sink,
        Duration::ZERO,
    )
}

#[tokio::test]
async fn failed_episode_write_sends_no_notification() {
    let store = temp_store().await;
    seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show").episodes(Some(13)).build(),
    ]));

    let result = read_only_checker(&store, source)
        .check_user("alice", &CancellationToken::new())
        .await;

    assert!(result.is_err());
    assert!(store.list_notifications("alice").await.unwrap().is_empty());
    let rows = store.list_tracked("alice").await.unwrap();
    assert_eq!(rows[0].total_episodes, Some(12));
}

#[tokio::test]
async fn failed_stub_insert_sends_no_notification() {
    let store = temp_store().await;
    seed_rows(&store, &[tracked("alice", 1, Some(1), Some(12))]).await;
    let source = Arc::new(FakeSource::new(vec![
        record(1, "Show").related(RelationKind::Sequel, &[2]).build(),
        record(2, "Show Season 2").aired("2022-01-01").build(),
    ]));

    let result = read_only_checker(&store, source)
        .check_user("alice", &CancellationToken::new())
        .await;

    assert!(result.is_err());
    assert!(store.list_notifications("alice").await.unwrap().is_empty());
    assert_eq!(store.list_tracked("alice").await.unwrap().len(), 1);
}
