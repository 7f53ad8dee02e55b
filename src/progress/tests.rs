use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;

use crate::bus::{ArcadeBus, ArcadeEvent, Subscription};
use crate::progress::{
    BootstrapOutcome, ProgressProjection, RefreshOutcome, SurfaceScope, TrackProgressCache,
};
use crate::testing::{snapshot, ScriptedSource};

fn projection_with(source: ScriptedSource) -> (Arc<ProgressProjection>, Arc<ScriptedSource>, Arc<ArcadeBus>) {
    let source = Arc::new(source);
    let bus = Arc::new(ArcadeBus::new());
    let projection = Arc::new(ProgressProjection::new(
        source.clone(),
        Arc::new(TrackProgressCache::new()),
        bus.clone(),
    ));
    (projection, source, bus)
}

fn record_events(bus: &ArcadeBus) -> (Arc<Mutex<Vec<ArcadeEvent>>>, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let subscription = bus.subscribe(move |event: &ArcadeEvent| sink.lock().unwrap().push(event.clone()));
    (events, subscription)
}

#[tokio::test]
async fn bootstrap_writes_snapshot() {
    let (projection, _, _) =
        projection_with(ScriptedSource::new().ok(snapshot(&[("python-basics", 45.0)])));

    let outcome = projection.bootstrap().await.expect("bootstrap should succeed");

    assert_eq!(outcome, BootstrapOutcome::Loaded { tracks: 1 });
    assert_eq!(projection.progress("python-basics"), 45.0);
    assert!(projection.is_bootstrapped());
}

#[tokio::test]
async fn bootstrap_failure_keeps_prior_state() {
    let (projection, _, _) = projection_with(
        ScriptedSource::new()
            .fail(500)
            .ok(snapshot(&[("python-basics", 45.0)])),
    );
    projection.cache().set("sql-intro", 10.0);

    let error = projection.bootstrap().await.expect_err("scripted failure");

    assert_eq!(error.status(), Some(500));
    assert_eq!(projection.progress("sql-intro"), 10.0);
    assert!(!projection.cache().contains("python-basics"));
    assert!(!projection.is_bootstrapped());

    // No automatic retry, but the caller may try again.
    let outcome = projection.bootstrap().await.expect("second attempt");
    assert_eq!(outcome, BootstrapOutcome::Loaded { tracks: 1 });
    assert_eq!(projection.progress("python-basics"), 45.0);
    assert_eq!(projection.progress("sql-intro"), 10.0);
}

#[tokio::test]
async fn bootstrap_fetches_once_per_session() {
    let (projection, source, _) =
        projection_with(ScriptedSource::new().ok(snapshot(&[("python-basics", 45.0)])));

    projection.bootstrap().await.expect("first bootstrap");
    let outcome = projection.bootstrap().await.expect("second bootstrap");

    assert_eq!(outcome, BootstrapOutcome::AlreadyLoaded);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn bootstrap_is_last_write_wins_per_slug() {
    let (projection, _, _) = projection_with(ScriptedSource::new().ok(snapshot(&[
        ("python-basics", 10.0),
        ("python-basics", 30.0),
        ("sql-intro", 5.0),
    ])));

    projection.bootstrap().await.expect("bootstrap");

    assert_eq!(projection.progress("python-basics"), 30.0);
    assert_eq!(projection.progress("sql-intro"), 5.0);
}

#[tokio::test]
async fn progress_values_are_clamped() {
    let (projection, _, _) = projection_with(
        ScriptedSource::new().ok(snapshot(&[("over", 140.0), ("under", -5.0), ("half", 49.6)])),
    );

    projection.bootstrap().await.expect("bootstrap");

    assert_eq!(projection.progress("over"), 100.0);
    assert_eq!(projection.progress("under"), 0.0);
    assert_eq!(projection.progress("half"), 49.6);
    assert_eq!(projection.progress("unknown"), 0.0);
}

#[tokio::test]
async fn fractional_progress_is_kept_exactly() {
    let (projection, _, _) = projection_with(
        ScriptedSource::new().ok(snapshot(&[("python-basics", 33.4), ("sql-intro", 99.6)])),
    );

    projection.bootstrap().await.expect("bootstrap");

    assert_eq!(projection.progress("python-basics"), 33.4);
    // Almost done is not done.
    assert_eq!(projection.progress("sql-intro"), 99.6);
    assert!(projection.progress("sql-intro") < 100.0);
    assert_eq!(
        projection.cache().snapshot().get("python-basics").copied(),
        Some(33.4)
    );
}

#[test]
fn non_finite_progress_reads_as_zero() {
    let cache = TrackProgressCache::new();
    cache.set("nan", f64::NAN);
    cache.set("inf", f64::INFINITY);

    assert_eq!(cache.get("nan"), 0.0);
    assert_eq!(cache.get("inf"), 0.0);
    assert!(cache.contains("nan"));
}

#[tokio::test]
async fn refresh_replaces_full_set_and_notifies() {
    let (projection, _, bus) = projection_with(
        ScriptedSource::new()
            .ok(snapshot(&[("python-basics", 45.0), ("sql-intro", 20.0)]))
            .ok(snapshot(&[("python-basics", 60.0)])),
    );
    projection.bootstrap().await.expect("bootstrap");
    let (events, _sub) = record_events(&bus);

    let outcome = projection
        .refresh(Some("python-basics".to_string()))
        .await
        .expect("refresh");

    assert_eq!(outcome, RefreshOutcome::Applied { tracks: 1 });
    assert_eq!(
        projection.cache().snapshot().into_iter().collect::<Vec<_>>(),
        vec![("python-basics".to_string(), 60.0)]
    );
    assert_eq!(
        *events.lock().unwrap(),
        vec![ArcadeEvent::WorldProgressUpdated {
            track_slug: Some("python-basics".to_string())
        }]
    );
}

#[tokio::test]
async fn refresh_failure_changes_nothing() {
    let (projection, _, bus) = projection_with(
        ScriptedSource::new()
            .ok(snapshot(&[("python-basics", 45.0)]))
            .fail(502),
    );
    projection.bootstrap().await.expect("bootstrap");
    let (events, _sub) = record_events(&bus);

    assert!(projection.refresh(None).await.is_err());
    assert_eq!(projection.progress("python-basics"), 45.0);
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn spawned_refresh_swallows_failure() {
    let (projection, source, _) = projection_with(ScriptedSource::new().fail(503));

    let handle = projection.spawn_refresh(None);

    assert!(handle.await.is_ok());
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn overlapping_refreshes_settle_on_latest_issued() {
    let (projection, _, bus) = projection_with(
        ScriptedSource::new()
            .ok_after(Duration::from_millis(100), snapshot(&[("python-basics", 40.0)]))
            .ok_after(Duration::from_millis(10), snapshot(&[("python-basics", 55.0)])),
    );
    let (events, _sub) = record_events(&bus);

    let (older, newer) = tokio::join!(projection.refresh(None), async {
        // Make sure the slow refresh took its ticket first.
        tokio::task::yield_now().await;
        projection.refresh(None).await
    });

    assert_eq!(newer.expect("newer refresh"), RefreshOutcome::Applied { tracks: 1 });
    assert_eq!(older.expect("older refresh"), RefreshOutcome::Stale);
    assert_eq!(projection.progress("python-basics"), 55.0);
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unmounted_surface_discards_bootstrap() {
    let (projection, _, _) = projection_with(ScriptedSource::new().ok_after(
        Duration::from_millis(50),
        snapshot(&[("python-basics", 45.0)]),
    ));
    let scope = SurfaceScope::new();
    let guard = scope.unmount_guard();

    let (outcome, _) = tokio::join!(projection.bootstrap_in(&scope), async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(guard);
    });

    assert_eq!(outcome.expect("discarded"), BootstrapOutcome::Discarded);
    assert!(projection.cache().is_empty());
    assert!(!projection.is_bootstrapped());
}

#[tokio::test]
async fn mounted_surface_bootstraps_normally() {
    let (projection, _, _) =
        projection_with(ScriptedSource::new().ok(snapshot(&[("python-basics", 45.0)])));
    let scope = SurfaceScope::new();

    let outcome = projection.bootstrap_in(&scope).await.expect("bootstrap");

    assert_eq!(outcome, BootstrapOutcome::Loaded { tracks: 1 });
    assert_eq!(projection.progress("python-basics"), 45.0);
}

#[tokio::test]
async fn already_cancelled_scope_does_not_write() {
    let (projection, _, _) =
        projection_with(ScriptedSource::new().ok(snapshot(&[("python-basics", 45.0)])));
    let scope = SurfaceScope::new();
    scope.cancel();

    let outcome = projection.bootstrap_in(&scope).await.expect("discarded");

    assert_eq!(outcome, BootstrapOutcome::Discarded);
    assert!(projection.cache().is_empty());
}
