//! Track warp: activating a track on one surface and having every other
//! surface follow exactly once.

mod activation;
mod dedup;

pub use activation::{track_warp, ActiveTrack, TrackActivation, TrackDifficulty};
pub use dedup::{DedupWatcher, OncePerKey};

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::bus::SubscriptionGuard;

    fn python_basics() -> ActiveTrack {
        ActiveTrack {
            world_slug: "python".to_string(),
            track_slug: "python-basics".to_string(),
            label: "Python Basics".to_string(),
            difficulty: TrackDifficulty::Novice,
        }
    }

    fn recorder(activation: &TrackActivation) -> (Arc<Mutex<Vec<ActiveTrack>>>, SubscriptionGuard) {
        let warps = Arc::new(Mutex::new(Vec::new()));
        let sink = warps.clone();
        let subscription = track_warp(activation, move |track| {
            sink.lock().unwrap().push(track.clone());
        });
        (warps, subscription)
    }

    #[test]
    fn calls_on_warp_when_track_activates() {
        let activation = TrackActivation::new();
        let (warps, _sub) = recorder(&activation);

        activation.warp_to(python_basics());

        assert_eq!(*warps.lock().unwrap(), vec![python_basics()]);
    }

    #[test]
    fn no_active_track_never_warps() {
        let activation = TrackActivation::new();
        let (warps, _sub) = recorder(&activation);

        activation.clear();

        assert!(warps.lock().unwrap().is_empty());
    }

    #[test]
    fn warps_once_per_track_slug() {
        let activation = TrackActivation::new();
        let (warps, _sub) = recorder(&activation);

        let first = python_basics();
        activation.warp_to(first.clone());
        // New value, same slug.
        activation.warp_to(ActiveTrack {
            label: "Python Basics (again)".to_string(),
            ..first.clone()
        });
        let second = ActiveTrack {
            track_slug: "python-advanced".to_string(),
            ..first.clone()
        };
        activation.warp_to(second.clone());

        assert_eq!(*warps.lock().unwrap(), vec![first, second]);
    }

    #[test]
    fn returning_to_same_track_through_empty_does_not_rewarp() {
        let activation = TrackActivation::new();
        let (warps, _sub) = recorder(&activation);

        activation.warp_to(python_basics());
        activation.clear();
        activation.warp_to(python_basics());

        assert_eq!(warps.lock().unwrap().len(), 1);
    }

    #[test]
    fn late_watcher_picks_up_current_track_once() {
        let activation = TrackActivation::new();
        activation.warp_to(python_basics());

        let (warps, _sub) = recorder(&activation);
        activation.warp_to(python_basics());

        assert_eq!(*warps.lock().unwrap(), vec![python_basics()]);
    }

    #[test]
    fn surfaces_dedup_independently() {
        let activation = TrackActivation::new();
        let (workshop, _a) = recorder(&activation);
        activation.warp_to(python_basics());
        let (cyberdeck, _b) = recorder(&activation);

        assert_eq!(workshop.lock().unwrap().len(), 1);
        assert_eq!(cyberdeck.lock().unwrap().len(), 1);
    }

    #[test]
    fn unsubscribed_watcher_stops_warping() {
        let activation = TrackActivation::new();
        let (warps, guard) = recorder(&activation);
        guard.subscription().unsubscribe();
        assert!(!guard.subscription().is_active());

        activation.warp_to(python_basics());

        assert!(warps.lock().unwrap().is_empty());
    }

    #[test]
    fn unmounted_surface_stops_warping() {
        let activation = TrackActivation::new();
        let (warps, guard) = recorder(&activation);
        activation.warp_to(python_basics());

        drop(guard);
        activation.warp_to(ActiveTrack {
            track_slug: "python-advanced".to_string(),
            ..python_basics()
        });

        assert_eq!(*warps.lock().unwrap(), vec![python_basics()]);
    }

    #[test]
    fn active_track_serializes_like_the_store() {
        let value = serde_json::to_value(python_basics()).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "worldSlug": "python",
                "trackSlug": "python-basics",
                "label": "Python Basics",
                "difficulty": "NOVICE"
            })
        );
    }
}
