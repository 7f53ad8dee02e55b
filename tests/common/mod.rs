// tests/common/mod.rs
//! Shared fixtures for the arcade integration tests.

use evalforge_lib::config::{ApiConfig, ArcadeConfig};
use evalforge_lib::ArcadeApp;
use httpmock::Method::GET;
use httpmock::{Mock, MockServer};
use serde_json::{json, Value};

pub fn app_for(server: &MockServer) -> ArcadeApp {
    let config = ArcadeConfig {
        api: ApiConfig {
            base_url: server.base_url(),
            timeout_ms: 5_000,
        },
        ..ArcadeConfig::default()
    };
    ArcadeApp::new(config).expect("app should build against the mock server")
}

pub fn quest_json(slug: &str, state: &str) -> Value {
    json!({
        "id": 11,
        "slug": slug,
        "world_id": "world-python",
        "track_id": "python-basics",
        "order_index": 3,
        "title": "Reactor Warmup",
        "short_description": "Heat up the core",
        "state": state,
        "best_score": null,
        "attempts": 0,
        "base_xp_reward": 100,
        "mastery_xp_bonus": 50
    })
}

pub fn mock_world_progress(server: &MockServer, progress: f64) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/api/worlds/progress");
        then.status(200).json_body(json!({
            "tracks": [{
                "world_slug": "world-python",
                "track_slug": "python-basics",
                "label": "Python Basics",
                "progress": progress,
                "total_quests": 8,
                "completed_quests": 4
            }]
        }));
    })
}
