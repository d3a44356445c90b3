//! Every way a question can fail, and what the caller sees.

use std::path::PathBuf;

use kinema::config::Config;
use kinema::{FixtureSource, GeminiClient, QueryError, ScenarioSource, parse_scenario};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

mod parsing {
    use super::*;

    #[test]
    fn empty_object_is_empty_result() {
        let source = FixtureSource::from_path(fixture("declined.json"));
        assert_eq!(source.ask("what is love?"), Err(QueryError::EmptyResult));
    }

    #[test]
    fn non_increasing_track_is_malformed() {
        let source = FixtureSource::from_path(fixture("bad_track.json"));
        let err = source.ask("q").unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)), "{err:?}");
        assert!(err.to_string().contains("does not come after"));
    }

    #[test]
    fn single_sample_track_is_malformed() {
        let text = r#"{
            "concept": "c", "category": "motion_1d", "visualization_mode": "space_motion",
            "assumptions": [],
            "space_motion": {"object": "o", "motion": [{"time": 0, "x": 0, "y": 0}]},
            "final_answer": "", "teaching_note": ""
        }"#;
        assert!(matches!(
            parse_scenario(text),
            Err(QueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn track_too_wide_to_draw_is_malformed() {
        let text = r#"{
            "concept": "c", "category": "motion_1d", "visualization_mode": "space_motion",
            "assumptions": [],
            "space_motion": {"object": "o", "motion": [
                {"time": 0, "x": -1e308, "y": 0},
                {"time": 1, "x": 1e308, "y": 0}
            ]},
            "final_answer": "", "teaching_note": ""
        }"#;
        let err = parse_scenario(text).unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)), "{err:?}");
        assert!(err.to_string().contains("span too far"));
    }

    #[test]
    fn unknown_category_is_malformed() {
        let text = std::fs::read_to_string(fixture("free_fall.json"))
            .unwrap()
            .replace("\"free_fall\"", "\"thermodynamics\"");
        assert!(matches!(
            parse_scenario(&text),
            Err(QueryError::MalformedResponse(m)) if m.contains("thermodynamics")
        ));
    }

    #[test]
    fn truncated_json_is_malformed() {
        let text = std::fs::read_to_string(fixture("free_fall.json")).unwrap();
        let cut = &text[..text.len() / 2];
        assert!(matches!(
            parse_scenario(cut),
            Err(QueryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn fixture_serves_valid_scenario() {
        let source = FixtureSource::from_path(fixture("braking_car.json"));
        let s = source.ask("braking car").unwrap();
        assert_eq!(s.concept, "Uniform deceleration");
    }
}

mod client {
    use super::*;

    #[test]
    fn missing_key_fails_before_any_request() {
        let config = Config {
            api_key: None,
            endpoint: "http://127.0.0.1:9".into(),
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.ask("projectile"), Err(QueryError::MissingCredential));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = Config {
            api_key: Some("   ".into()),
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.ask("projectile"), Err(QueryError::MissingCredential));
    }

    #[test]
    fn unreachable_endpoint_is_transport_failure() {
        let config = Config {
            api_key: Some("test-key".into()),
            endpoint: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        let err = client.ask("braking car").unwrap_err();
        assert!(
            matches!(err, QueryError::TransportFailure { status: None, .. }),
            "{err:?}"
        );
        assert!(err.to_string().starts_with("Request failed"));
    }
}

#[test]
fn messages_are_user_facing() {
    assert!(
        QueryError::MissingCredential
            .to_string()
            .contains("GEMINI_API_KEY")
    );
    assert!(QueryError::EmptyResult.to_string().contains("braking car"));
    assert!(
        QueryError::MalformedResponse("expected value".into())
            .to_string()
            .contains("expected value")
    );
}
