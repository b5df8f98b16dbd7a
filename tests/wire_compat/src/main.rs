fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tuskit_protocol::{CreateUploadAck, EngineEvent, EventKind, UploadSettings};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON values so that integer-valued floats compare equal.
    ///
    /// The native bridge sends byte counts as doubles (`1024.0`) while the
    /// Rust side writes them back as integers (`1024`).
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => {
                let normalized: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect();
                serde_json::Value::Object(normalized)
            }
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent, float-normalized comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  bridge: {fixture}\n  Rust:   {reserialized}"
        );
        parsed
    }

    #[test]
    fn fixture_success_event() {
        let event = roundtrip_test::<EngineEvent>("success_event.json");
        assert_eq!(event.kind(), EventKind::Success);
        match event {
            EngineEvent::Success(p) => {
                assert_eq!(p.upload_url, "https://tusd.tusdemo.net/files/8d1c3b7e0f9a4c2d");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn fixture_error_event() {
        let event = roundtrip_test::<EngineEvent>("error_event.json");
        assert_eq!(event.kind(), EventKind::Error);
        assert_eq!(
            event.upload_id().as_str(),
            "3f2b8c1e-7d4a-4e1b-9a6f-0c5d2e8b7a41"
        );
    }

    #[test]
    fn fixture_progress_event_with_double_counts() {
        match roundtrip_test::<EngineEvent>("progress_event.json") {
            EngineEvent::Progress(p) => {
                assert_eq!(p.bytes_written, 10 * 1024 * 1024);
                assert_eq!(p.bytes_total, 50 * 1024 * 1024);
            }
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn fixture_upload_settings() {
        let settings = roundtrip_test::<UploadSettings>("upload_settings.json");
        assert_eq!(settings.metadata["filetype"], "video/mp4");
    }

    #[test]
    fn fixture_create_upload_ack() {
        let ack = roundtrip_test::<CreateUploadAck>("create_upload_ack.json");
        assert!(ack.into_result().is_ok());
    }

    #[test]
    fn fixture_create_upload_rejected() {
        let ack = roundtrip_test::<CreateUploadAck>("create_upload_rejected.json");
        assert_eq!(
            ack.into_result(),
            Err(Some("no protocol: sdcard/VID_20240312_181522.mp4".into()))
        );
    }

    #[test]
    fn event_names_match_fixtures() {
        for (name, kind) in [
            ("success_event.json", EventKind::Success),
            ("error_event.json", EventKind::Error),
            ("progress_event.json", EventKind::Progress),
        ] {
            let fixture = load_fixture(name);
            assert_eq!(fixture["event"], kind.name(), "event name in {name}");
        }
    }
}
