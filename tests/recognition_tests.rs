//! End-to-end learning and classification through the recognizer.

use sloth_lib::models::UNKNOWN_ACTIVITY;
use sloth_lib::{
    init_logging, ActivityConfig, ActivityError, ActivityKind, Posture, Recognizer, Topology,
};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn topology() -> Arc<Topology> {
    Arc::new(
        Topology::new()
            .with_node(1, "chest")
            .with_node(2, "thigh")
            .with_node(3, "ankle"),
    )
}

fn recognizer_in(temp_dir: &TempDir) -> Recognizer {
    init_logging();
    Recognizer::new(&ActivityConfig::with_root(temp_dir.path()), topology()).unwrap()
}

#[test]
fn test_sit_and_stand_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = recognizer_in(&temp_dir);

    recognizer
        .learn("sit", Posture::new().with(1, vec![1.0, 2.0]).with(2, vec![0.0, 0.0]))
        .unwrap();
    recognizer
        .learn("stand", Posture::new().with(1, vec![5.0, 5.0]).with(2, vec![0.0, 0.0]))
        .unwrap();

    let live = Posture::new().with(1, vec![1.0, 2.0]).with(2, vec![0.0, 0.0]);
    let classification = recognizer.classify(&live);

    assert_eq!(classification.record.kind(), ActivityKind::Classified);
    assert_eq!(classification.record.name(), "sit");
    assert_eq!(classification.record.accuracy(), 100.0);
    assert!(classification.is_logged());

    let library: Vec<_> = {
        let store = recognizer.store();
        store.load_all_learned().unwrap()
    };
    let scores = recognizer.engine().rank(&live, &library);
    let stand = scores.iter().find(|score| score.name == "stand").unwrap();
    assert!(stand.accuracy < 100.0);
}

#[test]
fn test_partial_dropout_uses_shared_nodes_only() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = recognizer_in(&temp_dir);

    recognizer
        .learn("sit", Posture::new().with(1, vec![0.2, 0.4]).with(2, vec![9.0, 9.0]))
        .unwrap();

    let live = Posture::new().with(1, vec![0.2, 0.4]);
    let classification = recognizer.classify(&live);

    assert_eq!(classification.record.name(), "sit");
    assert_eq!(classification.record.accuracy(), 100.0);
}

#[test]
fn test_empty_library_classifies_as_unknown() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = recognizer_in(&temp_dir);

    let classification = recognizer.classify(&Posture::new().with(3, vec![1.0]));

    assert_eq!(classification.record.name(), UNKNOWN_ACTIVITY);
    assert_eq!(classification.record.accuracy(), 0.0);
    assert!(classification.log_error.is_none());
}

#[test]
fn test_classification_survives_logging_failure() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let mut config = ActivityConfig::with_root(temp_dir.path());
    config.classified_dir = blocker.join("classified");
    let recognizer = Recognizer::new(&config, topology()).unwrap();

    recognizer
        .learn("walk", Posture::new().with(2, vec![1.0, 0.0]))
        .unwrap();
    let classification = recognizer.classify(&Posture::new().with(2, vec![1.0, 0.0]));

    assert_eq!(classification.record.name(), "walk");
    assert_eq!(classification.record.accuracy(), 100.0);
    assert!(!classification.is_logged());
    assert!(matches!(
        classification.log_error,
        Some(ActivityError::Persistence { .. })
    ));
}

#[test]
fn test_learned_library_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    {
        let recognizer = recognizer_in(&temp_dir);
        recognizer
            .learn("lie", Posture::new().with(3, vec![0.0, 0.0, 9.81]))
            .unwrap();
        recognizer
            .learn("stand", Posture::new().with(3, vec![0.0, 9.81, 0.0]))
            .unwrap();
    }

    let recognizer = recognizer_in(&temp_dir);
    assert_eq!(recognizer.learned_names(), vec!["lie", "stand"]);

    let classification = recognizer.classify(&Posture::new().with(3, vec![0.1, 9.7, 0.0]));
    assert_eq!(classification.record.name(), "stand");
    assert!(classification.record.accuracy() < 100.0);
    assert!(classification.record.accuracy() > 0.0);
}

#[test]
fn test_reload_picks_up_external_files() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = recognizer_in(&temp_dir);
    assert_eq!(recognizer.library_len(), 0);

    fs::write(
        temp_dir.path().join("learned").join("260101000000.json"),
        r#"{"name": "jump", "posture": [{"id": 1, "code": [3.0]}]}"#,
    )
    .unwrap();
    fs::write(temp_dir.path().join("learned").join("garbage.json"), "[]").unwrap();

    assert_eq!(recognizer.reload().unwrap(), 1);
    assert_eq!(recognizer.learned_names(), vec!["jump"]);
}

#[test]
fn test_concurrent_learn_and_classify() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = Arc::new(recognizer_in(&temp_dir));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let recognizer = Arc::clone(&recognizer);
            thread::spawn(move || {
                let posture = Posture::new().with(1, vec![i as f64, 0.0]);
                if i % 2 == 0 {
                    recognizer.learn(format!("pose-{i}"), posture).unwrap();
                } else {
                    let classification = recognizer.classify(&posture);
                    assert!(classification.is_logged());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(recognizer.library_len(), 3);
    assert_eq!(recognizer.reload().unwrap(), 3);

    let classified = fs::read_dir(recognizer.store().classified_dir())
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .map(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
                .unwrap_or(false)
        })
        .count();
    assert_eq!(classified, 3);
}

#[test]
fn test_unstorable_posture_is_not_learned() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = recognizer_in(&temp_dir);

    let err = recognizer
        .learn("sit", Posture::new().with(1, vec![f64::NAN, 1.0]))
        .unwrap_err();

    assert!(matches!(err, ActivityError::Persistence { .. }));
    assert_eq!(recognizer.library_len(), 0);
    assert_eq!(recognizer.reload().unwrap(), 0);
}

#[test]
fn test_ties_across_subdirectories_go_to_the_earliest_learned() {
    let temp_dir = TempDir::new().unwrap();
    let recognizer = recognizer_in(&temp_dir);
    let learned_dir = temp_dir.path().join("learned");
    fs::create_dir_all(learned_dir.join("a")).unwrap();
    fs::write(
        learned_dir.join("260101000000.json"),
        r#"{"name": "newer", "posture": [{"id": 2, "code": [1.0, 1.0]}]}"#,
    )
    .unwrap();
    fs::write(
        learned_dir.join("a").join("200101000000.json"),
        r#"{"name": "older", "posture": [{"id": 2, "code": [1.0, 1.0]}]}"#,
    )
    .unwrap();

    assert_eq!(recognizer.reload().unwrap(), 2);
    let classification = recognizer.classify(&Posture::new().with(2, vec![1.0, 1.0]));
    assert_eq!(classification.record.name(), "older");
}
