//! Property tests for queue removal.

use autopost::idea::Idea;
use autopost::queue::IdeaStore;
use proptest::prelude::*;
use tempfile::TempDir;

fn write_queue(texts: &[String]) -> (IdeaStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = IdeaStore::new(dir.path().join("post_ideas.jsonl"));
    std::fs::write(store.path(), "").unwrap();
    for text in texts {
        store.append(&Idea::new(text.clone())).unwrap();
    }
    (store, dir)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn remove_drops_every_copy_and_nothing_else(
        texts in proptest::collection::vec("[abc]{1,2}", 0..12),
        target in "[abc]{1,2}",
    ) {
        let (store, _dir) = write_queue(&texts);
        let idea = Idea::new(target.clone());

        let expected_removed = texts.iter().filter(|t| **t == target).count();
        prop_assert_eq!(store.remove(&idea).unwrap(), expected_removed);

        let remaining: Vec<String> = store
            .load_all()
            .unwrap()
            .iter()
            .map(|i| i.text().to_string())
            .collect();
        let expected: Vec<String> = texts.iter().filter(|t| **t != target).cloned().collect();
        prop_assert_eq!(remaining, expected);

        let snapshot = std::fs::read_to_string(store.path()).unwrap();
        prop_assert_eq!(store.remove(&idea).unwrap(), 0);
        prop_assert_eq!(std::fs::read_to_string(store.path()).unwrap(), snapshot);
    }

    #[test]
    fn has_pending_matches_record_count(texts in proptest::collection::vec("[a-z ]{1,8}", 0..6)) {
        let (store, _dir) = write_queue(&texts);
        prop_assert_eq!(store.has_pending().unwrap(), !texts.is_empty());
    }
}
