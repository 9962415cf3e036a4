//! Collection Store Integration Tests
//!
//! Exercises the public store API end to end: loading initial data, running
//! sequences of mutations, and checking that every sibling group stays dense
//! and every item stays reachable.
//!
//! ## Test Coverage
//! - Mixed add/move/remove sequences keep indices `0..n-1`
//! - Guard refusals surface as warnings, not errors
//! - Custom configuration (root sentinel, parent key, orphan holder)
//! - Container-driven deep traversal

#[cfg(test)]
mod collection_store_tests {
    use anyhow::Result;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Once;
    use treebase_core::{
        ChildPolicy, CollectionStore, DuplicateCheck, MoveTarget, NewItem, StoreConfig,
        StoreWarning,
    };

    static INIT: Once = Once::new();

    /// Route store logs to the test output (`RUST_LOG=treebase_core=debug`)
    fn init_tracing() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });
    }

    fn assert_dense(store: &CollectionStore) {
        let parents: HashSet<&str> = store
            .get_collection()
            .values()
            .map(|item| item.pid.as_str())
            .collect();

        for pid in parents {
            let indices: Vec<Option<i64>> = store
                .get_sorted_children(pid)
                .iter()
                .map(|item| item.index)
                .collect();
            let expected: Vec<Option<i64>> = (0..indices.len() as i64).map(Some).collect();
            assert_eq!(indices, expected, "sibling group '{}' is not dense", pid);
        }
    }

    fn assert_all_reachable(store: &CollectionStore) {
        let root = store.config().default_root.clone();
        for item in store.get_collection().values() {
            assert!(
                store.is_deep_parent(&item.id, &root),
                "item '{}' is not reachable from the root",
                item.id
            );
        }
    }

    fn order(store: &CollectionStore, pid: &str) -> Vec<String> {
        store
            .get_sorted_children(pid)
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    #[test]
    fn test_outline_editing_session() -> Result<()> {
        init_tracing();
        let mut store = CollectionStore::new(StoreConfig::default())?;

        let chapter = store.add(NewItem::new().with_field("title", json!("Chapter")), None)?;
        let intro = store.add(
            NewItem::new()
                .with_pid(chapter.id.clone())
                .with_field("title", json!("Intro")),
            None,
        )?;
        let body = store.add(
            NewItem::new()
                .with_pid(chapter.id.clone())
                .with_field("title", json!("Body")),
            None,
        )?;
        let summary = store.add(
            NewItem::new()
                .with_pid(chapter.id.clone())
                .with_index(0)
                .with_field("title", json!("Summary")),
            None,
        )?;

        assert_eq!(order(&store, &chapter.id), vec![summary.id.clone(), intro.id.clone(), body.id.clone()]);
        assert_dense(&store);

        store.move_item(&summary.id, MoveTarget::index(10))?;
        assert_eq!(order(&store, &chapter.id), vec![intro.id.clone(), body.id.clone(), summary.id.clone()]);

        let note = store.add(
            NewItem::new()
                .with_pid(body.id.clone())
                .with_field("title", json!("Note")),
            None,
        )?;
        store.move_item(&note.id, MoveTarget::parent(chapter.id.clone()).at(1))?;
        assert_eq!(
            order(&store, &chapter.id),
            vec![intro.id.clone(), note.id.clone(), body.id.clone(), summary.id.clone()]
        );

        store.remove(&body.id, ChildPolicy::Cascade)?;
        assert_eq!(order(&store, &chapter.id), vec![intro.id, note.id, summary.id]);

        assert_dense(&store);
        assert_all_reachable(&store);
        Ok(())
    }

    #[test]
    fn test_guard_refusals_are_warnings() -> Result<()> {
        init_tracing();
        let mut store = CollectionStore::from_collection_value(
            &json!({
                "docs": {},
                "guide": { "pid": "docs" },
                "intro": { "pid": "guide" }
            }),
            StoreConfig::default(),
        )?;
        store.normalize();

        let outcome = store.move_item("docs", MoveTarget::parent("intro"))?;
        assert!(!outcome.is_applied());
        assert_eq!(
            outcome.warning,
            Some(StoreWarning::CyclicMove {
                id: "docs".to_string(),
                target: "intro".to_string()
            })
        );
        assert_eq!(store.get("docs").map(|item| item.pid.as_str()), Some("root"));

        let warning = serde_json::to_value(outcome.warning)?;
        assert_eq!(warning["type"], "cyclicMove");

        assert_all_reachable(&store);
        Ok(())
    }

    #[test]
    fn test_custom_configuration() -> Result<()> {
        init_tracing();
        let config = StoreConfig::from_json_str(
            r#"{ "pid": "parent", "defaultRoot": "top", "orphanId": "lost+found" }"#,
        )?;
        let mut store = CollectionStore::from_collection_value(
            &json!({
                "home": {},
                "user": { "parent": "home" },
                "notes.txt": { "parent": "user" }
            }),
            config,
        )?;

        assert_eq!(store.get_parents("notes.txt", None), vec!["user", "home"]);

        store.remove("user", ChildPolicy::Orphan)?;
        assert_eq!(order(&store, "lost+found"), vec!["notes.txt"]);
        assert_eq!(store.get("lost+found").map(|item| item.pid.as_str()), Some("top"));

        let exported = store.export_tree_value(None, false);
        assert_eq!(exported[0]["parent"], "top");

        assert_dense(&store);
        assert_all_reachable(&store);
        Ok(())
    }

    #[test]
    fn test_file_tree_with_container_classifier() -> Result<()> {
        init_tracing();
        let mut store = CollectionStore::from_tree_value(
            &json!([
                { "id": "src", "isDir": true, "children": [
                    { "id": "lib.rs" },
                    { "id": "models", "isDir": true, "children": [
                        { "id": "item.rs" }
                    ]}
                ]},
                { "id": "README.md" }
            ]),
            StoreConfig::default(),
        )?
        .with_container_classifier(|item: &treebase_core::Item| {
            item.field("isDir") == Some(&json!(true))
        });
        store.normalize();

        let deep: Vec<&str> = store
            .get_deep_children("src")
            .iter()
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(deep, vec!["lib.rs", "models", "item.rs"]);

        let check = DuplicateCheck::new("name", json!("mod.rs"));
        let first = store.add(
            NewItem::new()
                .with_pid("models")
                .with_field("name", json!("mod.rs")),
            Some(&check),
        )?;
        let second = store.add(
            NewItem::new()
                .with_pid("models")
                .with_field("name", json!("mod.rs")),
            Some(&check),
        )?;
        assert_eq!(first.id, second.id);
        assert_eq!(store.get_direct_children("models").len(), 2);

        assert_dense(&store);
        Ok(())
    }
}
