//! Property tests: random operation sequences keep pages and items consistent.

use proptest::prelude::*;
use std::collections::HashSet;
use todo_testkit::prelude::*;

fn assert_matches_model(nb: &todo_store::Notebook, runner: &OpRunner) {
    let report = nb.check_integrity().unwrap();
    assert!(
        report.is_consistent(),
        "violations: {:?}",
        report.violations
    );

    let pages = nb.list_pages().unwrap();
    let page_ids: Vec<_> = pages.iter().map(|p| p.id).collect();
    let model_ids: Vec<_> = runner.pages().iter().map(|p| p.id).collect();
    assert_eq!(page_ids, model_ids);

    for model in runner.pages() {
        let items = nb.list_items_in_page(model.id).unwrap();
        assert_eq!(items.len(), model.items.len());
        for (item, (id, data)) in items.iter().zip(&model.items) {
            assert_eq!(item.id, *id);
            assert_eq!(item.page, model.id);
            assert_eq!(item.text, data.text);
            assert_eq!(item.done, data.done);
        }
    }

    assert_eq!(nb.store().item_count().unwrap(), runner.item_count());
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn random_operations_preserve_integrity(ops in notebook_op_sequence_strategy(1, 60)) {
        let test = TestNotebook::memory();
        let mut runner = OpRunner::new();

        for op in &ops {
            runner.apply(&test, op).unwrap();
        }
        assert_matches_model(&test, &runner);
    }

    #[test]
    fn state_survives_reopen(ops in notebook_op_sequence_strategy(1, 30)) {
        let test = TestNotebook::file();
        let mut runner = OpRunner::new();
        for op in &ops {
            runner.apply(&test, op).unwrap();
        }

        let test = test.reopen();
        assert_matches_model(&test, &runner);
    }

    #[test]
    fn deleted_page_leaves_no_items(pages in 1usize..4, items in 0usize..6) {
        let (test, seeded) = scenarios::seeded_notebook(pages, items);
        let (victim, victim_items) = &seeded[0];

        let deleted = test.delete_page(victim.id).unwrap();
        prop_assert_eq!(&deleted.items, &victim.items);

        for item in victim_items {
            prop_assert!(test.store().get_item(item.id).unwrap().is_none());
        }
        let remaining: HashSet<_> = test
            .list_pages()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        prop_assert!(!remaining.contains(&victim.id));
        prop_assert_eq!(test.store().item_count().unwrap(), (pages - 1) * items);
        prop_assert!(test.check_integrity().unwrap().is_consistent());
    }

    #[test]
    fn missing_page_never_gains_items(data in item_data_strategy(), id in entity_id_strategy()) {
        let test = TestNotebook::memory();
        let err = test.add_item_to_page(id, data).unwrap_err();
        prop_assert!(err.is_not_found());
        prop_assert_eq!(test.store().item_count().unwrap(), 0);
    }
}

#[test]
fn nil_id_is_never_found() {
    with_notebook(|nb| {
        scenarios::seed(nb, 2, 2);
        assert!(nb.get_page(nil_id()).unwrap_err().is_not_found());
    });
}

#[test]
fn seeded_file_notebook_is_persisted() {
    with_file_notebook(|nb, path| {
        scenarios::seed(nb, 3, 2);
        assert!(path.join("SNAPSHOT").is_file());
        assert!(nb.store().snapshot_size().unwrap() > 0);
        assert!(nb.check_integrity().unwrap().is_consistent());
    });
}
