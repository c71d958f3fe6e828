//! Property-based tests for slice composition and labeling.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use serde_json::json;
use slicestate::compose::{create_slices, CompositionError, LabelFallback, SliceMutator, Slices};
use slicestate::core::{MutationEnvelope, Slice};
use slicestate::devtools::{self, DevtoolsOptions};
use slicestate::infer::{caller_name_from_stack, FixedInference};
use slicestate::store::{BoxError, GetState, Store};

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn touch(set: SliceMutator, _get: GetState, _store: Store) -> Result<Slice, BoxError> {
    let name = set.slice().to_string();
    Ok(Slice::new().field("touched", 0).command("touch", move || {
        set.set(json!({ name.clone(): { "touched": 1 } }));
    }))
}

fn slices_named<'a>(names: impl IntoIterator<Item = &'a String>) -> Slices {
    names
        .into_iter()
        .fold(Slices::builder(), |builder, name| builder.slice(name.as_str(), touch))
        .inference(FixedInference::named("touch"))
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn composed_keys_match_slice_names(names in btree_set(identifier(), 0..8)) {
        let store = Store::create(create_slices(slices_named(&names))).unwrap();
        let state = store.get_state();

        let keys: Vec<&str> = state.slice_names().collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        prop_assert_eq!(keys, expected);
        for name in &names {
            prop_assert_eq!(state.field(name, "touched"), Some(&json!(0)));
        }
    }

    #[test]
    fn any_repeated_name_is_rejected(names in vec(identifier(), 1..8), pick in any::<prop::sample::Index>()) {
        let repeated = pick.get(&names).clone();
        let result = names
            .iter()
            .chain(std::iter::once(&repeated))
            .fold(Slices::builder(), |builder, name| builder.slice(name.as_str(), touch))
            .build();

        match result {
            Err(CompositionError::DuplicateSlices(duplicates)) => {
                prop_assert!(duplicates.contains(&repeated));
            }
            other => prop_assert!(false, "Expected duplicate slices, got {:?}", other),
        }
    }

    #[test]
    fn inferred_labels_are_prefixed_with_the_slice(names in btree_set(identifier(), 1..6)) {
        let store = Store::create(devtools::devtools(
            create_slices(slices_named(&names)),
            DevtoolsOptions::default(),
        ))
        .unwrap();

        for name in &names {
            store.dispatch(name, "touch", &[]).unwrap();
        }

        let labels = devtools::connection(&store).unwrap().labels();
        let expected: Vec<String> = std::iter::once("@@INIT".to_string())
            .chain(names.iter().map(|name| format!("{name}/touch")))
            .collect();
        prop_assert_eq!(labels, expected);
    }

    #[test]
    fn explicit_labels_survive_composition(slice in identifier(), label in "[a-z/ ]{1,20}") {
        let explicit = label.clone();
        let slices = Slices::builder()
            .slice(slice.as_str(), move |set, _get, _store| {
                let label = explicit.clone();
                Ok(Slice::new().command("rename", move || {
                    set.call(MutationEnvelope::new(json!({ "renamed": true })).labeled(label.clone()));
                }))
            })
            .inference(FixedInference::named("ignored"))
            .build()
            .unwrap();
        let store = Store::create(devtools::devtools(create_slices(slices), DevtoolsOptions::default())).unwrap();

        store.dispatch(&slice, "rename", &[]).unwrap();

        let labels = devtools::connection(&store).unwrap().labels();
        prop_assert_eq!(labels, vec!["@@INIT".to_string(), label]);
    }

    #[test]
    fn sentinel_fallback_is_prefixed(slice in identifier(), sentinel in "[a-z ]{1,12}") {
        let fallback = LabelFallback::Sentinel(sentinel.clone());
        prop_assert_eq!(fallback.label_for(&slice), Some(format!("{slice}/{sentinel}")));
        prop_assert_eq!(LabelFallback::Omit.label_for(&slice), None);
    }

    #[test]
    fn text_without_the_marker_has_no_caller(text in "[ -~\n]{0,200}") {
        prop_assume!(!text.contains("infer_caller_name"));
        prop_assert_eq!(caller_name_from_stack(&text, "infer_caller_name"), None);
    }

    #[test]
    fn named_frame_above_the_mutator_is_reported(name in "[A-Za-z_][A-Za-z0-9_]{0,15}") {
        let stack = format!(
            "Error\n    at infer_caller_name (mw.js:1:1)\n    at mutator (mw.js:2:2)\n    at {name} (app.js:3:3)\n"
        );
        prop_assert_eq!(caller_name_from_stack(&stack, "infer_caller_name"), Some(name));
    }
}
