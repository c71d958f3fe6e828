//! Bears and Fish
//!
//! This example composes three slices into one store with devtools attached
//! and prints the action labels the devtools connection recorded.
//!
//! Key concepts:
//! - Each slice's data and actions live under the slice name
//! - A shared slice calls other slices' actions through `get`
//! - Unlabeled mutations are labeled `"<slice>/<function>"`
//!
//! Run with: RUST_LOG=slicestate=trace cargo run --example bears_and_fish

use serde_json::{json, Value};
use slicestate::compose::{create_slices, SliceMutator};
use slicestate::core::{Slice, Update};
use slicestate::devtools::{self, DevtoolsOptions};
use slicestate::slices;
use slicestate::store::{BoxError, GetState, Store};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[inline(never)]
fn add_bear(set: &SliceMutator) -> Value {
    set.set(Update::draft(|s| {
        let bears = s["bear"]["bears"].as_i64().unwrap_or(0);
        s["bear"]["bears"] = json!(bears + 1);
    }));
    Value::Null
}

#[inline(never)]
fn add_fish(set: &SliceMutator) -> Value {
    set.set(Update::draft(|s| {
        let fishes = s["fish"]["fishes"].as_i64().unwrap_or(0);
        s["fish"]["fishes"] = json!(fishes + 1);
    }));
    Value::Null
}

fn bear(set: SliceMutator, _get: GetState, _store: Store) -> Result<Slice, BoxError> {
    let eat = set.clone();
    Ok(Slice::new()
        .field("bears", 0)
        .action("add_bear", move |_| add_bear(&set))
        .command("eat_fish", move || {
            eat.set_labeled(json!({ "fish": { "fishes": 0 } }), "bear/eat_fish");
        }))
}

fn fish(set: SliceMutator, _get: GetState, _store: Store) -> Result<Slice, BoxError> {
    Ok(Slice::new()
        .field("fishes", 0)
        .action("add_fish", move |_| add_fish(&set)))
}

fn shared(_set: SliceMutator, get: GetState, _store: Store) -> Result<Slice, BoxError> {
    Ok(Slice::new().action("add_both", move |_| {
        let state = get();
        let added = state.call("bear", "add_bear", &[]).is_ok()
            && state.call("fish", "add_fish", &[]).is_ok();
        json!(added)
    }))
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    println!("=== Bears and Fish Example ===\n");

    let slices = slices! {
        bear: bear,
        fish: fish,
        shared: shared,
    }?;

    let store = Store::create(devtools::devtools(
        create_slices(slices),
        DevtoolsOptions::default().named("Bears and Fish"),
    ))?;

    println!("Initial state: {:?}", store.get_state().data());

    store.dispatch("bear", "add_bear", &[])?;
    store.dispatch("fish", "add_fish", &[])?;
    store.dispatch("shared", "add_both", &[])?;
    store.dispatch("bear", "eat_fish", &[])?;

    println!("Final state:   {:?}", store.get_state().data());

    if let Some(connection) = devtools::connection(&store) {
        println!("\nRecorded actions:");
        for label in connection.labels() {
            println!("  {label}");
        }
    }

    Ok(())
}
