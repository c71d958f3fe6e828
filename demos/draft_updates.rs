//! Draft Updates
//!
//! This example shows the three update shapes a slice can hand to its
//! mutator and how devtools record them, including replacement and the
//! label fallback for callers that cannot be named.
//!
//! Key concepts:
//! - Partial objects are merged at the top level
//! - Functional updates receive the current data
//! - Draft updates mutate a working copy in place
//! - `replace` swaps the data while actions stay callable
//!
//! Run with: cargo run --example draft_updates

use serde_json::json;
use slicestate::compose::{create_slices, LabelFallback, Slices};
use slicestate::core::{Slice, Update};
use slicestate::devtools::{self, DevtoolsOptions};
use slicestate::infer::FixedInference;
use slicestate::store::{BoxError, Store};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    println!("=== Draft Updates Example ===\n");

    let slices = Slices::builder()
        .slice("todo", |set, _get, _store| {
            let (rename, push, reset) = (set.clone(), set.clone(), set);
            Ok(Slice::new()
                .field("title", "groceries")
                .field("items", json!([]))
                .command("rename", move || {
                    rename.set(json!({ "todo": { "title": "errands", "items": [] } }));
                })
                .action("push", move |args| {
                    let item = args.first().cloned().unwrap_or_default();
                    push.set(Update::draft(move |s| {
                        if let Some(items) = s["todo"]["items"].as_array_mut() {
                            items.push(item);
                        }
                    }));
                    json!(true)
                })
                .command("reset", move || {
                    reset.replace(Update::with(|_| {
                        let mut data = serde_json::Map::new();
                        data.insert("todo".into(), json!({ "title": "groceries", "items": [] }));
                        data
                    }));
                }))
        })
        .inference(FixedInference::unknown())
        .fallback(LabelFallback::Sentinel("unnamed".into()))
        .build()?;

    let store = Store::create(devtools::devtools(
        create_slices(slices),
        DevtoolsOptions::default().named("Todo"),
    ))?;

    store.subscribe(|next, _previous| {
        println!("  -> {:?}", next.slice("todo"));
    });

    store.dispatch("todo", "push", &[json!("milk")])?;
    store.dispatch("todo", "push", &[json!("eggs")])?;
    store.dispatch("todo", "rename", &[])?;
    store.dispatch("todo", "reset", &[])?;
    store.dispatch("todo", "push", &[json!("bread")])?;

    let connection = devtools::connection(&store).ok_or("devtools not attached")?;
    println!("\nRecorded actions:");
    for record in connection.history().records() {
        let kind = if record.replaced { "replace" } else { "merge" };
        println!("  {:<16} {kind}", record.label);
    }

    println!("\nExport:\n{}", connection.export_json()?);
    Ok(())
}
