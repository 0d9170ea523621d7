//! # Model Store Demo
//!
//! Runs a small todo model end to end:
//! 1.  Adds todos through bound action creators.
//! 2.  Saves them with a thunk and notifies the listeners of its completion.
//! 3.  Adds a `stats` model at runtime and removes it again.
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! ```

use model_store::lifecycle::setup_tracing;
use model_store::{action, create_store, thunk, Listeners, Model, StoreConfig, StoreError};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, info_span, Instrument};

fn todo_model() -> Model {
    let save = thunk(|actions, _, ctx| async move {
        let items = ctx.get_state()["items"].clone();
        tokio::time::sleep(Duration::from_millis(20)).await;
        actions.dispatch("setSaved", json!(true))?;
        Ok(items)
    });

    let todos = Model::new()
        .with("items", json!([]))
        .with("saved", json!(false))
        .with(
            "add",
            action(|mut state, payload| {
                if let Some(items) = state["items"].as_array_mut() {
                    items.push(payload);
                }
                state["saved"] = json!(false);
                state
            }),
        )
        .with("setSaved", action(|mut state, payload| {
            state["saved"] = payload;
            state
        }))
        .with("save", save.clone());

    let audit = Model::new().with("saves", json!(0)).with(
        "listeners",
        Listeners::new().on(
            &save,
            action(|mut state, payload: Value| {
                let saves = state["saves"].as_i64().unwrap_or(0);
                state["saves"] = json!(saves + 1);
                state["last"] = payload;
                state
            }),
        ),
    );

    Model::new().with("todos", todos).with("audit", audit)
}

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    setup_tracing();

    let store = create_store(todo_model(), StoreConfig::default());
    let actions = store.actions();

    async {
        actions.dispatch("todos.add", json!("write docs"))?;
        actions.dispatch("todos.add", json!("ship it"))?;
        info!(count = store.get_state()["todos"]["items"].as_array().map_or(0, Vec::len), "Todos added");
        Ok::<_, StoreError>(())
    }
    .instrument(info_span!("adding"))
    .await?;

    async {
        let save = actions.thunk("todos.save")?;
        let saved = save.run(Value::Null).await?;
        store.trigger_listeners(save, saved).await?;
        info!(saves = %store.get_state()["audit"]["saves"], "Todos saved");
        Ok::<_, StoreError>(())
    }
    .instrument(info_span!("saving"))
    .await?;

    store.add_model(
        "stats",
        Model::value(json!(0)).with("bump", action(|n, _| json!(n.as_i64().unwrap_or(0) + 1))),
    );
    store.actions().dispatch("stats.bump", Value::Null)?;
    info!(stats = %store.get_state()["stats"], "Stats model added");

    store.remove_model("stats");
    store.actions().run("logFullState", Value::Null).await?;

    info!("Demo finished");
    Ok(())
}
