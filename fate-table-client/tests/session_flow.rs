//! End-to-end flows through controller, reducer and poller against the
//! in-memory API.

use std::sync::Arc;

use tokio::sync::mpsc;

use fate_table_client::api::TableApi;
use fate_table_client::testing::{FakeTableApi, MemoryNavigator};
use fate_table_client::Controller;
use fate_table_core::{Message, Model, Reducer, Scene, SessionId};

fn setup() -> (
    Controller,
    Arc<FakeTableApi>,
    Arc<MemoryNavigator>,
    mpsc::UnboundedReceiver<Message>,
) {
    let api = Arc::new(FakeTableApi::new("u1"));
    let navigator = Arc::new(MemoryNavigator::default());
    let (tx, rx) = mpsc::unbounded_channel();
    let controller =
        Controller::new(api.clone(), navigator.clone(), tx).with_reducer(Reducer::seeded(7));
    (controller, api, navigator, rx)
}

/// Apply messages from the channel until the predicate holds on the model.
async fn apply_until<F>(
    controller: &mut Controller,
    rx: &mut mpsc::UnboundedReceiver<Message>,
    mut done: F,
) where
    F: FnMut(&Model) -> bool,
{
    loop {
        let message = rx.recv().await.expect("message stream ended");
        controller.apply(message).await;
        if done(controller.model()) {
            return;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn gamemaster_runs_a_session_from_creation_to_aspect() {
    let (mut controller, _api, navigator, mut rx) = setup();

    controller
        .apply(Message::NewSession {
            title: "Game Night".into(),
        })
        .await;
    assert_eq!(navigator.paths(), vec!["/session/session-1".to_string()]);

    apply_until(&mut controller, &mut rx, |model| model.scene.is_gamemaster()).await;
    let Scene::Gamemaster { session, .. } = &controller.model().scene else {
        unreachable!();
    };
    assert_eq!(session.title, "Game Night");
    assert!(session.aspects.is_empty());

    controller
        .apply(Message::AddAspect {
            name: "Fog".into(),
            target_player: None,
        })
        .await;
    tokio::task::yield_now().await;

    apply_until(&mut controller, &mut rx, |model| {
        model
            .scene
            .session()
            .is_some_and(|s| s.aspects.iter().any(|a| a.name == "Fog"))
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn player_joins_and_sees_their_own_character() {
    let (mut controller, api, navigator, mut rx) = setup();
    api.put_session(FakeTableApi::sample_session("s1", "Game Night", "gm"));

    controller
        .apply(Message::JoinAsPlayer {
            session_id: SessionId::from("s1"),
            name: "Cynere".into(),
        })
        .await;
    assert_eq!(navigator.paths(), vec!["/session/s1".to_string()]);

    apply_until(&mut controller, &mut rx, |model| {
        model.scene.is_player_character()
    })
    .await;
    assert_eq!(
        controller
            .model()
            .scene
            .self_player()
            .map(|p| p.name.as_str()),
        Some("Cynere")
    );
}

#[tokio::test(start_paused = true)]
async fn gamemaster_grants_fate_points_and_player_spends_one() {
    let (mut controller, api, _navigator, mut rx) = setup();
    api.put_session(FakeTableApi::sample_session("s1", "Game Night", "gm"));

    controller
        .apply(Message::JoinAsPlayer {
            session_id: SessionId::from("s1"),
            name: "Cynere".into(),
        })
        .await;
    apply_until(&mut controller, &mut rx, |model| {
        model.scene.is_player_character()
    })
    .await;

    // Grant as the server would (another client's gamemaster action).
    let character_id = fate_table_core::CharacterId::from("char-1");
    api.update_fate_points(&SessionId::from("s1"), &character_id, 2)
        .await
        .expect("grant");
    apply_until(&mut controller, &mut rx, |model| {
        model
            .scene
            .self_player()
            .is_some_and(|p| p.fate_points == 2)
    })
    .await;

    controller.apply(Message::SpendFatePoint).await;
    tokio::task::yield_now().await;
    apply_until(&mut controller, &mut rx, |model| {
        model
            .scene
            .self_player()
            .is_some_and(|p| p.fate_points == 1)
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn deleted_session_ends_in_a_closed_notification_at_home() {
    let (mut controller, api, _navigator, mut rx) = setup();
    api.put_session(FakeTableApi::sample_session("s1", "Game Night", "u1"));

    controller
        .apply(Message::Rejoin {
            session_id: SessionId::from("s1"),
        })
        .await;
    apply_until(&mut controller, &mut rx, |model| model.scene.is_gamemaster()).await;

    api.push_response(Err(fate_table_client::ApiError::NotFound));

    apply_until(&mut controller, &mut rx, |model| {
        model.scene == Scene::home()
    })
    .await;
    assert_eq!(controller.model().notifications.len(), 1);
}
