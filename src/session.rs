use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::engine::GameEngine;
use crate::error::{CommandError, CommandResult};
use crate::server_protocol::{parse_client_message, ParsedClientMessage};
use crate::server_utils::sanitize_name;
use crate::types::{Audience, PlayerClass};

pub type SharedState = Arc<Mutex<ServerState>>;

/// Capacity of each session's outbound queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
}

/// What to do when a session's outbound queue is full. Tick snapshots are
/// superseded by the next one and may be dropped; anything else the
/// session cannot receive ends the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

#[derive(Clone, Debug)]
pub struct ClientContext {
    tx: mpsc::Sender<OutboundMessage>,
    player_id: Option<String>,
}

pub struct ServerState {
    clients: HashMap<String, ClientContext>,
    client_by_player_id: HashMap<String, String>,
    next_client_seq: u64,
    pub game: GameEngine,
}

impl ServerState {
    pub fn new(game: GameEngine) -> Self {
        Self {
            clients: HashMap::new(),
            client_by_player_id: HashMap::new(),
            next_client_seq: 1,
            game,
        }
    }

    /// Registers a connection and returns its session id. The session has no
    /// player until it selects a class.
    pub fn register_client(&mut self, tx: mpsc::Sender<OutboundMessage>) -> String {
        let client_id = format!("client_{}", self.next_client_seq);
        self.next_client_seq += 1;
        self.clients.insert(
            client_id.clone(),
            ClientContext {
                tx,
                player_id: None,
            },
        );
        debug!(%client_id, "session registered");
        client_id
    }

    /// False once the session was dropped, e.g. after its queue overflowed.
    pub fn is_registered(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn player_for_client(&self, client_id: &str) -> Option<&str> {
        self.clients.get(client_id)?.player_id.as_deref()
    }

    /// The live player this session controls.
    fn bound_player(&self, client_id: &str) -> CommandResult<String> {
        let player_id = self
            .player_for_client(client_id)
            .ok_or(CommandError::NotInGame)?;
        if !self.game.has_player(player_id) {
            return Err(CommandError::NotInGame);
        }
        Ok(player_id.to_string())
    }
}

/// Applies one inbound text frame. Malformed frames and rejected commands
/// are dropped without a reply.
pub fn handle_client_message(state: &mut ServerState, client_id: &str, raw: &str) {
    let Some(message) = parse_client_message(raw) else {
        debug!(client_id, "dropping malformed message");
        return;
    };

    let result = match message {
        ParsedClientMessage::SelectClass { class, name } => {
            handle_select_class(state, client_id, &class, name.as_deref()).map(|_| ())
        }
        ParsedClientMessage::UpdatePosition { x, y, angle } => state
            .bound_player(client_id)
            .and_then(|player_id| state.game.update_position(&player_id, x, y, angle)),
        ParsedClientMessage::Shoot { angle } => state
            .bound_player(client_id)
            .and_then(|player_id| state.game.fire(&player_id, angle))
            .map(|_| ()),
        ParsedClientMessage::Reload => state
            .bound_player(client_id)
            .and_then(|player_id| state.game.reload(&player_id)),
        ParsedClientMessage::CollectPowerUp { id } => state
            .bound_player(client_id)
            .and_then(|player_id| state.game.collect_power_up(&player_id, &id)),
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                state,
                client_id,
                json!({ "type": "pong", "t": t }).to_string(),
                QueuePolicy::DisconnectOnFull,
            );
            Ok(())
        }
    };

    if let Err(err) = result {
        debug!(client_id, %err, "command ignored");
    }
    flush_events(state);
}

/// Creates a player for the session and replies with the join snapshot.
/// A session whose previous player died may select again.
fn handle_select_class(
    state: &mut ServerState,
    client_id: &str,
    class: &str,
    name: Option<&str>,
) -> CommandResult<String> {
    let class =
        PlayerClass::parse(class).ok_or_else(|| CommandError::UnknownClass(class.to_string()))?;
    if !state.clients.contains_key(client_id) {
        return Err(CommandError::NotInGame);
    }
    if state.bound_player(client_id).is_ok() {
        return Err(CommandError::AlreadyInGame);
    }

    let name = sanitize_name(name);
    let player_id = state.game.join(&name, class);
    bind_client_to_player(state, client_id, &player_id);
    info!(client_id, %player_id, %name, class = class.as_str(), "player joined");

    let snapshot = state.game.join_snapshot(&player_id);
    if let Some(payload) = tagged_message("init", &snapshot) {
        send_to_client(state, client_id, payload, QueuePolicy::DisconnectOnFull);
    }
    Ok(player_id)
}

fn bind_client_to_player(state: &mut ServerState, client_id: &str, player_id: &str) {
    let previous = state
        .clients
        .get_mut(client_id)
        .and_then(|ctx| ctx.player_id.replace(player_id.to_string()));
    if let Some(previous) = previous {
        state.client_by_player_id.remove(&previous);
    }
    state
        .client_by_player_id
        .insert(player_id.to_string(), client_id.to_string());
}

/// Drops the session and removes its player from the arena.
pub fn disconnect_client(state: &mut ServerState, client_id: &str) {
    disconnect_client_internal(state, client_id);
    flush_events(state);
}

fn disconnect_client_internal(state: &mut ServerState, client_id: &str) {
    let Some(context) = state.clients.remove(client_id) else {
        return;
    };
    let Some(player_id) = context.player_id else {
        debug!(client_id, "session closed before joining");
        return;
    };
    if state.client_by_player_id.get(&player_id).map(String::as_str) == Some(client_id) {
        state.client_by_player_id.remove(&player_id);
    }
    if state.game.remove_player(&player_id) {
        info!(client_id, %player_id, "player left");
    }
}

/// Advances the simulation one tick, delivers its events and broadcasts
/// the world snapshot.
pub fn tick_game(state: &mut ServerState, dt_ms: u64) {
    state.game.step(dt_ms);
    flush_events(state);

    let update = state.game.build_update();
    if let Some(payload) = tagged_message("update", &update) {
        broadcast(state, &payload, QueuePolicy::DropOnFull);
    }
}

/// Sends every joined session its own authoritative state.
pub fn push_corrections(state: &mut ServerState) {
    let targets: Vec<(String, String)> = state
        .clients
        .iter()
        .filter_map(|(client_id, ctx)| Some((client_id.clone(), ctx.player_id.clone()?)))
        .collect();
    for (client_id, player_id) in targets {
        let Some(correction) = state.game.correction_for(&player_id) else {
            continue;
        };
        if let Some(payload) = tagged_message("serverUpdate", &correction) {
            send_to_client(state, &client_id, payload, QueuePolicy::DropOnFull);
        }
    }
}

/// Routes pending engine events to their audiences. Sessions whose queue
/// overflows are disconnected, which may produce further events.
fn flush_events(state: &mut ServerState) {
    loop {
        let events = state.game.drain_events();
        if events.is_empty() {
            return;
        }
        let mut failed = Vec::new();
        for outbound in events {
            let payload = match serde_json::to_string(&outbound.event) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%err, "failed to encode event");
                    continue;
                }
            };
            for client_id in recipients(state, &outbound.audience) {
                let Some(client) = state.clients.get(&client_id) else {
                    continue;
                };
                if client
                    .tx
                    .try_send(OutboundMessage::Text(payload.clone()))
                    .is_err()
                    && !failed.contains(&client_id)
                {
                    failed.push(client_id);
                }
            }
        }
        for client_id in failed {
            warn!(%client_id, "outbound queue full; disconnecting");
            disconnect_client_internal(state, &client_id);
        }
    }
}

fn recipients(state: &ServerState, audience: &Audience) -> Vec<String> {
    match audience {
        Audience::All => state.clients.keys().cloned().collect(),
        Audience::AllExcept(player_id) => state
            .clients
            .iter()
            .filter(|(_, ctx)| ctx.player_id.as_deref() != Some(player_id.as_str()))
            .map(|(client_id, _)| client_id.clone())
            .collect(),
        Audience::Only(player_id) => state
            .client_by_player_id
            .get(player_id)
            .cloned()
            .into_iter()
            .collect(),
    }
}

fn send_to_client(state: &mut ServerState, client_id: &str, payload: String, policy: QueuePolicy) {
    let send_failed = match state.clients.get(client_id) {
        Some(client) => client.tx.try_send(OutboundMessage::Text(payload)).is_err(),
        None => false,
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        warn!(client_id, "outbound queue full; disconnecting");
        disconnect_client(state, client_id);
    }
}

fn broadcast(state: &mut ServerState, payload: &str, policy: QueuePolicy) {
    let mut failed_clients = Vec::new();
    for (client_id, client) in &state.clients {
        if client
            .tx
            .try_send(OutboundMessage::Text(payload.to_string()))
            .is_err()
            && policy == QueuePolicy::DisconnectOnFull
        {
            failed_clients.push(client_id.clone());
        }
    }
    for client_id in failed_clients {
        disconnect_client(state, &client_id);
    }
}

/// Serializes `body` as a JSON object with a `"type"` discriminator added.
fn tagged_message<T: Serialize>(kind: &str, body: &T) -> Option<String> {
    let mut value = match serde_json::to_value(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(kind, %err, "failed to encode message");
            return None;
        }
    };
    value
        .as_object_mut()?
        .insert("type".to_string(), Value::String(kind.to_string()));
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TICK_MS;
    use crate::engine::GameEngineOptions;
    use crate::world::StaticWorld;

    fn quiet_state() -> ServerState {
        let mut game = GameEngine::new(
            GameEngineOptions {
                bot_target: 0,
                world: StaticWorld::default(),
            },
            1,
        );
        game.drain_events();
        ServerState::new(game)
    }

    fn connect(
        state: &mut ServerState,
        capacity: usize,
    ) -> (String, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (state.register_client(tx), rx)
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(OutboundMessage::Text(payload)) = rx.try_recv() {
            messages.push(serde_json::from_str(&payload).expect("valid json"));
        }
        messages
    }

    fn types(messages: &[Value]) -> Vec<String> {
        messages
            .iter()
            .map(|message| message["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn select_class_replies_with_snapshot_and_notifies_others() {
        let mut state = quiet_state();
        let (first, mut first_rx) = connect(&mut state, 16);
        let (second, mut second_rx) = connect(&mut state, 16);

        handle_client_message(
            &mut state,
            &first,
            r#"{"type":"selectClass","class":"rifle","name":"Ann"}"#,
        );
        let messages = drain(&mut first_rx);
        assert_eq!(types(&messages), vec!["init"]);
        let init = &messages[0];
        let player_id = init["playerId"].as_str().expect("player id");
        assert_eq!(state.player_for_client(&first), Some(player_id));
        assert_eq!(init["classes"].as_array().map(Vec::len), Some(4));
        assert!(init["walls"].as_array().is_some_and(|walls| !walls.is_empty()));

        let others = drain(&mut second_rx);
        assert_eq!(types(&others), vec!["playerJoined"]);
        assert_eq!(others[0]["player"]["name"], "Ann");
        assert!(state.player_for_client(&second).is_none());
    }

    #[test]
    fn unknown_class_is_ignored() {
        let mut state = quiet_state();
        let (client, mut rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &client, r#"{"type":"selectClass","class":"bazooka"}"#);
        assert!(drain(&mut rx).is_empty());
        assert!(state.player_for_client(&client).is_none());
        assert!(state.game.players().is_empty());
    }

    #[test]
    fn second_select_while_alive_is_ignored() {
        let mut state = quiet_state();
        let (client, mut rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &client, r#"{"type":"selectClass","class":"rifle"}"#);
        handle_client_message(&mut state, &client, r#"{"type":"selectClass","class":"pyro"}"#);
        assert_eq!(types(&drain(&mut rx)), vec!["init"]);
        assert_eq!(state.game.players().len(), 1);
    }

    #[test]
    fn commands_before_joining_are_ignored() {
        let mut state = quiet_state();
        let (client, mut rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &client, r#"{"type":"shoot","angle":0}"#);
        handle_client_message(&mut state, &client, r#"{"type":"reload"}"#);
        handle_client_message(&mut state, &client, r#"{"type":"updatePosition","x":5,"y":5}"#);
        assert!(drain(&mut rx).is_empty());
        assert!(state.game.bullets().is_empty());
    }

    #[test]
    fn ping_echoes_timestamp() {
        let mut state = quiet_state();
        let (client, mut rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &client, r#"{"type":"ping","t":42.5}"#);
        let messages = drain(&mut rx);
        assert_eq!(messages, vec![json!({ "type": "pong", "t": 42.5 })]);
    }

    #[test]
    fn disconnect_removes_player_and_broadcasts() {
        let mut state = quiet_state();
        let (leaver, mut leaver_rx) = connect(&mut state, 16);
        let (_watcher, mut watcher_rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &leaver, r#"{"type":"selectClass","class":"sniper"}"#);
        drain(&mut leaver_rx);
        drain(&mut watcher_rx);
        let player_id = state.player_for_client(&leaver).expect("joined").to_string();

        disconnect_client(&mut state, &leaver);
        assert!(!state.game.has_player(&player_id));
        assert_eq!(state.client_count(), 1);
        let messages = drain(&mut watcher_rx);
        assert_eq!(messages, vec![json!({ "type": "playerLeft", "id": player_id })]);

        // a second disconnect for the same session is a no-op
        disconnect_client(&mut state, &leaver);
        assert!(drain(&mut watcher_rx).is_empty());
    }

    #[test]
    fn tick_broadcasts_update_and_corrections_are_private() {
        let mut state = quiet_state();
        let (player, mut player_rx) = connect(&mut state, 16);
        let (_lurker, mut lurker_rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &player, r#"{"type":"selectClass","class":"rifle"}"#);
        drain(&mut player_rx);
        drain(&mut lurker_rx);

        tick_game(&mut state, TICK_MS);
        let update = drain(&mut player_rx);
        assert_eq!(types(&update), vec!["update"]);
        assert_eq!(update[0]["players"].as_array().map(Vec::len), Some(1));
        assert_eq!(types(&drain(&mut lurker_rx)), vec!["update"]);

        push_corrections(&mut state);
        let corrections = drain(&mut player_rx);
        assert_eq!(types(&corrections), vec!["serverUpdate"]);
        assert_eq!(corrections[0]["health"], 100);
        assert!(corrections[0]["timestamp"].as_i64().is_some());
        assert!(drain(&mut lurker_rx).is_empty());
    }

    #[test]
    fn full_queue_drops_updates_but_keeps_session() {
        let mut state = quiet_state();
        let (_client, mut rx) = connect(&mut state, 1);
        tick_game(&mut state, TICK_MS);
        tick_game(&mut state, TICK_MS);
        assert_eq!(state.client_count(), 1);
        assert_eq!(types(&drain(&mut rx)), vec!["update"]);
    }

    #[test]
    fn full_queue_on_reliable_message_disconnects_only_that_session() {
        let mut state = quiet_state();
        let (slow, _slow_rx) = connect(&mut state, 1);
        let (fast, mut fast_rx) = connect(&mut state, 16);
        handle_client_message(&mut state, &slow, r#"{"type":"selectClass","class":"rifle"}"#);
        drain(&mut fast_rx);
        let slow_player = state.player_for_client(&slow).expect("joined").to_string();

        // slow queue already holds the init reply
        handle_client_message(&mut state, &fast, r#"{"type":"selectClass","class":"pyro"}"#);
        assert_eq!(state.client_count(), 1);
        assert!(!state.is_registered(&slow));
        assert!(!state.game.has_player(&slow_player));
        let messages = drain(&mut fast_rx);
        assert!(types(&messages).contains(&"init".to_string()));
        assert!(messages
            .iter()
            .any(|message| message["type"] == "playerLeft" && message["id"] == slow_player.as_str()));
    }
}
