use std::collections::HashMap;

use blockverse_shared::protocol::{ClientMsg, ConnectionId, ServerMsg};
use tokio::sync::{mpsc, oneshot};

use crate::auth::Identity;
use crate::registry::{Delivery, RelayError, RoomRegistry};

/// Commands from client connections to the relay task
pub enum RelayCommand {
    Connect {
        identity: Identity,
        outbox: mpsc::Sender<ServerMsg>,
        response: oneshot::Sender<ConnectionId>,
    },
    Client {
        id: ConnectionId,
        msg: ClientMsg,
    },
    Disconnect {
        id: ConnectionId,
    },
}

/// Registry plus the per-connection outboxes it delivers into.
pub struct Relay {
    registry: RoomRegistry,
    outboxes: HashMap<ConnectionId, mpsc::Sender<ServerMsg>>,
}

impl Relay {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            registry,
            outboxes: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn handle(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Connect {
                identity,
                outbox,
                response,
            } => {
                let user_id = identity.user_id.clone();
                let (id, deliveries) = self.registry.connect(identity);
                self.outboxes.insert(id, outbox);
                if response.send(id).is_err() {
                    // Socket went away before learning its id
                    self.disconnect(id);
                    return;
                }
                tracing::info!("Connection {} opened for user {}", id, user_id);
                self.deliver(deliveries);
            }
            RelayCommand::Client { id, msg } => {
                let result = self.apply(id, msg);
                match result {
                    Ok(deliveries) => self.deliver(deliveries),
                    Err(RelayError::PolicyRejected(violation)) => {
                        tracing::warn!("Connection {} move rejected: {}", id, violation);
                    }
                    Err(e) => {
                        tracing::debug!("Connection {} message ignored: {}", id, e);
                    }
                }
            }
            RelayCommand::Disconnect { id } => self.disconnect(id),
        }
    }

    fn apply(&mut self, id: ConnectionId, msg: ClientMsg) -> Result<Vec<Delivery>, RelayError> {
        match msg {
            ClientMsg::JoinWorld(join) => self.registry.join(id, &join.world_id, &join.display_name),
            ClientMsg::PlayerMove(m) => self.registry.move_player(id, m.position, m.rotation),
            ClientMsg::BlockPlaced(b) => self.registry.place_block(id, b.position, b.block_id),
            ClientMsg::BlockDestroyed(b) => self.registry.destroy_block(id, b.position),
            ClientMsg::LeaveWorld => self.registry.leave(id),
        }
    }

    fn disconnect(&mut self, id: ConnectionId) {
        let deliveries = self.registry.disconnect(id);
        self.outboxes.remove(&id);
        self.deliver(deliveries);
        tracing::info!("Connection {} closed", id);
    }

    /// Push deliveries into outboxes without waiting. A full outbox drops the
    /// message for that recipient only.
    fn deliver(&self, deliveries: Vec<Delivery>) {
        for Delivery { to, msg } in deliveries {
            let Some(outbox) = self.outboxes.get(&to) else {
                continue;
            };
            match outbox.try_send(msg) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!("Connection {} outbox full, dropping message", to);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!("Connection {} outbox closed", to);
                }
            }
        }
    }
}

/// Run the relay. Owns all session and room state.
pub async fn run_relay(mut cmd_rx: mpsc::Receiver<RelayCommand>, registry: RoomRegistry) {
    let mut relay = Relay::new(registry);

    while let Some(cmd) = cmd_rx.recv().await {
        relay.handle(cmd);
    }

    tracing::info!("Relay ended");
}
