use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

use bevy::prelude::Resource;
use blockverse_shared::protocol::{ClientMsg, ServerMsg, PROTOCOL_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone)]
pub enum NetEvent {
    Connected,
    Disconnected,
    Message(ServerMsg),
    ProtocolMismatch { server: u32, client: u32 },
}

#[derive(Debug)]
pub enum NetCommand {
    Send(ClientMsg),
    /// Close the socket and stop reconnecting.
    Close,
}

type NativeCmdSender = tokio::sync::mpsc::UnboundedSender<NetCommand>;

/// Handle to the websocket worker thread for one world visit.
#[derive(Resource)]
pub struct ServerConnection {
    pub state: ConnectionState,
    pub self_id: u32,
    pub server_version: String,
    pub protocol_mismatch: bool,

    event_rx: Mutex<Receiver<NetEvent>>,
    cmd_tx: NativeCmdSender,
}

impl ServerConnection {
    pub fn new(url: String) -> Self {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let cmd_tx = spawn_native_network_thread(url, event_tx);
        Self::with_channels(event_rx, cmd_tx)
    }

    fn with_channels(event_rx: Receiver<NetEvent>, cmd_tx: NativeCmdSender) -> Self {
        Self {
            state: ConnectionState::Connecting,
            self_id: 0,
            server_version: String::new(),
            protocol_mismatch: false,
            event_rx: Mutex::new(event_rx),
            cmd_tx,
        }
    }

    /// Connection with no worker thread: the test feeds events through the
    /// returned sender and reads whatever the client tried to send.
    #[cfg(test)]
    pub fn test_stub() -> (
        Self,
        Sender<NetEvent>,
        tokio::sync::mpsc::UnboundedReceiver<NetCommand>,
    ) {
        let (event_tx, event_rx) = mpsc::channel::<NetEvent>();
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        (Self::with_channels(event_rx, cmd_tx), event_tx, cmd_rx)
    }

    pub fn poll_events(&mut self) -> Vec<NetEvent> {
        let mut out = Vec::new();
        if let Ok(rx) = self.event_rx.lock() {
            while let Ok(evt) = rx.try_recv() {
                out.push(evt);
            }
        }
        out
    }

    pub fn send(&self, msg: ClientMsg) {
        let _ = self.cmd_tx.send(NetCommand::Send(msg));
    }

    pub fn close(&self) {
        let _ = self.cmd_tx.send(NetCommand::Close);
    }
}

fn spawn_native_network_thread(url: String, event_tx: Sender<NetEvent>) -> NativeCmdSender {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    let (cmd_tx, mut cmd_rx) = tokio::sync::mpsc::unbounded_channel::<NetCommand>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_io()
            .enable_time()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                bevy::log::error!("Failed to build network runtime: {}", e);
                return;
            }
        };

        rt.block_on(async move {
            let mut reconnect_delay = Duration::from_millis(1000);
            let max_delay = Duration::from_millis(30_000);

            loop {
                let connect = tokio_tungstenite::connect_async(url.as_str()).await;

                let (ws_stream, _) = match connect {
                    Ok(x) => x,
                    Err(e) => {
                        bevy::log::warn!("Connect failed: {}", e);
                        let _ = event_tx.send(NetEvent::Disconnected);
                        if wait_or_close(&mut cmd_rx, reconnect_delay).await {
                            return;
                        }
                        reconnect_delay = (reconnect_delay.mul_f32(1.5)).min(max_delay);
                        continue;
                    }
                };

                reconnect_delay = Duration::from_millis(1000);
                let _ = event_tx.send(NetEvent::Connected);

                let (mut write, mut read) = ws_stream.split();

                loop {
                    tokio::select! {
                        biased;

                        cmd = cmd_rx.recv() => {
                            match cmd {
                                Some(NetCommand::Send(msg)) => {
                                    if let Ok(text) = serde_json::to_string(&msg) {
                                        if write.send(Message::Text(text.into())).await.is_err() {
                                            break;
                                        }
                                    }
                                }
                                Some(NetCommand::Close) | None => {
                                    let _ = write.close().await;
                                    let _ = event_tx.send(NetEvent::Disconnected);
                                    return;
                                }
                            }
                        }

                        msg = read.next() => {
                            match msg {
                                Some(Ok(Message::Text(txt))) => {
                                    if let Ok(server_msg) = serde_json::from_str::<ServerMsg>(&txt) {
                                        if let ServerMsg::Welcome(w) = &server_msg {
                                            if w.protocol_version != PROTOCOL_VERSION {
                                                let _ = event_tx.send(NetEvent::ProtocolMismatch {
                                                    server: w.protocol_version,
                                                    client: PROTOCOL_VERSION,
                                                });
                                                let _ = write.close().await;
                                                break;
                                            }
                                        }
                                        let _ = event_tx.send(NetEvent::Message(server_msg));
                                    }
                                }
                                Some(Ok(Message::Close(_))) => break,
                                Some(Ok(_)) => {}
                                Some(Err(_)) => break,
                                None => break,
                            }
                        }
                    }
                }

                let _ = event_tx.send(NetEvent::Disconnected);
                if wait_or_close(&mut cmd_rx, reconnect_delay).await {
                    return;
                }
                reconnect_delay = (reconnect_delay.mul_f32(1.5)).min(max_delay);
            }
        });
    });

    cmd_tx
}

/// Sleep out a reconnect delay. Returns true if the client asked to close
/// meanwhile. Moves queued while offline are stale and dropped.
async fn wait_or_close(
    cmd_rx: &mut tokio::sync::mpsc::UnboundedReceiver<NetCommand>,
    delay: Duration,
) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            cmd = cmd_rx.recv() => match cmd {
                Some(NetCommand::Send(_)) => {}
                Some(NetCommand::Close) | None => return true,
            },
        }
    }
}

/// Append the identity token to the websocket endpoint.
pub fn connect_url(base: &str, token: &str) -> Result<String, url::ParseError> {
    let mut url = url::Url::parse(base)?;
    if !token.is_empty() {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_appended_as_query() {
        let url = connect_url("ws://127.0.0.1:3001/ws", "abc.def").unwrap();
        assert_eq!(url, "ws://127.0.0.1:3001/ws?token=abc.def");
    }

    #[test]
    fn empty_token_leaves_url_alone() {
        let url = connect_url("ws://127.0.0.1:3001/ws", "").unwrap();
        assert_eq!(url, "ws://127.0.0.1:3001/ws");
    }

    #[test]
    fn invalid_base_is_an_error() {
        assert!(connect_url("not a url", "t").is_err());
    }

    #[test]
    fn stub_forwards_events_and_commands() {
        let (mut conn, event_tx, mut cmd_rx) = ServerConnection::test_stub();
        event_tx.send(NetEvent::Connected).unwrap();
        assert!(matches!(conn.poll_events().as_slice(), [NetEvent::Connected]));

        conn.send(ClientMsg::LeaveWorld);
        conn.close();
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(NetCommand::Send(ClientMsg::LeaveWorld))
        ));
        assert!(matches!(cmd_rx.try_recv(), Ok(NetCommand::Close)));
    }
}
