//! Load test for the blockverse relay.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Connect with a freshly signed token
//! - Join a shared world
//! - Wander around, sending player-move at 5 Hz
//! - Count the player-moved fan-out they receive
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of clients to spawn (default: 100)
//!   --duration S     Test duration in seconds (default: 30)
//!   --world ID       World to join (default: neon)
//!   --url URL        Server URL (default: ws://127.0.0.1:3001/ws)
//!
//! Tokens are signed with AUTH_SECRET, or the development secret when unset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use blockverse_server::auth::JwtVerifier;
use blockverse_server::config::DEV_AUTH_SECRET;
use blockverse_shared::config::{DEFAULT_SPAWN_POSITION, MOVE_SEND_RATE_HZ};
use blockverse_shared::protocol::{ClientMsg, JoinWorldMsg, PlayerMoveMsg, ServerMsg};
use blockverse_shared::vec3::{Rotation, Vec3};
use futures_util::{SinkExt, StreamExt};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Wander step per move, in world units
const WANDER_STEP: f64 = 0.8;

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    moves_received: AtomicU64,
    moves_sent: AtomicU64,
    joins_seen: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    world: String,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let join = ClientMsg::JoinWorld(JoinWorldMsg {
        world_id: world.clone(),
        display_name: format!("bot-{client_id}"),
    });
    if send_json(&mut ws, &join).await.is_err() {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let mut move_timer = tokio::time::interval(Duration::from_secs_f64(1.0 / MOVE_SEND_RATE_HZ));
    move_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut rng = ChaCha8Rng::seed_from_u64(client_id as u64);
    let mut position = DEFAULT_SPAWN_POSITION;
    let mut yaw: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let test_end = Instant::now() + duration;

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = move_timer.tick() => {
                yaw += rng.gen_range(-0.4..0.4);
                position = Vec3::new(
                    position.x + yaw.sin() * WANDER_STEP,
                    position.y,
                    position.z + yaw.cos() * WANDER_STEP,
                );
                let msg = ClientMsg::PlayerMove(PlayerMoveMsg {
                    position,
                    rotation: Rotation::new(0.0, yaw),
                    world_id: Some(world.clone()),
                });
                if send_json(&mut ws, &msg).await.is_ok() {
                    metrics.moves_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::PlayerMoved(_)) => {
                                metrics.moves_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::PlayerJoined(_)) => {
                                metrics.joins_seen.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(_) => {}
                            Err(_) => {
                                metrics.errors.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

async fn send_json<S>(ws: &mut S, msg: &ClientMsg) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    ws.send(Message::Text(json.into())).await.map_err(|_| ())
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 100;
    let mut duration_secs: u64 = 30;
    let mut world = "neon".to_string();
    let mut url = "ws://127.0.0.1:3001/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--world" => {
                i += 1;
                world = args.get(i).cloned().unwrap_or(world);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    let secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| DEV_AUTH_SECRET.to_string());
    let signer = JwtVerifier::new(secret.as_bytes());
    let token_ttl = Duration::from_secs(duration_secs + 60);

    println!("=== Blockverse Relay Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    println!("World: {}", world);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);

    println!("Spawning {} clients...", num_clients);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let token = match signer.issue(&format!("loadtest-{client_id}"), "", token_ttl) {
            Ok(token) => token,
            Err(e) => {
                eprintln!("Failed to sign token for client {}: {}", client_id, e);
                return;
            }
        };
        let client_url = format!("{url}?token={token}");
        let world = world.clone();
        let metrics = Arc::clone(&metrics);

        handles.push(tokio::spawn(async move {
            run_client(client_id, client_url, world, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            if elapsed >= duration_secs + 5 {
                break;
            }

            println!(
                "[{:3}s] connected={}, msgs={}, moves_sent={}, moves_received={}, errors={}",
                elapsed,
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.moves_sent.load(Ordering::Relaxed),
                metrics_clone.moves_received.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let sent = metrics.moves_sent.load(Ordering::Relaxed);
    let received = metrics.moves_received.load(Ordering::Relaxed);
    let joins = metrics.joins_seen.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total player-move sent: {}", sent);
    println!("Total player-moved received: {}", received);
    println!("Total player-joined seen: {}", joins);
    println!("Total errors: {}", errors);

    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    // Every move fans out to every other member of the room
    let expected = sent * (num_clients.saturating_sub(1) as u64);
    if expected > 0 {
        println!(
            "Fan-out delivery rate: {:.1}%",
            received as f64 / expected as f64 * 100.0
        );
    }
}
