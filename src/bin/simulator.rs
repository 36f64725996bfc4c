use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use weathernode::clock::WallClock;
use weathernode::node::WeatherNode;
use weathernode::selftest;
use weathernode::sensors::SimulatedSensors;
use weathernode::store::FixedAddressStore;
use weathernode::transport::{Transport, TransportError};

const TCP_PORT: u16 = 8070;
const NODE_ADDR: u8 = 1;
const TICK_PERIOD_MS: u64 = 50;
const FRAME_BROADCAST_BUFFER_SIZE: usize = 256;
// Status snapshot every ~10 s of tick time.
const STATUS_EVERY_TICKS: u64 = 200;

type InputQueue = Arc<Mutex<VecDeque<u8>>>;

/// Transport bridging the node thread to the TCP side: outbound frames fan
/// out to every connected ground station, inbound client bytes feed the
/// command session.
struct RadioBridge {
    frames: broadcast::Sender<Vec<u8>>,
    input: InputQueue,
}

impl Transport for RadioBridge {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        // No connected ground station just means the frame goes unheard,
        // same as a best-effort radio send.
        let _ = self.frames.send(bytes.to_vec());
        Ok(())
    }

    fn data_available(&self) -> bool {
        !self.input.lock().expect("input queue poisoned").is_empty()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.input.lock().expect("input queue poisoned").pop_front()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("📡 Weather Node Simulator");
    println!("=========================");

    let (frames_tx, _) = broadcast::channel(FRAME_BROADCAST_BUFFER_SIZE);
    let input: InputQueue = Arc::new(Mutex::new(VecDeque::new()));

    let bridge = RadioBridge {
        frames: frames_tx.clone(),
        input: Arc::clone(&input),
    };

    // The node is strictly single-threaded; it gets its own OS thread and
    // the TCP side only ever reaches it through the transport bridge.
    std::thread::spawn(move || run_node(bridge));

    let listener = TcpListener::bind(format!("127.0.0.1:{TCP_PORT}")).await?;
    info!("ground station link listening on port {}", TCP_PORT);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("ground station connected: {}", addr);
                let frames_rx = frames_tx.subscribe();
                let client_input = Arc::clone(&input);
                tokio::spawn(async move {
                    handle_client(stream, frames_rx, client_input).await;
                    info!("ground station disconnected: {}", addr);
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}

fn run_node(bridge: RadioBridge) {
    let mut sensors = SimulatedSensors::new();
    let report = selftest::run_post(NODE_ADDR, &mut sensors);
    if !report.is_clean() {
        warn!(flagged = ?report.flagged, "post flagged channels, continuing anyway");
    }

    let mut store = FixedAddressStore::new(NODE_ADDR);
    let mut node = WeatherNode::boot(&mut store, sensors, bridge, WallClock::new());

    let mut ticks: u64 = 0;
    loop {
        if let Err(e) = node.tick() {
            error!("tick failed: {}", e);
        }

        ticks += 1;
        if ticks % STATUS_EVERY_TICKS == 0 {
            if let Ok(json) = serde_json::to_string(&node.snapshot()) {
                info!(status = %json, "node status");
            }
        }

        std::thread::sleep(Duration::from_millis(TICK_PERIOD_MS));
    }
}

async fn handle_client(
    stream: TcpStream,
    mut frames: broadcast::Receiver<Vec<u8>>,
    input: InputQueue,
) {
    let (mut reader, mut writer) = stream.into_split();

    // Stream radio output to the client as raw bytes.
    let writer_task = tokio::spawn(async move {
        while let Ok(frame) = frames.recv().await {
            if writer.write_all(&frame).await.is_err() {
                break;
            }
        }
    });

    // Everything the client types becomes operator input on the node's link.
    let mut buf = [0u8; 64];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                input
                    .lock()
                    .expect("input queue poisoned")
                    .extend(buf[..n].iter().copied());
            }
            Err(e) => {
                warn!("client read error: {}", e);
                break;
            }
        }
    }

    writer_task.abort();
}
