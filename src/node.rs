use crate::clock::Clock;
use crate::packet::{HeartbeatRecord, SampleRecord, SCHEMA_HEARTBEAT, SCHEMA_SAMPLE};
use crate::sensors::SensorBank;
use crate::shell::{CommandShell, SessionEvent};
use crate::store::NodeAddressStore;
use crate::transport::{Transport, TransportError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Samples buffered before a transmission is due. There is only ever one
/// buffered record, so reaching the threshold means "time to flush".
pub const MAX_SAMPLES_PER_TX: u32 = 20;
pub const SAMPLE_INTERVAL_MS: u64 = 3000;
pub const HEARTBEAT_INTERVAL_MS: u64 = 3000;
/// Heartbeats only run for a window after boot. The window is 1000*69*5 ms
/// (just under six minutes) exactly as deployed in the field; receivers are
/// tuned to it, so do not round it to five minutes.
pub const HEARTBEAT_CUTOFF_MS: u64 = 1000 * 69 * 5;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Which activity body ran during a tick. At most one fires per tick; that
/// mutual exclusion is the entire concurrency discipline of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Idle,
    CommandSession,
    Transmitted,
    Sampled,
    Heartbeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    CommandSession,
}

/// Point-in-time view of the node state, for status output and logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub node_addr: u8,
    pub sample_count: u32,
    pub in_command_session: bool,
    pub record: SampleRecord,
}

/// The weather node: all mutable state plus the cooperative scheduling loop.
///
/// One [`tick`](Self::tick) is a full readiness sweep in fixed priority
/// order: command session, transmit, sample, heartbeat. Everything runs on
/// one control flow; "suspending" an activity just means its predicate is
/// false for the tick.
///
/// The three deployed board generations differ only in their sensor chips,
/// which is why the node is generic over [`SensorBank`] rather than existing
/// in per-board copies.
pub struct WeatherNode<S, T, C> {
    node_addr: u8,
    sensors: S,
    transport: T,
    clock: C,
    shell: CommandShell,
    mode: Mode,
    record: SampleRecord,
    sample_count: u32,
    prev_sample_ms: u64,
    prev_heartbeat_ms: u64,
}

impl<S, T, C> WeatherNode<S, T, C>
where
    S: SensorBank,
    T: Transport,
    C: Clock,
{
    pub fn new(node_addr: u8, sensors: S, transport: T, clock: C) -> Self {
        Self {
            node_addr,
            sensors,
            transport,
            clock,
            shell: CommandShell::new(),
            mode: Mode::Idle,
            record: SampleRecord::default(),
            sample_count: 0,
            prev_sample_ms: 0,
            prev_heartbeat_ms: 0,
        }
    }

    /// Boot path: read the provisioned node address once, then construct.
    pub fn boot<A: NodeAddressStore>(store: &mut A, sensors: S, transport: T, clock: C) -> Self {
        let node_addr = store.read_node_addr();
        info!(node_addr, "node boot");
        Self::new(node_addr, sensors, transport, clock)
    }

    /// One pass of the scheduling loop.
    ///
    /// While a command session is open the node stays in session mode across
    /// ticks, draining operator input and running no telemetry activity, until
    /// the shell sees the exit verb.
    pub fn tick(&mut self) -> Result<TickOutcome, NodeError> {
        if self.mode == Mode::CommandSession {
            self.pump_session()?;
            return Ok(TickOutcome::CommandSession);
        }

        if self.transport.data_available() {
            info!("command session open, telemetry suspended");
            self.mode = Mode::CommandSession;
            self.pump_session()?;
            return Ok(TickOutcome::CommandSession);
        }

        if self.ready_tx() {
            self.transmit()?;
            return Ok(TickOutcome::Transmitted);
        }

        if self.ready_sample() {
            self.sample();
            return Ok(TickOutcome::Sampled);
        }

        if self.ready_heartbeat() {
            self.heartbeat()?;
            return Ok(TickOutcome::Heartbeat);
        }

        Ok(TickOutcome::Idle)
    }

    fn pump_session(&mut self) -> Result<(), NodeError> {
        while let Some(byte) = self.transport.read_byte() {
            if self.shell.feed(byte, &mut self.transport)? == SessionEvent::Exit {
                info!("command session closed, telemetry resumed");
                self.mode = Mode::Idle;
                break;
            }
        }
        Ok(())
    }

    fn ready_tx(&self) -> bool {
        self.sample_count >= MAX_SAMPLES_PER_TX
    }

    fn transmit(&mut self) -> Result<(), NodeError> {
        let payload = self.record.encode();
        self.transport.write(&payload)?;
        self.sample_count = 0;
        info!(uptime_ms = self.record.uptime_ms, "sample frame sent");
        Ok(())
    }

    /// Timestamp-latching predicate: the sample clock restarts at the moment
    /// readiness is observed, before the sensor reads, so slow reads do not
    /// accumulate drift across passes.
    fn ready_sample(&mut self) -> bool {
        let now = self.clock.now_ms();
        if now.saturating_sub(self.prev_sample_ms) >= SAMPLE_INTERVAL_MS {
            self.prev_sample_ms = now;
            true
        } else {
            false
        }
    }

    fn sample(&mut self) {
        let record = &mut self.record;
        record.schema = SCHEMA_SAMPLE;
        record.node_addr = self.node_addr;
        record.uptime_ms = self.clock.now_ms() as u32;
        record.batt_mv = self.sensors.battery_mv();
        record.panel_mv = self.sensors.panel_mv();
        record.pressure_pa = self.sensors.pressure_pa();
        record.temp_decic = self.sensors.temperature_decic();
        record.humidity_centi_pct = self.sensors.humidity_centi_pct();
        record.irradiance_w_m2 = self.sensors.irradiance_w_m2();

        self.sample_count += 1;
        // Transmit outranks sampling, so the count can never pass the
        // threshold.
        debug_assert!(self.sample_count <= MAX_SAMPLES_PER_TX);
        debug!(count = self.sample_count, "sample pass");
    }

    fn ready_heartbeat(&mut self) -> bool {
        let now = self.clock.now_ms();
        if now >= HEARTBEAT_CUTOFF_MS {
            return false;
        }
        if now.saturating_sub(self.prev_heartbeat_ms) >= HEARTBEAT_INTERVAL_MS {
            self.prev_heartbeat_ms = now;
            true
        } else {
            false
        }
    }

    fn heartbeat(&mut self) -> Result<(), NodeError> {
        let record = HeartbeatRecord {
            schema: SCHEMA_HEARTBEAT,
            uptime_ms: self.clock.now_ms() as u32,
            batt_mv: self.sensors.battery_mv(),
            node_addr: self.node_addr,
        };
        self.transport.write(&record.encode())?;
        debug!(uptime_ms = record.uptime_ms, "heartbeat sent");
        Ok(())
    }

    pub fn node_addr(&self) -> u8 {
        self.node_addr
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn record(&self) -> &SampleRecord {
        &self.record
    }

    pub fn in_command_session(&self) -> bool {
        self.mode == Mode::CommandSession
    }

    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            node_addr: self.node_addr,
            sample_count: self.sample_count,
            in_command_session: self.in_command_session(),
            record: self.record,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn sensors_mut(&mut self) -> &mut S {
        &mut self.sensors
    }
}
