use crate::sensors::SensorBank;
use heapless::Vec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const MAX_FINDINGS: usize = 8;

/// Plausibility floors used by the power-on self-test. Readings below these
/// are flagged; they are never corrected or suppressed.
const MIN_PRESSURE_PA: i32 = 80_000;
const MIN_PANEL_MV: i16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Battery,
    Panel,
    Irradiance,
    Pressure,
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostReport {
    pub node_addr: u8,
    pub flagged: Vec<Channel, MAX_FINDINGS>,
}

impl PostReport {
    pub fn is_clean(&self) -> bool {
        self.flagged.is_empty()
    }
}

/// Power-on self-test: read every channel once and flag implausible values.
///
/// Purely advisory. A flagged channel still gets sampled and transmitted at
/// face value during normal operation; this exists so a technician watching
/// the serial line at install time can spot a dead sensor.
pub fn run_post<S: SensorBank>(node_addr: u8, sensors: &mut S) -> PostReport {
    let mut report = PostReport {
        node_addr,
        ..PostReport::default()
    };

    info!(node_addr, "post begin");

    let batt_mv = sensors.battery_mv();
    info!(batt_mv, "post: battery");
    if batt_mv < 0 {
        flag(&mut report, Channel::Battery);
    }

    let panel_mv = sensors.panel_mv();
    info!(panel_mv, "post: panel");
    if panel_mv < MIN_PANEL_MV {
        flag(&mut report, Channel::Panel);
    }

    let irradiance_w_m2 = sensors.irradiance_w_m2();
    info!(irradiance_w_m2, "post: irradiance");
    if irradiance_w_m2 < 0 {
        flag(&mut report, Channel::Irradiance);
    }

    let pressure_pa = sensors.pressure_pa();
    info!(pressure_pa, "post: pressure");
    if pressure_pa < MIN_PRESSURE_PA {
        flag(&mut report, Channel::Pressure);
    }

    let temp_decic = sensors.temperature_decic();
    info!(temp_decic, "post: temperature");
    if temp_decic < 0 {
        flag(&mut report, Channel::Temperature);
    }

    let humidity_centi_pct = sensors.humidity_centi_pct();
    info!(humidity_centi_pct, "post: humidity");
    if humidity_centi_pct < 0 {
        flag(&mut report, Channel::Humidity);
    }

    info!(flagged = report.flagged.len(), "post end");
    report
}

fn flag(report: &mut PostReport, channel: Channel) {
    warn!(?channel, "post: reading out of range");
    // Capacity equals the channel count, so this cannot overflow.
    let _ = report.flagged.push(channel);
}
