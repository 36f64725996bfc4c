/// One read operation per physical quantity on the board.
///
/// Reads may take bounded hardware time and return either a measurement or an
/// out-of-range sentinel (negative on the signed channels). Sentinels are
/// recorded and transmitted as-is; range checking is advisory and lives in
/// [`crate::selftest`].
///
/// The deployed hardware generations differ only in which chips sit behind
/// these calls, so one node implementation covers every board variant.
pub trait SensorBank {
    fn battery_mv(&mut self) -> i16;
    fn panel_mv(&mut self) -> i16;
    fn irradiance_w_m2(&mut self) -> i16;
    fn pressure_pa(&mut self) -> i32;
    fn temperature_decic(&mut self) -> i16;
    fn humidity_centi_pct(&mut self) -> i16;
}

const NOMINAL_BATT_MV: f32 = 4000.0;
const NOMINAL_PANEL_MV: f32 = 5600.0;
const NOMINAL_PRESSURE_PA: f32 = 101_300.0;
const NOMINAL_TEMP_DECIC: f32 = 235.0;
const NOMINAL_HUMIDITY_CENTI_PCT: f32 = 6200.0;
const NOMINAL_IRRADIANCE_W_M2: f32 = 650.0;

/// Smoothly varying plausible readings for bench runs and the simulator.
#[derive(Debug, Default)]
pub struct SimulatedSensors {
    passes: u32,
}

impl SimulatedSensors {
    pub fn new() -> Self {
        Self::default()
    }

    fn drift(&self, scale: f32, rate: f32) -> f32 {
        (self.passes as f32 * rate).sin() * scale
    }
}

impl SensorBank for SimulatedSensors {
    fn battery_mv(&mut self) -> i16 {
        // Battery read leads each pass; use it to advance the simulation.
        self.passes = self.passes.wrapping_add(1);
        (NOMINAL_BATT_MV + self.drift(150.0, 0.05)) as i16
    }

    fn panel_mv(&mut self) -> i16 {
        (NOMINAL_PANEL_MV + self.drift(400.0, 0.11)) as i16
    }

    fn irradiance_w_m2(&mut self) -> i16 {
        (NOMINAL_IRRADIANCE_W_M2 + self.drift(200.0, 0.07)).max(0.0) as i16
    }

    fn pressure_pa(&mut self) -> i32 {
        (NOMINAL_PRESSURE_PA + self.drift(300.0, 0.03)) as i32
    }

    fn temperature_decic(&mut self) -> i16 {
        (NOMINAL_TEMP_DECIC + self.drift(30.0, 0.04)) as i16
    }

    fn humidity_centi_pct(&mut self) -> i16 {
        (NOMINAL_HUMIDITY_CENTI_PCT + self.drift(900.0, 0.06)).clamp(0.0, 10_000.0) as i16
    }
}

/// All-zero readings, matching the firmware's sensor-stub build for boards
/// under assembly. Also a convenient fixture base for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubSensors;

impl SensorBank for StubSensors {
    fn battery_mv(&mut self) -> i16 {
        0
    }

    fn panel_mv(&mut self) -> i16 {
        0
    }

    fn irradiance_w_m2(&mut self) -> i16 {
        0
    }

    fn pressure_pa(&mut self) -> i32 {
        0
    }

    fn temperature_decic(&mut self) -> i16 {
        0
    }

    fn humidity_centi_pct(&mut self) -> i16 {
        0
    }
}
