use weathernode::clock::ManualClock;
use weathernode::node::{
    TickOutcome, WeatherNode, HEARTBEAT_CUTOFF_MS, MAX_SAMPLES_PER_TX, SAMPLE_INTERVAL_MS,
};
use weathernode::packet::{Frame, SCHEMA_HEARTBEAT, SCHEMA_SAMPLE};
use weathernode::sensors::SensorBank;
use weathernode::transport::MockTransport;
use weathernode::PAYLOAD_LEN;

/// Sensor bank whose readings are the pass number, so each sampling pass is
/// distinguishable in the record.
#[derive(Default)]
struct CountingSensors {
    pass: i16,
}

impl SensorBank for CountingSensors {
    fn battery_mv(&mut self) -> i16 {
        self.pass += 1;
        4000 + self.pass
    }
    fn panel_mv(&mut self) -> i16 {
        5000 + self.pass
    }
    fn irradiance_w_m2(&mut self) -> i16 {
        600 + self.pass
    }
    fn pressure_pa(&mut self) -> i32 {
        100_000 + i32::from(self.pass)
    }
    fn temperature_decic(&mut self) -> i16 {
        200 + self.pass
    }
    fn humidity_centi_pct(&mut self) -> i16 {
        5000 + self.pass
    }
}

fn node_with(clock: &ManualClock) -> WeatherNode<CountingSensors, MockTransport, &ManualClock> {
    WeatherNode::new(
        11,
        CountingSensors::default(),
        MockTransport::new(),
        clock,
    )
}

fn frames(bytes: &[u8]) -> Vec<Frame> {
    assert_eq!(bytes.len() % PAYLOAD_LEN, 0, "partial frame on the wire");
    bytes
        .chunks(PAYLOAD_LEN)
        .map(|chunk| Frame::decode(chunk).expect("undecodable frame"))
        .collect()
}

#[test]
fn three_spaced_samples_accumulate_into_one_record() {
    let clock = ManualClock::new();
    let mut node = node_with(&clock);

    // Boot at uptime 0: nothing is due yet.
    assert_eq!(node.tick().unwrap(), TickOutcome::Idle);

    for _ in 0..3 {
        clock.advance_ms(SAMPLE_INTERVAL_MS);
        assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
    }

    assert_eq!(node.sample_count(), 3);

    // The record holds the third pass only; earlier passes were overwritten.
    let record = *node.record();
    assert_eq!(record.batt_mv, 4003);
    assert_eq!(record.temp_decic, 203);
    assert_eq!(record.uptime_ms, 3 * SAMPLE_INTERVAL_MS as u32);

    let payload = record.encode();
    assert_eq!(payload.len(), PAYLOAD_LEN);
    assert_eq!(payload[0], SCHEMA_SAMPLE);
    assert!(payload[20..].iter().all(|&b| b == 0));
}

#[test]
fn twentieth_sample_arms_transmission_over_sampling() {
    let clock = ManualClock::new();
    let mut node = node_with(&clock);
    clock.set_ms(HEARTBEAT_CUTOFF_MS); // keep heartbeats quiet

    for n in 1..=MAX_SAMPLES_PER_TX - 1 {
        clock.advance_ms(SAMPLE_INTERVAL_MS);
        assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
        assert_eq!(node.sample_count(), n);
    }

    clock.advance_ms(SAMPLE_INTERVAL_MS);
    assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
    assert_eq!(node.sample_count(), MAX_SAMPLES_PER_TX);

    // Another full sample interval passes, but the flush still wins the tick.
    clock.advance_ms(SAMPLE_INTERVAL_MS);
    assert_eq!(node.tick().unwrap(), TickOutcome::Transmitted);
    assert_eq!(node.sample_count(), 0);

    let written = node.transport_mut().take_written();
    match frames(&written).as_slice() {
        [Frame::Sample(sample)] => {
            assert_eq!(sample.node_addr, 11);
            assert_eq!(sample.batt_mv, 4020);
        }
        other => panic!("expected one sample frame, got {other:?}"),
    }

    // And the cycle restarts from an empty buffer.
    assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
    assert_eq!(node.sample_count(), 1);
}

#[test]
fn heartbeats_flow_early_and_stop_at_cutoff() {
    let clock = ManualClock::new();
    let mut node = node_with(&clock);

    // Two ticks per interval: sampling wins the first, heartbeat the second.
    for _ in 0..4 {
        clock.advance_ms(SAMPLE_INTERVAL_MS);
        assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
        assert_eq!(node.tick().unwrap(), TickOutcome::Heartbeat);
    }

    let early = node.transport_mut().take_written();
    let early_frames = frames(&early);
    assert_eq!(early_frames.len(), 4);
    for frame in &early_frames {
        match frame {
            Frame::Heartbeat(hb) => {
                assert_eq!(hb.schema, SCHEMA_HEARTBEAT);
                assert_eq!(hb.node_addr, 11);
            }
            other => panic!("expected heartbeat, got {other:?}"),
        }
    }

    // Jump past the cutoff: heartbeat readiness is gone for good, no matter
    // how stale the last heartbeat is.
    clock.set_ms(HEARTBEAT_CUTOFF_MS + 10 * SAMPLE_INTERVAL_MS);
    assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
    assert_eq!(node.tick().unwrap(), TickOutcome::Idle);
    assert!(node.transport_mut().take_written().is_empty());
}

#[test]
fn command_session_owns_the_loop_until_exit() {
    let clock = ManualClock::new();
    let mut node = node_with(&clock);

    // A sample is due, but operator input takes priority.
    clock.advance_ms(SAMPLE_INTERVAL_MS);
    node.transport_mut().push_input(b"hello\n");
    assert_eq!(node.tick().unwrap(), TickOutcome::CommandSession);
    assert!(node.in_command_session());
    assert_eq!(node.sample_count(), 0);

    // Session persists across ticks while the operator thinks.
    assert_eq!(node.tick().unwrap(), TickOutcome::CommandSession);
    assert_eq!(node.tick().unwrap(), TickOutcome::CommandSession);

    // Recognized verb, then exit.
    node.transport_mut().push_input(b"T\nE\n");
    assert_eq!(node.tick().unwrap(), TickOutcome::CommandSession);
    assert!(!node.in_command_session());

    let echoed = node.transport_mut().take_written();
    let text = String::from_utf8(echoed).unwrap();
    assert!(text.contains("got cmd: T"));
    assert!(text.contains("cmd mode ok"));
    assert!(text.contains("got cmd: E"));

    // Telemetry picks back up on the next tick.
    assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);
    assert_eq!(node.sample_count(), 1);
}

#[test]
fn sentinel_readings_are_transmitted_at_face_value() {
    struct FailingHumidity;

    impl SensorBank for FailingHumidity {
        fn battery_mv(&mut self) -> i16 {
            4000
        }
        fn panel_mv(&mut self) -> i16 {
            5000
        }
        fn irradiance_w_m2(&mut self) -> i16 {
            -1
        }
        fn pressure_pa(&mut self) -> i32 {
            101_000
        }
        fn temperature_decic(&mut self) -> i16 {
            230
        }
        fn humidity_centi_pct(&mut self) -> i16 {
            -1
        }
    }

    let clock = ManualClock::new();
    let mut node = WeatherNode::new(2, FailingHumidity, MockTransport::new(), &clock);
    clock.set_ms(HEARTBEAT_CUTOFF_MS);

    clock.advance_ms(SAMPLE_INTERVAL_MS);
    assert_eq!(node.tick().unwrap(), TickOutcome::Sampled);

    // No validation, no retry, no suppression.
    assert_eq!(node.record().humidity_centi_pct, -1);
    assert_eq!(node.record().irradiance_w_m2, -1);

    let decoded = Frame::decode(&node.record().encode()).unwrap();
    match decoded {
        Frame::Sample(sample) => {
            assert_eq!(sample.humidity_centi_pct, -1);
            assert_eq!(sample.irradiance_w_m2, -1);
        }
        other => panic!("expected sample frame, got {other:?}"),
    }
}
