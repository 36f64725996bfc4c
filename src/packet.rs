use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

/// Radio payload budget. Every frame goes out as exactly this many bytes,
/// zero-padded past the encoded record, so a receiver can spot an undersized
/// frame by its trailing zeros and no uninitialized memory ever hits the air.
pub const PAYLOAD_LEN: usize = 32;

/// Schema tag for [`SampleRecord`] frames.
pub const SCHEMA_SAMPLE: u8 = 3;
/// Schema tag for [`HeartbeatRecord`] frames.
pub const SCHEMA_HEARTBEAT: u8 = 5;

pub type Payload = [u8; PAYLOAD_LEN];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("frame truncated: need {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },
    #[error("unknown schema tag {0}")]
    UnknownSchema(u8),
    #[error("schema tag {got} does not match expected {expected}")]
    SchemaMismatch { expected: u8, got: u8 },
}

/// One full pass of sensor readings, as framed for the radio.
///
/// Field order and widths are the wire contract: the frame is the fields
/// below, little-endian, in declaration order. Any change here requires a
/// new schema tag or every deployed receiver breaks silently.
///
/// Sensor channels are signed so an out-of-range sentinel (negative) survives
/// the trip to the ground station unaltered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Frame layout tag, always [`SCHEMA_SAMPLE`].
    pub schema: u8,
    pub node_addr: u8,
    /// Milliseconds since boot at the start of the sampling pass.
    pub uptime_ms: u32,
    pub batt_mv: i16,
    pub panel_mv: i16,
    pub pressure_pa: i32,
    pub temp_decic: i16,
    pub humidity_centi_pct: i16,
    pub irradiance_w_m2: i16,
}

/// Low-cost liveness frame, sent on its own timer during the early-uptime
/// window. Distinct schema tag lets a receiver split the two frame kinds on
/// the first byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatRecord {
    /// Frame layout tag, always [`SCHEMA_HEARTBEAT`].
    pub schema: u8,
    pub uptime_ms: u32,
    pub batt_mv: i16,
    pub node_addr: u8,
}

impl SampleRecord {
    /// Encoded size on the wire.
    pub const WIRE_LEN: usize = 20;

    /// Serialize into a zero-padded radio payload.
    pub fn encode(&self) -> Payload {
        let mut buf = [0u8; PAYLOAD_LEN];
        let mut w = FieldWriter::new(&mut buf);
        w.put_u8(self.schema);
        w.put_u8(self.node_addr);
        w.put_u32(self.uptime_ms);
        w.put_i16(self.batt_mv);
        w.put_i16(self.panel_mv);
        w.put_i32(self.pressure_pa);
        w.put_i16(self.temp_decic);
        w.put_i16(self.humidity_centi_pct);
        w.put_i16(self.irradiance_w_m2);
        debug_assert_eq!(w.position(), Self::WIRE_LEN);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated {
                need: Self::WIRE_LEN,
                got: bytes.len(),
            });
        }
        let mut r = FieldReader::new(bytes);
        let schema = r.take_u8();
        if schema != SCHEMA_SAMPLE {
            return Err(CodecError::SchemaMismatch {
                expected: SCHEMA_SAMPLE,
                got: schema,
            });
        }
        Ok(Self {
            schema,
            node_addr: r.take_u8(),
            uptime_ms: r.take_u32(),
            batt_mv: r.take_i16(),
            panel_mv: r.take_i16(),
            pressure_pa: r.take_i32(),
            temp_decic: r.take_i16(),
            humidity_centi_pct: r.take_i16(),
            irradiance_w_m2: r.take_i16(),
        })
    }
}

impl HeartbeatRecord {
    /// Encoded size on the wire.
    pub const WIRE_LEN: usize = 8;

    /// Serialize into a zero-padded radio payload.
    pub fn encode(&self) -> Payload {
        let mut buf = [0u8; PAYLOAD_LEN];
        let mut w = FieldWriter::new(&mut buf);
        w.put_u8(self.schema);
        w.put_u32(self.uptime_ms);
        w.put_i16(self.batt_mv);
        w.put_u8(self.node_addr);
        debug_assert_eq!(w.position(), Self::WIRE_LEN);
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::WIRE_LEN {
            return Err(CodecError::Truncated {
                need: Self::WIRE_LEN,
                got: bytes.len(),
            });
        }
        let mut r = FieldReader::new(bytes);
        let schema = r.take_u8();
        if schema != SCHEMA_HEARTBEAT {
            return Err(CodecError::SchemaMismatch {
                expected: SCHEMA_HEARTBEAT,
                got: schema,
            });
        }
        Ok(Self {
            schema,
            uptime_ms: r.take_u32(),
            batt_mv: r.take_i16(),
            node_addr: r.take_u8(),
        })
    }
}

// A record that outgrows the payload is a schema bug, not a runtime error.
const_assert!(SampleRecord::WIRE_LEN <= PAYLOAD_LEN);
const_assert!(HeartbeatRecord::WIRE_LEN <= PAYLOAD_LEN);

/// Receiver-side frame dispatch, keyed on the schema byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Sample(SampleRecord),
    Heartbeat(HeartbeatRecord),
}

impl Frame {
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        match bytes.first() {
            Some(&SCHEMA_SAMPLE) => SampleRecord::decode(bytes).map(Frame::Sample),
            Some(&SCHEMA_HEARTBEAT) => HeartbeatRecord::decode(bytes).map(Frame::Heartbeat),
            Some(&other) => Err(CodecError::UnknownSchema(other)),
            None => Err(CodecError::Truncated { need: 1, got: 0 }),
        }
    }
}

struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    fn put_u8(&mut self, v: u8) {
        self.put(&[v]);
    }

    fn put_u32(&mut self, v: u32) {
        self.put(&v.to_le_bytes());
    }

    fn put_i16(&mut self, v: i16) {
        self.put(&v.to_le_bytes());
    }

    fn put_i32(&mut self, v: i32) {
        self.put(&v.to_le_bytes());
    }
}

struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn take_u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn take_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn take_i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    fn take_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }
}
