use clap::{App, Arg, SubCommand};
use colored::*;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use weathernode::packet::{Frame, PAYLOAD_LEN};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8070";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("weathernode")
        .version("0.1.0")
        .author("Remote Sensing Systems Team")
        .about("🌦️  Ground-side tools for the weather node radio link")
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("HOST")
                .help("Node simulator host address")
                .takes_value(true)
                .default_value(DEFAULT_HOST)
                .global(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("Node simulator port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table", "compact"])
                .default_value("table")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("listen")
                .about("📻 Stream and decode frames from a running node")
                .long_about(
                    "Connects to the node's radio link and decodes sample and \
                     heartbeat frames as they arrive, resynchronizing past any \
                     diagnostic text on the line",
                ),
        )
        .subcommand(
            SubCommand::with_name("decode")
                .about("🔍 Decode a single hex-encoded payload")
                .arg(
                    Arg::with_name("hex")
                        .help("Payload bytes as hex (whitespace ignored)")
                        .required(true),
                ),
        )
        .get_matches();

    let host = matches.value_of("host").unwrap_or(DEFAULT_HOST);
    let port = matches.value_of("port").unwrap_or(DEFAULT_PORT);
    let format = matches.value_of("format").unwrap_or("table");

    match matches.subcommand() {
        ("decode", Some(sub)) => {
            let bytes = parse_hex(sub.value_of("hex").unwrap_or_default())?;
            let frame = Frame::decode(&bytes)?;
            print_frame(&frame, format);
            Ok(())
        }
        _ => listen(host, port, format).await,
    }
}

async fn listen(host: &str, port: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(format!("{host}:{port}")).await?;
    println!("{}", format!("listening on {host}:{port}").dimmed());

    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            println!("{}", "link closed".red());
            return Ok(());
        }
        pending.extend_from_slice(&buf[..n]);

        while pending.len() >= PAYLOAD_LEN {
            match Frame::decode(&pending[..PAYLOAD_LEN]) {
                Ok(frame) => {
                    print_frame(&frame, format);
                    pending.drain(..PAYLOAD_LEN);
                }
                Err(_) => {
                    // Command-session echo text shares the link with frames;
                    // slide forward until a schema byte lines up again.
                    pending.remove(0);
                }
            }
        }
    }
}

fn print_frame(frame: &Frame, format: &str) {
    match format {
        "json" => {
            if let Ok(json) = serde_json::to_string(frame) {
                println!("{json}");
            }
        }
        "compact" => match frame {
            Frame::Sample(s) => println!(
                "S addr={} up={}ms batt={}mV panel={}mV press={}Pa temp={}dC humid={}c% irr={}W/m2",
                s.node_addr,
                s.uptime_ms,
                s.batt_mv,
                s.panel_mv,
                s.pressure_pa,
                s.temp_decic,
                s.humidity_centi_pct,
                s.irradiance_w_m2
            ),
            Frame::Heartbeat(h) => println!(
                "H addr={} up={}ms batt={}mV",
                h.node_addr, h.uptime_ms, h.batt_mv
            ),
        },
        _ => match frame {
            Frame::Sample(s) => {
                println!("{}", "── sample ─────────────────────".bold());
                println!("  {:<12} {}", "node", s.node_addr.to_string().cyan());
                println!("  {:<12} {} ms", "uptime", s.uptime_ms);
                println!("  {:<12} {} mV", "battery", s.batt_mv);
                println!("  {:<12} {} mV", "panel", s.panel_mv);
                println!("  {:<12} {} Pa", "pressure", s.pressure_pa);
                println!(
                    "  {:<12} {:.1} °C",
                    "temperature",
                    f64::from(s.temp_decic) / 10.0
                );
                println!(
                    "  {:<12} {:.2} %",
                    "humidity",
                    f64::from(s.humidity_centi_pct) / 100.0
                );
                println!("  {:<12} {} W/m²", "irradiance", s.irradiance_w_m2);
            }
            Frame::Heartbeat(h) => {
                println!(
                    "{} node {} battery {} mV uptime {} ms",
                    "♥ heartbeat".green(),
                    h.node_addr.to_string().cyan(),
                    h.batt_mv,
                    h.uptime_ms
                );
            }
        },
    }
}

fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err("odd number of hex digits".to_string());
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| format!("invalid hex byte at offset {i}"))
        })
        .collect()
}
