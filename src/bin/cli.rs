//! SBDP CLI Client
//!
//! Sends one message built from `key=type:value` arguments and prints
//! the reply.
//!
//! Type prefixes: `i` int64, `u` uint64, `f` float64, `s` string,
//! `b` binary (hex).

use std::time::Duration;

use clap::Parser;
use sbdp::{Message, Socket, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// SBDP CLI
#[derive(Parser, Debug)]
#[command(name = "sbdp-cli")]
#[command(about = "Send a dictionary message to an SBDP server")]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "9000")]
    port: u16,

    /// Reply timeout in milliseconds (0 = wait forever)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Entries as key=type:value, e.g. id=i:42 name=s:alice
    #[arg(required = true)]
    entries: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let mut request = Message::new();
    for raw in &args.entries {
        match parse_entry(raw) {
            Ok((key, value)) => {
                request.insert(key, value);
            }
            Err(e) => {
                eprintln!("invalid entry {:?}: {}", raw, e);
                std::process::exit(2);
            }
        }
    }

    if let Err(e) = exchange(&args, &request) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn exchange(args: &Args, request: &Message) -> sbdp::Result<()> {
    let mut socket = Socket::create();
    socket.connect(&args.host, args.port)?;

    socket.send_message(request)?;
    let reply = socket.recv_message(Duration::from_millis(args.timeout_ms))?;

    for (key, value) in &reply {
        println!("{} = {}", key, value);
    }

    socket.close();
    Ok(())
}

fn parse_entry(raw: &str) -> Result<(String, Value), String> {
    let (key, typed) = raw.split_once('=').ok_or("expected key=type:value")?;
    let (kind, text) = typed.split_once(':').ok_or("expected type:value after '='")?;

    let value = match kind {
        "i" => Value::Int64(text.parse().map_err(|e| format!("int64: {}", e))?),
        "u" => Value::UInt64(text.parse().map_err(|e| format!("uint64: {}", e))?),
        "f" => Value::Float64(text.parse().map_err(|e| format!("float64: {}", e))?),
        "s" => Value::String(text.to_string()),
        "b" => Value::Binary(parse_hex(text)?),
        other => return Err(format!("unknown type {:?} (use i, u, f, s or b)", other)),
    };

    Ok((key.to_string(), value))
}

fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    if text.len() % 2 != 0 {
        return Err("hex needs an even number of digits".to_string());
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("bad hex at offset {}", i))
        })
        .collect()
}
