//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::io::Cursor;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use miette::IntoDiagnostic;
use mqttp::MqttPacket;
use mqttp::ProtocolVersion;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Protocol {
    #[value(name = "3.1.1")]
    V3_1_1,
    #[value(name = "5")]
    V5,
}

impl From<Protocol> for ProtocolVersion {
    fn from(value: Protocol) -> Self {
        match value {
            Protocol::V3_1_1 => ProtocolVersion::V3_1_1,
            Protocol::V5 => ProtocolVersion::V5,
        }
    }
}

/// Decode a stream of raw MQTT frames and print the packets it contains
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The protocol version to assume until a CONNECT says otherwise
    #[arg(long, value_enum, default_value = "5")]
    protocol: Protocol,

    /// Read from this file instead of stdin
    #[arg(value_parser)]
    file: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    let filter_layer = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .init();

    let args = Cli::parse();

    let mut data = Vec::new();
    match &args.file {
        Some(path) => {
            data = std::fs::read(path).into_diagnostic()?;
        }
        None => {
            std::io::stdin().read_to_end(&mut data).into_diagnostic()?;
        }
    }

    let total = data.len() as u64;
    let mut source = Cursor::new(data);
    let mut version = ProtocolVersion::from(args.protocol);

    while source.position() < total {
        let offset = source.position();
        let packet = match mqttp::read_packet(&mut source, version) {
            Ok(packet) => packet,
            Err(error) => {
                let reason = error.reason_code();
                return Err(miette::miette!(
                    "Could not decode the frame at offset {offset}: {error} ({reason:?})"
                ));
            }
        };

        if let MqttPacket::Connect(connect) = &packet {
            tracing::info!(version = %connect.version, "Switching protocol version");
            version = connect.version;
        }

        println!("{packet:#?}");
    }

    tracing::debug!(bytes = total, "Done");

    Ok(())
}
