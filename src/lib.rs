//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! A codec for MQTT 3.1.1 and 5.0 control packets
//!
//! Frames are decoded into the owned [`MqttPacket`] tagged union and encoded back
//! into their exact wire representation. Every decode is all-or-nothing: either a
//! fully validated packet is returned or an [`MqttCodecError`] describing the first
//! violation encountered.
//!
//! ```
//! use mqttp::packets::connect::MConnect;
//! use mqttp::{MqttPacket, ProtocolVersion};
//!
//! let connect = MConnect::new(ProtocolVersion::V3_1_1, "dev-01");
//! let mut frame = Vec::new();
//! mqttp::write_packet(&mut frame, &MqttPacket::Connect(connect.clone())).unwrap();
//!
//! let decoded = mqttp::read_packet(&mut frame.as_slice(), ProtocolVersion::V3_1_1).unwrap();
//! assert_eq!(decoded, MqttPacket::Connect(connect));
//! ```

#![deny(missing_debug_implementations)]

pub mod binary;
#[cfg(feature = "codec")]
pub mod codec;
pub mod error;
pub mod fixed_header;
pub mod frame;
pub mod integers;
pub mod level;
pub mod packets;
pub mod properties;
pub mod qos;
pub mod reason_code;
pub mod strings;
pub mod topic;
pub mod variable_header;
pub mod write;

mod util;

pub use error::MqttCodecError;
pub use frame::read_packet;
pub use frame::write_packet;
pub use level::ProtocolVersion;
pub use packets::MqttPacket;

/// The result of parsing any part of an MQTT packet
pub type MResult<O> = core::result::Result<O, MqttCodecError>;
