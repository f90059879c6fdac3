//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
//! A [`tokio_util::codec`] implementation for framing MQTT connections

use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;
use tokio_util::codec::Encoder;

use crate::error::MqttCodecError;
use crate::integers::peek_variable_u32;
use crate::level::ProtocolVersion;
use crate::packets::MqttPacket;

/// Frames a byte stream into [`MqttPacket`]s
///
/// The codec starts out with the configured protocol version. Whenever a CONNECT passes through
/// it, in either direction, the version carried by that CONNECT is used from then on.
#[derive(Debug, Clone)]
pub struct MqttPacketCodec {
    version: ProtocolVersion,
    maximum_packet_size: Option<u32>,
}

impl MqttPacketCodec {
    pub fn new(version: ProtocolVersion) -> Self {
        MqttPacketCodec {
            version,
            maximum_packet_size: None,
        }
    }

    /// Refuse frames larger than `maximum_packet_size` bytes, fixed header included
    pub fn with_maximum_packet_size(mut self, maximum_packet_size: u32) -> Self {
        self.maximum_packet_size = Some(maximum_packet_size);
        self
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    fn check_size(&self, size: usize) -> Result<(), MqttCodecError> {
        match self.maximum_packet_size {
            Some(maximum) if size > maximum as usize => {
                Err(MqttCodecError::PacketTooLarge { size, maximum })
            }
            _ => Ok(()),
        }
    }

    fn adopt_version(&mut self, packet: &MqttPacket) {
        if let MqttPacket::Connect(connect) = packet {
            if connect.version != self.version {
                tracing::debug!(from = %self.version, to = %connect.version, "Switching protocol version");
                self.version = connect.version;
            }
        }
    }
}

impl Decoder for MqttPacketCodec {
    type Item = MqttPacket;

    type Error = MqttCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // 1. Byte: FixedHeader
        // 2-5. Byte: Variable-Size

        if src.len() < 2 {
            src.reserve(2 - src.len());
            return Ok(None);
        }

        let Some((remaining_length, length_size)) = peek_variable_u32(&src[1..])? else {
            return Ok(None);
        };

        let total_packet_length = 1 + length_size + remaining_length as usize;
        self.check_size(total_packet_length)?;

        if src.len() < total_packet_length {
            src.reserve(total_packet_length - src.len());
            return Ok(None);
        }

        let frame = src.split_to(total_packet_length);
        let packet = MqttPacket::parse_complete(self.version, &frame)?;

        tracing::trace!(kind = %packet.kind(), length = total_packet_length, "Decoded packet");

        self.adopt_version(&packet);

        Ok(Some(packet))
    }
}

impl Encoder<MqttPacket> for MqttPacketCodec {
    type Error = MqttCodecError;

    fn encode(&mut self, packet: MqttPacket, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut frame = Vec::new();
        packet.write(&mut frame)?;
        self.check_size(frame.len())?;

        dst.extend_from_slice(&frame);

        self.adopt_version(&packet);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures::SinkExt;
    use futures::StreamExt;
    use tokio_util::bytes::BytesMut;
    use tokio_util::codec::Decoder;
    use tokio_util::codec::Framed;

    use super::MqttPacketCodec;
    use crate::error::MqttCodecError;
    use crate::level::ProtocolVersion;
    use crate::packets::connect::MConnect;
    use crate::packets::pingreq::MPingreq;
    use crate::packets::publish::MPublish;
    use crate::packets::MqttPacket;

    static_assertions::assert_impl_all!(MqttPacketCodec: Send, Sync);
    static_assertions::assert_impl_all!(MqttPacket: Send, Sync);

    #[tokio::test]
    async fn simple_test_codec() {
        let (client, server) = tokio::io::duplex(100);
        let mut framed_client = Framed::new(client, MqttPacketCodec::new(ProtocolVersion::V5));
        let mut framed_server = Framed::new(server, MqttPacketCodec::new(ProtocolVersion::V5));

        let packet = MqttPacket::Pingreq(MPingreq {
            version: ProtocolVersion::V5,
        });

        let send_packet = packet.clone();
        tokio::spawn(async move {
            framed_client.send(send_packet).await.unwrap();
        });

        let recv_packet = framed_server.next().await.unwrap().unwrap();

        assert_eq!(packet, recv_packet);
    }

    #[tokio::test]
    async fn check_version_follows_connect() {
        let (client, server) = tokio::io::duplex(1024);
        let mut framed_client = Framed::new(client, MqttPacketCodec::new(ProtocolVersion::V5));
        let mut framed_server = Framed::new(server, MqttPacketCodec::new(ProtocolVersion::V5));

        let connect = MqttPacket::Connect(MConnect::new(ProtocolVersion::V3_1_1, "dev-01"));
        let publish = MqttPacket::Publish(MPublish::new(ProtocolVersion::V3_1_1, "a/b", "1"));

        framed_client.send(connect.clone()).await.unwrap();
        framed_client.send(publish.clone()).await.unwrap();
        assert_eq!(framed_client.codec().version(), ProtocolVersion::V3_1_1);

        assert_eq!(framed_server.next().await.unwrap().unwrap(), connect);
        assert_eq!(framed_server.codec().version(), ProtocolVersion::V3_1_1);
        assert_eq!(framed_server.next().await.unwrap().unwrap(), publish);
    }

    #[test]
    fn check_partial_frames() {
        let mut codec = MqttPacketCodec::new(ProtocolVersion::V3_1_1);
        let mut src = BytesMut::new();

        src.extend_from_slice(&[0x30]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        src.extend_from_slice(&[0x05, 0x00, 0x01, b't']);
        assert!(codec.decode(&mut src).unwrap().is_none());

        src.extend_from_slice(&[b'h', b'i', 0xC0]);
        let packet = codec.decode(&mut src).unwrap().unwrap();
        assert_eq!(
            packet,
            MqttPacket::Publish(MPublish::new(ProtocolVersion::V3_1_1, "t", "hi"))
        );
        assert_eq!(&src[..], &[0xC0]);
    }

    #[test]
    fn check_overlong_remaining_length() {
        let mut codec = MqttPacketCodec::new(ProtocolVersion::V5);
        let mut src = BytesMut::from(&[0xC0u8, 0x80, 0x00][..]);

        assert!(matches!(
            codec.decode(&mut src),
            Err(MqttCodecError::MalformedPacket(_))
        ));
    }

    #[test]
    fn check_maximum_packet_size() {
        let mut codec =
            MqttPacketCodec::new(ProtocolVersion::V3_1_1).with_maximum_packet_size(16);
        let mut src = BytesMut::from(&[0x30u8, 0x80, 0x01][..]);

        assert!(matches!(
            codec.decode(&mut src),
            Err(MqttCodecError::PacketTooLarge {
                size: 131,
                maximum: 16
            })
        ));
    }
}
