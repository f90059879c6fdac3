//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use winnow::Bytes;

use crate::error::MqttCodecError;
use crate::level::ProtocolVersion;
use crate::write::WResult;
use crate::write::WriteMqttPacket;
use crate::MResult;

#[doc = crate::util::md_speclink!("_Toc3901200")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MPingresp {
    pub version: ProtocolVersion,
}

impl MPingresp {
    pub fn parse(version: ProtocolVersion, input: &mut &Bytes) -> MResult<Self> {
        if !input.is_empty() {
            return Err(MqttCodecError::MalformedPacket("a PINGRESP has no body"));
        }

        Ok(MPingresp { version })
    }

    pub fn write<W: WriteMqttPacket>(&self, _buffer: &mut W) -> WResult<W> {
        Ok(())
    }
}
