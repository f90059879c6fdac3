//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

#![no_main]
use libfuzzer_sys::fuzz_target;
use mqttp::MqttPacket;
use mqttp::ProtocolVersion;

fuzz_target!(|data: &[u8]| {
    for version in [ProtocolVersion::V3_1_1, ProtocolVersion::V5] {
        let Ok(packet) = MqttPacket::parse_complete(version, data) else {
            continue;
        };

        // Anything that decodes has to encode again and decode to the same value
        let mut frame = Vec::new();
        packet.write(&mut frame).unwrap();
        assert_eq!(MqttPacket::parse_complete(packet.version(), &frame).unwrap(), packet);
    }
});
