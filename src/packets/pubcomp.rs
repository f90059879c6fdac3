//
//   This Source Code Form is subject to the terms of the Mozilla Public
//   License, v. 2.0. If a copy of the MPL was not distributed with this
//   file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

crate::packets::define_ack_packet! {
    #[doc = crate::util::md_speclink!("_Toc3901151")]
    MPubcomp => PubComp
}
