// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Battery Service ([BAS]).
//! [BAS]: https://www.bluetooth.com/specifications/specs/battery-service/

use defmt::info;
use nrf_softdevice::gatt_service;

#[gatt_service(uuid = "180F")]
pub struct BatteryService {
    #[characteristic(uuid = "2A19", read, notify)]
    battery_level: u8,
}

impl BatteryService {
    pub(crate) fn handle(&self, event: BatteryServiceEvent) {
        match event {
            BatteryServiceEvent::BatteryLevelCccdWrite { notifications } => {
                info!("BAS notifications {}", if notifications { "enabled" } else { "disabled" });
            }
        }
    }
}
