// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Heart Rate Service ([HRS]).
//! [HRS]: https://www.bluetooth.com/specifications/specs/heart-rate-service-1-0/

use defmt::info;
use nrf_softdevice::gatt_service;

/// Body Sensor Location: chest.
pub(crate) const BODY_SENSOR_LOCATION_CHEST: u8 = 0x01;

#[gatt_service(uuid = "180D")]
pub struct HeartRateService {
    #[characteristic(uuid = "2A37", notify)]
    heart_rate_measurement: [u8; 2],

    #[characteristic(uuid = "2A38", read)]
    body_sensor_location: u8,
}

impl HeartRateService {
    pub(crate) fn handle(&self, event: HeartRateServiceEvent) {
        match event {
            HeartRateServiceEvent::HeartRateMeasurementCccdWrite { notifications } => {
                info!("HRS notifications {}", if notifications { "enabled" } else { "disabled" });
            }
        }
    }
}
