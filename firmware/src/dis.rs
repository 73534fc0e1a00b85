// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device Information Service, read-only strings.

use consts::{MANUFACTURER_NAME, MODEL_NUMBER};
use heapless::Vec;
use nrf_softdevice::ble::gatt_server::SetValueError;
use nrf_softdevice::gatt_service;

pub(crate) const DIS_STRING_MAX: usize = 32;

#[gatt_service(uuid = "180A")]
pub struct DeviceInformationService {
    #[characteristic(uuid = "2A29", read)]
    manufacturer_name: Vec<u8, DIS_STRING_MAX>,

    #[characteristic(uuid = "2A24", read)]
    model_number: Vec<u8, DIS_STRING_MAX>,
}

impl DeviceInformationService {
    /// Writes the constant strings into the attribute table.
    pub(crate) fn init(&self) -> Result<(), SetValueError> {
        // Both strings are shorter than `DIS_STRING_MAX`, checked below.
        let manufacturer = Vec::from_slice(MANUFACTURER_NAME.as_bytes()).unwrap_or_default();
        let model = Vec::from_slice(MODEL_NUMBER.as_bytes()).unwrap_or_default();
        self.manufacturer_name_set(&manufacturer)?;
        self.model_number_set(&model)
    }
}

const _: () = assert!(MANUFACTURER_NAME.len() <= DIS_STRING_MAX && MODEL_NUMBER.len() <= DIS_STRING_MAX);
