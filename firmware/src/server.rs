// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::bas::*;
use crate::dis::*;
use crate::hrs::*;
use consts::{ATT_MTU, DEVICE_NAME};
use core::mem;
use defmt::{error, info};
use nrf_softdevice::ble::gatt_server::SetValueError;
use nrf_softdevice::gatt_server;
use nrf_softdevice::{raw, Softdevice};

#[gatt_server]
pub struct Server {
    hrs: HeartRateService,
    bas: BatteryService,
    dis: DeviceInformationService,
}

pub fn initialize_sd() -> &'static mut Softdevice {
    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: ATT_MTU as u16 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        // The SoftDevice drives a single advertising set.
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: raw::BLE_GAP_ADV_SET_COUNT_MAX as u8,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(raw::BLE_GATTS_VLOC_STACK as u8),
        }),
        conn_gatts: Some(raw::ble_gatts_conn_cfg_t { hvn_tx_queue_size: 3 }),

        ..Default::default()
    };

    Softdevice::enable(&config)
}

impl Server {
    /// Sets the initial values of the read-only characteristics.
    pub fn init_values(&self) -> Result<(), SetValueError> {
        self.hrs.body_sensor_location_set(&BODY_SENSOR_LOCATION_CHEST)?;
        self.dis.init()?;
        info!("GATT services ready");
        Ok(())
    }

    pub fn handle_event(&self, event: ServerEvent) {
        #[allow(unreachable_patterns)]
        match event {
            ServerEvent::Hrs(e) => self.hrs.handle(e),
            ServerEvent::Bas(e) => self.bas.handle(e),
            _ => error!("Unexpected GATT event"),
        }
    }

    pub fn hrs(&self) -> &HeartRateService {
        &self.hrs
    }

    pub fn bas(&self) -> &BatteryService {
        &self.bas
    }
}
