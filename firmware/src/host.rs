// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! `hr-coded` host traits on top of the SoftDevice.
//!
//! Advertising sets are kept here as parameters plus encoded data. Starting a set hands it
//! to the advertiser task matching its connectability, since advertising in the SoftDevice
//! is an async operation that lasts until a central connects or the set times out.
//!
//! The SoftDevice runs a single advertising set, which the connectable set holds. Sets that
//! cannot be started are reported once, when their data is attached. Non-connectable sets
//! are only advertised with the `broadcast-adv` feature.

use crate::server::Server;
use consts::ADV_TARGET_TOTAL_LEN;
use defmt::{debug, info, warn};
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;
use hr_coded::ad::{encode, encoded_len, AdStructure};
use hr_coded::advertising::{check_data_len, AdvParams, AdvSet};
use hr_coded::host::{AddressKind, BleHost, ConnInfo, GattServices, PeerAddress};
use hr_coded::hrs::encode_measurement;
use hr_coded::phy::Phy;
use hr_coded::StackError;
use nrf_softdevice::ble::gatt_server::{NotifyValueError, SetValueError};
use nrf_softdevice::ble::{AddressType, Connection};
use nrf_softdevice::{raw, RawError, Softdevice};

/// Largest extended advertising data the SoftDevice accepts for one set.
pub const EXTENDED_ADV_DATA_MAX: usize = raw::BLE_GAP_ADV_SET_DATA_SIZE_EXTENDED_MAX_SUPPORTED as usize;

/// Advertising sets the application may create.
const MAX_ADV_SETS: usize = 2;

/// Data of a started set, copied out for the advertiser task.
pub type AdvData = Vec<u8, EXTENDED_ADV_DATA_MAX>;

/// Wakes the connectable advertiser with the set to run.
pub static CONNECTABLE_START: Signal<ThreadModeRawMutex, AdvSet> = Signal::new();
/// Wakes the non-connectable advertiser with the set to run.
#[cfg(feature = "broadcast-adv")]
pub static BROADCAST_START: Signal<ThreadModeRawMutex, AdvSet> = Signal::new();

const fn nrf_error(code: u32) -> StackError {
    StackError(code as i32)
}

fn raw_error(err: RawError) -> StackError {
    StackError(err as i32)
}

fn set_value_error(err: SetValueError) -> StackError {
    match err {
        SetValueError::Truncated => nrf_error(raw::NRF_ERROR_DATA_SIZE),
        SetValueError::Raw(err) => raw_error(err),
    }
}

fn notify_error(err: NotifyValueError) -> StackError {
    match err {
        NotifyValueError::Disconnected => nrf_error(raw::NRF_ERROR_INVALID_STATE),
        NotifyValueError::Raw(err) => raw_error(err),
    }
}

struct Slot {
    params: AdvParams,
    data: Vec<u8, ADV_TARGET_TOTAL_LEN>,
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    info!("SD is running");
    sd.run().await
}

pub struct SoftdeviceHost {
    spawner: Spawner,
    sd: &'static Softdevice,
    server: &'static Server,
    slots: Vec<Slot, MAX_ADV_SETS>,
    connection: Option<Connection>,
}

impl SoftdeviceHost {
    pub fn new(spawner: Spawner, sd: &'static Softdevice, server: &'static Server) -> Self {
        Self {
            spawner,
            sd,
            server,
            slots: Vec::new(),
            connection: None,
        }
    }

    /// Parameters and data of a created set.
    pub fn advertisement(&self, set: AdvSet) -> Option<(AdvParams, AdvData)> {
        let slot = self.slots.get(set.0 as usize)?;
        let data = Vec::from_slice(&slot.data).ok()?;
        Some((slot.params, data))
    }

    /// Tracks the connection the GATT services notify on.
    pub fn set_connection(&mut self, connection: Option<Connection>) {
        self.connection = connection;
    }
}

impl BleHost for SoftdeviceHost {
    type Conn = Connection;

    fn enable(&mut self) -> Result<(), StackError> {
        self.spawner
            .spawn(softdevice_task(self.sd))
            .map_err(|_| nrf_error(raw::NRF_ERROR_BUSY))
    }

    fn create_adv_set(&mut self, params: &AdvParams) -> Result<AdvSet, StackError> {
        let set = AdvSet(self.slots.len() as u8);
        self.slots
            .push(Slot {
                params: *params,
                data: Vec::new(),
            })
            .map_err(|_| nrf_error(raw::NRF_ERROR_NO_MEM))?;
        Ok(set)
    }

    fn set_adv_data(&mut self, set: AdvSet, ad: &[AdStructure<'_>]) -> Result<(), StackError> {
        let slot = self
            .slots
            .get_mut(set.0 as usize)
            .ok_or(nrf_error(raw::NRF_ERROR_INVALID_PARAM))?;
        slot.data
            .resize_default(encoded_len(ad))
            .map_err(|_| nrf_error(raw::NRF_ERROR_INVALID_LENGTH))?;
        encode(ad, &mut slot.data).map_err(|_| nrf_error(raw::NRF_ERROR_INVALID_LENGTH))?;
        debug!("Adv set {} data: {} bytes", set, slot.data.len());

        if let Err(err) = check_data_len(slot.data.len(), EXTENDED_ADV_DATA_MAX) {
            warn!("Adv set {} will not start on this SoftDevice: {}", set, err);
        } else if !cfg!(feature = "broadcast-adv") && !slot.params.is_connectable() {
            warn!("Adv set {} will not start: non-connectable advertising is disabled", set);
        }
        Ok(())
    }

    fn start_adv_set(&mut self, set: AdvSet) -> Result<(), StackError> {
        let slot = self
            .slots
            .get(set.0 as usize)
            .ok_or(nrf_error(raw::NRF_ERROR_INVALID_PARAM))?;
        // Same check the SoftDevice applies when the set is configured.
        check_data_len(slot.data.len(), EXTENDED_ADV_DATA_MAX)
            .map_err(|_| nrf_error(raw::NRF_ERROR_INVALID_LENGTH))?;
        if slot.params.is_connectable() {
            CONNECTABLE_START.signal(set);
            return Ok(());
        }

        #[cfg(feature = "broadcast-adv")]
        BROADCAST_START.signal(set);
        #[cfg(feature = "broadcast-adv")]
        return Ok(());
        #[cfg(not(feature = "broadcast-adv"))]
        return Err(nrf_error(raw::NRF_ERROR_NOT_SUPPORTED));
    }

    fn conn_info(&self, conn: &Connection) -> Result<ConnInfo, StackError> {
        if conn.handle().is_none() {
            return Err(nrf_error(raw::NRF_ERROR_INVALID_STATE));
        }
        let address = conn.peer_address();
        let kind = match address.address_type() {
            AddressType::Public => AddressKind::Public,
            _ => AddressKind::Random,
        };
        // The link is established on the PHY of the connectable advertisement.
        Ok(ConnInfo {
            peer: PeerAddress {
                kind,
                bytes: address.bytes(),
            },
            tx_phy: Phy::Coded,
            rx_phy: Phy::Coded,
        })
    }
}

impl GattServices for SoftdeviceHost {
    fn notify_heart_rate(&mut self, bpm: u8) -> Result<(), StackError> {
        let conn = self
            .connection
            .as_ref()
            .ok_or(nrf_error(raw::NRF_ERROR_INVALID_STATE))?;
        self.server
            .hrs()
            .heart_rate_measurement_notify(conn, &encode_measurement(bpm))
            .map_err(notify_error)
    }

    fn set_battery_level(&mut self, level: u8) -> Result<(), StackError> {
        self.server.bas().battery_level_set(&level).map_err(set_value_error)?;
        let Some(conn) = self.connection.as_ref() else {
            return Ok(());
        };
        match self.server.bas().battery_level_notify(conn, &level) {
            // The central has not subscribed yet
            Err(NotifyValueError::Raw(RawError::BleGattsSysAttrMissing)) => Ok(()),
            other => other.map_err(notify_error),
        }
    }
}
