#![no_std]

/// Complete device name advertised over BLE.
/// Carried in the connectable advertising set and exposed as the GAP device name.
pub const DEVICE_NAME: &str = "Nordic_HR_Coded";

/// Maximum Transfer Unit (MTU) size for BLE communication.
/// Heart rate and battery notifications are tiny, the default ATT MTU is enough.
pub const ATT_MTU: usize = 23;

/// 16-bit UUID of the Heart Rate Service.
pub const HRS_UUID16: u16 = 0x180D;

/// 16-bit UUID of the Battery Service.
pub const BAS_UUID16: u16 = 0x180F;

/// 16-bit UUID of the Device Information Service.
pub const DIS_UUID16: u16 = 0x180A;

/// 16-bit UUID of the Heart Rate Measurement characteristic.
pub const HRM_UUID16: u16 = 0x2A37;

/// 16-bit UUID of the Battery Level characteristic.
pub const BATTERY_LEVEL_UUID16: u16 = 0x2A19;

/// List of BLE service UUIDs advertised by the connectable set, in advertising order.
pub const SERVICES_LIST: [u16; 3] = [HRS_UUID16, BAS_UUID16, DIS_UUID16];

/// Manufacturer name reported by the Device Information Service.
pub const MANUFACTURER_NAME: &str = "Nordic Semiconductor ASA";

/// Model number reported by the Device Information Service.
pub const MODEL_NUMBER: &str = "nRF52840 HR Coded";

/// Bluetooth SIG company identifier placed at the start of every Manufacturer Specific Data entry.
/// 0x0059 is Nordic Semiconductor ASA, sent least significant byte first.
pub const COMPANY_ID: u16 = 0x0059;

/// Total HCI Advertising_Data_Length of the large, non-connectable advertising set.
/// Every AD structure counts its length byte, its type byte and its data.
pub const ADV_TARGET_TOTAL_LEN: usize = 1650;

/// Largest data part of a single AD structure.
/// The length byte covers the type byte too, so 255 - 1 data bytes remain.
pub const AD_DATA_MAX_LEN: usize = 254;

/// Fill byte of the last, partial Manufacturer Specific Data entry.
pub const LAST_ENTRY_FILL: u8 = 0xEE;

/// Fast advertising interval 2, lower bound, in units of 0.625 ms (100 ms).
pub const ADV_FAST_INT_MIN_2: u16 = 0x00A0;

/// Fast advertising interval 2, upper bound, in units of 0.625 ms (150 ms).
pub const ADV_FAST_INT_MAX_2: u16 = 0x00F0;

/// Slow advertising interval, lower bound, in units of 0.625 ms (1 s).
pub const ADV_SLOW_INT_MIN: u16 = 0x0640;

/// Slow advertising interval, upper bound, in units of 0.625 ms (1.2 s).
pub const ADV_SLOW_INT_MAX: u16 = 0x0780;

/// Run status LED blink period in milliseconds.
pub const RUN_LED_BLINK_INTERVAL_MS: u64 = 1000;

/// Period of the simulated heart rate and battery notifications in milliseconds.
pub const NOTIFY_INTERVAL_MS: u64 = 1000;

/// First simulated heart rate value and the value it wraps back to.
pub const HEART_RATE_MIN: u8 = 100;

/// Simulated heart rate wraps back to [`HEART_RATE_MIN`] when it reaches this value.
pub const HEART_RATE_WRAP: u8 = 160;

/// Battery level reported at boot and after the simulated level runs out.
pub const BATTERY_LEVEL_FULL: u8 = 100;

/// Application flash start, right after the SoftDevice S140 7.x.
pub const BASE_APP_ADDR: u32 = 0x27000;

/// Total flash of the nRF52840.
pub const FLASH_SIZE: u32 = 1024 * 1024;

/// RAM reserved at the beginning of RAM for the SoftDevice.
/// S140 7.x with one peripheral link, one advertising set and the three services needs less than 32K.
pub const SOFTDEVICE_RAM_RESERVED: u32 = 0x8000;

/// Total RAM of the nRF52840.
pub const RAM_SIZE: u32 = 256 * 1024;
