use btleplug::api::bleuuid::{uuid_from_u16, BleUuid};
use btleplug::api::{Central, CentralEvent, Characteristic, Manager as _, Peripheral, ScanFilter, ValueNotification};
use btleplug::platform::{Adapter, Manager};
use clap::Parser;
use futures::stream::StreamExt;
use hr_coded::hrs::decode_measurement;
use log::{debug, warn};
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

#[derive(Debug, Parser)]
struct Args {
    #[arg(short, long)]
    list_adapters: bool,
    #[arg(short, long, default_value_t = String::from("hci0"))]
    adapter: String,
    #[arg(short, long)]
    enumerate: bool,
    /// Only report advertisements, never connect
    #[arg(short, long)]
    scan_only: bool,
    /// Stop after this many heart rate notifications
    #[arg(short, long, default_value_t = 10)]
    count: usize,
}

const HRS_UUID: Uuid = uuid_from_u16(consts::HRS_UUID16);
const HRM_UUID: Uuid = uuid_from_u16(consts::HRM_UUID16);
const BATTERY_LEVEL_UUID: Uuid = uuid_from_u16(consts::BATTERY_LEVEL_UUID16);

/// One decoded notification of the peripheral.
#[derive(Debug, PartialEq, Eq)]
enum Reading {
    HeartRate(u16),
    BatteryLevel(u8),
}

fn decode_notification(notification: &ValueNotification) -> Option<Reading> {
    match notification.uuid {
        HRM_UUID => decode_measurement(&notification.value).map(Reading::HeartRate),
        BATTERY_LEVEL_UUID => notification.value.first().copied().map(Reading::BatteryLevel),
        _ => None,
    }
}

/// Manufacturer data bytes per company identifier, as `0x0059: 252 bytes`.
fn describe_manufacturer_data(data: &HashMap<u16, Vec<u8>>) -> String {
    let mut ids: Vec<_> = data.keys().copied().collect();
    ids.sort_unstable();
    ids.iter()
        .map(|id| format!("{:#06x}: {} bytes", id, data[id].len()))
        .collect::<Vec<_>>()
        .join(", ")
}

async fn select_adapter(adapter_list: Vec<Adapter>, wanted: &str) -> Result<Adapter, Box<dyn Error>> {
    for adapter in adapter_list.iter() {
        if let Ok(info) = adapter.adapter_info().await {
            if info.contains(wanted) {
                println!("Wanted adapter found: {}", info);
                return Ok(adapter.clone());
            }
        }
    }
    let first = adapter_list.into_iter().next().ok_or("No Bluetooth adapters found")?;
    println!(
        "Wanted adapter not found, using first available one: {}",
        first.adapter_info().await?
    );
    Ok(first)
}

async fn local_name(central: &Adapter, id: &btleplug::platform::PeripheralId) -> Result<String, Box<dyn Error>> {
    let peripheral = central.peripheral(id).await?;
    let properties = peripheral.properties().await?;
    Ok(properties.and_then(|p| p.local_name).unwrap_or_default())
}

async fn subscribe(peripheral: &impl Peripheral, uuid: Uuid) -> Result<(), Box<dyn Error>> {
    let characteristic: Option<Characteristic> = peripheral.characteristics().into_iter().find(|c| c.uuid == uuid);
    match characteristic {
        Some(characteristic) => {
            peripheral.subscribe(&characteristic).await?;
            println!("Subscribed to {}", uuid.to_short_string());
        }
        None => warn!("Characteristic {} not found", uuid.to_short_string()),
    }
    Ok(())
}

/// Subscribes to heart rate and battery level, then prints `count` heart rate readings.
async fn monitor(peripheral: &impl Peripheral, name: &str, enumerate: bool, count: usize) -> Result<(), Box<dyn Error>> {
    peripheral.discover_services().await?;
    println!("Discover {} services...", name);
    if enumerate {
        for service in peripheral.services() {
            println!("Service UUID {}, primary: {}", service.uuid, service.primary);
            for characteristic in service.characteristics {
                println!("  {:?}", characteristic);
            }
        }
    }

    let mut notifications = peripheral.notifications().await?;
    subscribe(peripheral, HRM_UUID).await?;
    subscribe(peripheral, BATTERY_LEVEL_UUID).await?;

    let mut heart_rates = 0;
    while heart_rates < count {
        let Some(notification) = notifications.next().await else {
            break;
        };
        match decode_notification(&notification) {
            Some(Reading::HeartRate(bpm)) => {
                heart_rates += 1;
                println!("Heart rate: {} bpm", bpm);
            }
            Some(Reading::BatteryLevel(level)) => println!("Battery level: {}%", level),
            None => debug!("Ignored notification {:?}", notification),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let args = Args::parse();

    let manager = Manager::new().await?;
    let adapter_list = manager.adapters().await?;
    if adapter_list.is_empty() {
        eprintln!("No Bluetooth adapters found");
    }
    if args.list_adapters {
        println!("List of available bluetooth adapters:");
        for adapter in adapter_list.iter() {
            println!("- {}", adapter.adapter_info().await?);
        }
        return Ok(());
    }

    let central = select_adapter(adapter_list, &args.adapter).await?;
    println!("CentralState: {:?}", central.adapter_state().await?);

    let mut events = central.events().await?;

    // The large advertising set carries no service list, so scan unfiltered.
    println!("Starting scan...");
    central.start_scan(ScanFilter::default()).await?;

    while let Some(event) = events.next().await {
        match event {
            CentralEvent::DeviceDiscovered(id) => {
                let name = local_name(&central, &id).await?;
                if name != consts::DEVICE_NAME {
                    continue;
                }
                println!("DeviceDiscovered: {}", name);
                if args.scan_only {
                    continue;
                }
                let peripheral = central.peripheral(&id).await?;
                if !peripheral.is_connected().await? {
                    println!("Connecting to peripheral {}...", name);
                    if let Err(err) = peripheral.connect().await {
                        eprintln!("Error connecting to peripheral, skipping: {}", err);
                        continue;
                    }
                }
            }
            CentralEvent::StateUpdate(state) => {
                println!("AdapterStatusUpdate {:?}", state);
            }
            CentralEvent::DeviceConnected(id) => {
                let peripheral = central.peripheral(&id).await?;
                let name = local_name(&central, &id).await?;
                println!("DeviceConnected: {}", name);
                if name != consts::DEVICE_NAME {
                    continue;
                }
                let services = peripheral.services();
                if !services.is_empty() && !services.iter().any(|s| s.uuid == HRS_UUID) {
                    warn!("{} has no Heart Rate service", name);
                }
                monitor(&peripheral, &name, args.enumerate, args.count).await?;
                println!("Disconnecting from {}...", name);
                peripheral.disconnect().await?;
                break;
            }
            CentralEvent::DeviceDisconnected(id) => {
                println!("DeviceDisconnected: {}", local_name(&central, &id).await?);
            }
            CentralEvent::ManufacturerDataAdvertisement { id, manufacturer_data } => {
                let name = local_name(&central, &id).await?;
                println!(
                    "ManufacturerDataAdvertisement: {}, {}",
                    name,
                    describe_manufacturer_data(&manufacturer_data)
                );
            }
            CentralEvent::ServicesAdvertisement { id, services } => {
                let name = local_name(&central, &id).await?;
                let services: Vec<String> = services.into_iter().map(|s| s.to_short_string()).collect();
                println!("ServicesAdvertisement: {}, {:?}", name, services);
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(uuid: Uuid, value: &[u8]) -> ValueNotification {
        ValueNotification {
            uuid,
            value: value.to_vec(),
        }
    }

    #[test]
    fn decodes_heart_rate_and_battery() {
        assert_eq!(
            decode_notification(&notification(HRM_UUID, &[0x06, 120])),
            Some(Reading::HeartRate(120))
        );
        assert_eq!(
            decode_notification(&notification(BATTERY_LEVEL_UUID, &[42])),
            Some(Reading::BatteryLevel(42))
        );
    }

    #[test]
    fn ignores_unknown_and_empty_notifications() {
        assert_eq!(decode_notification(&notification(HRS_UUID, &[0x06, 120])), None);
        assert_eq!(decode_notification(&notification(BATTERY_LEVEL_UUID, &[])), None);
        assert_eq!(decode_notification(&notification(HRM_UUID, &[0x06])), None);
    }

    #[test]
    fn manufacturer_data_is_sorted_by_company() {
        let data = HashMap::from([(0x0059, vec![0xEE; 112]), (0x0006, vec![1, 2])]);
        assert_eq!(describe_manufacturer_data(&data), "0x0006: 2 bytes, 0x0059: 112 bytes");
    }

    #[test]
    fn service_uuids_use_the_bluetooth_base() {
        assert_eq!(HRS_UUID.to_string(), "0000180d-0000-1000-8000-00805f9b34fb");
    }
}
