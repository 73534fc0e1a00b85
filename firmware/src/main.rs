// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_std]
#![no_main]

mod bas;
mod dis;
mod host;
mod hrs;
mod leds;
mod server;

use core::cell::RefCell;
// global logger
use defmt_rtt as _;
// time driver
use embassy_nrf as _;
use panic_probe as _;

use defmt::{debug, error, info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin;
use embassy_nrf::interrupt;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use futures::future::select;
use futures::pin_mut;
#[cfg(feature = "broadcast-adv")]
use host::BROADCAST_START;
use host::{SoftdeviceHost, CONNECTABLE_START};
use hr_coded::advertising::AdvParams;
use hr_coded::{hci, App, Config, ConnectionEvent, ConnectionListener};
use leds::BoardLeds;
#[cfg(feature = "broadcast-adv")]
use nrf_softdevice::ble::peripheral::NonconnectableAdvertisement;
use nrf_softdevice::ble::peripheral::{self, ConnectableAdvertisement};
use nrf_softdevice::ble::{gatt_server, get_address, Phy};
use nrf_softdevice::Softdevice;
use server::{initialize_sd, Server};
use static_cell::StaticCell;

type HrApp = App<SoftdeviceHost, BoardLeds>;

/// The application context, only touched from thread-mode tasks.
static APP: Mutex<ThreadModeRawMutex, RefCell<Option<HrApp>>> = Mutex::new(RefCell::new(None));

/// Raised whenever new work was queued outside the work task.
static WORK: Signal<ThreadModeRawMutex, ()> = Signal::new();

static SERVER: StaticCell<Server> = StaticCell::new();

fn with_app<R>(f: impl FnOnce(&mut HrApp) -> R) -> Option<R> {
    APP.lock(|app| app.borrow_mut().as_mut().map(f))
}

fn adv_config(params: &AdvParams) -> peripheral::Config {
    peripheral::Config {
        primary_phy: Phy::Coded,
        secondary_phy: Phy::Coded,
        interval: params.interval_min as u32,
        ..Default::default()
    }
}

/// Runs deferred work when it is due, sleeping until the next deadline in between.
#[embassy_executor::task]
async fn work_task() -> ! {
    loop {
        let next = with_app(|app| {
            app.run_pending(Instant::now());
            app.next_deadline(Instant::now())
        })
        .flatten();

        match next {
            Some(deadline) => {
                let timer = Timer::at(deadline);
                let wake = WORK.wait();
                pin_mut!(timer);
                pin_mut!(wake);
                select(timer, wake).await;
            }
            None => WORK.wait().await,
        }
    }
}

/// Advertises the connectable set and serves the GATT server while a central is connected.
#[embassy_executor::task]
async fn connectable_advertiser_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    loop {
        let set = CONNECTABLE_START.wait().await;
        let Some((params, data)) = with_app(|app| app.host().advertisement(set)).flatten() else {
            error!("Unknown advertising set {}", set);
            continue;
        };

        let adv = ConnectableAdvertisement::ExtendedNonscannableUndirected {
            set_id: set.0,
            adv_data: &data,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &adv_config(&params)).await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Connectable advertising stopped: {:?}", e);
                continue;
            }
        };

        with_app(|app| {
            app.host_mut().set_connection(Some(conn.clone()));
            app.on_event(ConnectionEvent::Connected {
                conn: conn.clone(),
                err: hci::SUCCESS,
            });
        });

        let e = gatt_server::run(&conn, server, |e| server.handle_event(e)).await;
        debug!("gatt_server run exited: {:?}", e);

        // The SoftDevice does not hand the disconnect reason to the GATT server loop.
        with_app(|app| {
            app.host_mut().set_connection(None);
            app.on_event(ConnectionEvent::Disconnected {
                conn,
                reason: hci::UNSPECIFIED,
            });
        });
        WORK.signal(());
    }
}

/// Advertises non-connectable sets until they time out or fail.
/// Needs a SoftDevice configured with a second advertising set.
#[cfg(feature = "broadcast-adv")]
#[embassy_executor::task]
async fn broadcast_advertiser_task(sd: &'static Softdevice) -> ! {
    loop {
        let set = BROADCAST_START.wait().await;
        let Some((params, data)) = with_app(|app| app.host().advertisement(set)).flatten() else {
            error!("Unknown advertising set {}", set);
            continue;
        };

        let adv = NonconnectableAdvertisement::ExtendedNonscannableUndirected {
            set_id: set.0,
            anonymous: false,
            adv_data: &data,
        };
        match peripheral::advertise(sd, adv, &adv_config(&params)).await {
            Ok(()) => info!("Advertising set {} done", set),
            Err(e) => error!("Advertising set {} stopped: {:?}", set, e),
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut conf = embassy_nrf::config::Config::default();
    conf.hfclk_source = embassy_nrf::config::HfclkSource::ExternalXtal;
    conf.lfclk_source = embassy_nrf::config::LfclkSource::ExternalXtal;

    // Keep clear of the priorities reserved by the SoftDevice
    conf.gpiote_interrupt_priority = interrupt::Priority::P2;
    conf.time_interrupt_priority = interrupt::Priority::P2;

    let p = embassy_nrf::init(conf);

    let leds = BoardLeds::new(p.P0_13.degrade(), p.P0_14.degrade());

    let sd = initialize_sd();
    let server: &'static Server = SERVER.init(unwrap!(Server::new(sd), "Creating the GATT server failed"));
    unwrap!(server.init_values(), "Setting the GATT values failed");
    let sd: &'static Softdevice = sd;

    // Get Bt device address
    let mut address = get_address(sd).bytes();
    address.reverse();
    info!("Address : {=[u8;6]:#X}", address);

    let host = SoftdeviceHost::new(spawner, sd, server);
    APP.lock(|app| app.borrow_mut().replace(App::new(host, leds, Config::default())));

    unwrap!(spawner.spawn(work_task()), "Spawning the work task failed");
    unwrap!(
        spawner.spawn(connectable_advertiser_task(sd, server)),
        "Spawning the connectable advertiser failed"
    );
    #[cfg(feature = "broadcast-adv")]
    unwrap!(
        spawner.spawn(broadcast_advertiser_task(sd)),
        "Spawning the broadcast advertiser failed"
    );

    match with_app(|app| app.start(Instant::now())) {
        Some(Ok(())) => WORK.signal(()),
        // Already logged, the device stays up without advertising
        _ => return,
    }

    let interval = unwrap!(with_app(|app| app.blink_interval()));
    loop {
        with_app(|app| app.blink());
        Timer::after(interval).await;
    }
}
