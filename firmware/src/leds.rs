// SPDX-FileCopyrightText: 2024 Foundation Devices, Inc. <hello@foundationdevices.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Development kit LEDs, active low.

use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};
use hr_coded::host::{Indicators, Led};

pub struct BoardLeds {
    run: Output<'static>,
    connection: Output<'static>,
}

impl BoardLeds {
    /// LED1 shows the run status, LED2 the connection.
    pub fn new(run: AnyPin, connection: AnyPin) -> Self {
        Self {
            run: Output::new(run, Level::High, OutputDrive::Standard),
            connection: Output::new(connection, Level::High, OutputDrive::Standard),
        }
    }
}

impl Indicators for BoardLeds {
    fn set(&mut self, led: Led, on: bool) {
        let pin = match led {
            Led::Run => &mut self.run,
            Led::Connection => &mut self.connection,
        };
        pin.set_level(if on { Level::Low } else { Level::High });
    }
}
