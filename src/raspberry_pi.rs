use std::io;
use std::path::Path;
use std::time::Duration;

use acquire::Transport;
use anyhow::bail;
use rppal::spi::Bus;
use rppal::uart::{Parity, Uart};

/// Map a bus number to its rppal identifier.
pub fn spi_bus(number: u8) -> Result<Bus, anyhow::Error> {
    Ok(match number {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        _ => bail!("no SPI bus {number}"),
    })
}

/// Records and commands over a serial port, 8N1.
pub struct UartTransport {
    uart: Uart,
}

impl UartTransport {
    pub fn open(path: &Path, baud: u32) -> Result<Self, rppal::uart::Error> {
        let mut uart = Uart::with_path(path, baud, Parity::None, 8, 1)?;

        // Reads return immediately, writes wait for room in the buffer.
        uart.set_read_mode(0, Duration::ZERO)?;
        uart.set_write_mode(true)?;

        Ok(Self { uart })
    }
}

impl Transport for UartTransport {
    fn emit_line(&mut self, line: &str) -> io::Result<()> {
        self.uart.write(line.as_bytes()).map_err(io::Error::other)?;
        self.uart.write(b"\r\n").map_err(io::Error::other)?;
        Ok(())
    }

    fn try_receive(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0];

        match self.uart.read(&mut byte).map_err(io::Error::other)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }
}
