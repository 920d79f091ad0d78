//! Serial port integration for badge sessions.

use std::time::Duration;

use crate::{ConnectionConfig, DataBits, FromStd, Parity, PortResolver, StopBits, Transport};

/// How long a write may block before the transport gives up.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// [PortResolver] over the operating system's visible serial ports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortResolver for SystemPorts {
    fn resolve(&self, pattern: &str) -> Option<String> {
        let infos = serialport::available_ports().ok()?;
        infos
            .into_iter()
            .find(|info| port_matches(info, pattern))
            .map(|info| info.port_name)
    }
}

fn port_matches(info: &serialport::SerialPortInfo, pattern: &str) -> bool {
    if contains_ignore_case(&info.port_name, pattern) {
        return true;
    }

    // USB bridges carry the friendly device name in their descriptor strings
    if let serialport::SerialPortType::UsbPort(usb) = &info.port_type {
        usb.product
            .as_deref()
            .map_or(false, |name| contains_ignore_case(name, pattern))
            || usb
                .manufacturer
                .as_deref()
                .map_or(false, |name| contains_ignore_case(name, pattern))
    } else {
        false
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// [Transport] over real serial ports, opened fresh for every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialTransport;

impl SerialTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for SerialTransport {
    type Error = std::io::Error;
    type Port<'a> = FromStd<Box<dyn serialport::SerialPort>> where Self: 'a;

    fn open(
        &mut self,
        config: &ConnectionConfig,
        port: &str,
    ) -> Result<Self::Port<'_>, Self::Error> {
        let mut port = serialport::new(port, config.baud_rate)
            .data_bits(data_bits(config.data_bits))
            .parity(parity(config.parity))
            .stop_bits(stop_bits(config.stop_bits))
            .open()?;
        port.set_timeout(WRITE_TIMEOUT)?;
        Ok(FromStd::new(port))
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Odd => serialport::Parity::Odd,
        Parity::Even => serialport::Parity::Even,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        assert!(contains_ignore_case(
            "Prolific USB-to-Serial Comm Port",
            "prolific"
        ));
        assert!(contains_ignore_case("/dev/ttyUSB0", "TTYUSB"));
        assert!(!contains_ignore_case("CH340 serial", "prolific"));
    }

    #[test]
    fn usb_descriptor_strings_are_searched() {
        let info = serialport::SerialPortInfo {
            port_name: "/dev/ttyUSB0".into(),
            port_type: serialport::SerialPortType::UsbPort(serialport::UsbPortInfo {
                vid: 0x067b,
                pid: 0x2303,
                serial_number: None,
                manufacturer: Some("Prolific Technology Inc.".into()),
                product: Some("USB-Serial Controller".into()),
            }),
        };

        assert!(port_matches(&info, "Prolific"));
        assert!(port_matches(&info, "usb-serial"));
        assert!(!port_matches(&info, "FTDI"));
    }

    #[test]
    fn line_parameters_map_across() {
        assert_eq!(data_bits(DataBits::Eight), serialport::DataBits::Eight);
        assert_eq!(parity(Parity::None), serialport::Parity::None);
        assert_eq!(stop_bits(StopBits::One), serialport::StopBits::One);
    }
}
