use alloc::string::String;

use embedded_io::Write;

use crate::protocol::{Frame, LedMessage, BAUD_RATE, ENABLE_NONE};

/// Re-export to allow building a [Transport] around [std::io] handles.
#[cfg(feature = "std")]
pub use embedded_io_adapters::std::FromStd;

/// An error type for [BadgeClient].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BadgeError<E> {
    /// No serial port matched the configured device name pattern.
    DeviceNotFound,
    /// The transport failed while opening the port or writing a frame.
    Transmission(E),
}

#[cfg(feature = "std")]
impl<E> std::error::Error for BadgeError<E> where E: core::fmt::Debug {}

impl<E> core::fmt::Display for BadgeError<E>
where
    E: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Self::DeviceNotFound => write!(f, "no badge found on any serial port"),
            Self::Transmission(e) => write!(f, "transmission error: {:?}", e),
        }
    }
}

impl<E> From<E> for BadgeError<E> {
    fn from(other: E) -> Self {
        Self::Transmission(other)
    }
}

/// Parity bit of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// Stop bits of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Word size of the serial line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Serial line parameters and the device name pattern used to find the
/// badge. Built up front and handed to the session whole, so there is no
/// half-configured state to trip over.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub device_pattern: String,
}

impl ConnectionConfig {
    pub fn new(
        baud_rate: u32,
        data_bits: DataBits,
        parity: Parity,
        stop_bits: StopBits,
        device_pattern: &str,
    ) -> Self {
        Self {
            baud_rate,
            data_bits,
            parity,
            stop_bits,
            device_pattern: String::from(device_pattern),
        }
    }

    /// Settings observed from the Prolific badge hardware: 38400 8N1, with
    /// the port surfaced under the "Prolific" USB bridge name.
    pub fn prolific() -> Self {
        Self::new(
            BAUD_RATE,
            DataBits::Eight,
            Parity::None,
            StopBits::One,
            "Prolific",
        )
    }
}

impl core::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "Baud Rate:{}|ParityBit:{:?}|StopBits:{:?}|Word Size:{:?}|Device:{}",
            self.baud_rate, self.parity, self.stop_bits, self.data_bits, self.device_pattern
        )
    }
}

/// Finds the serial port a badge is attached to.
///
/// Matching is case-insensitive against OS-visible device names; when
/// several ports match, the first wins.
pub trait PortResolver {
    fn resolve(&self, pattern: &str) -> Option<String>;
}

/// The serial link frames are written to.
///
/// A port is acquired per operation and released when the returned writer
/// drops, so a failed write never leaves the line held open.
pub trait Transport {
    type Error: embedded_io::Error;
    type Port<'a>: embedded_io::Write<Error = Self::Error>
    where
        Self: 'a;

    fn open(
        &mut self,
        config: &ConnectionConfig,
        port: &str,
    ) -> Result<Self::Port<'_>, Self::Error>;
}

/// A session with one LED badge.
///
/// The protocol is one-way; nothing is ever read back from the device.
/// Writes are not retried, and the device framing cannot disambiguate
/// interleaved writers, so share a session across threads only behind an
/// external lock.
#[derive(Debug, Clone)]
pub struct BadgeClient<R, T> {
    config: ConnectionConfig,
    resolver: R,
    transport: T,
    port: Option<String>,
}

impl<R, T> BadgeClient<R, T>
where
    R: PortResolver,
    T: Transport,
{
    /// Create a session. No port is touched until [open](Self::open).
    pub fn new(config: ConnectionConfig, resolver: R, transport: T) -> Self {
        Self {
            config,
            resolver,
            transport,
            port: None,
        }
    }

    /// Release the components used to create this session.
    pub fn free(self) -> (ConnectionConfig, R, T) {
        (self.config, self.resolver, self.transport)
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The resolved port, once [open](Self::open) has succeeded.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get the underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Resolve the badge's port by the configured device name pattern.
    pub fn open(&mut self) -> Result<(), BadgeError<T::Error>> {
        match self.resolver.resolve(&self.config.device_pattern) {
            Some(port) => {
                self.port = Some(port);
                Ok(())
            }
            None => Err(BadgeError::DeviceNotFound),
        }
    }

    /// The badge has no disconnect handshake; nothing to do.
    pub fn close(&mut self) {}

    /// Set a single message in the first slot.
    pub fn set_message(&mut self, message: &LedMessage) -> Result<(), BadgeError<T::Error>> {
        self.set_messages(core::slice::from_ref(message))
    }

    /// Set up to six messages, one slot each in input order.
    ///
    /// Messages past the sixth are dropped; panics if `messages` is empty.
    pub fn set_messages(&mut self, messages: &[LedMessage]) -> Result<(), BadgeError<T::Error>> {
        self.transmit(&Frame::messages(messages))
    }

    /// Switch slots on or off. Bit `i` of `pattern` enables slot `i`;
    /// 0xFF enables all six text slots and both image slots.
    pub fn enable_messages(&mut self, pattern: u8) -> Result<(), BadgeError<T::Error>> {
        self.transmit(&Frame::enable(pattern))
    }

    /// Disable every slot.
    pub fn clear_messages(&mut self) -> Result<(), BadgeError<T::Error>> {
        self.enable_messages(ENABLE_NONE)
    }

    // one port acquisition and exactly one frame write per operation
    fn transmit(&mut self, frame: &Frame) -> Result<(), BadgeError<T::Error>> {
        let port = self.port.as_deref().ok_or(BadgeError::DeviceNotFound)?;
        let mut link = self.transport.open(&self.config, port)?;
        link.write_all(frame.as_bytes())?;
        link.flush()?;
        Ok(())
    }
}

/// A badge session over real serial ports.
#[cfg(feature = "std")]
pub type SerialBadgeClient = BadgeClient<crate::serial::SystemPorts, crate::serial::SerialTransport>;

#[cfg(feature = "std")]
impl SerialBadgeClient {
    /// A session over real serial ports with the given config.
    pub fn new_serial(config: ConnectionConfig) -> Self {
        Self::new(
            config,
            crate::serial::SystemPorts,
            crate::serial::SerialTransport::new(),
        )
    }

    /// A session preconfigured for the Prolific badge.
    pub fn new_prolific() -> Self {
        Self::new_serial(ConnectionConfig::prolific())
    }
}

#[cfg(test)]
mod test {
    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use embedded_io::ErrorKind;

    use crate::protocol::{Frame, LedMessage, ENABLE_ALL};

    use super::*;

    #[derive(Debug, Clone)]
    struct StubResolver(Option<&'static str>);

    impl PortResolver for StubResolver {
        fn resolve(&self, _pattern: &str) -> Option<String> {
            self.0.map(String::from)
        }
    }

    /// Resolves every pattern, echoing it into the port name.
    #[derive(Debug, Clone)]
    struct PatternEcho;

    impl PortResolver for PatternEcho {
        fn resolve(&self, pattern: &str) -> Option<String> {
            Some(format!("port-for-{}", pattern))
        }
    }

    /// Records the bytes of every opened connection.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        writes: Vec<Vec<u8>>,
    }

    struct RecordingPort<'a> {
        sink: &'a mut Vec<u8>,
    }

    impl embedded_io::ErrorType for RecordingPort<'_> {
        type Error = core::convert::Infallible;
    }

    impl embedded_io::Write for RecordingPort<'_> {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.sink.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl Transport for RecordingTransport {
        type Error = core::convert::Infallible;
        type Port<'a> = RecordingPort<'a> where Self: 'a;

        fn open(
            &mut self,
            _config: &ConnectionConfig,
            _port: &str,
        ) -> Result<Self::Port<'_>, Self::Error> {
            self.writes.push(Vec::new());
            Ok(RecordingPort {
                sink: self.writes.last_mut().unwrap(),
            })
        }
    }

    struct FailingPort;

    impl embedded_io::ErrorType for FailingPort {
        type Error = ErrorKind;
    }

    impl embedded_io::Write for FailingPort {
        fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> {
            Err(ErrorKind::TimedOut)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// Fails at port-open time, as an unplugged badge would.
    struct UnpluggedTransport;

    impl Transport for UnpluggedTransport {
        type Error = ErrorKind;
        type Port<'a> = FailingPort where Self: 'a;

        fn open(
            &mut self,
            _config: &ConnectionConfig,
            _port: &str,
        ) -> Result<Self::Port<'_>, Self::Error> {
            Err(ErrorKind::NotFound)
        }
    }

    /// Opens fine but fails every write.
    struct BrokenWireTransport;

    impl Transport for BrokenWireTransport {
        type Error = ErrorKind;
        type Port<'a> = FailingPort where Self: 'a;

        fn open(
            &mut self,
            _config: &ConnectionConfig,
            _port: &str,
        ) -> Result<Self::Port<'_>, Self::Error> {
            Ok(FailingPort)
        }
    }

    fn recording(resolver: StubResolver) -> BadgeClient<StubResolver, RecordingTransport> {
        BadgeClient::new(
            ConnectionConfig::prolific(),
            resolver,
            RecordingTransport::default(),
        )
    }

    #[test]
    fn open_resolves_the_configured_pattern() {
        let mut badge = BadgeClient::new(
            ConnectionConfig::prolific(),
            PatternEcho,
            RecordingTransport::default(),
        );
        badge.open().unwrap();
        assert_eq!(badge.port(), Some("port-for-Prolific"));
    }

    #[test]
    fn open_without_match_is_device_not_found() {
        let mut badge = recording(StubResolver(None));
        assert_eq!(badge.open(), Err(BadgeError::DeviceNotFound));
        assert!(badge.transport().writes.is_empty());
    }

    #[test]
    fn operations_before_open_are_device_not_found() {
        let mut badge = recording(StubResolver(Some("COM3")));
        let message = LedMessage::new("hello");

        assert_eq!(badge.set_message(&message), Err(BadgeError::DeviceNotFound));
        assert_eq!(badge.enable_messages(ENABLE_ALL), Err(BadgeError::DeviceNotFound));
        assert!(badge.transport().writes.is_empty());
    }

    #[test]
    fn set_messages_is_a_single_write() {
        let mut badge = recording(StubResolver(Some("COM3")));
        badge.open().unwrap();

        let messages = [LedMessage::new("first"), LedMessage::new("second")];
        badge.set_messages(&messages).unwrap();

        let writes = &badge.transport().writes;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0], Frame::messages(&messages).as_bytes());
    }

    #[test]
    fn enable_then_clear_frames() {
        let mut badge = recording(StubResolver(Some("COM3")));
        badge.open().unwrap();

        badge.enable_messages(ENABLE_ALL).unwrap();
        badge.clear_messages().unwrap();

        let writes = &badge.transport().writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], &[0x00, 0x02, 0x33, 0xff][..]);
        assert_eq!(writes[1], &[0x00, 0x02, 0x33, 0x00][..]);
    }

    #[test]
    fn close_is_a_no_op() {
        let mut badge = recording(StubResolver(Some("COM3")));
        badge.open().unwrap();
        badge.close();

        badge.set_message(&LedMessage::new("still here")).unwrap();
        assert_eq!(badge.transport().writes.len(), 1);
    }

    #[test]
    fn open_failure_surfaces_as_transmission() {
        let mut badge = BadgeClient::new(
            ConnectionConfig::prolific(),
            StubResolver(Some("COM3")),
            UnpluggedTransport,
        );
        badge.open().unwrap();

        assert_eq!(
            badge.set_message(&LedMessage::new("hi")),
            Err(BadgeError::Transmission(ErrorKind::NotFound))
        );
    }

    #[test]
    fn write_failure_surfaces_as_transmission() {
        let mut badge = BadgeClient::new(
            ConnectionConfig::prolific(),
            StubResolver(Some("COM3")),
            BrokenWireTransport,
        );
        badge.open().unwrap();

        assert_eq!(
            badge.clear_messages(),
            Err(BadgeError::Transmission(ErrorKind::TimedOut))
        );
    }

    #[test]
    fn config_renders_in_one_line() {
        let config = ConnectionConfig::prolific();
        assert_eq!(
            config.to_string(),
            "Baud Rate:38400|ParityBit:None|StopBits:One|Word Size:Eight|Device:Prolific"
        );
    }
}
