//! Message types and the per-slot segment encoder.

use super::serialize::{Serializer, SerializerChecksum};
use super::{CONTROL_BYTE_ONE, CONTROL_BYTE_TWO, MAX_TEXT_LENGTH, PADDING_BYTE};

/// Scrolling/update speed of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageSpeed {
    Slowest = 0x31,
    Slow = 0x32,
    Medium = 0x33,
    Fast = 0x34,
    Fastest = 0x35,
}

impl MessageSpeed {
    /// The byte this speed is written as on the wire.
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl Default for MessageSpeed {
    fn default() -> Self {
        Self::Slowest
    }
}

/// Display style of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageStyle {
    Hold = 0x41,
    Scroll = 0x42,
    RainDown = 0x43,
    Flash = 0x44,
}

impl MessageStyle {
    /// The byte this style is written as on the wire.
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl Default for MessageStyle {
    fn default() -> Self {
        Self::Scroll
    }
}

/// One of the six text slots the badge can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slot {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
}

impl Slot {
    /// All slots, in wire order.
    pub const ALL: [Slot; 6] = [
        Slot::One,
        Slot::Two,
        Slot::Three,
        Slot::Four,
        Slot::Five,
        Slot::Six,
    ];

    /// Zero-based index of this slot.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Slot> {
        match index {
            0 => Some(Slot::One),
            1 => Some(Slot::Two),
            2 => Some(Slot::Three),
            3 => Some(Slot::Four),
            4 => Some(Slot::Five),
            5 => Some(Slot::Six),
            _ => None,
        }
    }

    /// The slot's address byte pair in sub-frame headers.
    pub const fn offsets(self) -> (u8, u8) {
        match self {
            Slot::One => (0x06, 0x31),
            Slot::Two => (0x07, 0x32),
            Slot::Three => (0x08, 0x33),
            Slot::Four => (0x09, 0x34),
            Slot::Five => (0x0a, 0x35),
            Slot::Six => (0x0b, 0x36),
        }
    }

    /// The slot's bit in the enablement pattern.
    pub const fn mask(self) -> u8 {
        1u8 << self.index()
    }
}

// batch marker and payload window of the four sub-frames of a segment
const SUB_FRAMES: [(u8, usize); 4] = [(0x00, 60), (0x40, 64), (0x80, 64), (0xc0, 62)];

/// One message to place in a badge slot.
///
/// `text` is sent as raw bytes; the badge character set covers printable
/// ASCII. Text longer than [MAX_TEXT_LENGTH] is clipped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LedMessage<'a> {
    pub text: &'a [u8],
    pub style: MessageStyle,
    pub speed: MessageSpeed,
}

impl<'a> LedMessage<'a> {
    /// Create a message with the default style and speed.
    pub fn new(text: &'a str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_bytes(text: &'a [u8]) -> Self {
        Self {
            text,
            style: MessageStyle::default(),
            speed: MessageSpeed::default(),
        }
    }

    pub fn with_style(mut self, style: MessageStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_speed(mut self, speed: MessageSpeed) -> Self {
        self.speed = speed;
        self
    }

    /// Serialize this message's four sub-frames for `slot`.
    ///
    /// Each sub-frame is a leading control byte, a checksummed span of
    /// header fields and payload window, and a trailing checksum byte. The
    /// first sub-frame carries the extended header with speed, style, and
    /// text length; the last carries two extra padding bytes before its
    /// checksum. The segment size is [SEGMENT_LEN](super::SEGMENT_LEN)
    /// regardless of text length.
    pub fn serialize<S>(&self, slot: Slot, ser: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        let text = clip_overlong(self.text);
        let (offset1, offset2) = slot.offsets();

        let mut taken = 0;
        for (index, (batch, window)) in SUB_FRAMES.iter().enumerate() {
            ser.write_u8(CONTROL_BYTE_ONE)?;

            let mut check = SerializerChecksum::new(&mut *ser);
            check.write_u8(CONTROL_BYTE_TWO)?;
            check.write_u8(offset1)?;
            check.write_u8(*batch)?;
            if index == 0 {
                check.write_u8(self.speed.byte())?;
                check.write_u8(offset2)?;
                check.write_u8(self.style.byte())?;
                check.write_u8(text.len() as u8)?;
            }

            let chunk_end = text.len().min(taken + window);
            let chunk = &text[taken..chunk_end];
            check.write_bytes(chunk)?;
            for _ in chunk.len()..*window {
                check.write_u8(PADDING_BYTE)?;
            }
            taken = chunk_end;

            let (sum, tail) = check.finalize();
            if index == SUB_FRAMES.len() - 1 {
                tail.write_u8(PADDING_BYTE)?;
                tail.write_u8(PADDING_BYTE)?;
            }
            tail.write_u8(sum)?;
        }

        Ok(())
    }
}

/// Clip over-length text the way the badge host software always has: drop
/// the leading byte, then cap at [MAX_TEXT_LENGTH] bytes.
///
/// Clipping from the front is a long-standing quirk of the original host
/// tooling; keep it until the firmware is confirmed to accept anything
/// else.
fn clip_overlong(text: &[u8]) -> &[u8] {
    if text.len() <= MAX_TEXT_LENGTH {
        return text;
    }

    let trimmed = &text[1..];
    let end = if trimmed.len() < MAX_TEXT_LENGTH {
        trimmed.len()
    } else {
        MAX_TEXT_LENGTH
    };
    &trimmed[..end]
}
