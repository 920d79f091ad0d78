pub const START_BYTE: u8 = 0x00;
pub const PADDING_BYTE: u8 = 0x00;
pub const CONTROL_BYTE_ONE: u8 = 0x02;
pub const CONTROL_BYTE_TWO: u8 = 0x31;
pub const CONTROL_BYTE_THREE: u8 = 0x33;

/// Reduces a sub-frame checksum to a single wire byte.
pub const CHECKSUM_MODULUS: u32 = 0x100;

/// The badge addresses six text slots.
pub const MAX_MESSAGES: usize = 6;

/// Text capacity of one slot, in bytes, summed over all four sub-frames.
pub const MAX_TEXT_LENGTH: usize = 250;

pub const BAUD_RATE: u32 = 38400;

/// Enablement pattern turning on all six text slots plus both image slots.
pub const ENABLE_ALL: u8 = 0xff;
/// Enablement pattern with every slot switched off.
pub const ENABLE_NONE: u8 = 0x00;

/// Encoded size of one message segment: four sub-frames, each a header,
/// a payload window, and a trailer.
pub const SEGMENT_LEN: usize = (8 + 60 + 1) + (4 + 64 + 1) + (4 + 64 + 1) + (4 + 62 + 2 + 1);

pub mod checksum;

mod messages;
pub use messages::*;

pub mod serialize;
pub use serialize::Serializer;

/// Serialize a full update frame: the start byte, one segment per message
/// in slot order, and the trailer carrying the encoded-message count.
///
/// Messages beyond [MAX_MESSAGES] are silently dropped, matching the bound
/// of the slot table. Panics if `messages` is empty.
pub fn serialize_messages<S>(ser: &mut S, messages: &[LedMessage]) -> Result<(), S::Error>
where
    S: Serializer,
{
    assert!(!messages.is_empty(), "frame needs at least one message");

    ser.write_u8(START_BYTE)?;

    let mut count = 0u8;
    for (slot, message) in Slot::ALL.iter().zip(messages.iter()) {
        message.serialize(*slot, ser)?;
        count += 1;
    }

    ser.write_u8(CONTROL_BYTE_ONE)?;
    ser.write_u8(CONTROL_BYTE_THREE)?;
    ser.write_u8(count)
}

/// Serialize the 4-byte slot enablement frame. Bit `i` of `pattern` turns
/// slot `i` on; see [ENABLE_ALL] and [ENABLE_NONE].
pub fn serialize_enable<S>(ser: &mut S, pattern: u8) -> Result<(), S::Error>
where
    S: Serializer,
{
    ser.write_bytes(&[START_BYTE, CONTROL_BYTE_ONE, CONTROL_BYTE_THREE, pattern])
}

/// An encoded frame, ready to hand to a transport in a single write.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frame(alloc::vec::Vec<u8>);

#[cfg(feature = "alloc")]
impl Frame {
    /// Encode an update frame for up to [MAX_MESSAGES] messages.
    ///
    /// Panics if `messages` is empty.
    pub fn messages(messages: &[LedMessage]) -> Frame {
        use void::ResultVoidExt;

        // run it once to get a length
        let mut len_ser = serialize::SerializerLength::new();
        serialize_messages(&mut len_ser, messages).void_unwrap();

        let mut ser = serialize::SerializerVec::with_capacity(len_ser.len());
        serialize_messages(&mut ser, messages).void_unwrap();
        Frame(ser.done())
    }

    /// Encode a slot enablement frame.
    pub fn enable(pattern: u8) -> Frame {
        use void::ResultVoidExt;

        let mut ser = serialize::SerializerVec::with_capacity(4);
        serialize_enable(&mut ser, pattern).void_unwrap();
        Frame(ser.done())
    }

    /// Encode the frame that disables every slot.
    pub fn clear() -> Frame {
        Self::enable(ENABLE_NONE)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> alloc::vec::Vec<u8> {
        self.0
    }
}

#[cfg(feature = "alloc")]
impl core::ops::Deref for Frame {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}
