//! Classic CAN frame as seen by the controller.
//!
//! A frame carries:
//! - ID: 11-bit standard or 29-bit extended identifier (stored as u32)
//! - DATA (0-8 bytes): payload
//! - BUS: index of the bus the frame was received on or is destined for

use heapless::Vec;

/// Maximum classic CAN payload size in bytes
pub const MAX_DATA_LEN: usize = 8;

/// Largest valid standard (11-bit) identifier
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Largest valid extended (29-bit) identifier
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

/// Errors that can occur when constructing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds 8 bytes
    PayloadTooLarge,
    /// Identifier does not fit in 29 bits
    InvalidId,
}

/// A received or to-be-sent CAN frame
///
/// Frames are immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanFrame {
    id: u32,
    data: Vec<u8, MAX_DATA_LEN>,
    bus: u8,
    extended: bool,
}

impl CanFrame {
    /// Create a new frame with the given identifier, payload and bus
    ///
    /// Identifiers above `MAX_STANDARD_ID` use the extended format.
    pub fn new(id: u32, data: &[u8], bus: u8) -> Result<Self, FrameError> {
        Self::build(id, data, bus, id > MAX_STANDARD_ID)
    }

    /// Create a frame in the extended format, whatever the identifier value
    pub fn new_extended(id: u32, data: &[u8], bus: u8) -> Result<Self, FrameError> {
        Self::build(id, data, bus, true)
    }

    fn build(id: u32, data: &[u8], bus: u8, extended: bool) -> Result<Self, FrameError> {
        if id > MAX_EXTENDED_ID {
            return Err(FrameError::InvalidId);
        }

        let data = Vec::from_slice(data).map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            id,
            data,
            bus,
            extended,
        })
    }

    /// Build a standard frame from an already-bounded payload
    pub(crate) fn from_parts(id: u32, data: Vec<u8, MAX_DATA_LEN>, bus: u8) -> Self {
        Self {
            id,
            data,
            bus,
            extended: false,
        }
    }

    /// Message identifier
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bus index
    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// Payload length (DLC)
    pub fn dlc(&self) -> usize {
        self.data.len()
    }

    /// Whether the frame uses the 29-bit extended format
    pub fn is_extended(&self) -> bool {
        self.extended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_accessors() {
        let frame = CanFrame::new(0x3E9, &[0x13, 0x88], 1).unwrap();

        assert_eq!(frame.id(), 0x3E9);
        assert_eq!(frame.data(), &[0x13, 0x88]);
        assert_eq!(frame.bus(), 1);
        assert_eq!(frame.dlc(), 2);
        assert!(!frame.is_extended());
    }

    #[test]
    fn test_empty_payload() {
        let frame = CanFrame::new(0x100, &[], 0).unwrap();
        assert_eq!(frame.dlc(), 0);
    }

    #[test]
    fn test_payload_too_large() {
        let result = CanFrame::new(0x1E1, &[0u8; MAX_DATA_LEN + 1], 0);
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_extended_id() {
        let frame = CanFrame::new(0x18DA_F110, &[0x02, 0x10, 0x03], 0).unwrap();
        assert!(frame.is_extended());

        let result = CanFrame::new(MAX_EXTENDED_ID + 1, &[], 0);
        assert_eq!(result, Err(FrameError::InvalidId));
    }

    #[test]
    fn test_extended_format_with_small_id() {
        let frame = CanFrame::new_extended(0x3E9, &[0x13, 0x88], 0).unwrap();
        assert!(frame.is_extended());
        assert_eq!(frame.id(), 0x3E9);
        assert_ne!(frame, CanFrame::new(0x3E9, &[0x13, 0x88], 0).unwrap());
    }
}
