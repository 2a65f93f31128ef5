//! CAN bus source and sink traits

use tripmode_protocol::CanFrame;

/// Trait for receiving frames from the bus
///
/// Implementations block until a frame is available. Errors are treated as
/// fatal by the drive loop: it propagates them and does not retry.
pub trait FrameSource {
    /// Transport error type
    type Error;

    /// Receive the next frame
    ///
    /// Returns `Ok(None)` once the source is closed and no more frames will
    /// arrive.
    fn receive(&mut self) -> Result<Option<CanFrame>, Self::Error>;
}

/// Trait for transmitting frames on the bus
pub trait FrameSink {
    /// Transport error type
    type Error;

    /// Queue a batch of frames for transmission, in order
    ///
    /// Delivery is not acknowledged; an error means the transport itself is
    /// no longer usable.
    fn send_batch(&mut self, frames: &[CanFrame]) -> Result<(), Self::Error>;
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    type Error = T::Error;

    fn receive(&mut self) -> Result<Option<CanFrame>, Self::Error> {
        (**self).receive()
    }
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    type Error = T::Error;

    fn send_batch(&mut self, frames: &[CanFrame]) -> Result<(), Self::Error> {
        (**self).send_batch(frames)
    }
}
