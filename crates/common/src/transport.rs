//! Control transfer abstraction
//!
//! The UPS operation set only needs one primitive: an IN control transfer.
//! `ControlTransport` is implemented by the rusb-backed session and by the
//! scripted transport used in tests.

use protocol::{ControlRequest, OperationDescriptor, Reply, UsbError, decode_reply};
use tracing::{debug, warn};

/// A device that can answer IN control transfers
pub trait ControlTransport {
    /// Issue `request`, reading at most `buf.len()` bytes into `buf`
    ///
    /// Returns the number of bytes the device sent.
    fn read_control(&mut self, request: &ControlRequest, buf: &mut [u8])
    -> Result<usize, UsbError>;

    /// Request a string descriptor and decode the reply
    fn send_and_decode(&mut self, descriptor: OperationDescriptor) -> protocol::Result<Reply> {
        let request = descriptor.request();
        let mut buffer = vec![0u8; usize::from(request.length)];

        debug!(
            "Descriptor request: index={}, length={}",
            descriptor.index, descriptor.length
        );

        let transfer = self
            .read_control(&request, &mut buffer)
            .map(|len| &buffer[..len.min(buffer.len())]);

        if let Err(ref e) = transfer {
            warn!("Descriptor request {} failed: {}", descriptor.index, e);
        }

        let reply = decode_reply(transfer)?;
        debug!("Descriptor {} reply: {:?}", descriptor.index, reply);
        Ok(reply)
    }
}

impl<T: ControlTransport + ?Sized> ControlTransport for &mut T {
    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
    ) -> Result<usize, UsbError> {
        (**self).read_control(request, buf)
    }
}

impl<T: ControlTransport + ?Sized> ControlTransport for Box<T> {
    fn read_control(
        &mut self,
        request: &ControlRequest,
        buf: &mut [u8],
    ) -> Result<usize, UsbError> {
        (**self).read_control(request, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedTransport;
    use protocol::UpsError;

    #[test]
    fn test_send_and_decode_uses_descriptor_request() {
        let mut transport = ScriptedTransport::new().with_reply(b"\x0a\x03UPS-1000");
        let desc = OperationDescriptor::new(2, 256);

        let reply = transport.send_and_decode(desc).unwrap();

        assert_eq!(reply, Reply::Text("UPS-1000".to_string()));
        assert_eq!(transport.requests(), &[desc.request()]);
    }

    #[test]
    fn test_send_and_decode_short_reply() {
        let mut transport = ScriptedTransport::new().with_reply(&[0x02]);
        let reply = transport
            .send_and_decode(OperationDescriptor::new(7, 256))
            .unwrap();
        assert_eq!(reply, Reply::Acknowledged);
    }

    #[test]
    fn test_send_and_decode_error() {
        let mut transport = ScriptedTransport::new().with_error(UsbError::Timeout);
        let err = transport
            .send_and_decode(OperationDescriptor::new(3, 256))
            .unwrap_err();
        assert_eq!(err, UpsError::Transport(UsbError::Timeout));
    }

    #[test]
    fn test_reply_truncated_to_buffer_length() {
        let mut transport = ScriptedTransport::new().with_reply(b"ABCDEFGH");
        let reply = transport
            .send_and_decode(OperationDescriptor::new(6, 4))
            .unwrap();
        assert_eq!(reply, Reply::Text("ABCD".to_string()));
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn name_of(mut transport: impl ControlTransport) -> Reply {
            transport
                .send_and_decode(OperationDescriptor::new(2, 256))
                .unwrap()
        }

        let mut transport = ScriptedTransport::new().with_reply(b"abc");
        assert_eq!(name_of(&mut transport), Reply::Text("abc".to_string()));
        assert_eq!(transport.requests().len(), 1);
    }
}
