#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No central is connected
    NotConnected,
    /// Payload does not fit the characteristic or the command buffer
    PayloadTooLarge,
    /// Inbound command queue is full
    QueueFull,
    Driver,
}

/// Outbound channel for status fragments and command replies
pub trait StatusNotifier {
    fn notify(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Wireless link the device is controlled over.
///
/// Inbound writes are pushed into the command queue by the transport
/// itself, see [`crate::submit_command`].
pub trait Transport: StatusNotifier {
    /// Start advertising under `name` with the given service id
    fn advertise(&mut self, name: &str, service_id: &str) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}
