/// Persistent node-address storage, read once during boot.
///
/// On the deployed hardware this is a single byte of EEPROM written during
/// provisioning. The address never changes for the lifetime of the process.
pub trait NodeAddressStore {
    fn read_node_addr(&mut self) -> u8;
}

/// Address store with a provisioned constant, standing in for the EEPROM.
#[derive(Debug, Clone, Copy)]
pub struct FixedAddressStore {
    addr: u8,
}

impl FixedAddressStore {
    pub fn new(addr: u8) -> Self {
        Self { addr }
    }
}

impl NodeAddressStore for FixedAddressStore {
    fn read_node_addr(&mut self) -> u8 {
        self.addr
    }
}
