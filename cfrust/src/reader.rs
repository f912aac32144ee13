//! High-level reader interface

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use cfrust_core::{Command, CommandDescriptor, InventoryState, ProtocolFamily};
use cfrust_transport::{SerialConfig, SerialTransport, TcpTransport, Transport};
use cfrust_types::params::decode_whitelist_count;
use cfrust_types::{
    AntennaMask, DeviceInfo, FrequencyPlan, InventoryRequest, KillTagRequest, LockTagRequest,
    ReadTagRequest, RelayCommand, RfPower, RfidType, SelectMask, TagReport, TagResponse, Temperature,
    WhitelistBegin, WriteTagRequest,
};

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::inventory::{InventorySession, Poll};
use crate::link::Link;

/// CF-series UHF RFID reader
///
/// High-level interface over one connection. Tag commands are resolved in
/// the protocol family held by the configuration, so it has to match the
/// reader's RFID type (see [`Reader::rfid_family`] and [`Reader::set_family`]).
///
/// # Examples
///
/// ```no_run
/// use cfrust::{Reader, ReaderConfig};
///
/// #[tokio::main]
/// async fn main() -> cfrust::Result<()> {
///     let mut reader = Reader::connect_tcp("192.168.1.200", 4001, ReaderConfig::default()).await?;
///
///     let info = reader.get_info().await?;
///     println!("Reader: {}", info);
///
///     if let Some(tag) = reader.read_single_tag(std::time::Duration::from_secs(3)).await? {
///         println!("Tag: {}", tag);
///     }
///
///     reader.close().await?;
///     Ok(())
/// }
/// ```
pub struct Reader {
    link: Link,
    config: ReaderConfig,
    inventory: InventorySession,
}

impl Reader {
    /// Wrap an already connected transport
    pub fn new(transport: impl Transport + 'static, config: ReaderConfig) -> Self {
        Self {
            link: Link::new(Box::new(transport), config.address),
            config,
            inventory: InventorySession::new(),
        }
    }

    /// Connect to a networked reader
    pub async fn connect_tcp(host: impl Into<String>, port: u16, config: ReaderConfig) -> Result<Self> {
        let mut transport = TcpTransport::new(host, port);

        info!("Connecting to {}...", transport.remote_addr());
        transport.connect().await?;
        info!("Connected to {}", transport.remote_addr());

        Ok(Self::new(transport, config))
    }

    /// Open a reader on a serial port
    pub async fn open_serial(port: impl Into<String>, baud_rate: u32, config: ReaderConfig) -> Result<Self> {
        let mut transport = SerialTransport::new(port, SerialConfig::default().with_baud_rate(baud_rate));
        transport.connect().await?;

        Ok(Self::new(transport, config))
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Protocol family tag commands are currently resolved in
    pub fn family(&self) -> ProtocolFamily {
        self.config.family
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    pub fn inventory_state(&self) -> InventoryState {
        self.inventory.state()
    }

    /// Get device information
    ///
    /// Retrieves firmware and hardware versions and the serial number.
    pub async fn get_info(&mut self) -> Result<DeviceInfo> {
        debug!("Getting device info...");

        let payload = self.transact(Command::GetInfo, &[]).await?;
        let info = DeviceInfo::decode(&payload)?;

        debug!("Device info: {}", info);
        Ok(info)
    }

    /// Restart the reader
    pub async fn reboot(&mut self) -> Result<()> {
        info!("Rebooting reader...");
        self.transact(Command::Reboot, &[]).await?;
        Ok(())
    }

    pub async fn rf_power(&mut self) -> Result<RfPower> {
        let payload = self.transact(Command::GetRfPower, &[]).await?;
        Ok(RfPower::decode(&payload)?)
    }

    pub async fn set_rf_power(&mut self, power: RfPower) -> Result<()> {
        debug!("Setting RF power to {}", power);
        self.transact(Command::SetRfPower, &power.encode()).await?;
        Ok(())
    }

    pub async fn frequency(&mut self) -> Result<FrequencyPlan> {
        let payload = self.transact(Command::GetFrequency, &[]).await?;
        Ok(FrequencyPlan::decode(&payload)?)
    }

    pub async fn set_frequency(&mut self, plan: &FrequencyPlan) -> Result<()> {
        let payload = plan.encode()?;
        self.transact(Command::SetFrequency, &payload).await?;
        Ok(())
    }

    /// Enabled antenna ports
    pub async fn antenna(&mut self) -> Result<AntennaMask> {
        let payload = self.transact(Command::GetAntenna, &[]).await?;
        Ok(AntennaMask::decode(&payload)?)
    }

    pub async fn set_antenna(&mut self, mask: AntennaMask) -> Result<()> {
        let payload = mask.encode()?;
        self.transact(Command::SetAntenna, &payload).await?;
        Ok(())
    }

    /// Current temperature and protection limit
    pub async fn temperature(&mut self) -> Result<Temperature> {
        let payload = self.transact(Command::GetTemperature, &[]).await?;
        Ok(Temperature::decode(&payload)?)
    }

    pub async fn set_temperature_limit(&mut self, limit: u8) -> Result<()> {
        self.transact(Command::SetTemperature, &Temperature::encode_limit(limit)).await?;
        Ok(())
    }

    /// Close or release the relay for `command.hold` × 100 ms
    pub async fn relay(&mut self, command: RelayCommand) -> Result<()> {
        self.transact(Command::Relay, &command.encode()).await?;
        Ok(())
    }

    /// Query the air-interface family the reader is set to
    pub async fn rfid_family(&mut self) -> Result<ProtocolFamily> {
        let payload = self.transact(Command::RfidType, &RfidType::Query.encode()).await?;
        Ok(RfidType::decode(&payload)?)
    }

    /// Switch the reader to `family` and resolve later tag commands in it
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] while an inventory is running.
    pub async fn set_family(&mut self, family: ProtocolFamily) -> Result<()> {
        self.ensure_no_inventory("change protocol family")?;

        self.transact(Command::RfidType, &RfidType::Set(family).encode()).await?;
        info!(from = %self.config.family, to = %family, "Protocol family changed");
        self.config.family = family;
        Ok(())
    }

    /// Read words from tag memory
    ///
    /// The words are in [`TagResponse::words`].
    pub async fn read_tag(&mut self, request: &ReadTagRequest) -> Result<TagResponse> {
        let payload = request.encode()?;
        let response = self.transact(Command::ReadTag, &payload).await?;
        Ok(TagResponse::decode(&response)?)
    }

    pub async fn write_tag(&mut self, request: &WriteTagRequest) -> Result<TagResponse> {
        let payload = request.encode()?;
        let response = self.transact(Command::WriteTag, &payload).await?;
        Ok(TagResponse::decode(&response)?)
    }

    pub async fn lock_tag(&mut self, request: &LockTagRequest) -> Result<TagResponse> {
        let response = self.transact(Command::LockTag, &request.encode()).await?;
        Ok(TagResponse::decode(&response)?)
    }

    /// Permanently disable a tag
    pub async fn kill_tag(&mut self, request: &KillTagRequest) -> Result<TagResponse> {
        let payload = request.encode()?;
        let response = self.transact(Command::KillTag, &payload).await?;
        Ok(TagResponse::decode(&response)?)
    }

    /// Restrict tag commands and inventory to matching tags
    pub async fn set_select_mask(&mut self, mask: &SelectMask) -> Result<()> {
        self.transact(Command::SetSelectMask, &mask.encode()).await?;
        Ok(())
    }

    /// Open a whitelist transfer
    pub async fn begin_whitelist(&mut self, begin: WhitelistBegin) -> Result<()> {
        debug!(option = ?begin.option, entries = begin.entries, "Beginning whitelist transfer");
        self.transact(Command::BeginWhitelist, &begin.encode()).await?;
        Ok(())
    }

    /// Send one chunk of whitelist data
    pub async fn send_whitelist(&mut self, chunk: &[u8]) -> Result<()> {
        self.transact(Command::Whitelist, chunk).await?;
        Ok(())
    }

    /// Close the transfer; returns the entry count the reader stored
    pub async fn end_whitelist(&mut self) -> Result<u16> {
        let payload = self.transact(Command::EndWhitelist, &[]).await?;
        Ok(decode_whitelist_count(&payload)?)
    }

    /// Start a continuous inventory
    pub async fn start_inventory(&mut self, request: InventoryRequest) -> Result<()> {
        let family = self.config.family;
        let timeout = self.timeout(Command::InventoryContinue)?;
        self.inventory.start(&mut self.link, family, request, timeout).await
    }

    /// Wait for the next tag report, up to the configured poll timeout
    pub async fn poll_tag(&mut self) -> Result<Poll> {
        let timeout = self.config.poll_timeout;
        self.poll_tag_within(timeout).await
    }

    pub async fn poll_tag_within(&mut self, timeout: Duration) -> Result<Poll> {
        self.inventory.poll(&mut self.link, self.config.family, timeout).await
    }

    /// Stop the running inventory
    ///
    /// A [`Error::StopUnacknowledged`] result is a warning; the inventory is
    /// stopped on this side either way.
    pub async fn stop_inventory(&mut self) -> Result<()> {
        let timeout = self.config.stop_timeout;
        self.inventory.stop(&mut self.link, self.config.family, timeout).await
    }

    /// Run an inventory until the first tag or `timeout`, then stop it
    ///
    /// Returns `Ok(None)` if no tag was seen in time.
    pub async fn read_single_tag(&mut self, timeout: Duration) -> Result<Option<TagReport>> {
        self.start_inventory(InventoryRequest::default()).await?;

        let deadline = Instant::now() + timeout;
        let result = loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break Ok(None);
            }

            match self.poll_tag_within(remaining.min(self.config.poll_timeout)).await {
                Ok(Poll::Tag(tag)) => break Ok(Some(tag)),
                Ok(Poll::Empty(reason)) => debug!(?reason, "No tag yet"),
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = self.stop_inventory().await {
            warn!("Failed to stop inventory after single read: {}", e);
        }

        result
    }

    /// Collect tags from a continuous inventory for up to `duration`, then stop it
    ///
    /// Returns early once `max` tags are in hand. Every report counts, so a
    /// tag seen twice appears twice.
    pub async fn read_tags(&mut self, max: Option<usize>, duration: Duration) -> Result<Vec<TagReport>> {
        self.start_inventory(InventoryRequest::default()).await?;

        let deadline = Instant::now() + duration;
        let mut tags = Vec::new();
        let result = loop {
            if max.is_some_and(|max| tags.len() >= max) {
                break Ok(());
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break Ok(());
            }

            match self.poll_tag_within(remaining.min(self.config.poll_timeout)).await {
                Ok(Poll::Tag(tag)) => tags.push(tag),
                Ok(Poll::Empty(reason)) => debug!(?reason, collected = tags.len(), "Waiting for tags"),
                Err(e) => break Err(e),
            }
        };

        if let Err(e) = self.stop_inventory().await {
            warn!("Failed to stop inventory after collecting tags: {}", e);
        }

        result.map(|()| {
            info!(count = tags.len(), "Inventory read finished");
            tags
        })
    }

    /// Execute any registered command with a caller-built payload
    pub async fn execute_raw(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        self.transact(command, payload).await
    }

    /// Stop any inventory and close the connection
    pub async fn close(&mut self) -> Result<()> {
        if self.inventory.state().is_active() {
            if let Err(e) = self.stop_inventory().await {
                warn!("Failed to stop inventory before closing: {}", e);
            }
        }

        info!("Closing connection to {}", self.link.remote_addr());
        self.link.close().await
    }

    fn descriptor(&self, command: Command) -> Result<&'static CommandDescriptor> {
        Ok(command.descriptor(self.config.family)?)
    }

    fn timeout(&self, command: Command) -> Result<Duration> {
        let descriptor = self.descriptor(command)?;
        Ok(self.config.timeout_for(descriptor.timeout))
    }

    async fn transact(&mut self, command: Command, payload: &[u8]) -> Result<Bytes> {
        let descriptor = self.descriptor(command)?;
        let timeout = self.config.timeout_for(descriptor.timeout);
        self.link.execute(descriptor, payload, timeout).await
    }

    fn ensure_no_inventory(&self, action: &str) -> Result<()> {
        let state = self.inventory.state();
        if state.is_active() {
            return Err(Error::InvalidState(format!("Cannot {} while {:?}", action, state)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfrust_core::{ErrorCode, FrameKind, Packet};
    use cfrust_transport::{MockHandle, MockTransport};
    use cfrust_types::{MemoryBank, WhitelistOption};
    use pretty_assertions::assert_eq;

    const REPORT: [u8; 13] = [
        0xFF, 0x38, 0x02, 0x03, 0x00, 0x00, 0x30, 0x00, 0x04, //
        0xE2, 0x80, 0x11, 0x60,
    ];

    fn reader(config: ReaderConfig) -> (Reader, MockHandle) {
        let mock = MockTransport::new();
        let handle = mock.handle();
        (Reader::new(mock, config), handle)
    }

    fn frame(opcode: u16, status: u8, payload: &[u8]) -> Vec<u8> {
        Packet::response(0xFF, opcode, status, payload.to_vec())
            .encode()
            .unwrap()
            .to_vec()
    }

    fn sent(handle: &MockHandle, index: usize) -> Packet {
        Packet::decode(&handle.sent()[index], FrameKind::Command).unwrap()
    }

    #[tokio::test]
    async fn test_get_info() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        let mut payload = vec![0u8; 76];
        payload[..5].copy_from_slice(b"V1.02");
        payload[32..36].copy_from_slice(b"CF59");
        payload[64..76].copy_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0x12, 0x34, 0x56, 0x78]);
        handle.push_bytes(&frame(0x0051, 0x00, &payload));

        let info = reader.get_info().await.unwrap();

        assert_eq!(info.firmware_version, "V1.02");
        assert_eq!(info.hardware_version, "CF59");
        assert_eq!(info.serial_number, "000000000000000012345678");
        assert_eq!(handle.sent()[0], vec![0xCF, 0xFF, 0x00, 0x02, 0x00, 0x51, 0x66, 0x33]);
    }

    #[tokio::test]
    async fn test_rf_power() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0053, 0x00, &[]));
        handle.push_bytes(&frame(0x0054, 0x00, &[26, 0]));

        reader.set_rf_power(RfPower::new(26).unwrap()).await.unwrap();
        let power = reader.rf_power().await.unwrap();

        assert_eq!(power.dbm(), 26);
        let request = sent(&handle, 0);
        assert_eq!(request.opcode, 0x0053);
        assert_eq!(request.payload.as_ref(), &[26, 0]);
    }

    #[tokio::test]
    async fn test_device_error_surfaces_code() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0061, 0x02, &[]));

        let error = reader.temperature().await.unwrap_err();

        assert_eq!(error.code(), ErrorCode::CmdInnerErr);
    }

    #[tokio::test]
    async fn test_read_tag_words() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        let payload = [
            0x00, 0x01, 0x00, 0x00, 0x30, 0x00, 0x02, 0xE2, 0x80, // header + code
            0x02, 0xE2, 0x80, 0x11, 0x60, // two words of TID
        ];
        handle.push_bytes(&frame(0x0003, 0x00, &payload));

        let response = reader
            .read_tag(&ReadTagRequest::new(MemoryBank::Tid, 0, 2))
            .await
            .unwrap();

        assert_eq!(response.words().unwrap().as_ref(), &[0xE2, 0x80, 0x11, 0x60]);
        assert_eq!(sent(&handle, 0).payload.as_ref(), &[0, 0, 0, 0, 0, 0x02, 0, 0, 2]);
    }

    #[tokio::test]
    async fn test_tag_commands_follow_family() {
        let (mut reader, handle) = reader(ReaderConfig::default().with_family(ProtocolFamily::Gb));
        handle.push_bytes(&frame(0x003E, 0x02, &[0x86]));

        let error = reader
            .read_tag(&ReadTagRequest::new(MemoryBank::User, 0, 1))
            .await
            .unwrap_err();

        assert_eq!(sent(&handle, 0).opcode, 0x003E);
        assert!(matches!(error, Error::Device(ErrorCode::GbTagPwdErr)));
    }

    #[tokio::test]
    async fn test_unsupported_in_family_not_sent() {
        let (mut reader, handle) = reader(ReaderConfig::default().with_family(ProtocolFamily::Multi));

        let error = reader
            .read_tag(&ReadTagRequest::new(MemoryBank::User, 0, 1))
            .await
            .unwrap_err();

        assert_eq!(error.code(), ErrorCode::CmdParamErr);
        assert_eq!(handle.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_request_not_sent() {
        let (mut reader, handle) = reader(ReaderConfig::default());

        let error = reader.kill_tag(&KillTagRequest { password: 0u32.into() }).await.unwrap_err();

        assert!(matches!(error, Error::Types(_)));
        assert_eq!(error.code(), ErrorCode::CmdParamErr);
        assert_eq!(handle.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_set_family() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0059, 0x00, &[]));
        handle.push_bytes(&frame(0x0059, 0x00, &[0x01]));

        reader.set_family(ProtocolFamily::Gb).await.unwrap();
        assert_eq!(reader.family(), ProtocolFamily::Gb);
        assert_eq!(sent(&handle, 0).payload.as_ref(), &[0x01, 0x01]);

        assert_eq!(reader.rfid_family().await.unwrap(), ProtocolFamily::Gb);
        assert_eq!(sent(&handle, 1).payload.as_ref(), &[0x02]);
    }

    #[tokio::test]
    async fn test_whitelist_transfer() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x008B, 0x00, &[]));
        handle.push_bytes(&frame(0x008C, 0x00, &[]));
        handle.push_bytes(&frame(0x008D, 0x00, &[0x00, 0x02]));

        reader
            .begin_whitelist(WhitelistBegin { option: WhitelistOption::Update, entries: 2 })
            .await
            .unwrap();
        reader.send_whitelist(&[0xE2; 24]).await.unwrap();
        let stored = reader.end_whitelist().await.unwrap();

        assert_eq!(stored, 2);
        assert_eq!(sent(&handle, 0).payload.as_ref(), &[0x01, 0x00, 0x02]);
        assert_eq!(sent(&handle, 1).payload.len(), 24);
    }

    #[tokio::test]
    async fn test_inventory_cycle() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        handle.push_bytes(&frame(0x0001, 0x00, &REPORT));
        handle.push_bytes(&frame(0x0001, 0x12, &[]));
        handle.push_bytes(&frame(0x0002, 0x00, &[]));

        reader.start_inventory(InventoryRequest::default()).await.unwrap();
        assert_eq!(reader.inventory_state(), InventoryState::Scanning);

        let tag = reader.poll_tag().await.unwrap().into_tag().unwrap();
        assert_eq!(tag.epc_hex(), "E2801160");
        assert_eq!(tag.rssi_dbm(), -20.0);

        assert!(reader.poll_tag().await.unwrap().into_tag().is_none());
        assert_eq!(reader.inventory_state(), InventoryState::Scanning);

        reader.stop_inventory().await.unwrap();
        assert_eq!(reader.inventory_state(), InventoryState::Idle);
    }

    #[tokio::test]
    async fn test_family_locked_during_inventory() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        reader.start_inventory(InventoryRequest::default()).await.unwrap();

        let error = reader.set_family(ProtocolFamily::Gb).await.unwrap_err();

        assert!(matches!(error, Error::InvalidState(_)));
        assert_eq!(reader.family(), ProtocolFamily::Iso);
    }

    #[tokio::test]
    async fn test_read_single_tag() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        handle.push_bytes(&frame(0x0001, 0x00, &REPORT));
        handle.push_bytes(&frame(0x0002, 0x12, &[]));

        let tag = reader.read_single_tag(Duration::from_secs(3)).await.unwrap();

        assert_eq!(tag.unwrap().antenna, 2);
        assert_eq!(handle.sent_count(), 2);
        assert_eq!(sent(&handle, 1).opcode, 0x0002);
        assert_eq!(reader.inventory_state(), InventoryState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_single_tag_times_out() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        let start = Instant::now();

        let tag = reader.read_single_tag(Duration::from_millis(2500)).await.unwrap();

        assert!(tag.is_none());
        assert!(start.elapsed() >= Duration::from_millis(2500));
        assert_eq!(reader.inventory_state(), InventoryState::Idle);
    }

    #[tokio::test]
    async fn test_read_tags_stops_at_max() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        handle.push_bytes(&frame(0x0001, 0x00, &REPORT));
        handle.push_bytes(&frame(0x0001, 0x00, &REPORT));
        handle.push_bytes(&frame(0x0002, 0x00, &[]));

        let tags = reader.read_tags(Some(2), Duration::from_secs(5)).await.unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].sequence, 0);
        assert_eq!(tags[1].sequence, 1);
        assert_eq!(handle.sent_count(), 2);
        assert_eq!(sent(&handle, 1).opcode, 0x0002);
        assert_eq!(reader.inventory_state(), InventoryState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_tags_until_duration() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        handle.push_bytes(&frame(0x0001, 0x00, &REPORT));
        handle.push_bytes(&frame(0x0001, 0x12, &[]));
        let start = Instant::now();

        let tags = reader.read_tags(None, Duration::from_millis(2500)).await.unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].epc_hex(), "E2801160");
        assert!(start.elapsed() >= Duration::from_millis(2500));
        assert_eq!(reader.inventory_state(), InventoryState::Idle);
    }

    #[tokio::test]
    async fn test_execute_raw() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0058, 0x00, &[0x03]));

        let payload = reader.execute_raw(Command::GetAntenna, &[]).await.unwrap();

        assert_eq!(payload.as_ref(), &[0x03]);
    }

    #[tokio::test]
    async fn test_close_stops_inventory() {
        let (mut reader, handle) = reader(ReaderConfig::default());
        handle.push_bytes(&frame(0x0001, 0x00, &[]));
        handle.push_bytes(&frame(0x0002, 0x00, &[]));
        reader.start_inventory(InventoryRequest::default()).await.unwrap();

        reader.close().await.unwrap();

        assert_eq!(sent(&handle, 1).opcode, 0x0002);
        assert!(!reader.is_connected());
    }

    #[tokio::test]
    async fn test_command_timeout_override() {
        let config = ReaderConfig::default().with_command_timeout(Duration::from_millis(10));
        let (mut reader, _handle) = reader(config);

        let error = reader.reboot().await.unwrap_err();

        assert_eq!(error.code(), ErrorCode::CmdCommTimeout);
    }
}
