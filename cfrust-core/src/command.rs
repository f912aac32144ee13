//! Command registry
//!
//! Opcodes are only meaningful together with a scope. Device management
//! commands are family independent, but tag commands reuse the same small
//! numbers in every air-interface family: `0x0051` is `GET_INFO` for the
//! device and `ISO_SET_RF_PRM` for the ISO command set, `0x0012` starts an
//! inventory in multi-protocol mode and sets query parameters in ISO mode.
//! The active [`ProtocolFamily`] therefore travels with every lookup.

use std::fmt;
use std::time::Duration;

use crate::constants::timeouts;
use crate::error::{Error, Result};
use crate::packet::Packet;
use crate::status::TagFamily;

/// Air-interface command set the reader is operating in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ProtocolFamily {
    /// GB/T 29768
    Gb,
    /// ISO 18000-6C / EPC Gen2
    #[default]
    Iso,
    /// Multi-protocol firmware
    Multi,
}

impl ProtocolFamily {
    /// Status vocabulary used for tag-level results
    ///
    /// Multi-protocol firmware reports tag errors with the ISO vocabulary.
    pub fn tag_family(self) -> TagFamily {
        match self {
            Self::Gb => TagFamily::Gb,
            Self::Iso | Self::Multi => TagFamily::Iso,
        }
    }

    /// Value used by the RFID type command
    pub fn to_wire(self) -> u8 {
        match self {
            Self::Iso => 0x00,
            Self::Gb => 0x01,
            Self::Multi => 0x02,
        }
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Iso),
            0x01 => Some(Self::Gb),
            0x02 => Some(Self::Multi),
            _ => None,
        }
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gb => "GB",
            Self::Iso => "ISO",
            Self::Multi => "multi-protocol",
        };
        f.write_str(name)
    }
}

/// Namespace an opcode is looked up in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Device,
    Tag(ProtocolFamily),
    /// Firmware update; classification only
    Iap,
}

impl Scope {
    pub fn is_tag(self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::Tag(family) => write!(f, "{} tag", family),
            Self::Iap => f.write_str("IAP"),
        }
    }
}

/// Command direction
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Set,
    Get,
    Action,
}

/// Expected response payload size
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    Empty,
    Fixed(usize),
    AtLeast(usize),
    Variable { min: usize, max: usize },
}

impl ResponseShape {
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Self::Empty => len == 0,
            Self::Fixed(n) => len == n,
            Self::AtLeast(n) => len >= n,
            Self::Variable { min, max } => (min..=max).contains(&len),
        }
    }
}

/// Coarse opcode classification by numeric range
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpcodeClass {
    DeviceManagement,
    TagProtocol,
    Iap,
    TestDebug,
    Unassigned,
}

impl OpcodeClass {
    pub fn of(opcode: u16) -> Self {
        match opcode {
            0x1000..=0x1007 => Self::Iap,
            0x00D0..=0x00FA => Self::TestDebug,
            0x0050..=0x00FF => Self::DeviceManagement,
            0x0001..=0x004F => Self::TagProtocol,
            _ => Self::Unassigned,
        }
    }
}

/// Logical operations
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // Device management
    ReaderInit,
    GetInfo,
    Reboot,
    SetRfPower,
    GetRfPower,
    SetFrequency,
    GetFrequency,
    SetAntenna,
    GetAntenna,
    RfidType,
    SetTemperature,
    GetTemperature,
    Relay,
    BeginWhitelist,
    Whitelist,
    EndWhitelist,

    // Tag protocol
    InventoryContinue,
    InventoryStop,
    ReadTag,
    WriteTag,
    EraseTag,
    LockTag,
    KillTag,
    SetSelectMask,
    SetCoilParam,
    GetCoilParam,
    SetRfParam,
    GetRfParam,
    SetSortParam,
    GetSortParam,
    SetQueryParam,
    GetQueryParam,
    SaveSettings,
    RestoreDefaults,

    // Firmware update
    JumpToBooter,
    IapInit,
    IapEraseUser,
    IapWriteUser,
    IapCheckCrc,
    IapDownloadVerify,
    IapJumpToUser,
    IapChipEnable,
}

impl Command {
    /// Scope this command resolves in for the given family
    pub fn scope(self, family: ProtocolFamily) -> Scope {
        use Command::*;

        match self {
            ReaderInit | GetInfo | Reboot | SetRfPower | GetRfPower | SetFrequency
            | GetFrequency | SetAntenna | GetAntenna | RfidType | SetTemperature
            | GetTemperature | Relay | BeginWhitelist | Whitelist | EndWhitelist => Scope::Device,

            JumpToBooter | IapInit | IapEraseUser | IapWriteUser | IapCheckCrc
            | IapDownloadVerify | IapJumpToUser | IapChipEnable => Scope::Iap,

            _ => Scope::Tag(family),
        }
    }

    /// Resolve to a descriptor in the active family
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] if the family has no opcode for this command.
    pub fn descriptor(self, family: ProtocolFamily) -> Result<&'static CommandDescriptor> {
        table(self.scope(family))
            .iter()
            .find(|d| d.command == self)
            .ok_or(Error::Unsupported {
                command: self,
                family,
            })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Static description of one opcode in one scope
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub command: Command,
    /// Vendor name of the opcode
    pub name: &'static str,
    pub opcode: u16,
    pub scope: Scope,
    pub direction: Direction,
    pub response: ResponseShape,
    /// Largest request payload the command's fields allow
    pub max_request: usize,
    pub timeout: Duration,
    /// Error responses may carry a tag status in the payload
    pub carries_tag_data: bool,
}

impl CommandDescriptor {
    /// Default cap for variable-size request fields
    pub const DEFAULT_MAX_REQUEST: usize = 255;

    const fn new(
        command: Command,
        name: &'static str,
        opcode: u16,
        scope: Scope,
        direction: Direction,
        response: ResponseShape,
    ) -> Self {
        Self {
            command,
            name,
            opcode,
            scope,
            direction,
            response,
            max_request: Self::DEFAULT_MAX_REQUEST,
            timeout: Duration::from_millis(timeouts::COMMON_TIMEOUT),
            carries_tag_data: false,
        }
    }

    const fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Duration::from_millis(ms);
        self
    }

    const fn max_request(mut self, max: usize) -> Self {
        self.max_request = max;
        self
    }

    const fn tag_data(mut self) -> Self {
        self.carries_tag_data = true;
        self
    }

    /// Whether the command may be sent to a reader
    pub fn is_executable(&self) -> bool {
        self.scope != Scope::Iap
    }
}

impl fmt::Display for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.name, self.opcode)
    }
}

/// Look an opcode up in a scope
///
/// # Errors
///
/// [`Error::UnknownOpcode`] if the scope does not define it.
pub fn describe(opcode: u16, scope: Scope) -> Result<&'static CommandDescriptor> {
    table(scope)
        .iter()
        .find(|d| d.opcode == opcode)
        .ok_or(Error::UnknownOpcode { opcode, scope })
}

/// Descriptor table of a scope
pub fn table(scope: Scope) -> &'static [CommandDescriptor] {
    match scope {
        Scope::Device => DEVICE_COMMANDS,
        Scope::Tag(ProtocolFamily::Iso) => ISO_COMMANDS,
        Scope::Tag(ProtocolFamily::Gb) => GB_COMMANDS,
        Scope::Tag(ProtocolFamily::Multi) => MULTI_COMMANDS,
        Scope::Iap => IAP_COMMANDS,
    }
}

use Direction::{Action, Get, Set};
use ResponseShape::{AtLeast, Empty, Fixed, Variable};

/// `RSSI(2) | ANT | CH | CRC(2) | PC(2) | LEN` header of a streamed tag report
pub const TAG_REPORT_HEADER: usize = 9;

/// `STATUS | ANT | CRC(2) | PC(2) | LEN` header of a tag operation response
pub const TAG_RESPONSE_HEADER: usize = 7;

/// Firmware version, hardware version, serial number
pub const DEVICE_INFO_SIZE: usize = 32 + 32 + 12;

const INVENTORY_RESPONSE: ResponseShape = Variable {
    min: 0,
    max: TAG_REPORT_HEADER + 255,
};
const PARAM_RESPONSE: ResponseShape = Variable { min: 1, max: 255 };

const DEV: Scope = Scope::Device;
const ISO: Scope = Scope::Tag(ProtocolFamily::Iso);
const GB: Scope = Scope::Tag(ProtocolFamily::Gb);
const MULTI: Scope = Scope::Tag(ProtocolFamily::Multi);
const IAP: Scope = Scope::Iap;

static DEVICE_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(Command::ReaderInit, "READER_INIT", 0x0050, DEV, Action, Empty),
    CommandDescriptor::new(Command::GetInfo, "GET_INFO", 0x0051, DEV, Get, AtLeast(DEVICE_INFO_SIZE)),
    CommandDescriptor::new(Command::Reboot, "REBOOT", 0x0052, DEV, Action, Empty),
    CommandDescriptor::new(Command::SetRfPower, "SET_PWR", 0x0053, DEV, Set, Empty),
    CommandDescriptor::new(Command::GetRfPower, "GET_PWR", 0x0054, DEV, Get, Fixed(2)),
    CommandDescriptor::new(Command::SetFrequency, "SET_FRE", 0x0055, DEV, Set, Empty),
    CommandDescriptor::new(Command::GetFrequency, "GET_FRE", 0x0056, DEV, Get, Fixed(8)),
    CommandDescriptor::new(Command::SetAntenna, "SET_ANTENNA", 0x0057, DEV, Set, Empty),
    CommandDescriptor::new(Command::GetAntenna, "GET_ANTENNA", 0x0058, DEV, Get, Fixed(1)),
    CommandDescriptor::new(
        Command::RfidType,
        "SET_GET_RFID_TYPE",
        0x0059,
        DEV,
        Get,
        Variable { min: 0, max: 1 },
    ),
    CommandDescriptor::new(Command::SetTemperature, "TEMPERATURE_SET", 0x0060, DEV, Set, Empty),
    CommandDescriptor::new(Command::GetTemperature, "TEMPERATURE_GET", 0x0061, DEV, Get, Fixed(2)),
    CommandDescriptor::new(Command::Relay, "RELEASE_CLOSE_RELAY", 0x0077, DEV, Action, Empty),
    CommandDescriptor::new(Command::BeginWhitelist, "BEGIN_WHITELIST", 0x008B, DEV, Action, Empty),
    CommandDescriptor::new(Command::Whitelist, "GET_SET_WHITELIST", 0x008C, DEV, Set, Empty)
        .max_request(Packet::MAX_PAYLOAD_SIZE)
        .timeout_ms(timeouts::TIMEOUT_5000),
    CommandDescriptor::new(Command::EndWhitelist, "END_WHITELIST", 0x008D, DEV, Get, Fixed(2)),
];

static ISO_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(
        Command::InventoryContinue,
        "ISO_INVENTORY_CONTINUE",
        0x0001,
        ISO,
        Action,
        INVENTORY_RESPONSE,
    ),
    CommandDescriptor::new(Command::InventoryStop, "ISO_INVENTORY_STOP", 0x0002, ISO, Action, Empty)
        .timeout_ms(timeouts::TIMEOUT_5000),
    CommandDescriptor::new(Command::ReadTag, "ISO_READ_TAG", 0x0003, ISO, Get, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::WriteTag, "ISO_WRITE_TAG", 0x0004, ISO, Set, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::LockTag, "ISO_LOCK_TAG", 0x0005, ISO, Set, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::KillTag, "ISO_KILL_TAG", 0x0006, ISO, Action, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::SetSelectMask, "ISO_SET_SELECTMASK", 0x0007, ISO, Set, Empty),
    CommandDescriptor::new(Command::SetCoilParam, "ISO_SET_COIL_PARAM", 0x0008, ISO, Set, Empty),
    CommandDescriptor::new(Command::GetCoilParam, "ISO_GET_COIL_PARAM", 0x0009, ISO, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SetRfParam, "ISO_SET_RF_PRM", 0x0051, ISO, Set, Empty),
    CommandDescriptor::new(Command::GetRfParam, "ISO_GET_RF_PRM", 0x0052, ISO, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SetQueryParam, "ISO_SET_QUERY_PARAM", 0x0055, ISO, Set, Empty),
    CommandDescriptor::new(Command::GetQueryParam, "ISO_GET_QUERY_PARAM", 0x0056, ISO, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SaveSettings, "ISO_SAVE_SETTING", 0x005B, ISO, Action, Empty),
];

static GB_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(Command::SetRfParam, "GB_SET_RF_PRM", 0x0031, GB, Set, Empty),
    CommandDescriptor::new(Command::GetRfParam, "GB_GET_RF_PRM", 0x0032, GB, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SetSortParam, "GB_SET_SORT_PARAM", 0x0033, GB, Set, Empty),
    CommandDescriptor::new(Command::GetSortParam, "GB_GET_SORT_PARAM", 0x0034, GB, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SetQueryParam, "GB_SET_QUERY_PARAM", 0x0035, GB, Set, Empty),
    CommandDescriptor::new(Command::GetQueryParam, "GB_GET_QUERY_PARAM", 0x0036, GB, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SetCoilParam, "GB_SET_COIL_PARAM", 0x0037, GB, Set, Empty),
    CommandDescriptor::new(Command::GetCoilParam, "GB_GET_COIL_PARAM", 0x0038, GB, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SaveSettings, "GB_SAVE_SETTING", 0x003B, GB, Action, Empty),
    CommandDescriptor::new(
        Command::InventoryContinue,
        "GB_INVENTORY_CONTINUE",
        0x003C,
        GB,
        Action,
        INVENTORY_RESPONSE,
    ),
    CommandDescriptor::new(Command::InventoryStop, "GB_INVENTORY_STOP", 0x003D, GB, Action, Empty)
        .timeout_ms(timeouts::TIMEOUT_5000),
    CommandDescriptor::new(Command::ReadTag, "GB_READ_TAG", 0x003E, GB, Get, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::WriteTag, "GB_WRITE_TAG", 0x003F, GB, Set, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::EraseTag, "GB_ERASE_TAG", 0x0040, GB, Set, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::LockTag, "GB_LOCK_TAG", 0x0041, GB, Set, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
    CommandDescriptor::new(Command::KillTag, "GB_KILL_TAG", 0x0042, GB, Action, AtLeast(TAG_RESPONSE_HEADER))
        .tag_data(),
];

static MULTI_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(Command::SetSortParam, "SET_SORT_PARAM", 0x0008, MULTI, Set, Empty),
    CommandDescriptor::new(Command::GetSortParam, "GET_SORT_PARAM", 0x0009, MULTI, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SetQueryParam, "SET_QUERY_PARAM", 0x000A, MULTI, Set, Empty),
    CommandDescriptor::new(Command::GetQueryParam, "GET_QUERY_PARAM", 0x000B, MULTI, Get, PARAM_RESPONSE),
    CommandDescriptor::new(Command::SaveSettings, "SAVE_PARAMS", 0x000E, MULTI, Action, Empty),
    CommandDescriptor::new(Command::RestoreDefaults, "RESTORE_DEFAULT_PARAM", 0x000F, MULTI, Action, Empty),
    CommandDescriptor::new(
        Command::InventoryContinue,
        "INVENTORY_CONTINUE",
        0x0012,
        MULTI,
        Action,
        INVENTORY_RESPONSE,
    ),
    CommandDescriptor::new(Command::InventoryStop, "INVENTORY_STOP", 0x0013, MULTI, Action, Empty)
        .timeout_ms(timeouts::TIMEOUT_5000),
];

static IAP_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(Command::JumpToBooter, "JUMP2_BOOTER", 0x1000, IAP, Action, Empty),
    CommandDescriptor::new(Command::IapInit, "IAP_INIT", 0x1001, IAP, Action, Empty),
    CommandDescriptor::new(Command::IapEraseUser, "IAP_ERASE_USER", 0x1002, IAP, Action, Empty),
    CommandDescriptor::new(Command::IapWriteUser, "IAP_WRITE_USER", 0x1003, IAP, Set, Empty),
    CommandDescriptor::new(Command::IapCheckCrc, "IAP_CHECK_CRC", 0x1004, IAP, Get, Empty),
    CommandDescriptor::new(Command::IapDownloadVerify, "IAP_DOWNLOAD_VERIFY", 0x1005, IAP, Get, Empty),
    CommandDescriptor::new(Command::IapJumpToUser, "IAP_JUMP2USER", 0x1006, IAP, Action, Empty),
    CommandDescriptor::new(Command::IapChipEnable, "IAP_CHIP_ENBABLE", 0x1007, IAP, Action, Empty),
];
