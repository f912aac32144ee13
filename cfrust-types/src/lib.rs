//! Type definitions for cfrust
//!
//! Strongly typed views of command and response payloads.

pub mod device_info;
pub mod error;
pub mod params;
pub mod tag;

pub use device_info::DeviceInfo;
pub use error::{Error, Result};
pub use params::{
    AntennaMask, FrequencyPlan, Region, RelayAction, RelayCommand, RfPower, RfidType, Temperature,
    WhitelistBegin, WhitelistOption,
};
pub use tag::{
    InventoryRequest, KillTagRequest, LockAction, LockArea, LockTagRequest, MemoryBank, Password,
    ReadTagRequest, SelectMask, TagReport, TagResponse, WriteTagRequest,
};
