pub mod session;
pub mod memory;
pub mod ssh;
pub mod byte_source;
pub mod guard;
pub mod connection;
pub mod device;
pub mod screens;

pub use session::*;
pub use memory::{MemorySession, SessionEvent};
pub use ssh::OpenSshSession;
pub use byte_source::*;
pub use guard::*;
pub use connection::{SessionGuard, TabletConnection};
pub use device::{BatteryInfo, DeviceInfo};
pub use screens::{RM_SCREEN_DIR, SCREEN_NAMES};
