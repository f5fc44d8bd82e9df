//! Network reachability signal consulted by callers before issuing calls.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkAccess {
    Unknown,
    None,
    Local,
    ConstrainedInternet,
    Internet,
}

impl NetworkAccess {
    fn to_u8(self) -> u8 {
        match self {
            NetworkAccess::Unknown => 0,
            NetworkAccess::None => 1,
            NetworkAccess::Local => 2,
            NetworkAccess::ConstrainedInternet => 3,
            NetworkAccess::Internet => 4,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => NetworkAccess::None,
            2 => NetworkAccess::Local,
            3 => NetworkAccess::ConstrainedInternet,
            4 => NetworkAccess::Internet,
            _ => NetworkAccess::Unknown,
        }
    }
}

pub trait Connectivity: Send + Sync {
    fn network_access(&self) -> NetworkAccess;

    /// Only full internet access counts as connected.
    fn is_connected(&self) -> bool {
        self.network_access() == NetworkAccess::Internet
    }
}

/// A connectivity signal set by the host platform.
#[derive(Debug)]
pub struct StaticConnectivity {
    access: AtomicU8,
}

impl StaticConnectivity {
    pub fn new(access: NetworkAccess) -> Self {
        Self {
            access: AtomicU8::new(access.to_u8()),
        }
    }

    pub fn online() -> Self {
        Self::new(NetworkAccess::Internet)
    }

    pub fn set(&self, access: NetworkAccess) {
        self.access.store(access.to_u8(), Ordering::Release);
    }
}

impl Default for StaticConnectivity {
    fn default() -> Self {
        Self::new(NetworkAccess::Unknown)
    }
}

impl Connectivity for StaticConnectivity {
    fn network_access(&self) -> NetworkAccess {
        NetworkAccess::from_u8(self.access.load(Ordering::Acquire))
    }
}
