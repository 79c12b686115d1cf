//! Client address allocation.
//!
//! Addresses are handed out from the PKI network in ascending order. The
//! first host address is reserved for the server and never issued to a
//! client:
//!
//! ```text
//! 10.0.0.0/24
//!   10.0.0.0      network (not a host)
//!   10.0.0.1      server (reserved)
//!   10.0.0.2..254 clients, lowest free address first
//!   10.0.0.255    broadcast (not a host)
//! ```
//!
//! The scan is linear and stateless: the same issued set always yields the
//! same address, so callers that serialize load-allocate-save per PKI can
//! never hand one address out twice.

use std::collections::HashSet;
use std::net::IpAddr;

use ipnet::IpNet;
use tracing::debug;

use crate::error::{PkiError, Result};

/// Allocator for client addresses within one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressAllocator {
    network: IpNet,
}

impl AddressAllocator {
    /// Creates an allocator for `network`.
    #[must_use]
    pub const fn new(network: IpNet) -> Self {
        Self { network }
    }

    /// Returns the managed network.
    #[must_use]
    pub const fn network(&self) -> IpNet {
        self.network
    }

    /// Returns the host address reserved for the server.
    #[must_use]
    pub fn reserved(&self) -> Option<IpAddr> {
        self.network.hosts().next()
    }

    /// Checks if `address` lies inside the network.
    #[must_use]
    pub fn contains(&self, address: IpAddr) -> bool {
        self.network.contains(&address)
    }

    /// Returns the lowest host address that is neither reserved nor issued.
    ///
    /// # Errors
    ///
    /// Returns [`PkiError::NetworkExhausted`] when no such address exists.
    pub fn allocate(&self, issued: &HashSet<IpAddr>) -> Result<IpAddr> {
        let address = self
            .network
            .hosts()
            .skip(1)
            .find(|candidate| !issued.contains(candidate))
            .ok_or(PkiError::NetworkExhausted(self.network))?;

        debug!(network = %self.network, %address, issued = issued.len(), "allocated address");
        Ok(address)
    }
}

/// Allocates the next free client address in `network`.
///
/// Shorthand for [`AddressAllocator::allocate`].
pub fn allocate(network: IpNet, issued: &HashSet<IpAddr>) -> Result<IpAddr> {
    AddressAllocator::new(network).allocate(issued)
}
