use std::sync::Arc;
use vault_manager_core::error::ManagerError;
use vault_manager_core::traits::VaultVenue;

/// Insertion-ordered set of approved venues, each carrying its vault handle.
#[derive(Default)]
pub struct VenueWhitelist {
    venues: Vec<VenueEntry>,
}

struct VenueEntry {
    address: String,
    vault: Arc<dyn VaultVenue>,
}

impl VenueWhitelist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Approves a venue, or refreshes its handle if already approved.
    /// Insertion order is preserved either way.
    pub fn approve(&mut self, address: &str, vault: Arc<dyn VaultVenue>) {
        if let Some(entry) = self.venues.iter_mut().find(|e| e.address == address) {
            entry.vault = vault;
        } else {
            self.venues.push(VenueEntry {
                address: address.to_string(),
                vault,
            });
        }
    }

    /// Removes a venue. The currently active venue cannot be removed.
    ///
    /// # Errors
    /// `State` when removing the active venue, `Policy` when the venue was
    /// never approved.
    pub fn remove(&mut self, address: &str, active: Option<&str>) -> Result<(), ManagerError> {
        if active == Some(address) {
            return Err(ManagerError::RemoveActiveVenue(address.to_string()));
        }
        let before = self.venues.len();
        self.venues.retain(|e| e.address != address);
        if self.venues.len() == before {
            return Err(ManagerError::VenueNotApproved(address.to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, address: &str) -> Option<Arc<dyn VaultVenue>> {
        self.venues
            .iter()
            .find(|e| e.address == address)
            .map(|e| e.vault.clone())
    }

    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.venues.iter().any(|e| e.address == address)
    }

    /// Approved venue addresses in insertion order.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        self.venues.iter().map(|e| e.address.clone()).collect()
    }
}
