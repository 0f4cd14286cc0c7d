//! Donor service
//!
//! Donors are matched on their exact, trimmed first and last name. Aliases
//! record alternate spellings and are only consulted by explicit alias
//! lookups.

use tracing::{debug, info};

use crate::error::{OffertoryError, OffertoryResult};
use crate::models::{Alias, AliasId, Donor, DonorId, DonorName};
use crate::storage::Storage;

/// Service for donor management
pub struct DonorService<'a> {
    storage: &'a Storage,
}

impl<'a> DonorService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a donor. Refuses an exact duplicate name.
    pub fn create(&self, first_name: &str, last_name: &str) -> OffertoryResult<Donor> {
        let name = DonorName::new(first_name, last_name);
        name.validate().map_err(OffertoryError::Validation)?;

        if self.storage.donors.find_by_name(&name)?.is_some() {
            return Err(OffertoryError::Duplicate {
                entity_type: "Donor",
                identifier: name.to_string(),
            });
        }

        let donor = self.storage.donors.create(&name)?;
        info!(donor = %donor.id, "donor created");
        Ok(donor)
    }

    pub fn get(&self, id: DonorId) -> OffertoryResult<Donor> {
        self.storage
            .donors
            .get(id)?
            .ok_or_else(|| OffertoryError::donor_not_found(id.to_string()))
    }

    pub fn find_by_name(&self, first_name: &str, last_name: &str) -> OffertoryResult<Option<Donor>> {
        self.storage
            .donors
            .find_by_name(&DonorName::new(first_name, last_name))
    }

    /// Return the donor with exactly this name, creating it when absent.
    /// The flag tells whether a donor was created.
    pub fn resolve_or_create(&self, name: &DonorName) -> OffertoryResult<(Donor, bool)> {
        if let Some(donor) = self.storage.donors.find_by_name(name)? {
            return Ok((donor, false));
        }
        name.validate().map_err(OffertoryError::Validation)?;
        let donor = self.storage.donors.create(name)?;
        debug!(donor = %donor.id, "donor created on first encounter");
        Ok((donor, true))
    }

    /// Find by `dnr-` id, `"Last, First"` or `"First Last"` (the last word is
    /// taken as the last name)
    pub fn find(&self, identifier: &str) -> OffertoryResult<Donor> {
        let identifier = identifier.trim();
        if let Some(raw) = identifier.strip_prefix("dnr-") {
            if let Ok(id) = raw.parse::<i64>() {
                if let Some(donor) = self.storage.donors.get(DonorId::new(id))? {
                    return Ok(donor);
                }
            }
        }

        let name = match identifier.split_once(',') {
            Some((last, first)) => Some(DonorName::new(first, last)),
            None => identifier
                .rsplit_once(' ')
                .map(|(first, last)| DonorName::new(first, last)),
        };
        if let Some(name) = name {
            if let Some(donor) = self.storage.donors.find_by_name(&name)? {
                return Ok(donor);
            }
        }
        Err(OffertoryError::donor_not_found(identifier))
    }

    /// All donors sorted by last name, then first name
    pub fn list(&self) -> OffertoryResult<Vec<Donor>> {
        self.storage.donors.list()
    }

    pub fn search(&self, query: &str) -> OffertoryResult<Vec<Donor>> {
        self.storage.donors.search(query)
    }

    /// Rename a donor
    pub fn rename(&self, id: DonorId, first_name: &str, last_name: &str) -> OffertoryResult<Donor> {
        let mut donor = self.get(id)?;
        let name = DonorName::new(first_name, last_name);
        name.validate().map_err(OffertoryError::Validation)?;

        if let Some(existing) = self.storage.donors.find_by_name(&name)? {
            if existing.id != id {
                return Err(OffertoryError::Duplicate {
                    entity_type: "Donor",
                    identifier: name.to_string(),
                });
            }
        }

        donor.first_name = name.first_name;
        donor.last_name = name.last_name;
        self.storage.donors.update(&donor)?;
        Ok(donor)
    }

    /// Include or exclude a donor from yearly statements
    pub fn set_opt_out(&self, id: DonorId, opt_out: bool) -> OffertoryResult<Donor> {
        let mut donor = self.get(id)?;
        donor.opt_out = opt_out;
        self.storage.donors.update(&donor)?;
        Ok(donor)
    }

    /// Delete a donor that has no donations
    pub fn delete(&self, id: DonorId) -> OffertoryResult<Donor> {
        let donor = self.get(id)?;
        let donations = self.storage.donors.donation_count(id)?;
        if donations > 0 {
            return Err(OffertoryError::Validation(format!(
                "Donor '{}' has {} donation(s) and cannot be deleted",
                donor, donations
            )));
        }

        self.storage.donors.delete(id)?;
        info!(donor = %id, "donor deleted");
        Ok(donor)
    }

    /// Record an alternate name for a donor
    pub fn add_alias(
        &self,
        donor_id: DonorId,
        first_name: &str,
        last_name: &str,
    ) -> OffertoryResult<Alias> {
        self.get(donor_id)?;
        let name = DonorName::new(first_name, last_name);
        name.validate().map_err(OffertoryError::Validation)?;

        if let Some(owner) = self.storage.aliases.find_donor(&name)? {
            return Err(OffertoryError::Duplicate {
                entity_type: "Alias",
                identifier: format!("{} (donor {})", name, owner),
            });
        }

        self.storage.aliases.create(donor_id, &name)
    }

    pub fn list_aliases(&self, donor_id: DonorId) -> OffertoryResult<Vec<Alias>> {
        self.get(donor_id)?;
        self.storage.aliases.list_for_donor(donor_id)
    }

    pub fn remove_alias(&self, id: AliasId) -> OffertoryResult<()> {
        if self.storage.aliases.delete(id)? {
            Ok(())
        } else {
            Err(OffertoryError::NotFound {
                entity_type: "Alias",
                identifier: id.to_string(),
            })
        }
    }

    /// Donor owning an alias with exactly this name
    pub fn find_by_alias(&self, first_name: &str, last_name: &str) -> OffertoryResult<Option<Donor>> {
        match self
            .storage
            .aliases
            .find_donor(&DonorName::new(first_name, last_name))?
        {
            Some(donor_id) => self.storage.donors.get(donor_id),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Storage {
        Storage::open_in_memory().unwrap()
    }

    #[test]
    fn test_resolve_or_create_reuses_exact_match() {
        let storage = setup();
        let service = DonorService::new(&storage);

        let (first, created) = service
            .resolve_or_create(&DonorName::new(" John ", "Smith"))
            .unwrap();
        assert!(created);

        let (again, created) = service
            .resolve_or_create(&DonorName::new("John", "Smith"))
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, first.id);

        // Case differs: a different donor
        let (other, created) = service
            .resolve_or_create(&DonorName::new("JOHN", "SMITH"))
            .unwrap();
        assert!(created);
        assert_ne!(other.id, first.id);
    }

    #[test]
    fn test_create_rejects_duplicates_and_empty_last_name() {
        let storage = setup();
        let service = DonorService::new(&storage);

        service.create("Mary", "Jones").unwrap();
        assert!(matches!(
            service.create("Mary", "Jones").unwrap_err(),
            OffertoryError::Duplicate { .. }
        ));
        assert!(service.create("Mary", " ").unwrap_err().is_validation());
    }

    #[test]
    fn test_find_by_identifier() {
        let storage = setup();
        let service = DonorService::new(&storage);
        let donor = service.create("Mary Ann", "Jones").unwrap();

        assert_eq!(service.find("Jones, Mary Ann").unwrap().id, donor.id);
        assert_eq!(service.find("Mary Ann Jones").unwrap().id, donor.id);
        assert_eq!(service.find(&donor.id.to_string()).unwrap().id, donor.id);
        assert!(service.find("Nobody").unwrap_err().is_not_found());
    }

    #[test]
    fn test_aliases() {
        let storage = setup();
        let service = DonorService::new(&storage);
        let robert = service.create("Robert", "Brown").unwrap();

        let alias = service.add_alias(robert.id, "Bob", "Brown").unwrap();
        assert_eq!(
            service.find_by_alias("Bob", "Brown").unwrap().unwrap().id,
            robert.id
        );
        // Aliases are not used for exact name lookup
        assert!(service.find_by_name("Bob", "Brown").unwrap().is_none());
        assert!(service.add_alias(robert.id, "Bob", "Brown").is_err());

        service.remove_alias(alias.id).unwrap();
        assert!(service.list_aliases(robert.id).unwrap().is_empty());
        assert!(service.remove_alias(alias.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_and_opt_out() {
        let storage = setup();
        let service = DonorService::new(&storage);
        let donor = service.create("Ann", "Lee").unwrap();
        service.create("Tom", "Lee").unwrap();

        assert!(service.rename(donor.id, "Tom", "Lee").is_err());
        let renamed = service.rename(donor.id, "Anne", "Lee").unwrap();
        assert_eq!(renamed.first_name, "Anne");

        assert!(service.set_opt_out(donor.id, true).unwrap().opt_out);
        service.delete(donor.id).unwrap();
        assert!(service.get(donor.id).unwrap_err().is_not_found());
    }
}
