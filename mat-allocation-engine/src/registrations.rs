//! Plain create/read/update/delete of registration rows, used outside of the
//! allocation workflow (corrections, imports).

use chrono::NaiveDate;
use mat_allocation_database::models::{
    FacilityId, Guest, GuestId, NewRegistration, Registration, RegistrationId,
    RegistrationWithGuest,
};
use mat_allocation_database::Store;
use tracing::{info, instrument};

use crate::error::AllocationError;
use crate::features::Features;
use crate::AllocationEngine;

impl<S: Store> AllocationEngine<S> {
    async fn checked(
        &self,
        mut registration: NewRegistration,
    ) -> Result<NewRegistration, AllocationError> {
        registration.features = match registration.features.as_deref() {
            None => None,
            Some(features) => Features::parse(features)
                .map_err(|err| AllocationError::bad_request(err.to_string()))?
                .into_column(),
        };
        if registration.mat_number < 1 {
            return Err(AllocationError::bad_request(format!(
                "matNumber: Mat number {} must be positive",
                registration.mat_number
            )));
        }
        if let Some(guest_id) = registration.guest_id {
            let guest = self.store.find_guest(guest_id).await?.ok_or_else(|| {
                AllocationError::bad_request(format!("guestId: Missing Guest {guest_id}"))
            })?;
            if guest.facility_id != registration.facility_id {
                return Err(AllocationError::bad_request(format!(
                    "guestId: Guest {guest_id} does not belong to facility {}",
                    registration.facility_id
                )));
            }
        }
        Ok(registration)
    }

    pub async fn registrations(&self) -> Result<Vec<Registration>, AllocationError> {
        Ok(self.store.all_registrations().await?)
    }

    /// The registration with the guest holding it, if any.
    pub async fn find_registration(
        &self,
        id: RegistrationId,
    ) -> Result<RegistrationWithGuest, AllocationError> {
        let registration = self.registration(id).await?;
        let guest = match registration.guest_id {
            Some(guest_id) => self.store.find_guest(guest_id).await?,
            None => None,
        };
        Ok(RegistrationWithGuest {
            registration,
            guest,
        })
    }

    /// Every mat of the day in mat order, with the guest holding it.
    pub async fn registrations_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<Vec<RegistrationWithGuest>, AllocationError> {
        Ok(self
            .store
            .find_registrations_by_facility_and_date(facility_id, registration_date)
            .await?)
    }

    pub async fn registrations_by_guest(
        &self,
        guest_id: GuestId,
    ) -> Result<Vec<Registration>, AllocationError> {
        Ok(self.store.find_registrations_by_guest(guest_id).await?)
    }

    /// Guests of a facility ordered by last and first name.
    pub async fn guests(&self, facility_id: FacilityId) -> Result<Vec<Guest>, AllocationError> {
        Ok(self.store.find_guests_by_facility(facility_id).await?)
    }

    #[instrument(skip(self, registration))]
    pub async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<Registration, AllocationError> {
        let registration = self.checked(registration).await?;
        let registration = self.store.insert_registration(registration).await?;
        info!(registration_id = registration.id, "registration created");
        Ok(registration)
    }

    /// Replaces every field of the row, including its facility, date and mat.
    #[instrument(skip(self, registration))]
    pub async fn update_registration(
        &self,
        id: RegistrationId,
        registration: NewRegistration,
    ) -> Result<Registration, AllocationError> {
        self.registration(id).await?;
        let registration = self.checked(registration).await?;
        let registration = self.store.update_registration(id, registration).await?;
        info!("registration updated");
        Ok(registration)
    }

    #[instrument(skip(self))]
    pub async fn remove_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Registration, AllocationError> {
        let registration = self.store.remove_registration(id).await?;
        info!("registration removed");
        Ok(registration)
    }
}
