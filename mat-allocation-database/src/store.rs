use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::{
    AssignmentUpdate, Facility, FacilityId, Guest, GuestId, NewFacility, NewGuest,
    NewRegistration, NewTemplate, Registration, RegistrationId, RegistrationWithGuest, Template,
    TemplateId,
};

/// Transactional persistence the allocation engine runs against.
///
/// Every write is one transaction: it either happens completely or fails with
/// nothing persisted. Unique indexes and foreign keys are reported as
/// [`StoreError::Validation`]. Lists come back in the orders of
/// [`crate::order`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_facility(&self, facility: NewFacility) -> Result<Facility, StoreError>;

    async fn insert_guest(&self, guest: NewGuest) -> Result<Guest, StoreError>;

    async fn find_guest(&self, id: GuestId) -> Result<Option<Guest>, StoreError>;

    async fn find_guests_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Guest>, StoreError>;

    async fn insert_template(&self, template: NewTemplate) -> Result<Template, StoreError>;

    async fn update_template(
        &self,
        id: TemplateId,
        template: NewTemplate,
    ) -> Result<Template, StoreError>;

    async fn find_template(&self, id: TemplateId) -> Result<Option<Template>, StoreError>;

    async fn find_templates_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Template>, StoreError>;

    /// Templates of the facility carrying `name`, not counting `excluding`.
    async fn count_templates_named(
        &self,
        facility_id: FacilityId,
        name: &str,
        excluding: Option<TemplateId>,
    ) -> Result<i64, StoreError>;

    async fn all_registrations(&self) -> Result<Vec<Registration>, StoreError>;

    async fn find_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Option<Registration>, StoreError>;

    /// The day sheet of a facility: every mat with the guest holding it.
    async fn find_registrations_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<Vec<RegistrationWithGuest>, StoreError>;

    async fn find_registrations_by_guest(
        &self,
        guest_id: GuestId,
    ) -> Result<Vec<Registration>, StoreError>;

    async fn find_registration_by_guest_and_date(
        &self,
        facility_id: FacilityId,
        guest_id: GuestId,
        registration_date: NaiveDate,
    ) -> Result<Option<Registration>, StoreError>;

    async fn count_registrations(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<i64, StoreError>;

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError>;

    /// Inserts all rows or none of them.
    async fn insert_registrations(
        &self,
        registrations: Vec<NewRegistration>,
    ) -> Result<Vec<Registration>, StoreError>;

    /// Replaces every field except the id.
    async fn update_registration(
        &self,
        id: RegistrationId,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError>;

    /// Rewrites the assignment fields of several rows in one transaction,
    /// in the given order, and returns the updated rows in that order.
    ///
    /// A row whose guest is no longer the expected one fails the whole
    /// transaction with [`StoreError::Validation`].
    async fn update_assignments(
        &self,
        updates: Vec<AssignmentUpdate>,
    ) -> Result<Vec<Registration>, StoreError>;

    async fn remove_registration(&self, id: RegistrationId) -> Result<Registration, StoreError>;
}
