#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use mat_allocation_database::models::{
    AssignmentUpdate, Facility, FacilityId, Guest, GuestId, NewFacility, NewGuest,
    NewRegistration, NewTemplate, Registration, RegistrationId, RegistrationWithGuest, Template,
    TemplateId,
};
use mat_allocation_database::{MemoryStore, Store, StoreError};
use mat_allocation_engine::AllocationEngine;
use tokio::task::yield_now;

pub struct Fixture {
    pub engine: AllocationEngine<MemoryStore>,
    pub facility: Facility,
    pub other_facility: Facility,
    pub fred: Guest,
    pub barney: Guest,
    pub stranger: Guest,
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 7, 4).unwrap()
}

pub fn next_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 7, 5).unwrap()
}

async fn facility(store: &MemoryStore, name: &str) -> Facility {
    store
        .insert_facility(NewFacility {
            name: name.to_owned(),
            active: true,
            ..NewFacility::default()
        })
        .await
        .unwrap()
}

async fn guest(store: &MemoryStore, facility: &Facility, first: &str, last: &str) -> Guest {
    store
        .insert_guest(NewGuest {
            facility_id: facility.id,
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            active: true,
            ..NewGuest::default()
        })
        .await
        .unwrap()
}

pub async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let first = facility(&store, "First Facility").await;
    let second = facility(&store, "Second Facility").await;
    let fred = guest(&store, &first, "Fred", "Flintstone").await;
    let barney = guest(&store, &first, "Barney", "Rubble").await;
    let stranger = guest(&store, &second, "Bam Bam", "Rubble").await;
    Fixture {
        engine: AllocationEngine::new(store),
        facility: first,
        other_facility: second,
        fred,
        barney,
        stranger,
    }
}

impl Fixture {
    /// A second engine on the same data whose store gives way to other
    /// tasks between the checks of an operation and its write.
    pub fn yielding_engine(&self) -> AllocationEngine<YieldingStore> {
        AllocationEngine::new(YieldingStore(self.engine.store().clone()))
    }

    pub async fn template(
        &self,
        all_mats: &str,
        handicap_mats: Option<&str>,
        socket_mats: Option<&str>,
        work_mats: Option<&str>,
    ) -> Template {
        self.engine
            .insert_template(NewTemplate {
                facility_id: self.facility.id,
                name: format!("Template {all_mats}"),
                active: true,
                comments: None,
                all_mats: all_mats.to_owned(),
                handicap_mats: handicap_mats.map(str::to_owned),
                socket_mats: socket_mats.map(str::to_owned),
                work_mats: work_mats.map(str::to_owned),
            })
            .await
            .unwrap()
    }
}

/// [`MemoryStore`] that yields before guest lookups and before assignment
/// writes, so operations joined on one task interleave.
pub struct YieldingStore(pub MemoryStore);

#[async_trait]
impl Store for YieldingStore {
    async fn insert_facility(&self, facility: NewFacility) -> Result<Facility, StoreError> {
        self.0.insert_facility(facility).await
    }

    async fn insert_guest(&self, guest: NewGuest) -> Result<Guest, StoreError> {
        self.0.insert_guest(guest).await
    }

    async fn find_guest(&self, id: GuestId) -> Result<Option<Guest>, StoreError> {
        yield_now().await;
        self.0.find_guest(id).await
    }

    async fn find_guests_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Guest>, StoreError> {
        self.0.find_guests_by_facility(facility_id).await
    }

    async fn insert_template(&self, template: NewTemplate) -> Result<Template, StoreError> {
        self.0.insert_template(template).await
    }

    async fn update_template(
        &self,
        id: TemplateId,
        template: NewTemplate,
    ) -> Result<Template, StoreError> {
        self.0.update_template(id, template).await
    }

    async fn find_template(&self, id: TemplateId) -> Result<Option<Template>, StoreError> {
        self.0.find_template(id).await
    }

    async fn find_templates_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Template>, StoreError> {
        self.0.find_templates_by_facility(facility_id).await
    }

    async fn count_templates_named(
        &self,
        facility_id: FacilityId,
        name: &str,
        excluding: Option<TemplateId>,
    ) -> Result<i64, StoreError> {
        self.0.count_templates_named(facility_id, name, excluding).await
    }

    async fn all_registrations(&self) -> Result<Vec<Registration>, StoreError> {
        self.0.all_registrations().await
    }

    async fn find_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Option<Registration>, StoreError> {
        self.0.find_registration(id).await
    }

    async fn find_registrations_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<Vec<RegistrationWithGuest>, StoreError> {
        self.0
            .find_registrations_by_facility_and_date(facility_id, registration_date)
            .await
    }

    async fn find_registrations_by_guest(
        &self,
        guest_id: GuestId,
    ) -> Result<Vec<Registration>, StoreError> {
        self.0.find_registrations_by_guest(guest_id).await
    }

    async fn find_registration_by_guest_and_date(
        &self,
        facility_id: FacilityId,
        guest_id: GuestId,
        registration_date: NaiveDate,
    ) -> Result<Option<Registration>, StoreError> {
        self.0
            .find_registration_by_guest_and_date(facility_id, guest_id, registration_date)
            .await
    }

    async fn count_registrations(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<i64, StoreError> {
        self.0.count_registrations(facility_id, registration_date).await
    }

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        self.0.insert_registration(registration).await
    }

    async fn insert_registrations(
        &self,
        registrations: Vec<NewRegistration>,
    ) -> Result<Vec<Registration>, StoreError> {
        self.0.insert_registrations(registrations).await
    }

    async fn update_registration(
        &self,
        id: RegistrationId,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        self.0.update_registration(id, registration).await
    }

    async fn update_assignments(
        &self,
        updates: Vec<AssignmentUpdate>,
    ) -> Result<Vec<Registration>, StoreError> {
        yield_now().await;
        self.0.update_assignments(updates).await
    }

    async fn remove_registration(&self, id: RegistrationId) -> Result<Registration, StoreError> {
        self.0.remove_registration(id).await
    }
}
