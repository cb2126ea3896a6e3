//! Process-local store for tests and development.
//!
//! Enforces the same unique indexes and foreign keys as the SQL schema. A
//! write runs against a staged copy of all tables which replaces the
//! published tables only when every statement succeeded.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::StoreError;
use crate::models::{
    AssignmentUpdate, Facility, FacilityId, Guest, GuestId, NewFacility, NewGuest,
    NewRegistration, NewTemplate, Registration, RegistrationId, RegistrationWithGuest, Template,
    TemplateId,
};
use crate::order;
use crate::store::Store;

#[derive(Clone, Default)]
struct Tables {
    facilities: BTreeMap<FacilityId, Facility>,
    guests: BTreeMap<GuestId, Guest>,
    templates: BTreeMap<TemplateId, Template>,
    registrations: BTreeMap<RegistrationId, Registration>,
    sequence: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.sequence += 1;
        self.sequence
    }

    fn require_facility(&self, facility_id: FacilityId) -> Result<(), StoreError> {
        if self.facilities.contains_key(&facility_id) {
            Ok(())
        } else {
            Err(StoreError::Validation(format!(
                "facilityId: Missing Facility {facility_id}"
            )))
        }
    }

    fn check_facility(&self, facility: &Facility) -> Result<(), StoreError> {
        if self
            .facilities
            .values()
            .any(|other| other.id != facility.id && other.name == facility.name)
        {
            return Err(StoreError::Validation(format!(
                "name: Name '{}' is already in use",
                facility.name
            )));
        }
        Ok(())
    }

    fn check_guest(&self, guest: &Guest) -> Result<(), StoreError> {
        self.require_facility(guest.facility_id)?;
        if self.guests.values().any(|other| {
            other.id != guest.id
                && other.facility_id == guest.facility_id
                && other.first_name == guest.first_name
                && other.last_name == guest.last_name
        }) {
            return Err(StoreError::Validation(format!(
                "name: Name '{} {}' is already in use within this facility",
                guest.first_name, guest.last_name
            )));
        }
        Ok(())
    }

    fn check_template(&self, template: &Template) -> Result<(), StoreError> {
        self.require_facility(template.facility_id)?;
        if self.templates.values().any(|other| {
            other.id != template.id
                && other.facility_id == template.facility_id
                && other.name == template.name
        }) {
            return Err(StoreError::Validation(format!(
                "name: Name '{}' is already in use within this facility",
                template.name
            )));
        }
        Ok(())
    }

    fn check_registration(&self, registration: &Registration) -> Result<(), StoreError> {
        self.require_facility(registration.facility_id)?;
        if registration.mat_number < 1 {
            return Err(StoreError::Validation(format!(
                "matNumber: Mat number {} must be positive",
                registration.mat_number
            )));
        }
        if let Some(guest_id) = registration.guest_id {
            if !self.guests.contains_key(&guest_id) {
                return Err(StoreError::Validation(format!(
                    "guestId: Missing Guest {guest_id}"
                )));
            }
        }
        for other in self.registrations.values() {
            if other.id == registration.id
                || other.facility_id != registration.facility_id
                || other.registration_date != registration.registration_date
            {
                continue;
            }
            if other.mat_number == registration.mat_number {
                return Err(StoreError::Validation(format!(
                    "matNumber: Mat number {} already in use on registration date {} within \
                     this facility",
                    registration.mat_number, registration.registration_date
                )));
            }
            if registration.guest_id.is_some() && other.guest_id == registration.guest_id {
                return Err(StoreError::Validation(format!(
                    "guestId: Guest {} is already assigned to mat {} on registration date {} \
                     within this facility",
                    other.guest_id.unwrap_or_default(),
                    other.mat_number,
                    registration.registration_date
                )));
            }
        }
        Ok(())
    }

    fn insert_registration(
        &mut self,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        let id = self.next_id();
        let registration = registration.into_registration(id);
        self.check_registration(&registration)?;
        self.registrations.insert(id, registration.clone());
        Ok(registration)
    }

    fn registration_mut(&mut self, id: RegistrationId) -> Result<&mut Registration, StoreError> {
        self.registrations
            .get_mut(&id)
            .ok_or_else(|| StoreError::missing_registration(id))
    }

    fn replace_registration(
        &mut self,
        registration: Registration,
    ) -> Result<Registration, StoreError> {
        self.check_registration(&registration)?;
        *self.registration_mut(registration.id)? = registration.clone();
        Ok(registration)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registration rows, regardless of facility and date.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.tables.read().registrations.len()
    }

    fn read<T>(&self, query: impl FnOnce(&Tables) -> T) -> T {
        query(&self.tables.read())
    }

    fn transaction<T>(
        &self,
        statements: impl FnOnce(&mut Tables) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut tables = self.tables.write();
        let mut staged = tables.clone();
        let result = statements(&mut staged);
        match result {
            Ok(value) => {
                *tables = staged;
                Ok(value)
            }
            Err(err) => {
                trace!("rolling back: {err}");
                Err(err)
            }
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_facility(&self, facility: NewFacility) -> Result<Facility, StoreError> {
        self.transaction(|tables| {
            let facility = Facility {
                id: tables.next_id(),
                name: facility.name,
                active: facility.active,
                address1: facility.address1,
                address2: facility.address2,
                city: facility.city,
                state: facility.state,
                zip_code: facility.zip_code,
                email: facility.email,
                phone: facility.phone,
            };
            tables.check_facility(&facility)?;
            tables.facilities.insert(facility.id, facility.clone());
            Ok(facility)
        })
    }

    async fn insert_guest(&self, guest: NewGuest) -> Result<Guest, StoreError> {
        self.transaction(|tables| {
            let guest = Guest {
                id: tables.next_id(),
                facility_id: guest.facility_id,
                first_name: guest.first_name,
                last_name: guest.last_name,
                active: guest.active,
                comments: guest.comments,
                favorite: guest.favorite,
            };
            tables.check_guest(&guest)?;
            tables.guests.insert(guest.id, guest.clone());
            Ok(guest)
        })
    }

    async fn find_guest(&self, id: GuestId) -> Result<Option<Guest>, StoreError> {
        Ok(self.read(|tables| tables.guests.get(&id).cloned()))
    }

    async fn find_guests_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Guest>, StoreError> {
        let mut guests: Vec<Guest> = self.read(|tables| {
            tables
                .guests
                .values()
                .filter(|guest| guest.facility_id == facility_id)
                .cloned()
                .collect()
        });
        order::guests(&mut guests);
        Ok(guests)
    }

    async fn insert_template(&self, template: NewTemplate) -> Result<Template, StoreError> {
        self.transaction(|tables| {
            let id = tables.next_id();
            let template = template_row(id, template);
            tables.check_template(&template)?;
            tables.templates.insert(id, template.clone());
            Ok(template)
        })
    }

    async fn update_template(
        &self,
        id: TemplateId,
        template: NewTemplate,
    ) -> Result<Template, StoreError> {
        self.transaction(|tables| {
            if !tables.templates.contains_key(&id) {
                return Err(StoreError::NotFound(format!("id: Missing Template {id}")));
            }
            let template = template_row(id, template);
            tables.check_template(&template)?;
            tables.templates.insert(id, template.clone());
            Ok(template)
        })
    }

    async fn find_template(&self, id: TemplateId) -> Result<Option<Template>, StoreError> {
        Ok(self.read(|tables| tables.templates.get(&id).cloned()))
    }

    async fn find_templates_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Template>, StoreError> {
        let mut templates: Vec<Template> = self.read(|tables| {
            tables
                .templates
                .values()
                .filter(|template| template.facility_id == facility_id)
                .cloned()
                .collect()
        });
        order::templates(&mut templates);
        Ok(templates)
    }

    async fn count_templates_named(
        &self,
        facility_id: FacilityId,
        name: &str,
        excluding: Option<TemplateId>,
    ) -> Result<i64, StoreError> {
        let count = self.read(|tables| {
            tables
                .templates
                .values()
                .filter(|template| {
                    template.facility_id == facility_id
                        && template.name == name
                        && Some(template.id) != excluding
                })
                .count()
        });
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn all_registrations(&self) -> Result<Vec<Registration>, StoreError> {
        let mut registrations: Vec<Registration> =
            self.read(|tables| tables.registrations.values().cloned().collect());
        order::registrations(&mut registrations);
        Ok(registrations)
    }

    async fn find_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Option<Registration>, StoreError> {
        Ok(self.read(|tables| tables.registrations.get(&id).cloned()))
    }

    async fn find_registrations_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<Vec<RegistrationWithGuest>, StoreError> {
        Ok(self.read(|tables| {
            let mut registrations: Vec<Registration> = tables
                .registrations
                .values()
                .filter(|registration| {
                    registration.facility_id == facility_id
                        && registration.registration_date == registration_date
                })
                .cloned()
                .collect();
            order::registrations(&mut registrations);
            registrations
                .into_iter()
                .map(|registration| RegistrationWithGuest {
                    guest: registration
                        .guest_id
                        .and_then(|guest_id| tables.guests.get(&guest_id).cloned()),
                    registration,
                })
                .collect()
        }))
    }

    async fn find_registrations_by_guest(
        &self,
        guest_id: GuestId,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut registrations: Vec<Registration> = self.read(|tables| {
            tables
                .registrations
                .values()
                .filter(|registration| registration.guest_id == Some(guest_id))
                .cloned()
                .collect()
        });
        order::registrations(&mut registrations);
        Ok(registrations)
    }

    async fn find_registration_by_guest_and_date(
        &self,
        facility_id: FacilityId,
        guest_id: GuestId,
        registration_date: NaiveDate,
    ) -> Result<Option<Registration>, StoreError> {
        Ok(self.read(|tables| {
            tables
                .registrations
                .values()
                .find(|registration| {
                    registration.facility_id == facility_id
                        && registration.guest_id == Some(guest_id)
                        && registration.registration_date == registration_date
                })
                .cloned()
        }))
    }

    async fn count_registrations(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<i64, StoreError> {
        let count = self.read(|tables| {
            tables
                .registrations
                .values()
                .filter(|registration| {
                    registration.facility_id == facility_id
                        && registration.registration_date == registration_date
                })
                .count()
        });
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        self.transaction(|tables| tables.insert_registration(registration))
    }

    async fn insert_registrations(
        &self,
        registrations: Vec<NewRegistration>,
    ) -> Result<Vec<Registration>, StoreError> {
        self.transaction(|tables| {
            registrations
                .into_iter()
                .map(|registration| tables.insert_registration(registration))
                .collect()
        })
    }

    async fn update_registration(
        &self,
        id: RegistrationId,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        self.transaction(|tables| {
            tables.registration_mut(id)?;
            tables.replace_registration(registration.into_registration(id))
        })
    }

    async fn update_assignments(
        &self,
        updates: Vec<AssignmentUpdate>,
    ) -> Result<Vec<Registration>, StoreError> {
        self.transaction(|tables| {
            updates
                .into_iter()
                .map(|update| {
                    let mut registration = tables.registration_mut(update.id)?.clone();
                    if registration.guest_id != update.expected_guest_id {
                        return Err(StoreError::stale_assignment(
                            update.id,
                            registration.guest_id,
                        ));
                    }
                    registration.apply(update.assignment);
                    tables.replace_registration(registration)
                })
                .collect()
        })
    }

    async fn remove_registration(&self, id: RegistrationId) -> Result<Registration, StoreError> {
        self.transaction(|tables| {
            tables
                .registrations
                .remove(&id)
                .ok_or_else(|| StoreError::missing_registration(id))
        })
    }
}

fn template_row(id: TemplateId, template: NewTemplate) -> Template {
    Template {
        id,
        facility_id: template.facility_id,
        name: template.name,
        active: template.active,
        comments: template.comments,
        all_mats: template.all_mats,
        handicap_mats: template.handicap_mats,
        socket_mats: template.socket_mats,
        work_mats: template.work_mats,
    }
}
