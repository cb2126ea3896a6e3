use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use mat_allocation_database::models::{
    Assignment, AssignmentUpdate, GuestId, NewRegistration, Registration, RegistrationId,
    TemplateId,
};
use mat_allocation_database::Store;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::AllocationError;
use crate::template::TemplateMats;

/// Payload of [`AllocationEngine::assign`]. Every optional field that is left
/// out is cleared on the registration.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GuestAssignment {
    pub guest_id: GuestId,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub payment_amount: Option<BigDecimal>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub shower_time: Option<NaiveTime>,
    #[serde(default)]
    pub wakeup_time: Option<NaiveTime>,
}

impl GuestAssignment {
    #[must_use]
    pub const fn new(guest_id: GuestId) -> Self {
        Self {
            guest_id,
            comments: None,
            payment_amount: None,
            payment_type: None,
            shower_time: None,
            wakeup_time: None,
        }
    }
}

impl From<GuestAssignment> for Assignment {
    fn from(value: GuestAssignment) -> Self {
        Self {
            guest_id: Some(value.guest_id),
            comments: value.comments,
            payment_amount: value.payment_amount,
            payment_type: value.payment_type,
            shower_time: value.shower_time,
            wakeup_time: value.wakeup_time,
        }
    }
}

/// Daily mat allocation on top of a [`Store`].
///
/// Holds no state besides the store handle. Each operation checks its
/// preconditions against the persisted rows and then issues exactly one
/// transactional write.
pub struct AllocationEngine<S> {
    pub(crate) store: S,
}

impl<S: Store> AllocationEngine<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub(crate) async fn registration(
        &self,
        id: RegistrationId,
    ) -> Result<Registration, AllocationError> {
        self.store
            .find_registration(id)
            .await?
            .ok_or_else(|| AllocationError::not_found(format!("id: Missing Registration {id}")))
    }

    /// Each update only applies while its row still holds the guest it was
    /// checked against, so a concurrent write is reported instead of lost.
    async fn write_assignments(
        &self,
        updates: Vec<AssignmentUpdate>,
    ) -> Result<Vec<Registration>, AllocationError> {
        let expected = updates.len();
        let updated = self.store.update_assignments(updates).await?;
        if updated.len() == expected {
            Ok(updated)
        } else {
            Err(AllocationError::bad_request(format!(
                "id: Update did not occur for {} of {expected} registrations",
                expected - updated.len().min(expected)
            )))
        }
    }

    /// Creates one unassigned registration per mat of the template.
    ///
    /// Refuses to touch a day that already has registrations at the
    /// template's facility, so existing assignments are never overwritten.
    #[instrument(skip(self))]
    pub async fn generate(
        &self,
        template_id: TemplateId,
        registration_date: NaiveDate,
    ) -> Result<Vec<Registration>, AllocationError> {
        let template = self.store.find_template(template_id).await?.ok_or_else(|| {
            AllocationError::not_found(format!("templateId: Missing Template {template_id}"))
        })?;

        let existing = self
            .store
            .count_registrations(template.facility_id, registration_date)
            .await?;
        if existing > 0 {
            warn!(existing, "registrations already exist");
            return Err(AllocationError::bad_request(format!(
                "registrationDate: Cannot generate registrations for {registration_date}, \
                 {existing} already exist"
            )));
        }

        let mats = TemplateMats::of_template(&template)?;
        let drafts: Vec<NewRegistration> = mats
            .all
            .exploded()
            .map(|mat_number| {
                NewRegistration::unassigned(
                    template.facility_id,
                    registration_date,
                    mat_number,
                    mats.features(mat_number).into_column(),
                )
            })
            .collect();

        let created = self.store.insert_registrations(drafts).await?;
        info!(
            facility_id = template.facility_id,
            count = created.len(),
            "registrations generated"
        );
        Ok(created)
    }

    /// Binds a guest to a registration, replacing all assignment fields.
    ///
    /// Assigning the guest that already holds the registration only refreshes
    /// the payment and schedule fields.
    #[instrument(skip(self, assignment), fields(guest_id = assignment.guest_id))]
    pub async fn assign(
        &self,
        registration_id: RegistrationId,
        assignment: GuestAssignment,
    ) -> Result<Registration, AllocationError> {
        let registration = self.registration(registration_id).await?;

        if let Some(current) = registration.guest_id {
            if current != assignment.guest_id {
                warn!(current, "registration is taken");
                return Err(AllocationError::bad_request(format!(
                    "id: Registration {registration_id} is already assigned to someone else"
                )));
            }
        }

        let guest_id = assignment.guest_id;
        let guest = self
            .store
            .find_guest(guest_id)
            .await?
            .ok_or_else(|| {
                AllocationError::not_found(format!("guestId: Missing Guest {guest_id}"))
            })?;

        if registration.is_assigned() {
            debug!("same guest, refreshing assignment fields");
        } else {
            if guest.facility_id != registration.facility_id {
                warn!(guest_facility_id = guest.facility_id, "guest of another facility");
                return Err(AllocationError::bad_request(format!(
                    "guestId: Guest {} does not belong to facility {}",
                    guest.id, registration.facility_id
                )));
            }
            if let Some(other) = self
                .store
                .find_registration_by_guest_and_date(
                    registration.facility_id,
                    guest.id,
                    registration.registration_date,
                )
                .await?
            {
                warn!(other = other.id, "guest already holds a mat");
                return Err(AllocationError::bad_request(format!(
                    "guestId: Guest {} is already assigned to mat {} on {}",
                    guest.id, other.mat_number, registration.registration_date
                )));
            }
        }

        let mut updated = self
            .write_assignments(vec![AssignmentUpdate::new(
                registration_id,
                registration.guest_id,
                assignment.into(),
            )])
            .await?;
        info!("registration assigned");
        Ok(updated.remove(0))
    }

    /// Unbinds the guest and clears its payment and schedule fields.
    #[instrument(skip(self))]
    pub async fn deassign(
        &self,
        registration_id: RegistrationId,
    ) -> Result<Registration, AllocationError> {
        let registration = self.registration(registration_id).await?;
        if !registration.is_assigned() {
            warn!("registration is not assigned");
            return Err(AllocationError::bad_request(format!(
                "id: Registration {registration_id} is not currently assigned"
            )));
        }

        let mut updated = self
            .write_assignments(vec![AssignmentUpdate::new(
                registration_id,
                registration.guest_id,
                Assignment::cleared(),
            )])
            .await?;
        info!("registration deassigned");
        Ok(updated.remove(0))
    }

    /// Moves a guest with all assignment fields from one registration to an
    /// unassigned one. Both rows change in the same transaction.
    #[instrument(skip(self))]
    pub async fn reassign(
        &self,
        registration_id_from: RegistrationId,
        registration_id_to: RegistrationId,
    ) -> Result<Registration, AllocationError> {
        if registration_id_from == registration_id_to {
            return Err(AllocationError::bad_request(format!(
                "idTo: Cannot reassign Registration {registration_id_from} to itself"
            )));
        }

        let from = self.registration(registration_id_from).await?;
        let Some(guest_id) = from.guest_id else {
            warn!("source registration is not assigned");
            return Err(AllocationError::bad_request(format!(
                "idFrom: Registration {registration_id_from} is not currently assigned"
            )));
        };

        let to = self.registration(registration_id_to).await?;
        if to.is_assigned() {
            warn!("target registration is taken");
            return Err(AllocationError::bad_request(format!(
                "idTo: Registration {registration_id_to} is already assigned"
            )));
        }
        if to.facility_id != from.facility_id {
            return Err(AllocationError::bad_request(format!(
                "idTo: Registration {registration_id_to} belongs to another facility"
            )));
        }
        if to.registration_date != from.registration_date {
            if let Some(other) = self
                .store
                .find_registration_by_guest_and_date(to.facility_id, guest_id, to.registration_date)
                .await?
            {
                return Err(AllocationError::bad_request(format!(
                    "guestId: Guest {guest_id} is already assigned to mat {} on {}",
                    other.mat_number, to.registration_date
                )));
            }
        }

        // clear the source first so the guest never holds two rows of a date
        let mut updated = self
            .write_assignments(vec![
                AssignmentUpdate::new(registration_id_from, Some(guest_id), Assignment::cleared()),
                AssignmentUpdate::new(registration_id_to, None, from.assignment()),
            ])
            .await?;
        info!(guest_id, "registration reassigned");
        Ok(updated.remove(1))
    }
}
