use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{facilities, guests, registrations, templates};

pub type FacilityId = i32;
pub type GuestId = i32;
pub type RegistrationId = i32;
pub type TemplateId = i32;

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = facilities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub active: bool,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Insertable, Deserialize, Debug, Clone, Default)]
#[diesel(table_name = facilities)]
pub struct NewFacility {
    pub name: String,
    pub active: bool,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = guests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Guest {
    pub id: GuestId,
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub comments: Option<String>,
    /// Favorite mat number.
    pub favorite: Option<i32>,
}

#[derive(Insertable, Deserialize, Debug, Clone, Default)]
#[diesel(table_name = guests)]
pub struct NewGuest {
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub comments: Option<String>,
    pub favorite: Option<i32>,
}

/// Blueprint of one day's mats. The mat lists are stored in their compact
/// textual form (`1-6,9,12-15`) and parsed on use.
#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Template {
    pub id: TemplateId,
    pub facility_id: FacilityId,
    pub name: String,
    pub active: bool,
    pub comments: Option<String>,
    pub all_mats: String,
    pub handicap_mats: Option<String>,
    pub socket_mats: Option<String>,
    pub work_mats: Option<String>,
}

#[derive(Insertable, Deserialize, Debug, Clone, Default)]
#[diesel(table_name = templates)]
pub struct NewTemplate {
    pub facility_id: FacilityId,
    pub name: String,
    pub active: bool,
    pub comments: Option<String>,
    pub all_mats: String,
    pub handicap_mats: Option<String>,
    pub socket_mats: Option<String>,
    pub work_mats: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Registration {
    pub id: RegistrationId,
    pub facility_id: FacilityId,
    pub registration_date: NaiveDate,
    pub mat_number: i32,
    pub guest_id: Option<GuestId>,
    pub features: Option<String>,
    pub payment_type: Option<String>,
    pub payment_amount: Option<BigDecimal>,
    pub shower_time: Option<NaiveTime>,
    pub wakeup_time: Option<NaiveTime>,
    pub comments: Option<String>,
}

impl Registration {
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.guest_id.is_some()
    }

    /// The guest-bound fields of this row.
    #[must_use]
    pub fn assignment(&self) -> Assignment {
        Assignment {
            guest_id: self.guest_id,
            comments: self.comments.clone(),
            payment_amount: self.payment_amount.clone(),
            payment_type: self.payment_type.clone(),
            shower_time: self.shower_time,
            wakeup_time: self.wakeup_time,
        }
    }

    pub(crate) fn apply(&mut self, assignment: Assignment) {
        self.guest_id = assignment.guest_id;
        self.comments = assignment.comments;
        self.payment_amount = assignment.payment_amount;
        self.payment_type = assignment.payment_type;
        self.shower_time = assignment.shower_time;
        self.wakeup_time = assignment.wakeup_time;
    }
}

#[derive(Insertable, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = registrations)]
pub struct NewRegistration {
    pub facility_id: FacilityId,
    pub registration_date: NaiveDate,
    pub mat_number: i32,
    pub guest_id: Option<GuestId>,
    pub features: Option<String>,
    pub payment_type: Option<String>,
    pub payment_amount: Option<BigDecimal>,
    pub shower_time: Option<NaiveTime>,
    pub wakeup_time: Option<NaiveTime>,
    pub comments: Option<String>,
}

impl NewRegistration {
    /// An empty mat slot, as produced when a day is generated.
    #[must_use]
    pub fn unassigned(
        facility_id: FacilityId,
        registration_date: NaiveDate,
        mat_number: i32,
        features: Option<String>,
    ) -> Self {
        Self {
            facility_id,
            registration_date,
            mat_number,
            guest_id: None,
            features,
            payment_type: None,
            payment_amount: None,
            shower_time: None,
            wakeup_time: None,
            comments: None,
        }
    }

    pub(crate) fn into_registration(self, id: RegistrationId) -> Registration {
        Registration {
            id,
            facility_id: self.facility_id,
            registration_date: self.registration_date,
            mat_number: self.mat_number,
            guest_id: self.guest_id,
            features: self.features,
            payment_type: self.payment_type,
            payment_amount: self.payment_amount,
            shower_time: self.shower_time,
            wakeup_time: self.wakeup_time,
            comments: self.comments,
        }
    }
}

/// Guest binding plus service metadata of a registration. Writing an
/// assignment replaces every one of these fields, `None` clears it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub guest_id: Option<GuestId>,
    pub comments: Option<String>,
    pub payment_amount: Option<BigDecimal>,
    pub payment_type: Option<String>,
    pub shower_time: Option<NaiveTime>,
    pub wakeup_time: Option<NaiveTime>,
}

impl Assignment {
    /// Clears the guest and all of its metadata.
    #[must_use]
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// Rewrites the assignment of row `id`, but only while the row still holds
/// `expected_guest_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub id: RegistrationId,
    pub expected_guest_id: Option<GuestId>,
    pub assignment: Assignment,
}

impl AssignmentUpdate {
    #[must_use]
    pub const fn new(
        id: RegistrationId,
        expected_guest_id: Option<GuestId>,
        assignment: Assignment,
    ) -> Self {
        Self {
            id,
            expected_guest_id,
            assignment,
        }
    }
}

/// A registration together with the guest holding it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationWithGuest {
    #[serde(flatten)]
    pub registration: Registration,
    pub guest: Option<Guest>,
}
