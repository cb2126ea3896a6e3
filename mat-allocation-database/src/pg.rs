use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;

use crate::error::StoreError;
use crate::models::{
    AssignmentUpdate, Facility, FacilityId, Guest, GuestId, NewFacility, NewGuest,
    NewRegistration, NewTemplate, Registration, RegistrationId, RegistrationWithGuest, Template,
    TemplateId,
};
use crate::schema::{facilities, guests, registrations, templates};
use crate::store::Store;
use crate::Pool;

// https://github.com/weiznich/diesel_async/tree/main/examples/postgres

/// [`Store`] on PostgreSQL. Single statements run in their implicit
/// transaction, multi-statement writes open an explicit one.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_facility(&self, facility: NewFacility) -> Result<Facility, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(facilities::table)
            .values(&facility)
            .returning(Facility::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    async fn insert_guest(&self, guest: NewGuest) -> Result<Guest, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(guests::table)
            .values(&guest)
            .returning(Guest::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    async fn find_guest(&self, id: GuestId) -> Result<Option<Guest>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(guests::table
            .find(id)
            .select(Guest::as_select())
            .first(&mut connection)
            .await
            .optional()?)
    }

    async fn find_guests_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Guest>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(guests::table
            .filter(guests::facility_id.eq(facility_id))
            .order_by((
                guests::facility_id.asc(),
                guests::last_name.asc(),
                guests::first_name.asc(),
            ))
            .select(Guest::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn insert_template(&self, template: NewTemplate) -> Result<Template, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(templates::table)
            .values(&template)
            .returning(Template::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    async fn update_template(
        &self,
        id: TemplateId,
        template: NewTemplate,
    ) -> Result<Template, StoreError> {
        let mut connection = self.pool.get().await?;
        diesel::update(templates::table.find(id))
            .set((
                templates::facility_id.eq(template.facility_id),
                templates::name.eq(template.name),
                templates::active.eq(template.active),
                templates::comments.eq(template.comments),
                templates::all_mats.eq(template.all_mats),
                templates::handicap_mats.eq(template.handicap_mats),
                templates::socket_mats.eq(template.socket_mats),
                templates::work_mats.eq(template.work_mats),
            ))
            .returning(Template::as_returning())
            .get_result(&mut connection)
            .await
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("id: Missing Template {id}")))
    }

    async fn find_template(&self, id: TemplateId) -> Result<Option<Template>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(templates::table
            .find(id)
            .select(Template::as_select())
            .first(&mut connection)
            .await
            .optional()?)
    }

    async fn find_templates_by_facility(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Template>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(templates::table
            .filter(templates::facility_id.eq(facility_id))
            .order_by((templates::facility_id.asc(), templates::name.asc()))
            .select(Template::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn count_templates_named(
        &self,
        facility_id: FacilityId,
        name: &str,
        excluding: Option<TemplateId>,
    ) -> Result<i64, StoreError> {
        let mut connection = self.pool.get().await?;
        let named = templates::table
            .filter(templates::facility_id.eq(facility_id))
            .filter(templates::name.eq(name));
        let count: i64 = match excluding {
            Some(excluding) => {
                named
                    .filter(templates::id.ne(excluding))
                    .count()
                    .get_result(&mut connection)
                    .await?
            }
            None => named.count().get_result(&mut connection).await?,
        };
        Ok(count)
    }

    async fn all_registrations(&self) -> Result<Vec<Registration>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(registrations::table
            .order_by((
                registrations::facility_id.asc(),
                registrations::registration_date.asc(),
                registrations::mat_number.asc(),
            ))
            .select(Registration::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn find_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Option<Registration>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(registrations::table
            .find(id)
            .select(Registration::as_select())
            .first(&mut connection)
            .await
            .optional()?)
    }

    async fn find_registrations_by_facility_and_date(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<Vec<RegistrationWithGuest>, StoreError> {
        let mut connection = self.pool.get().await?;
        let rows: Vec<(Registration, Option<Guest>)> = registrations::table
            .left_join(guests::table)
            .filter(registrations::facility_id.eq(facility_id))
            .filter(registrations::registration_date.eq(registration_date))
            .order_by(registrations::mat_number.asc())
            .select((Registration::as_select(), Option::<Guest>::as_select()))
            .load(&mut connection)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(registration, guest)| RegistrationWithGuest {
                registration,
                guest,
            })
            .collect())
    }

    async fn find_registrations_by_guest(
        &self,
        guest_id: GuestId,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(registrations::table
            .filter(registrations::guest_id.eq(guest_id))
            .order_by((
                registrations::facility_id.asc(),
                registrations::registration_date.asc(),
                registrations::mat_number.asc(),
            ))
            .select(Registration::as_select())
            .load(&mut connection)
            .await?)
    }

    async fn find_registration_by_guest_and_date(
        &self,
        facility_id: FacilityId,
        guest_id: GuestId,
        registration_date: NaiveDate,
    ) -> Result<Option<Registration>, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(registrations::table
            .filter(registrations::facility_id.eq(facility_id))
            .filter(registrations::guest_id.eq(guest_id))
            .filter(registrations::registration_date.eq(registration_date))
            .select(Registration::as_select())
            .first(&mut connection)
            .await
            .optional()?)
    }

    async fn count_registrations(
        &self,
        facility_id: FacilityId,
        registration_date: NaiveDate,
    ) -> Result<i64, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(registrations::table
            .filter(registrations::facility_id.eq(facility_id))
            .filter(registrations::registration_date.eq(registration_date))
            .count()
            .get_result(&mut connection)
            .await?)
    }

    async fn insert_registration(
        &self,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        let mut connection = self.pool.get().await?;
        Ok(diesel::insert_into(registrations::table)
            .values(&registration)
            .returning(Registration::as_returning())
            .get_result(&mut connection)
            .await?)
    }

    async fn insert_registrations(
        &self,
        rows: Vec<NewRegistration>,
    ) -> Result<Vec<Registration>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let mut connection = self.pool.get().await?;
        // a single multi-row INSERT, any failing row aborts the whole statement
        Ok(diesel::insert_into(registrations::table)
            .values(&rows)
            .returning(Registration::as_returning())
            .get_results(&mut connection)
            .await?)
    }

    async fn update_registration(
        &self,
        id: RegistrationId,
        registration: NewRegistration,
    ) -> Result<Registration, StoreError> {
        let mut connection = self.pool.get().await?;
        diesel::update(registrations::table.find(id))
            .set((
                registrations::facility_id.eq(registration.facility_id),
                registrations::registration_date.eq(registration.registration_date),
                registrations::mat_number.eq(registration.mat_number),
                registrations::guest_id.eq(registration.guest_id),
                registrations::features.eq(registration.features),
                registrations::payment_type.eq(registration.payment_type),
                registrations::payment_amount.eq(registration.payment_amount),
                registrations::shower_time.eq(registration.shower_time),
                registrations::wakeup_time.eq(registration.wakeup_time),
                registrations::comments.eq(registration.comments),
            ))
            .returning(Registration::as_returning())
            .get_result(&mut connection)
            .await
            .optional()?
            .ok_or_else(|| StoreError::missing_registration(id))
    }

    async fn update_assignments(
        &self,
        updates: Vec<AssignmentUpdate>,
    ) -> Result<Vec<Registration>, StoreError> {
        let mut connection = self.pool.get().await?;
        connection
            .transaction::<_, StoreError, _>(|connection| {
                async move {
                    let mut updated = Vec::with_capacity(updates.len());
                    for AssignmentUpdate {
                        id,
                        expected_guest_id,
                        assignment,
                    } in updates
                    {
                        // only touches the row while it still holds the expected guest
                        let target = registrations::table.find(id).filter(
                            registrations::guest_id.is_not_distinct_from(expected_guest_id),
                        );
                        let registration = diesel::update(target)
                            .set((
                                registrations::guest_id.eq(assignment.guest_id),
                                registrations::comments.eq(assignment.comments),
                                registrations::payment_amount.eq(assignment.payment_amount),
                                registrations::payment_type.eq(assignment.payment_type),
                                registrations::shower_time.eq(assignment.shower_time),
                                registrations::wakeup_time.eq(assignment.wakeup_time),
                            ))
                            .returning(Registration::as_returning())
                            .get_result(connection)
                            .await
                            .optional()?;
                        let Some(registration) = registration else {
                            let current: Option<Option<GuestId>> = registrations::table
                                .find(id)
                                .select(registrations::guest_id)
                                .first(connection)
                                .await
                                .optional()?;
                            return Err(current.map_or_else(
                                || StoreError::missing_registration(id),
                                |current| StoreError::stale_assignment(id, current),
                            ));
                        };
                        updated.push(registration);
                    }
                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
    }

    async fn remove_registration(&self, id: RegistrationId) -> Result<Registration, StoreError> {
        let mut connection = self.pool.get().await?;
        diesel::delete(registrations::table.find(id))
            .returning(Registration::as_returning())
            .get_result(&mut connection)
            .await
            .optional()?
            .ok_or_else(|| StoreError::missing_registration(id))
    }
}
