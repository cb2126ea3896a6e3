//! Sample data for trying the allocation workflow on an empty database.

use mat_allocation_database::models::{
    Facility, Guest, NewFacility, NewGuest, NewTemplate, Template,
};
use mat_allocation_database::Store;
use serde::Serialize;
use tracing::info;

use crate::error::AllocationError;
use crate::AllocationEngine;

const GUESTS: [(&str, &str); 3] = [
    ("Fred", "Flintstone"),
    ("Barney", "Rubble"),
    ("Bam Bam", "Rubble"),
];

#[derive(Serialize, Debug)]
pub struct Seeded {
    pub facility: Facility,
    pub guests: Vec<Guest>,
    pub template: Template,
}

impl<S: Store> AllocationEngine<S> {
    /// Creates a facility named `facility_name` with three guests and a
    /// 24 mat template.
    pub async fn seed(&self, facility_name: &str) -> Result<Seeded, AllocationError> {
        let facility = self
            .store
            .insert_facility(NewFacility {
                name: facility_name.to_owned(),
                active: true,
                city: Some(facility_name.to_owned()),
                ..NewFacility::default()
            })
            .await?;

        let mut guests = Vec::with_capacity(GUESTS.len());
        for (first_name, last_name) in GUESTS {
            guests.push(
                self.store
                    .insert_guest(NewGuest {
                        facility_id: facility.id,
                        first_name: first_name.to_owned(),
                        last_name: last_name.to_owned(),
                        active: true,
                        ..NewGuest::default()
                    })
                    .await?,
            );
        }

        let template = self
            .insert_template(NewTemplate {
                facility_id: facility.id,
                name: "Standard".to_owned(),
                active: true,
                comments: Some("Standard mat configuration".to_owned()),
                all_mats: "1-24".to_owned(),
                handicap_mats: Some("1-3".to_owned()),
                socket_mats: Some("3-8".to_owned()),
                work_mats: Some("20-24".to_owned()),
            })
            .await?;

        info!(facility_id = facility.id, "seed data loaded");
        Ok(Seeded {
            facility,
            guests,
            template,
        })
    }
}
