//! Canonical list orders. `PgStore` expresses the same orders as `ORDER BY`
//! clauses, `MemoryStore` sorts with these.

use crate::models::{Guest, Registration, Template};

pub fn guests(rows: &mut [Guest]) {
    rows.sort_by(|a, b| {
        (a.facility_id, &a.last_name, &a.first_name).cmp(&(
            b.facility_id,
            &b.last_name,
            &b.first_name,
        ))
    });
}

pub fn registrations(rows: &mut [Registration]) {
    rows.sort_by_key(|row| (row.facility_id, row.registration_date, row.mat_number));
}

pub fn templates(rows: &mut [Template]) {
    rows.sort_by(|a, b| (a.facility_id, &a.name).cmp(&(b.facility_id, &b.name)));
}
