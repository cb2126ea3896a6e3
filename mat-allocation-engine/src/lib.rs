//! Daily mat allocation for shelter facilities.
//!
//! A [`Template`](mat_allocation_database::models::Template) describes the
//! mats of a facility as compact [`MatsList`]s. [`AllocationEngine::generate`]
//! turns it into one unassigned registration per mat for a date, after which
//! guests are bound with [`AllocationEngine::assign`], released with
//! [`AllocationEngine::deassign`] and moved with
//! [`AllocationEngine::reassign`].

pub mod devmode;
pub mod engine;
pub mod error;
pub mod features;
pub mod mats_list;
pub mod registrations;
pub mod template;

pub use engine::{AllocationEngine, GuestAssignment};
pub use error::AllocationError;
pub use features::Features;
pub use mats_list::{MatsList, MatsListError};
pub use template::{validate_template, TemplateMats};
