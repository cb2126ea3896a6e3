use mat_allocation_database::models::{FacilityId, NewTemplate, Template, TemplateId};
use mat_allocation_database::Store;
use tracing::{info, instrument};

use crate::error::AllocationError;
use crate::features::Features;
use crate::mats_list::MatsList;
use crate::AllocationEngine;

/// The parsed mat lists of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMats {
    pub all: MatsList,
    pub handicap: Option<MatsList>,
    pub socket: Option<MatsList>,
    pub work: Option<MatsList>,
}

fn parse_list(field: &str, list: &str) -> Result<MatsList, AllocationError> {
    MatsList::new(list).map_err(|err| AllocationError::bad_request(format!("{field}: {err}")))
}

fn parse_optional_list(
    field: &str,
    list: Option<&str>,
) -> Result<Option<MatsList>, AllocationError> {
    // an empty string counts as not set
    list.filter(|list| !list.trim().is_empty())
        .map(|list| parse_list(field, list))
        .transpose()
}

impl TemplateMats {
    /// Parses all four lists and checks the feature lists against `allMats`.
    pub fn parse(
        all_mats: &str,
        handicap_mats: Option<&str>,
        socket_mats: Option<&str>,
        work_mats: Option<&str>,
    ) -> Result<Self, AllocationError> {
        let mats = Self {
            all: parse_list("allMats", all_mats)?,
            handicap: parse_optional_list("handicapMats", handicap_mats)?,
            socket: parse_optional_list("socketMats", socket_mats)?,
            work: parse_optional_list("workMats", work_mats)?,
        };
        for (field, list) in [
            ("handicapMats", &mats.handicap),
            ("socketMats", &mats.socket),
            ("workMats", &mats.work),
        ] {
            if let Some(list) = list {
                if !list.is_subset_of(&mats.all) {
                    return Err(AllocationError::bad_request(format!(
                        "{field}: is not a subset of all mats"
                    )));
                }
            }
        }
        Ok(mats)
    }

    pub fn of_template(template: &Template) -> Result<Self, AllocationError> {
        Self::parse(
            &template.all_mats,
            template.handicap_mats.as_deref(),
            template.socket_mats.as_deref(),
            template.work_mats.as_deref(),
        )
    }

    #[must_use]
    pub fn features(&self, mat_number: i32) -> Features {
        Features::of_mat(
            mat_number,
            self.handicap.as_ref(),
            self.socket.as_ref(),
            self.work.as_ref(),
        )
    }
}

/// Field checks of a template record that need no database access.
pub fn validate_template(template: &NewTemplate) -> Result<TemplateMats, AllocationError> {
    if template.name.trim().is_empty() {
        return Err(AllocationError::bad_request("name: Is required"));
    }
    TemplateMats::parse(
        &template.all_mats,
        template.handicap_mats.as_deref(),
        template.socket_mats.as_deref(),
        template.work_mats.as_deref(),
    )
}

impl<S: Store> AllocationEngine<S> {
    /// Fast-fail check only, the unique index on `(facility_id, name)` is what
    /// actually guards concurrent writers.
    async fn ensure_template_name_unique(
        &self,
        template: &NewTemplate,
        excluding: Option<TemplateId>,
    ) -> Result<(), AllocationError> {
        let found = self
            .store
            .count_templates_named(template.facility_id, &template.name, excluding)
            .await?;
        if found == 0 {
            Ok(())
        } else {
            Err(AllocationError::bad_request(format!(
                "name: Name '{}' is already in use within this facility",
                template.name
            )))
        }
    }

    #[instrument(
        skip(self, template),
        fields(facility_id = template.facility_id, name = %template.name)
    )]
    pub async fn insert_template(
        &self,
        template: NewTemplate,
    ) -> Result<Template, AllocationError> {
        validate_template(&template)?;
        self.ensure_template_name_unique(&template, None).await?;
        let template = self.store.insert_template(template).await?;
        info!(template_id = template.id, "template created");
        Ok(template)
    }

    #[instrument(skip(self, template))]
    pub async fn update_template(
        &self,
        id: TemplateId,
        template: NewTemplate,
    ) -> Result<Template, AllocationError> {
        self.find_template(id).await?;
        validate_template(&template)?;
        self.ensure_template_name_unique(&template, Some(id)).await?;
        let template = self.store.update_template(id, template).await?;
        info!("template updated");
        Ok(template)
    }

    pub async fn find_template(&self, id: TemplateId) -> Result<Template, AllocationError> {
        self.store
            .find_template(id)
            .await?
            .ok_or_else(|| AllocationError::not_found(format!("id: Missing Template {id}")))
    }

    pub async fn find_template_by_name(
        &self,
        facility_id: FacilityId,
        name: &str,
    ) -> Result<Template, AllocationError> {
        self.store
            .find_templates_by_facility(facility_id)
            .await?
            .into_iter()
            .find(|template| template.name == name)
            .ok_or_else(|| AllocationError::not_found(format!("name: Missing name '{name}'")))
    }

    pub async fn templates(
        &self,
        facility_id: FacilityId,
    ) -> Result<Vec<Template>, AllocationError> {
        Ok(self.store.find_templates_by_facility(facility_id).await?)
    }
}
