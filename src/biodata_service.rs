//! Persistence service for biodata profiles.
//!
//! The whole collection lives under one storage key as a JSON array of
//! [`BiodataPreview`] entries, in insertion order. Every operation is a full
//! read-modify-write of that array; there is no locking or versioning, so two
//! writers racing on the same store lose one of the writes.
//!
//! Reads fail open: [`BiodataService::list_previews`] and
//! [`BiodataService::get_by_id`] log storage or parse failures and answer with
//! an empty result. Mutations log and return the error so the caller can tell
//! the user the save failed.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error, info};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::biodata_model::{
    sample_previews, Biodata, BiodataInput, BiodataPreview, Salutation, DESCRIPTION_SEPARATOR,
};
use crate::key_value_store::KeyValueStore;

pub const STORAGE_KEY: &str = "biodata_entries";

/// Source of epoch milliseconds, used for new ids and timestamps.
pub type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

pub fn system_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateOutcome {
    Updated(BiodataPreview),
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// A [`Biodata`] rebuilt from a stored preview.
///
/// Only the name, salutation, occupation, religion, place of birth and photo
/// come from storage. Every other field holds a fixed placeholder (see
/// [`reconstruct_from_preview`]), never the value originally submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename = "reconstructed")]
pub struct PartialBiodata {
    biodata: Biodata,
}

impl PartialBiodata {
    pub fn biodata(&self) -> &Biodata {
        &self.biodata
    }

    pub fn into_biodata(self) -> Biodata {
        self.biodata
    }

    /// Starting point for an edit form: merge user edits into this, then pass
    /// it to [`BiodataService::update`].
    pub fn to_input(&self) -> BiodataInput {
        BiodataInput::from(self.biodata.clone())
    }
}

pub const PLACEHOLDER_DATE_OF_BIRTH: &str = "01/01/1990";
pub const PLACEHOLDER_EDUCATION: &str = "Bachelor's Degree";
pub const PLACEHOLDER_CASTE: &str = "General";
pub const PLACEHOLDER_FATHER_NAME: &str = "John Doe";
pub const PLACEHOLDER_FATHER_OCCUPATION: &str = "Business";
pub const PLACEHOLDER_MOTHER_NAME: &str = "Jane Doe";
pub const PLACEHOLDER_MOTHER_OCCUPATION: &str = "Homemaker";
pub const PLACEHOLDER_PHONE_NUMBER: &str = "9876543210";

/// Rebuilds a full record from a preview.
///
/// The name is split as `"<Mr|Ms> <full name>"`: a name starting with `Mr` is
/// `Mr`, anything else is `Ms`, and the first three characters are dropped.
/// The description is split positionally on `", "` into occupation, religion
/// and place of birth; missing parts come back empty.
pub fn reconstruct_from_preview(preview: &BiodataPreview, now: u64) -> PartialBiodata {
    let salutation = if preview.name.starts_with("Mr") {
        Salutation::Mr
    } else {
        Salutation::Ms
    };
    let full_name: String = preview.name.chars().skip(3).collect();

    let parts: Vec<&str> = preview.description.split(DESCRIPTION_SEPARATOR).collect();
    let part = |index: usize| parts.get(index).copied().unwrap_or_default().to_string();
    let place_of_birth = part(2);

    let email = format!("{}@example.com", full_name.to_lowercase().replacen(' ', ".", 1));
    let address = format!("123 Main Street, {}", place_of_birth);

    PartialBiodata {
        biodata: Biodata {
            id: preview.id.clone(),
            salutation,
            full_name,
            photo_uri: preview.photo_uri.clone(),
            date_of_birth: PLACEHOLDER_DATE_OF_BIRTH.to_string(),
            time_of_birth: None,
            place_of_birth,
            height: None,
            weight: None,
            education: PLACEHOLDER_EDUCATION.to_string(),
            occupation: part(0),
            annual_income: None,
            religion: part(1),
            caste: PLACEHOLDER_CASTE.to_string(),
            gotra: None,
            raasi: None,
            nakshatra: None,
            father_name: PLACEHOLDER_FATHER_NAME.to_string(),
            father_occupation: PLACEHOLDER_FATHER_OCCUPATION.to_string(),
            mother_name: PLACEHOLDER_MOTHER_NAME.to_string(),
            mother_occupation: PLACEHOLDER_MOTHER_OCCUPATION.to_string(),
            siblings: Vec::new(),
            phone_number: PLACEHOLDER_PHONE_NUMBER.to_string(),
            email,
            address,
            created_at: now,
            updated_at: now,
        },
    }
}

pub struct BiodataService<S> {
    store: S,
    key: String,
    clock: Clock,
}

impl<S: KeyValueStore> BiodataService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: STORAGE_KEY.to_string(),
            clock: Box::new(system_millis),
        }
    }

    /// Stores the collection under `key` instead of [`STORAGE_KEY`].
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // Seeds the sample entries when the key has never been written.
    // Failures are logged; the following read reports its own error.
    fn ensure_initialized(&self) {
        let seeded = match self.store.get_item(&self.key) {
            Ok(Some(_)) => return,
            Ok(None) => serde_json::to_string(&sample_previews())
                .map_err(AppResponse::from)
                .and_then(|json| self.store.set_item(&self.key, &json)),
            Err(e) => Err(e),
        };

        match seeded {
            Ok(()) => info!("Seeded '{}' with sample biodata", self.key),
            Err(e) => error!("Error initializing storage: {e}"),
        }
    }

    fn read_previews(&self) -> Result<Vec<BiodataPreview>, AppResponse> {
        self.ensure_initialized();
        match self.store.get_item(&self.key)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_previews(&self, previews: &[BiodataPreview]) -> Result<(), AppResponse> {
        let json = serde_json::to_string(previews)?;
        self.store.set_item(&self.key, &json)
    }

    /// All stored previews in insertion order. Empty on any failure.
    pub fn list_previews(&self) -> Vec<BiodataPreview> {
        self.read_previews().unwrap_or_else(|e| {
            error!("Error getting biodata previews: {e}");
            Vec::new()
        })
    }

    /// Looks up `id` and rebuilds a partial record from its preview.
    ///
    /// `None` when nothing matches or storage cannot be read.
    pub fn get_by_id(&self, id: &str) -> Option<PartialBiodata> {
        let preview = self.list_previews().into_iter().find(|item| item.id == id)?;
        Some(reconstruct_from_preview(&preview, (self.clock)()))
    }

    /// Appends the preview of `input` under a new id and returns it.
    ///
    /// The id is the current clock reading; two creates within the same
    /// millisecond get the same id. `input` is not validated here.
    pub fn create(&self, input: &BiodataInput) -> Result<BiodataPreview, AppResponse> {
        self.try_create(input)
            .inspect_err(|e| error!("Error creating biodata: {e}"))
    }

    fn try_create(&self, input: &BiodataInput) -> Result<BiodataPreview, AppResponse> {
        let mut previews = self.read_previews()?;
        let preview = BiodataPreview::project((self.clock)().to_string(), input);

        previews.push(preview.clone());
        self.write_previews(&previews)?;

        debug!("Created biodata {}", preview.id);
        Ok(preview)
    }

    /// Replaces the preview stored under `id` with the projection of `input`.
    ///
    /// A missing id is reported as [`UpdateOutcome::NotFound`] and leaves
    /// storage untouched.
    pub fn update(&self, id: &str, input: &BiodataInput) -> Result<UpdateOutcome, AppResponse> {
        self.try_update(id, input)
            .inspect_err(|e| error!("Error updating biodata: {e}"))
    }

    fn try_update(&self, id: &str, input: &BiodataInput) -> Result<UpdateOutcome, AppResponse> {
        let mut previews = self.read_previews()?;
        let updated = BiodataPreview::project(id.to_string(), input);

        let mut matched = false;
        for entry in previews.iter_mut().filter(|entry| entry.id == id) {
            *entry = updated.clone();
            matched = true;
        }

        if !matched {
            debug!("No biodata with id {id} to update");
            return Ok(UpdateOutcome::NotFound);
        }

        self.write_previews(&previews)?;
        Ok(UpdateOutcome::Updated(updated))
    }

    /// Removes the preview stored under `id`.
    pub fn delete(&self, id: &str) -> Result<DeleteOutcome, AppResponse> {
        self.try_delete(id)
            .inspect_err(|e| error!("Error deleting biodata: {e}"))
    }

    fn try_delete(&self, id: &str) -> Result<DeleteOutcome, AppResponse> {
        let mut previews = self.read_previews()?;
        let before = previews.len();
        previews.retain(|item| item.id != id);

        if previews.len() == before {
            debug!("No biodata with id {id} to delete");
            return Ok(DeleteOutcome::NotFound);
        }

        self.write_previews(&previews)?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Drops the stored collection. The next read seeds the samples again.
    pub fn clear(&self) -> Result<(), AppResponse> {
        self.store
            .remove_item(&self.key)
            .map(|_| ())
            .inspect_err(|e| error!("Error clearing biodata: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(name: &str, description: &str) -> BiodataPreview {
        BiodataPreview {
            id: "9".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            photo_uri: None,
        }
    }

    #[test]
    fn reconstruct_splits_name_and_description() {
        let partial = reconstruct_from_preview(
            &preview("Ms Divya GM", "Software Engineer, Hindu, Bangalore"),
            1_000,
        );
        let biodata = partial.biodata();

        assert_eq!(biodata.salutation, Salutation::Ms);
        assert_eq!(biodata.full_name, "Divya GM");
        assert_eq!(biodata.occupation, "Software Engineer");
        assert_eq!(biodata.religion, "Hindu");
        assert_eq!(biodata.place_of_birth, "Bangalore");
        assert_eq!(biodata.email, "divya.gm@example.com");
        assert_eq!(biodata.address, "123 Main Street, Bangalore");
        assert_eq!(biodata.created_at, 1_000);
        assert_eq!(biodata.updated_at, 1_000);
    }

    #[test]
    fn email_replaces_only_the_first_space() {
        let partial = reconstruct_from_preview(&preview("Mr Ravi Kumar Rao", "A, B, C"), 0);
        assert_eq!(partial.biodata().email, "ravi.kumar rao@example.com");
    }

    #[test]
    fn short_description_leaves_missing_parts_empty() {
        let partial = reconstruct_from_preview(&preview("Mr Solo", "Pilot"), 0);
        let biodata = partial.biodata();

        assert_eq!(biodata.occupation, "Pilot");
        assert_eq!(biodata.religion, "");
        assert_eq!(biodata.place_of_birth, "");
        assert_eq!(biodata.address, "123 Main Street, ");
    }

    #[test]
    fn names_starting_with_mr_read_as_mr() {
        let partial = reconstruct_from_preview(&preview("Mrs Kapoor", "A, B, C"), 0);
        assert_eq!(partial.biodata().salutation, Salutation::Mr);
        assert_eq!(partial.biodata().full_name, " Kapoor");
    }

    #[test]
    fn partial_serializes_with_reconstructed_tag() {
        let partial = reconstruct_from_preview(&preview("Mr A", "X, Y, Z"), 0);
        let json = serde_json::to_value(&partial).unwrap();
        assert_eq!(json["kind"], "reconstructed");
        assert_eq!(json["biodata"]["fullName"], "A");
    }
}
