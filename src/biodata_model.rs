//! Data model definitions for biodata profiles.
//!
//! A [`Biodata`] is the full matrimonial profile a user fills in. Only its
//! [`BiodataPreview`] projection is written to storage; the preview is what the
//! list screen renders and what the service reads back.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Honorific shown in front of the full name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Salutation {
    #[default]
    Mr,
    Ms,
}

impl Display for Salutation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Salutation::Mr => write!(f, "Mr"),
            Salutation::Ms => write!(f, "Ms"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

/// One sibling entry, owned by its parent [`Biodata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sibling {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
}

/// The full profile record.
///
/// Timestamps are epoch milliseconds. `photo_uri` is an opaque reference handed
/// over by the host's image picker; the crate never dereferences it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Biodata {
    pub id: String,
    pub salutation: Salutation,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
    pub date_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_birth: Option<String>,
    pub place_of_birth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    pub education: String,
    pub occupation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<String>,
    pub religion: String,
    pub caste: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gotra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raasi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nakshatra: Option<String>,
    pub father_name: String,
    pub father_occupation: String,
    pub mother_name: String,
    pub mother_occupation: String,
    #[serde(default)]
    pub siblings: Vec<Sibling>,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// A create/update payload: a [`Biodata`] without `id` and timestamps.
///
/// Deserializes from the same camelCase JSON the host's form state produces.
/// Every field defaults, so a partially filled form still parses; required
/// fields are checked by [`BiodataInput::missing_required_fields`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiodataInput {
    pub salutation: Salutation,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
    pub date_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_birth: Option<String>,
    pub place_of_birth: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    pub education: String,
    pub occupation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<String>,
    pub religion: String,
    pub caste: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gotra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raasi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra: Option<String>,
    pub father_name: String,
    pub father_occupation: String,
    pub mother_name: String,
    pub mother_occupation: String,
    pub siblings: Vec<Sibling>,
    pub phone_number: String,
    pub email: String,
    pub address: String,
}

impl BiodataInput {
    /// Names (camelCase, as the form knows them) of required fields left empty.
    ///
    /// This is the check the create and edit forms run before saving. The
    /// persistence service does not call it.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required = [
            ("fullName", &self.full_name),
            ("dateOfBirth", &self.date_of_birth),
            ("placeOfBirth", &self.place_of_birth),
            ("fatherName", &self.father_name),
            ("motherName", &self.mother_name),
            ("phoneNumber", &self.phone_number),
        ];

        required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect()
    }
}

impl From<Biodata> for BiodataInput {
    fn from(biodata: Biodata) -> Self {
        BiodataInput {
            salutation: biodata.salutation,
            full_name: biodata.full_name,
            photo_uri: biodata.photo_uri,
            date_of_birth: biodata.date_of_birth,
            time_of_birth: biodata.time_of_birth,
            place_of_birth: biodata.place_of_birth,
            height: biodata.height,
            weight: biodata.weight,
            education: biodata.education,
            occupation: biodata.occupation,
            annual_income: biodata.annual_income,
            religion: biodata.religion,
            caste: biodata.caste,
            gotra: biodata.gotra,
            raasi: biodata.raasi,
            nakshatra: biodata.nakshatra,
            father_name: biodata.father_name,
            father_occupation: biodata.father_occupation,
            mother_name: biodata.mother_name,
            mother_occupation: biodata.mother_occupation,
            siblings: biodata.siblings,
            phone_number: biodata.phone_number,
            email: biodata.email,
            address: biodata.address,
        }
    }
}

/// The persisted unit and list-row projection of a [`Biodata`].
///
/// Stored as `{ "id", "name", "description", "photoUri"? }`.
///
/// # Examples
///
/// ```rust
/// use biodata_core::biodata_model::{BiodataInput, BiodataPreview, Salutation};
///
/// let input = BiodataInput {
///     salutation: Salutation::Ms,
///     full_name: "Divya GM".to_string(),
///     occupation: "Software Engineer".to_string(),
///     religion: "Hindu".to_string(),
///     place_of_birth: "Bangalore".to_string(),
///     ..Default::default()
/// };
///
/// let preview = BiodataPreview::project("1".to_string(), &input);
/// assert_eq!(preview.name, "Ms Divya GM");
/// assert_eq!(preview.description, "Software Engineer, Hindu, Bangalore");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiodataPreview {
    pub id: String,
    /// Salutation and full name joined by a space.
    pub name: String,
    /// Occupation, religion and place of birth joined by `", "`.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
}

/// Separator between the positional parts of [`BiodataPreview::description`].
pub const DESCRIPTION_SEPARATOR: &str = ", ";

impl BiodataPreview {
    /// Derives the preview for `input` under the given id.
    ///
    /// One-way: the preview is not kept in sync with later edits made outside
    /// create/update.
    pub fn project(id: String, input: &BiodataInput) -> Self {
        BiodataPreview {
            id,
            name: format!("{} {}", input.salutation, input.full_name),
            description: [
                input.occupation.as_str(),
                input.religion.as_str(),
                input.place_of_birth.as_str(),
            ]
            .join(DESCRIPTION_SEPARATOR),
            photo_uri: input.photo_uri.clone(),
        }
    }
}

/// Entries written to storage the first time it is found empty.
pub fn sample_previews() -> Vec<BiodataPreview> {
    let sample = |id: &str, name: &str, description: &str, photo: &str| BiodataPreview {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        photo_uri: Some(photo.to_string()),
    };

    vec![
        sample(
            "1",
            "Ms Divya GM",
            "Software Engineer, Hindu, Bangalore",
            "https://randomuser.me/api/portraits/women/44.jpg",
        ),
        sample(
            "2",
            "Mr Rahul Sharma",
            "Doctor, Hindu, Mumbai",
            "https://randomuser.me/api/portraits/men/32.jpg",
        ),
        sample(
            "3",
            "Ms Priya Patel",
            "Architect, Jain, Ahmedabad",
            "https://randomuser.me/api/portraits/women/68.jpg",
        ),
        sample(
            "4",
            "Mr Arjun Reddy",
            "Business Analyst, Hindu, Hyderabad",
            "https://randomuser.me/api/portraits/men/75.jpg",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preview_serializes_with_camel_case_and_omits_missing_photo() {
        let preview = BiodataPreview {
            id: "7".to_string(),
            name: "Mr A".to_string(),
            description: "X, Y, Z".to_string(),
            photo_uri: None,
        };
        let value = serde_json::to_value(&preview).unwrap();
        assert_eq!(value, json!({"id": "7", "name": "Mr A", "description": "X, Y, Z"}));

        let with_photo = BiodataPreview {
            photo_uri: Some("file:///p.jpg".to_string()),
            ..preview
        };
        let value = serde_json::to_value(&with_photo).unwrap();
        assert_eq!(value["photoUri"], "file:///p.jpg");
    }

    #[test]
    fn input_parses_partial_form_state() {
        let input: BiodataInput = serde_json::from_value(json!({
            "salutation": "Ms",
            "fullName": "Asha Rao",
            "placeOfBirth": "Mysore",
            "siblings": [
                {"id": "s1", "name": "Ravi", "gender": "Male", "maritalStatus": "Married"}
            ]
        }))
        .unwrap();

        assert_eq!(input.salutation, Salutation::Ms);
        assert_eq!(input.full_name, "Asha Rao");
        assert_eq!(input.siblings.len(), 1);
        assert_eq!(input.siblings[0].marital_status, MaritalStatus::Married);
        assert!(input.siblings[0].age.is_none());
    }

    #[test]
    fn unknown_salutation_is_rejected() {
        let result = serde_json::from_value::<BiodataInput>(json!({"salutation": "Dr"}));
        assert!(result.is_err());
    }

    #[test]
    fn missing_required_fields_lists_empty_ones_in_form_order() {
        let input = BiodataInput {
            full_name: "Asha Rao".to_string(),
            place_of_birth: "Mysore".to_string(),
            mother_name: "Lata".to_string(),
            ..Default::default()
        };
        assert_eq!(
            input.missing_required_fields(),
            vec!["dateOfBirth", "fatherName", "phoneNumber"]
        );
    }

    #[test]
    fn project_joins_selected_fields() {
        let input = BiodataInput {
            salutation: Salutation::Mr,
            full_name: "Test User".to_string(),
            occupation: "Engineer".to_string(),
            religion: "Hindu".to_string(),
            place_of_birth: "Pune".to_string(),
            caste: "ignored".to_string(),
            ..Default::default()
        };
        let preview = BiodataPreview::project("42".to_string(), &input);
        assert_eq!(preview.id, "42");
        assert_eq!(preview.name, "Mr Test User");
        assert_eq!(preview.description, "Engineer, Hindu, Pune");
        assert!(preview.photo_uri.is_none());
    }

    #[test]
    fn sample_previews_are_four_in_id_order() {
        let ids: Vec<String> = sample_previews().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }
}
