//! # Biodata Core
//!
//! Local persistence core for the BioData Maker mobile app. The host app
//! (Flutter or React Native) keeps screens, forms, image picking and export;
//! this crate owns the biodata collection on device and exposes it through
//! C-compatible functions backed by LMDB.
//!
//! ## Layers
//!
//! - [`biodata_model`] - profile, sibling and preview types, seed entries
//! - [`key_value_store`] - the storage capability and an in-memory store
//! - [`local_db_state`] - the LMDB store used on device
//! - [`biodata_service`] - list, get, create, update and delete
//! - [`template_catalog`] - the fixed set of visual templates
//!
//! ## Quick Start
//!
//! ```rust
//! use biodata_core::biodata_model::{BiodataInput, Salutation};
//! use biodata_core::biodata_service::BiodataService;
//! use biodata_core::key_value_store::MemoryStore;
//!
//! let service = BiodataService::new(MemoryStore::new());
//! assert_eq!(service.list_previews().len(), 4);
//!
//! let input = BiodataInput {
//!     salutation: Salutation::Mr,
//!     full_name: "Test User".to_string(),
//!     occupation: "Engineer".to_string(),
//!     religion: "Hindu".to_string(),
//!     place_of_birth: "Pune".to_string(),
//!     ..Default::default()
//! };
//! let preview = service.create(&input)?;
//! assert_eq!(preview.name, "Mr Test User");
//! # Ok::<(), biodata_core::app_response::AppResponse>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function answers a JSON-serialized [`AppResponse`] that the caller
//! releases with [`free_response`].
//!
//! - [`create_biodata_db`] - open the LMDB-backed service
//! - [`list_biodata`] - all previews
//! - [`get_biodata`] - one reconstructed record
//! - [`create_biodata`] / [`update_biodata`] / [`delete_biodata`]
//! - [`clear_biodata`] - drop the collection
//! - [`list_templates`] - the template catalogue
//! - [`close_biodata_db`] - close and release the service

pub mod app_response;
pub mod biodata_model;
pub mod biodata_service;
pub mod key_value_store;
pub mod local_db_state;
pub mod template_catalog;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::biodata_model::BiodataInput;
use crate::biodata_service::{BiodataService, DeleteOutcome, UpdateOutcome};
use crate::local_db_state::AppDbState;
use crate::template_catalog::TEMPLATES;

/// The service as handed to FFI callers.
pub type BiodataState = BiodataService<AppDbState>;

/// Opens the biodata store at `<name>.lmdb`.
///
/// # Returns
///
/// A pointer to the service, or null when the name is null, not UTF-8, or the
/// environment cannot be opened. Release it with [`close_biodata_db`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_biodata_db(name: *const c_char) -> *mut BiodataState {
    if name.is_null() {
        warn!("Null name pointer passed to create_biodata_db");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match AppDbState::init(name_str.to_string()) {
        Ok(store) => {
            info!("Biodata store '{name_str}' ready");
            Box::into_raw(Box::new(BiodataService::new(store)))
        }
        Err(e) => {
            warn!("Failed to open biodata store '{name_str}': {e}");
            std::ptr::null_mut()
        }
    }
}

/// Lists every stored preview as a JSON array inside `Ok`.
///
/// Storage failures are not reported: the array is simply empty.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_biodata(state: *mut BiodataState) -> *const c_char {
    let state = match state_ref(state, "list_biodata") {
        Ok(s) => s,
        Err(err) => return err,
    };

    ok_json(&state.list_previews())
}

/// Fetches the record stored under `id`.
///
/// The answer is a reconstructed record tagged `"kind": "reconstructed"`;
/// only the fields carried by the preview are real. Answers `NotFound` when no
/// entry matches.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_biodata(state: *mut BiodataState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "get_biodata") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match state.get_by_id(&id_str) {
        Some(partial) => ok_json(&partial),
        None => response_to_c_string(&AppResponse::NotFound(format!(
            "No biodata found with id: {id_str}"
        ))),
    }
}

/// Creates a biodata from the form JSON and answers its preview.
///
/// # JSON Format
///
/// camelCase form state, e.g.
/// ```json
/// {
///   "salutation": "Mr",
///   "fullName": "Test User",
///   "dateOfBirth": "12/03/1994",
///   "placeOfBirth": "Pune",
///   "occupation": "Engineer",
///   "religion": "Hindu",
///   "fatherName": "R. User",
///   "motherName": "S. User",
///   "phoneNumber": "9000000000"
/// }
/// ```
///
/// Answers `ValidationError` when a required field is empty.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_biodata(state: *mut BiodataState, json_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "create_biodata") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let input = match parse_input(json_ptr) {
        Ok(input) => input,
        Err(err) => return err,
    };

    match state.create(&input) {
        Ok(preview) => ok_json(&preview),
        Err(e) => response_to_c_string(&e),
    }
}

/// Replaces the biodata stored under `id` with the form JSON.
///
/// Same payload as [`create_biodata`]. Answers `NotFound` when the id is not
/// stored; nothing is written in that case.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_biodata(
    state: *mut BiodataState,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "update_biodata") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let input = match parse_input(json_ptr) {
        Ok(input) => input,
        Err(err) => return err,
    };

    match state.update(&id_str, &input) {
        Ok(UpdateOutcome::Updated(preview)) => ok_json(&preview),
        Ok(UpdateOutcome::NotFound) => response_to_c_string(&AppResponse::NotFound(format!(
            "No biodata found with id: {id_str}"
        ))),
        Err(e) => response_to_c_string(&e),
    }
}

/// Deletes the biodata stored under `id`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_biodata(state: *mut BiodataState, id: *const c_char) -> *const c_char {
    let state = match state_ref(state, "delete_biodata") {
        Ok(s) => s,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match state.delete(&id_str) {
        Ok(DeleteOutcome::Deleted) => {
            response_to_c_string(&AppResponse::success("Biodata deleted successfully"))
        }
        Ok(DeleteOutcome::NotFound) => response_to_c_string(&AppResponse::NotFound(format!(
            "No biodata found with id: {id_str}"
        ))),
        Err(e) => response_to_c_string(&e),
    }
}

/// Drops the stored collection; the next list call reseeds the samples.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_biodata(state: *mut BiodataState) -> *const c_char {
    let state = match state_ref(state, "clear_biodata") {
        Ok(s) => s,
        Err(err) => return err,
    };

    match state.clear() {
        Ok(()) => response_to_c_string(&AppResponse::success("All biodata cleared")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Lists the template catalogue as a JSON array inside `Ok`.
#[no_mangle]
pub extern "C" fn list_templates() -> *const c_char {
    ok_json(&TEMPLATES)
}

/// Closes the LMDB environment and releases the service.
///
/// # Safety
///
/// `state` must come from [`create_biodata_db`] and must not be used after
/// this call.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_biodata_db(state: *mut BiodataState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_biodata_db".to_string());
        return response_to_c_string(&error);
    }

    let mut state = unsafe { Box::from_raw(state) };

    match state.store_mut().close_database() {
        Ok(()) => response_to_c_string(&AppResponse::success("Database connection closed successfully")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Releases a string returned by any function of this crate.
///
/// # Safety
///
/// `ptr` must come from this crate and must be released only once.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn state_ref<'a>(
    state: *mut BiodataState,
    fn_name: &str,
) -> Result<&'a BiodataState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(s) => Ok(s),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

/// Reads a form payload and applies the same required-field check as the
/// app's create and edit screens.
fn parse_input(json_ptr: *const c_char) -> Result<BiodataInput, *const c_char> {
    let json_str = c_ptr_to_string(json_ptr, "JSON")?;

    let input: BiodataInput = serde_json::from_str(&json_str).map_err(|e| {
        response_to_c_string(&AppResponse::SerializationError(format!("Invalid JSON: {e}")))
    })?;

    let missing = input.missing_required_fields();
    if !missing.is_empty() {
        let error = AppResponse::ValidationError(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        ));
        return Err(response_to_c_string(&error));
    }

    Ok(input)
}

fn ok_json<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Failed to serialize result: {e}"));
            response_to_c_string(&error)
        }
    }
}

/// Serializes an [`AppResponse`] into a heap C string owned by the caller.
///
/// Null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a `String`, or a ready `BadRequest` response.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
