//! Device management handlers.

use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{Html, IntoResponse, Response},
    Form,
};
use domain::models::DeviceForm;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, Flash};
use crate::services::device_workflow::{DeleteOutcome, DeviceWorkflow, FormOutcome};
use crate::services::flash::{
    clear_cookie, extract_cookie, redirect_with_flash, FlashMessage, FLASH_COOKIE,
};
use crate::views::{self, FormMode};

const DEVICES_PATH: &str = "/devices";

fn workflow(state: &AppState) -> DeviceWorkflow<'_> {
    DeviceWorkflow::new(state.store.as_ref(), &state.config.devices.vlan_names)
}

/// Maps a form outcome to a redirect, a re-rendered form or a 404 page.
fn form_response(
    outcome: FormOutcome,
    state: &AppState,
    user: &CurrentUser,
    mode: FormMode,
) -> Response {
    let vlan_names = &state.config.devices.vlan_names;
    match outcome {
        FormOutcome::Persisted { message } => {
            redirect_with_flash(DEVICES_PATH, &FlashMessage::success(message))
        }
        FormOutcome::Rejected { view, errors } => {
            let messages: Vec<FlashMessage> = errors.into_iter().map(FlashMessage::danger).collect();
            Html(views::device_form_page(
                &user.0,
                mode,
                Some(&view),
                vlan_names,
                &messages,
            ))
            .into_response()
        }
        FormOutcome::StorageFailed { view, message } => Html(views::device_form_page(
            &user.0,
            mode,
            Some(&view),
            vlan_names,
            &[FlashMessage::danger(message)],
        ))
        .into_response(),
        FormOutcome::NotFound => {
            ApiError::NotFound("The requested device does not exist.".to_string()).into_response()
        }
    }
}

/// GET /devices
///
/// A storage fault renders an empty table with an error message. A pending
/// flash message is shown once. Any flash cookie is cleared, including one
/// that no longer decodes.
pub async fn list_devices(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Flash(flash): Flash,
    headers: HeaderMap,
) -> Response {
    let mut messages: Vec<FlashMessage> = flash.iter().cloned().collect();

    let devices = match workflow(&state).list().await {
        Ok(devices) => devices,
        Err(_) => {
            messages.push(FlashMessage::danger(
                "Error fetching devices from the database.",
            ));
            Vec::new()
        }
    };

    let page = Html(views::device_list_page(&user, &devices, &messages));
    if extract_cookie(&headers, FLASH_COOKIE).is_some() {
        ([(SET_COOKIE, clear_cookie())], page).into_response()
    } else {
        page.into_response()
    }
}

/// GET /devices/add
pub async fn add_device_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Html<String> {
    Html(views::device_form_page(
        &user,
        FormMode::Add,
        None,
        &state.config.devices.vlan_names,
        &[],
    ))
}

/// POST /devices/add
pub async fn add_device(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<DeviceForm>,
) -> Response {
    let outcome = workflow(&state)
        .create(&form, user.0.user_or_unknown())
        .await;
    form_response(outcome, &state, &user, FormMode::Add)
}

/// GET /devices/edit/:mac
pub async fn edit_device_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(mac): Path<String>,
) -> Result<Html<String>, ApiError> {
    let view = workflow(&state)
        .load(&mac)
        .await?
        .ok_or_else(|| ApiError::NotFound("The requested device does not exist.".to_string()))?;

    Ok(Html(views::device_form_page(
        &user,
        FormMode::Edit,
        Some(&view),
        &state.config.devices.vlan_names,
        &[],
    )))
}

/// POST /devices/edit/:mac
pub async fn edit_device(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(mac): Path<String>,
    Form(form): Form<DeviceForm>,
) -> Response {
    let outcome = workflow(&state)
        .update(&mac, &form, user.0.user_or_unknown())
        .await;
    form_response(outcome, &state, &user, FormMode::Edit)
}

/// POST /devices/delete/:mac
pub async fn delete_device(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(mac): Path<String>,
) -> Response {
    match workflow(&state).delete(&mac, user.user_or_unknown()).await {
        DeleteOutcome::Deleted { message } => {
            redirect_with_flash(DEVICES_PATH, &FlashMessage::success(message))
        }
        DeleteOutcome::StorageFailed { message } => {
            redirect_with_flash(DEVICES_PATH, &FlashMessage::danger(message))
        }
        DeleteOutcome::NotFound => {
            ApiError::NotFound("The requested device does not exist.".to_string()).into_response()
        }
    }
}
