/// Own account management
///
/// - `GET  /profile` - current username and email
/// - `POST /profile` - replace username and email
/// - `POST /change_password` - replace the password, current one required
///
/// Both forms return to `/profile` with a notice.

use crate::{
    app::AppState,
    error::{first_validation_message, storage_reason, user_message, ApiError, ApiResult},
    flash::{Flash, Notice, SeeOther},
    middleware::session::CurrentUser,
    page::Page,
};
use axum::{extract::State, Extension, Form};
use serde::Deserialize;
use serde_json::json;
use taskboard_shared::{models::user::UserSummary, Error};
use validator::Validate;

const PROFILE: &str = "/profile";

/// Profile form
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "All fields are required"))]
    pub email: String,
}

/// Password change form
#[derive(Debug, Default, Deserialize)]
pub struct PasswordForm {
    #[serde(default)]
    pub current_password: String,

    #[serde(default)]
    pub new_password: String,

    #[serde(default)]
    pub confirm_password: String,
}

pub async fn profile_page(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    flash: Flash,
) -> ApiResult<Page> {
    let user = state
        .credentials
        .get(identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Page::new("profile", flash).with(json!({ "user": UserSummary::from(&user) })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Form(form): Form<ProfileForm>,
) -> SeeOther {
    let form = ProfileForm {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
    };
    if let Err(errors) = form.validate() {
        return SeeOther::to(PROFILE).with_notice(Notice::danger(first_validation_message(&errors)));
    }

    match state
        .credentials
        .update_profile(identity.user_id, &form.username, &form.email)
        .await
    {
        Ok(_) => SeeOther::to(PROFILE).with_notice(Notice::success("Profile updated")),
        // Already logged by the credential store; nothing was written
        Err(Error::Storage(reason)) => SeeOther::to(PROFILE).with_notice(Notice::danger(format!(
            "Error updating profile: {}",
            storage_reason(&reason)
        ))),
        Err(e) => SeeOther::to(PROFILE).with_notice(Notice::danger(user_message(&e))),
    }
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(identity)): Extension<CurrentUser>,
    Form(form): Form<PasswordForm>,
) -> SeeOther {
    match state
        .credentials
        .change_password(
            identity.user_id,
            &form.current_password,
            &form.new_password,
            &form.confirm_password,
        )
        .await
    {
        Ok(()) => SeeOther::to(PROFILE).with_notice(Notice::success("Password updated")),
        Err(e) => SeeOther::to(PROFILE).with_notice(Notice::danger(user_message(&e))),
    }
}
