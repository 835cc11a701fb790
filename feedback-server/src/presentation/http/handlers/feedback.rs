use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::post::{CreatePostRequest, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, redirect_with_notice};
use crate::presentation::http::forms::FormErrors;
use crate::presentation::http::handlers::auth::user_path;
use crate::presentation::http::middleware::session::Viewer;
use crate::presentation::http::notice::Notice;
use crate::presentation::http::views::{self, FeedbackFormTarget, Page};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct FeedbackForm {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters."))]
    pub(crate) title: String,
    #[validate(length(min = 1, message = "Content is required."))]
    pub(crate) content: String,
}

fn add_target(username: &str) -> FeedbackFormTarget {
    FeedbackFormTarget {
        heading: "Add Feedback".to_string(),
        action: format!("/users/{username}/feedback/add"),
        submit: "Add",
    }
}

fn edit_target(id: i64) -> FeedbackFormTarget {
    FeedbackFormTarget {
        heading: "Edit Feedback".to_string(),
        action: format!("/feedback/{id}/update"),
        submit: "Save",
    }
}

fn form_page(viewer: &Viewer, target: &FeedbackFormTarget, form: &FeedbackForm, errors: &FormErrors) -> Page {
    views::feedback_form_page(viewer, target, &form.title, &form.content, errors)
}

pub(crate) async fn feed(State(state): State<AppState>, viewer: Viewer) -> AppResult<Page> {
    let posts = state.feedback_service.recent_feed().await?;
    Ok(views::feed_page(&viewer, &posts))
}

pub(crate) async fn new_feedback_form(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> AppResult<Page> {
    state
        .feedback_service
        .authorize_new_post(viewer.identity(), &username)?;

    Ok(form_page(
        &viewer,
        &add_target(&username),
        &FeedbackForm::default(),
        &FormErrors::default(),
    ))
}

pub(crate) async fn add_feedback(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> AppResult<Response> {
    state
        .feedback_service
        .authorize_new_post(viewer.identity(), &username)?;
    if let Err(errors) = form.validate() {
        return Ok(form_page(&viewer, &add_target(&username), &form, &FormErrors::from(&errors))
            .into_response());
    }

    let req = CreatePostRequest {
        title: form.title.clone(),
        content: form.content.clone(),
    };
    match state
        .feedback_service
        .add_post(viewer.identity(), &username, req)
        .await
    {
        Ok(post) => Ok(redirect_with_notice(
            &user_path(&post.owner_username),
            Notice::FeedbackAdded,
        )),
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => {
                Ok(form_page(&viewer, &add_target(&username), &form, &errors).into_response())
            }
            None => Err(err.into()),
        },
    }
}

pub(crate) async fn edit_feedback_form(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> AppResult<Page> {
    let post = state
        .feedback_service
        .post_for_edit(viewer.identity(), id)
        .await?;

    let form = FeedbackForm {
        title: post.title,
        content: post.content,
    };
    Ok(form_page(&viewer, &edit_target(id), &form, &FormErrors::default()))
}

pub(crate) async fn update_feedback(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    Form(form): Form<FeedbackForm>,
) -> AppResult<Response> {
    state
        .feedback_service
        .post_for_edit(viewer.identity(), id)
        .await?;
    if let Err(errors) = form.validate() {
        return Ok(
            form_page(&viewer, &edit_target(id), &form, &FormErrors::from(&errors))
                .into_response(),
        );
    }

    let req = UpdatePostRequest {
        title: form.title.clone(),
        content: form.content.clone(),
    };
    match state
        .feedback_service
        .edit_post(viewer.identity(), id, req)
        .await
    {
        Ok(post) => Ok(redirect_with_notice(
            &user_path(&post.owner_username),
            Notice::FeedbackUpdated,
        )),
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => Ok(form_page(&viewer, &edit_target(id), &form, &errors).into_response()),
            None => Err(err.into()),
        },
    }
}

pub(crate) async fn delete_feedback(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let post = state
        .feedback_service
        .delete_post(viewer.identity(), id)
        .await?;

    Ok(redirect_with_notice(
        &user_path(&post.owner_username),
        Notice::FeedbackDeleted,
    ))
}
