use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use tracing::info;
use uuid::Uuid;

use crate::models::event::{DeletedEvent, Event, EventInput, EventListQuery};
use crate::models::user::AuthenticatedUser;
use crate::repositories::EventRepository;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{created, ok};

pub async fn list_events(
    State(state): State<AppState>,
    query: Result<Query<EventListQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let events = state.events()?.list(query.created_by).await?;
    Ok(ok(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let event = state
        .events()?
        .find(id)
        .await?
        .ok_or_else(|| event_not_found(id))?;
    Ok(ok(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> AppResult<Response> {
    let Json(input) = payload?;
    let input = input.validate()?;

    let event = state.events()?.create(&input, user.id).await?;
    info!(event_id = %event.id, created_by = %user.id, "Event created");

    Ok(created(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let input = input.validate()?;

    let events = state.events()?;
    owned_event(events, id, &user).await?;

    // The row can vanish between the ownership check and the write.
    let event = events
        .update(id, &input)
        .await?
        .ok_or_else(|| event_not_found(id))?;
    info!(event_id = %id, "Event updated");

    Ok(ok(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;

    let events = state.events()?;
    owned_event(events, id, &user).await?;

    let event = events.delete(id).await?.ok_or_else(|| event_not_found(id))?;
    info!(event_id = %id, "Event deleted");

    Ok(ok(DeletedEvent {
        message: "Event deleted",
        event,
    }))
}

/// Signs the caller up for a free event. Paid events are only joinable by
/// completing checkout.
pub async fn signup_for_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = id?;

    let events = state.events()?;
    let event = events.find(id).await?.ok_or_else(|| event_not_found(id))?;
    if !event.is_free() {
        return Err(AppError::ValidationError(
            "This event requires payment; use checkout to get a ticket".to_string(),
        ));
    }

    let signup = events
        .signup(id, user.id)
        .await?
        .ok_or_else(|| AppError::Conflict("Already signed up for this event".to_string()))?;
    info!(event_id = %id, user_id = %user.id, "User signed up for event");

    Ok(created(signup))
}

async fn owned_event(
    events: &dyn EventRepository,
    id: Uuid,
    user: &AuthenticatedUser,
) -> AppResult<Event> {
    let event = events.find(id).await?.ok_or_else(|| event_not_found(id))?;
    if event.created_by != user.id {
        return Err(AppError::Forbidden(
            "Only the organizer can change this event".to_string(),
        ));
    }
    Ok(event)
}

fn event_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Event with id '{id}' was not found"))
}
