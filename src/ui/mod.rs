//! Web UI handlers for the TV board
//!
//! - components/ - Shared Dioxus components (kiosk layout)
//! - pages/ - The TV page and the access setup page
//! - fragments - markup swapped into the TV page by the frame stream

pub mod components;
pub mod fragments;
pub mod pages;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use dioxus::prelude::*;
use serde::Deserialize;

use crate::api::AppState;
use crate::bus::BusEvent;
use pages::{SetupPage, TvPage};

#[derive(Debug, Deserialize)]
pub struct TvQuery {
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetupForm {
    pub key: String,
}

fn document(body: String) -> Html<String> {
    Html(format!("<!DOCTYPE html>\n<html lang=\"en\">\n{}</html>", body))
}

fn render_setup(error: Option<String>) -> Html<String> {
    document(dioxus::ssr::render_element(rsx! { SetupPage { error } }))
}

enum Provisioned {
    Stored,
    Blank,
    Failed(String),
}

/// Store a key and ask the fetcher to use it right away.
async fn provision(state: &AppState, key: &str) -> Provisioned {
    match state.access.set(key).await {
        Ok(true) => {
            state.bus.publish(BusEvent::AccessProvisioned);
            state.fetcher.refresh_now();
            Provisioned::Stored
        }
        Ok(false) => Provisioned::Blank,
        Err(e) => {
            tracing::error!("Failed to store access key: {}", e);
            Provisioned::Failed(e.to_string())
        }
    }
}

/// GET /tv - The board page; `?key=` provisions the key first
pub async fn tv_page(State(state): State<AppState>, Query(query): Query<TvQuery>) -> Response {
    if let Some(key) = query.key.as_deref() {
        match provision(&state, key).await {
            // Drop the key from the address bar
            Provisioned::Stored => return Redirect::to("/tv").into_response(),
            Provisioned::Blank => {}
            Provisioned::Failed(error) => {
                let page = render_setup(Some(error));
                return (StatusCode::INTERNAL_SERVER_ERROR, page).into_response();
            }
        }
    }

    if !state.access.is_set().await {
        return Redirect::to("/tv/setup").into_response();
    }

    let frame = state.board.frame();
    let today_html = frame.lists.today.clone();
    let upcoming_html = frame.lists.upcoming.clone();
    let page = dioxus::ssr::render_element(rsx! { TvPage { today_html, upcoming_html } });
    document(page).into_response()
}

/// GET /tv/setup - Access key form
pub async fn setup_page() -> impl IntoResponse {
    render_setup(None)
}

/// POST /tv/setup - Store the submitted key
pub async fn setup_submit(State(state): State<AppState>, Form(form): Form<SetupForm>) -> Response {
    match provision(&state, &form.key).await {
        Provisioned::Stored => Redirect::to("/tv").into_response(),
        Provisioned::Blank => (
            StatusCode::BAD_REQUEST,
            render_setup(Some("The access key cannot be empty.".to_string())),
        )
            .into_response(),
        Provisioned::Failed(error) => {
            (StatusCode::INTERNAL_SERVER_ERROR, render_setup(Some(error))).into_response()
        }
    }
}
