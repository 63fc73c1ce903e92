use actix_web::{
    cookie::{Cookie, SameSite},
    get,
    http::header::{self, ContentType},
    post, web, HttpRequest, HttpResponse,
};
use actix_web_lab::respond::Html;

use crate::{
    form::{
        csrf::CSRF_TOKEN_NAME,
        validator::{FormErrors, PersonForm},
    },
    templates::render::{render_add, render_index, AddFormView},
};

use super::{errors::WebError, server::AppState};

fn redirect_to_index() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

/// Renders the add page with a freshly issued CSRF token, also set as a cookie
fn add_page(state: &AppState, form: &PersonForm, errors: &FormErrors) -> HttpResponse {
    let csrf_token = state.csrf.issue();

    let body = render_add(&AddFormView {
        jmeno: &form.jmeno,
        prijmeni: &form.prijmeni,
        errors,
        csrf_token: csrf_token.as_deref(),
    });

    let mut response = HttpResponse::Ok();
    response.content_type(ContentType::html());

    if let Some(csrf_token) = csrf_token {
        response.cookie(
            Cookie::build(CSRF_TOKEN_NAME, csrf_token)
                .path("/add")
                .http_only(true)
                .same_site(SameSite::Strict)
                .finish(),
        );
    }

    response.body(body)
}

/// List of everyone in the store
#[get("/")]
pub async fn index(state: web::Data<AppState>) -> Result<Html, WebError> {
    let request_manager = state.request_manager.clone();

    let people = web::block(move || request_manager.send_list()).await??;

    Ok(Html(render_index(&people, &state.tokens)))
}

#[get("/add")]
pub async fn add_form(state: web::Data<AppState>) -> HttpResponse {
    add_page(&state, &PersonForm::default(), &FormErrors::default())
}

#[post("/add")]
pub async fn add_submit(
    state: web::Data<AppState>,
    request: HttpRequest,
    form: web::Form<PersonForm>,
) -> Result<HttpResponse, WebError> {
    let form = form.into_inner();

    let cookie = request.cookie(CSRF_TOKEN_NAME);
    let csrf = state.csrf.verify(
        form.csrf_token.as_deref(),
        cookie.as_ref().map(|cookie| cookie.value()),
    );

    match (csrf, form.validate()) {
        (Ok(()), Ok(new_person)) => {
            let request_manager = state.request_manager.clone();

            let person = web::block(move || request_manager.send_add(new_person)).await??;

            log::info!("Added person [id: {}]", person.id);

            Ok(redirect_to_index())
        }
        (csrf, validation) => {
            let mut errors = validation.err().unwrap_or_default();

            if let Err(csrf_error) = csrf {
                log::warn!("Rejected add form: {}", csrf_error);
                errors.form.push(csrf_error.to_string());
            }

            Ok(add_page(&state, &form, &errors))
        }
    }
}

#[get("/delete/{token}")]
pub async fn delete(
    state: web::Data<AppState>,
    token: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let id = state.tokens.decode(&token).map_err(|err| {
        log::warn!("Rejected delete token: {}", err);
        err
    })?;

    let request_manager = state.request_manager.clone();

    async move {
        web::block(move || request_manager.send_remove(id)).await??;

        Ok::<_, WebError>(())
    }
    .await
    .map_err(WebError::on_delete)?;

    log::info!("Deleted person [id: {}]", id);

    Ok(redirect_to_index())
}
