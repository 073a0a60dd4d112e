//! Contact form route handlers.
//!
//! The store has no backend to deliver messages to, so an accepted submission
//! is only logged and acknowledged.

use std::collections::HashMap;
use std::sync::LazyLock;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use campus_supply_core::validation::{FieldKind, FieldSpec, FormSchema, Validation};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::models::Notification;
use crate::routes::layout::Chrome;
use crate::storage;

/// Fields rendered on the contact page.
static CONTACT_FORM: LazyLock<FormSchema> = LazyLock::new(|| {
    FormSchema::new(vec![
        FieldSpec::required("name", "Name", FieldKind::Text),
        FieldSpec::required("email", "Email", FieldKind::Email),
        FieldSpec::optional("phone", "Phone", FieldKind::Text),
        FieldSpec::required("message", "Message", FieldKind::TextArea),
    ])
});

/// Form field display data.
#[derive(Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub is_textarea: bool,
    pub required: bool,
    pub value: String,
    pub error: Option<String>,
}

impl FieldView {
    fn build(
        schema: &FormSchema,
        values: &HashMap<String, String>,
        validation: &Validation,
    ) -> Vec<Self> {
        schema
            .fields()
            .iter()
            .map(|field| Self {
                name: field.name,
                label: field.label,
                input_type: field.kind.input_type(),
                is_textarea: field.kind == FieldKind::TextArea,
                required: field.required,
                value: values.get(field.name).cloned().unwrap_or_default(),
                error: validation.error(field.name).map(|e| e.to_string()),
            })
            .collect()
    }
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub chrome: Chrome,
    pub fields: Vec<FieldView>,
}

/// Display the empty contact form.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<ContactTemplate> {
    let cart = storage::load_cart(&session).await?;

    Ok(ContactTemplate {
        chrome: Chrome::for_page(&session, cart.item_count()).await,
        fields: FieldView::build(&CONTACT_FORM, &HashMap::new(), &Validation::default()),
    })
}

/// Validate and accept a contact submission.
///
/// Invalid submissions re-render the form with inline errors and the values
/// the visitor typed.
#[instrument(skip(session, form))]
pub async fn submit(
    session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    let validation = CONTACT_FORM.validate(&form);

    if !validation.is_valid() {
        let failed: Vec<_> = validation.errors().map(|(name, _)| name).collect();
        tracing::debug!(?failed, "Contact form rejected");

        let cart = storage::load_cart(&session).await?;
        let template = ContactTemplate {
            chrome: Chrome::for_page(&session, cart.item_count()).await,
            fields: FieldView::build(&CONTACT_FORM, &form, &validation),
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
    }

    let name = form.get("name").map_or("", |n| n.trim());
    let email = form.get("email").map_or("", |e| e.trim());
    tracing::info!(email = %email, "Contact message received");

    storage::notify(
        &session,
        Notification::success(format!("Thanks, {name}! We'll be in touch.")),
    )
    .await?;

    Ok(Redirect::to("/contact").into_response())
}
