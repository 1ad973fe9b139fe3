//! Contact form handling

use axum::extract::State;
use axum::response::Html;
use axum::Form;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use keystone_core::NewContact;

use crate::error::WebResult;
use crate::pages;
use crate::state::AppState;

/// Contact form fields; the validation rules mirror what the public form
/// promises in its placeholders.
#[derive(Debug, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = 2, max = 200, message = "Name must be between 2 and 200 characters."))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[validate(length(max = 20, message = "Phone number is too long. Maximum 20 characters."))]
    #[serde(default)]
    pub phone: String,
    #[validate(length(
        min = 5,
        max = 300,
        message = "Subject must be between 5 and 300 characters."
    ))]
    pub subject: String,
    #[validate(length(min = 10, message = "Message must be at least 10 characters long."))]
    pub message: String,
}

impl ContactForm {
    /// Trim all fields and lowercase the email before validation, so
    /// whitespace padding neither passes length checks nor reaches storage.
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.phone = self.phone.trim().to_string();
        self.subject = self.subject.trim().to_string();
        self.message = self.message.trim().to_string();
        self
    }
}

pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> WebResult<Html<String>> {
    let form = form.normalized();

    if let Err(errors) = form.validate() {
        return Ok(Html(pages::render_contact(&flatten_errors(&errors))));
    }

    let contact = NewContact {
        name: form.name,
        email: form.email,
        phone: form.phone,
        subject: form.subject,
        message: form.message,
    };
    let id = state.db.insert_contact(&contact).await?;
    let stored = state.db.get_contact(id).await?;

    info!(id, "contact message received");

    // The submission is stored either way; the notification must not be
    // able to fail the visitor's request.
    let mailer = Arc::clone(&state.mailer);
    tokio::spawn(async move { mailer.notify_contact(stored).await });

    Ok(Html(pages::render_contact_thanks()))
}

fn flatten_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            match &error.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{} is invalid.", field)),
            }
        }
    }
    messages.sort();
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: String::new(),
            subject: "Rental inquiry".to_string(),
            message: "Is the beach house available in June?".to_string(),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().normalized().validate().is_ok());
    }

    #[test]
    fn test_normalization_trims_and_lowercases() {
        let form = ContactForm {
            name: "  Jane Doe  ".to_string(),
            email: " JANE@Example.COM ".to_string(),
            ..valid_form()
        }
        .normalized();

        assert_eq!(form.name, "Jane Doe");
        assert_eq!(form.email, "jane@example.com");
    }

    #[test]
    fn test_short_fields_are_rejected() {
        let cases = [
            ContactForm {
                name: "J".to_string(),
                ..valid_form()
            },
            ContactForm {
                email: "not-an-address".to_string(),
                ..valid_form()
            },
            ContactForm {
                subject: "Hi".to_string(),
                ..valid_form()
            },
            ContactForm {
                message: "Too short".to_string(),
                ..valid_form()
            },
        ];
        for form in cases {
            assert!(form.normalized().validate().is_err());
        }
    }

    #[test]
    fn test_whitespace_padding_does_not_satisfy_lengths() {
        let form = ContactForm {
            message: "       yes       ".to_string(),
            ..valid_form()
        };
        assert!(form.normalized().validate().is_err());
    }

    #[test]
    fn test_error_messages_are_flattened() {
        let form = ContactForm {
            email: "nope".to_string(),
            message: "short".to_string(),
            ..valid_form()
        }
        .normalized();

        let errors = form.validate().unwrap_err();
        let messages = flatten_errors(&errors);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().any(|m| m.contains("valid email")));
        assert!(messages.iter().any(|m| m.contains("at least 10 characters")));
    }
}
