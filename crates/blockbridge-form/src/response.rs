//! Parsed form responses.

use blockbridge_protocol::CancelReason;
use serde_json::Value;

use crate::{Component, CustomForm, FormError, FormKind, ModalForm, SimpleForm};

/// What the client answered.
#[derive(Debug, Clone, PartialEq)]
pub enum FormResponse {
    /// The form was dismissed without an answer.
    Closed(CancelReason),
    /// Index of the pressed button.
    Simple { button: usize },
    /// `true` when the first button was pressed.
    Modal { first_button: bool },
    /// One value per content slot; labels and empty slots are `null`.
    Custom { values: Vec<Value> },
}

impl FormResponse {
    /// Parses a response body against the form it answers.
    ///
    /// A cancel reason, a missing body, or a literal `null` body all mean
    /// the form was closed.
    ///
    /// # Errors
    /// [`FormError::Json`] for malformed JSON, [`FormError::InvalidResponse`]
    /// when the value doesn't match the form's shape.
    pub fn parse(
        form: &FormKind,
        data: Option<&str>,
        cancel: Option<CancelReason>,
    ) -> Result<Self, FormError> {
        if let Some(reason) = cancel {
            return Ok(Self::Closed(reason));
        }
        let Some(data) = data else {
            return Ok(Self::Closed(CancelReason::UserClosed));
        };
        let value: Value = serde_json::from_str(data)?;
        if value.is_null() {
            return Ok(Self::Closed(CancelReason::UserClosed));
        }
        match form {
            FormKind::Simple(form) => parse_simple(form, &value),
            FormKind::Modal(form) => parse_modal(form, &value),
            FormKind::Custom(form) => parse_custom(form, value),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

fn invalid(msg: impl Into<String>) -> FormError {
    FormError::InvalidResponse(msg.into())
}

fn parse_simple(form: &SimpleForm, value: &Value) -> Result<FormResponse, FormError> {
    let button = value
        .as_u64()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| invalid(format!("expected a button index, got {value}")))?;
    if button >= form.buttons.len() {
        return Err(invalid(format!(
            "button {button} out of range for {} buttons",
            form.buttons.len()
        )));
    }
    Ok(FormResponse::Simple { button })
}

fn parse_modal(_form: &ModalForm, value: &Value) -> Result<FormResponse, FormError> {
    let first_button = value
        .as_bool()
        .ok_or_else(|| invalid(format!("expected a boolean, got {value}")))?;
    Ok(FormResponse::Modal { first_button })
}

fn parse_custom(form: &CustomForm, value: Value) -> Result<FormResponse, FormError> {
    let Value::Array(values) = value else {
        return Err(invalid(format!("expected an array, got {value}")));
    };
    if values.len() != form.content.len() {
        return Err(invalid(format!(
            "expected {} values, got {}",
            form.content.len(),
            values.len()
        )));
    }
    for (i, (component, value)) in form.content.iter().zip(&values).enumerate() {
        if !accepts(component.as_ref(), value) {
            return Err(invalid(format!("value {value} does not fit component {i}")));
        }
    }
    Ok(FormResponse::Custom { values })
}

fn accepts(component: Option<&Component>, value: &Value) -> bool {
    let index_below = |len: usize| value.as_u64().is_some_and(|i| (i as usize) < len);
    match component {
        None | Some(Component::Label { .. }) => value.is_null(),
        Some(Component::Input { .. }) => value.is_string(),
        Some(Component::Toggle { .. }) => value.is_boolean(),
        Some(Component::Slider { min, max, .. }) => value
            .as_f64()
            .is_some_and(|v| v >= f64::from(*min) && v <= f64::from(*max)),
        Some(Component::StepSlider { steps, .. }) => index_below(steps.len()),
        Some(Component::Dropdown { options, .. }) => index_below(options.len()),
    }
}
