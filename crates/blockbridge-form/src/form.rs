//! The three Bedrock form kinds and the [`Form`] handle that pairs one with
//! its response handler.
//!
//! # JSON
//!
//! Each kind serializes to the object the client renders, tagged by `type`:
//!
//! | Kind   | `type`        | Response            |
//! |--------|---------------|---------------------|
//! | Simple | `form`        | button index        |
//! | Modal  | `modal`       | `true` for button 1 |
//! | Custom | `custom_form` | array of values     |

use std::fmt;
use std::sync::Arc;

use blockbridge_protocol::CancelReason;
use serde::{Deserialize, Serialize};

use crate::{Component, ComponentType, FormError, FormResponse};

/// Callback run with the parsed response to a form.
pub type ResponseHandler = Arc<dyn Fn(FormResponse) -> Result<(), FormError> + Send + Sync>;

// ---------------------------------------------------------------------------
// Form kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Url,
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormImage {
    #[serde(rename = "type")]
    pub image_type: ImageType,
    pub data: String,
}

impl FormImage {
    pub fn url(data: impl Into<String>) -> Self {
        Self {
            image_type: ImageType::Url,
            data: data.into(),
        }
    }

    pub fn path(data: impl Into<String>) -> Self {
        Self {
            image_type: ImageType::Path,
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<FormImage>,
}

/// A list of buttons. Only kind affected by the image loading bug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleForm {
    pub title: String,
    pub content: String,
    pub buttons: Vec<Button>,
}

/// A yes/no prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalForm {
    pub title: String,
    pub content: String,
    pub button1: String,
    pub button2: String,
}

/// A list of input components. `None` entries render as nothing and are
/// skipped when looking for labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomForm {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<FormImage>,
    pub content: Vec<Option<Component>>,
}

impl CustomForm {
    /// Positions of label components, in order.
    pub fn label_indices(&self) -> Vec<usize> {
        self.content
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Some(c) if c.component_type() == ComponentType::Label => Some(i),
                _ => None,
            })
            .collect()
    }
}

/// Any form kind, tagged for JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FormKind {
    #[serde(rename = "form")]
    Simple(SimpleForm),
    #[serde(rename = "modal")]
    Modal(ModalForm),
    #[serde(rename = "custom_form")]
    Custom(CustomForm),
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// A form ready to be shown, with an optional response handler.
///
/// Cloning is cheap on the handler side (it's an `Arc`), so the session can
/// keep a copy for resending while the caller keeps its own.
#[derive(Clone)]
pub struct Form {
    kind: FormKind,
    handler: Option<ResponseHandler>,
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            handler: None,
        }
    }

    /// Attaches the callback run when the client answers.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(FormResponse) -> Result<(), FormError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn kind(&self) -> &FormKind {
        &self.kind
    }

    pub fn as_custom(&self) -> Option<&CustomForm> {
        match &self.kind {
            FormKind::Custom(form) => Some(form),
            _ => None,
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.kind, FormKind::Simple(_))
    }

    /// The JSON sent in the form request packet.
    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(serde_json::to_string(&self.kind)?)
    }

    /// Parses `data` against this form and runs the handler, if any.
    ///
    /// # Errors
    /// Fails if the response doesn't fit the form, or the handler does.
    pub fn handle_response(
        &self,
        data: Option<&str>,
        cancel: Option<CancelReason>,
    ) -> Result<(), FormError> {
        let response = FormResponse::parse(&self.kind, data, cancel)?;
        tracing::trace!(?response, "form response parsed");
        match &self.handler {
            Some(handler) => handler(response),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("kind", &self.kind)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl From<SimpleForm> for Form {
    fn from(form: SimpleForm) -> Self {
        Self::new(FormKind::Simple(form))
    }
}

impl From<ModalForm> for Form {
    fn from(form: ModalForm) -> Self {
        Self::new(FormKind::Modal(form))
    }
}

impl From<CustomForm> for Form {
    fn from(form: CustomForm) -> Self {
        Self::new(FormKind::Custom(form))
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

impl SimpleForm {
    pub fn builder() -> SimpleFormBuilder {
        SimpleFormBuilder::default()
    }
}

impl ModalForm {
    pub fn builder() -> ModalFormBuilder {
        ModalFormBuilder::default()
    }
}

impl CustomForm {
    pub fn builder() -> CustomFormBuilder {
        CustomFormBuilder::default()
    }
}

#[derive(Default)]
pub struct SimpleFormBuilder {
    form: SimpleForm,
    handler: Option<ResponseHandler>,
}

impl SimpleFormBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.form.title = title.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.form.content = content.into();
        self
    }

    pub fn button(mut self, text: impl Into<String>) -> Self {
        self.form.buttons.push(Button {
            text: text.into(),
            image: None,
        });
        self
    }

    pub fn button_with_image(mut self, text: impl Into<String>, image: FormImage) -> Self {
        self.form.buttons.push(Button {
            text: text.into(),
            image: Some(image),
        });
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(FormResponse) -> Result<(), FormError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Form {
        Form {
            kind: FormKind::Simple(self.form),
            handler: self.handler,
        }
    }
}

#[derive(Default)]
pub struct ModalFormBuilder {
    form: ModalForm,
    handler: Option<ResponseHandler>,
}

impl ModalFormBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.form.title = title.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.form.content = content.into();
        self
    }

    pub fn button1(mut self, text: impl Into<String>) -> Self {
        self.form.button1 = text.into();
        self
    }

    pub fn button2(mut self, text: impl Into<String>) -> Self {
        self.form.button2 = text.into();
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(FormResponse) -> Result<(), FormError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Form {
        Form {
            kind: FormKind::Modal(self.form),
            handler: self.handler,
        }
    }
}

#[derive(Default)]
pub struct CustomFormBuilder {
    form: CustomForm,
    handler: Option<ResponseHandler>,
}

impl CustomFormBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.form.title = title.into();
        self
    }

    pub fn icon(mut self, icon: FormImage) -> Self {
        self.form.icon = Some(icon);
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.form.content.push(Some(component));
        self
    }

    /// Appends a placeholder slot that renders nothing.
    pub fn empty_slot(mut self) -> Self {
        self.form.content.push(None);
        self
    }

    pub fn label(self, text: impl Into<String>) -> Self {
        self.component(Component::label(text))
    }

    pub fn input(self, text: impl Into<String>, placeholder: impl Into<String>) -> Self {
        self.component(Component::input(text, placeholder))
    }

    pub fn toggle(self, text: impl Into<String>, default: bool) -> Self {
        self.component(Component::toggle(text, default))
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(FormResponse) -> Result<(), FormError> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Form {
        Form {
            kind: FormKind::Custom(self.form),
            handler: self.handler,
        }
    }
}
