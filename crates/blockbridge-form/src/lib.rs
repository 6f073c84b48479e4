//! Bedrock modal forms for Blockbridge.
//!
//! Servers behind the bridge can put native Bedrock UI in front of a player:
//! a list of buttons ([`SimpleForm`]), a yes/no prompt ([`ModalForm`]), or a
//! panel of inputs ([`CustomForm`]). This crate models those forms, encodes
//! them to the JSON the client expects, and parses what comes back into a
//! [`FormResponse`].
//!
//! ```rust
//! use blockbridge_form::{FormResponse, SimpleForm};
//!
//! let form = SimpleForm::builder()
//!     .title("Teleport")
//!     .button("Spawn")
//!     .button("Home")
//!     .handler(|response| {
//!         if let FormResponse::Simple { button } = response {
//!             println!("picked {button}");
//!         }
//!         Ok(())
//!     })
//!     .build();
//! assert!(form.to_json()?.starts_with(r#"{"type":"form""#));
//! # Ok::<(), blockbridge_form::FormError>(())
//! ```

mod component;
mod error;
mod form;
mod response;

pub use component::{Component, ComponentType};
pub use error::FormError;
pub use form::{
    Button, CustomForm, CustomFormBuilder, Form, FormImage, FormKind, ImageType, ModalForm,
    ModalFormBuilder, ResponseHandler, SimpleForm, SimpleFormBuilder,
};
pub use response::FormResponse;
