//! Custom form components.

use serde::{Deserialize, Serialize};

/// Discriminant of a [`Component`], matching its JSON `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Label,
    Input,
    Toggle,
    Slider,
    StepSlider,
    Dropdown,
}

/// One row of a custom form.
///
/// Every component except [`Component::Label`] produces a value in the
/// response array. Labels produce `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    Label {
        text: String,
    },
    Input {
        text: String,
        #[serde(default)]
        placeholder: String,
        #[serde(default)]
        default: String,
    },
    Toggle {
        text: String,
        #[serde(default)]
        default: bool,
    },
    Slider {
        text: String,
        min: f32,
        max: f32,
        step: f32,
        default: f32,
    },
    StepSlider {
        text: String,
        steps: Vec<String>,
        #[serde(default)]
        default: usize,
    },
    Dropdown {
        text: String,
        options: Vec<String>,
        #[serde(default)]
        default: usize,
    },
}

impl Component {
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label { text: text.into() }
    }

    pub fn input(text: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self::Input {
            text: text.into(),
            placeholder: placeholder.into(),
            default: String::new(),
        }
    }

    pub fn toggle(text: impl Into<String>, default: bool) -> Self {
        Self::Toggle {
            text: text.into(),
            default,
        }
    }

    pub fn slider(text: impl Into<String>, min: f32, max: f32, step: f32) -> Self {
        Self::Slider {
            text: text.into(),
            min,
            max,
            step,
            default: min,
        }
    }

    pub fn step_slider<S: Into<String>>(
        text: impl Into<String>,
        steps: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::StepSlider {
            text: text.into(),
            steps: steps.into_iter().map(Into::into).collect(),
            default: 0,
        }
    }

    pub fn dropdown<S: Into<String>>(
        text: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::Dropdown {
            text: text.into(),
            options: options.into_iter().map(Into::into).collect(),
            default: 0,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            Self::Label { .. } => ComponentType::Label,
            Self::Input { .. } => ComponentType::Input,
            Self::Toggle { .. } => ComponentType::Toggle,
            Self::Slider { .. } => ComponentType::Slider,
            Self::StepSlider { .. } => ComponentType::StepSlider,
            Self::Dropdown { .. } => ComponentType::Dropdown,
        }
    }
}
