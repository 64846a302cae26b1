//! Property display sink

use ifc_pick_model::PropertySet;

/// What the property panel shows
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DisplayState {
    /// Nothing was under the pointer on the last double-click
    #[default]
    NoSelection,
    /// Properties of the selected element
    Properties(PropertySet),
    /// Fetching properties failed
    Failed(String),
}

/// Receiver of inspection results
pub trait PropertyDisplay {
    fn show(&mut self, state: &DisplayState);
}

/// Plain-text property panel
///
/// Shows `None` when nothing is selected, the property set as indented
/// JSON, or `Error: <message>`.
#[derive(Clone, Debug)]
pub struct TextPanel {
    text: String,
}

impl Default for TextPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPanel {
    pub const NO_SELECTION: &'static str = "None";

    pub fn new() -> Self {
        Self {
            text: Self::NO_SELECTION.to_string(),
        }
    }

    /// Current panel text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render a display state to text
    pub fn render(state: &DisplayState) -> String {
        match state {
            DisplayState::NoSelection => Self::NO_SELECTION.to_string(),
            DisplayState::Properties(properties) => match serde_json::to_string_pretty(properties) {
                Ok(json) => json,
                Err(err) => format!("Error: {}", err),
            },
            DisplayState::Failed(message) => format!("Error: {}", message),
        }
    }
}

impl PropertyDisplay for TextPanel {
    fn show(&mut self, state: &DisplayState) {
        self.text = Self::render(state);
    }
}
