//! Hover highlighting
//!
//! Keeps at most one element highlighted. Every pointer move feeds the
//! element under the pointer (or nothing) into [`HighlightManager::update`],
//! which creates, swaps or removes the overlay subset accordingly.

use ifc_pick_model::{ElementRef, HighlightMaterial, OverlayRenderer, SubsetRequest};

/// Current highlight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Idle,
    Highlighted(ElementRef),
}

impl HighlightState {
    pub fn element(&self) -> Option<ElementRef> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Highlighted(element) => Some(*element),
        }
    }
}

/// What an update did to the overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightTransition {
    /// Nothing changed
    Unchanged,
    /// An overlay was created from idle
    Created(ElementRef),
    /// The overlay moved to another element
    Replaced { from: ElementRef, to: ElementRef },
    /// The overlay was removed
    Cleared(ElementRef),
}

impl HighlightTransition {
    pub fn is_change(&self) -> bool {
        !matches!(self, HighlightTransition::Unchanged)
    }
}

/// Owner of the single highlight overlay
#[derive(Debug, Default)]
pub struct HighlightManager {
    state: HighlightState,
    material: HighlightMaterial,
}

impl HighlightManager {
    pub fn new(material: HighlightMaterial) -> Self {
        Self {
            state: HighlightState::Idle,
            material,
        }
    }

    pub fn state(&self) -> HighlightState {
        self.state
    }

    pub fn material(&self) -> &HighlightMaterial {
        &self.material
    }

    /// Move the highlight to `target`, or clear it for `None`
    pub fn update(
        &mut self,
        target: Option<ElementRef>,
        overlay: &mut dyn OverlayRenderer,
    ) -> HighlightTransition {
        let transition = match (self.state, target) {
            (HighlightState::Idle, None) => HighlightTransition::Unchanged,
            (HighlightState::Highlighted(current), Some(next)) if current == next => {
                HighlightTransition::Unchanged
            }
            (HighlightState::Idle, Some(next)) => {
                self.create(next, overlay);
                HighlightTransition::Created(next)
            }
            (HighlightState::Highlighted(current), Some(next)) => {
                self.remove(current, overlay);
                self.create(next, overlay);
                HighlightTransition::Replaced {
                    from: current,
                    to: next,
                }
            }
            (HighlightState::Highlighted(current), None) => {
                self.remove(current, overlay);
                HighlightTransition::Cleared(current)
            }
        };

        self.state = match target {
            Some(element) => HighlightState::Highlighted(element),
            None => HighlightState::Idle,
        };
        transition
    }

    /// Drop the highlight
    pub fn clear(&mut self, overlay: &mut dyn OverlayRenderer) -> HighlightTransition {
        self.update(None, overlay)
    }

    /// Switch material, redrawing the current overlay with it
    pub fn set_material(&mut self, material: HighlightMaterial, overlay: &mut dyn OverlayRenderer) {
        if let HighlightState::Highlighted(current) = self.state {
            self.remove(current, overlay);
            self.material = material;
            self.create(current, overlay);
        } else {
            self.material = material;
        }
    }

    fn create(&self, element: ElementRef, overlay: &mut dyn OverlayRenderer) {
        overlay.create_subset(SubsetRequest {
            model_id: element.model_id,
            ids: vec![element.element_id],
            material: &self.material,
            remove_previous: true,
        });
    }

    fn remove(&self, element: ElementRef, overlay: &mut dyn OverlayRenderer) {
        overlay.remove_subset(element.model_id, &self.material);
    }
}
