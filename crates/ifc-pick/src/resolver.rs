//! Hit to element resolution

use crate::raycast::Hit;
use crate::registry::{LoadedModel, ModelRegistry};
use ifc_pick_model::{ElementRef, NotFoundReason, PickError, Result};

/// Resolve a hit against the model that produced it
pub fn resolve_in(hit: &Hit, model: &LoadedModel) -> Result<ElementRef> {
    let not_found = |reason| PickError::not_found(hit.model_id, hit.mesh, hit.triangle_index, reason);

    let mesh = model
        .mesh(hit.mesh)
        .ok_or_else(|| not_found(NotFoundReason::UnknownMesh))?;
    let index = mesh
        .element_index
        .as_ref()
        .ok_or_else(|| not_found(NotFoundReason::IndexNotBuilt))?;
    let element_id = index
        .element_at(hit.triangle_index)
        .ok_or_else(|| not_found(NotFoundReason::TriangleOutOfRange))?;

    Ok(ElementRef::new(model.id, element_id))
}

/// Resolve a hit through the registry
pub fn resolve(hit: &Hit, registry: &ModelRegistry) -> Result<ElementRef> {
    let model = registry.get(hit.model_id).ok_or_else(|| {
        PickError::not_found(
            hit.model_id,
            hit.mesh,
            hit.triangle_index,
            NotFoundReason::UnknownModel,
        )
    })?;
    resolve_in(hit, model)
}

/// Resolve the nearest hit, treating a missing mapping as no hit
pub fn resolve_nearest(hits: &[Hit], registry: &ModelRegistry) -> Option<ElementRef> {
    let hit = hits.first()?;
    match resolve(hit, registry) {
        Ok(element) => Some(element),
        Err(err) => {
            log::trace!("[Resolver] {}", err);
            None
        }
    }
}
