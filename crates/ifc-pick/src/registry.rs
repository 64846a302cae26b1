//! Registry of published models
//!
//! Models enter the registry only once the loader has handed over fully
//! indexed geometry. Publishing builds the triangle hierarchy of every mesh;
//! from then on models are shared read-only with the ray caster and the
//! resolver.

use crate::bvh::TriangleBvh;
use ifc_pick_model::{LoadError, ModelGeometry, ModelId, ModelMesh};
use nalgebra::Matrix4;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Per-mesh data precomputed for ray casting
#[derive(Clone, Debug)]
pub struct PickMesh {
    /// World-to-local transform
    pub local_from_world: Matrix4<f32>,
    /// Triangle hierarchy in mesh-local coordinates
    pub bvh: TriangleBvh,
}

impl PickMesh {
    /// Precompute pick data, `None` for meshes without triangles or with
    /// singular transforms
    fn prepare(mesh: &ModelMesh) -> Option<Self> {
        let local_from_world = Matrix4::from_column_slice(&mesh.transform).try_inverse()?;
        let bvh = TriangleBvh::build(&mesh.mesh)?;
        Some(Self {
            local_from_world,
            bvh,
        })
    }
}

/// A model as held by the registry
#[derive(Debug)]
pub struct LoadedModel {
    pub id: ModelId,
    /// Display name (usually the file name)
    pub name: Option<String>,
    /// Meshes as handed over by the loader
    pub meshes: Vec<ModelMesh>,
    /// Pick data per mesh, `None` for meshes that cannot be hit
    pick: Vec<Option<PickMesh>>,
}

impl LoadedModel {
    pub(crate) fn new(id: ModelId, geometry: ModelGeometry) -> Self {
        let pick = geometry
            .meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| {
                let prepared = PickMesh::prepare(mesh);
                if prepared.is_none() && !mesh.mesh.is_empty() {
                    log::warn!(
                        "[Registry] {} mesh {} has a singular transform or no valid triangles, not pickable",
                        id,
                        i
                    );
                }
                prepared
            })
            .collect();
        Self {
            id,
            name: geometry.name,
            meshes: geometry.meshes,
            pick,
        }
    }

    /// Meshes that can be hit, with their index in the model
    pub fn pickable_meshes(&self) -> impl Iterator<Item = (usize, &ModelMesh, &PickMesh)> {
        self.meshes
            .iter()
            .zip(&self.pick)
            .enumerate()
            .filter_map(|(i, (mesh, pick))| pick.as_ref().map(|p| (i, mesh, p)))
    }

    pub fn mesh(&self, index: usize) -> Option<&ModelMesh> {
        self.meshes.get(index)
    }
}

/// Published models in load order
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Arc<LoadedModel>>,
    by_id: FxHashMap<ModelId, usize>,
    next_id: u32,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a model and assign it the next id
    ///
    /// Geometry whose meshes lack an element index is rejected, so a
    /// partially indexed model is never visible to picking.
    pub fn publish(&mut self, geometry: ModelGeometry) -> Result<ModelId, LoadError> {
        if !geometry.is_fully_indexed() {
            return Err(LoadError::IndexNotBuilt);
        }
        let id = ModelId(self.next_id);
        self.next_id += 1;

        let model = LoadedModel::new(id, geometry);
        log::debug!(
            "[Registry] Published {} ({} meshes, {} triangles)",
            id,
            model.meshes.len(),
            model.meshes.iter().map(ModelMesh::triangle_count).sum::<usize>()
        );
        self.by_id.insert(id, self.models.len());
        self.models.push(Arc::new(model));
        Ok(id)
    }

    /// Remove a model, returning it if it was registered
    pub fn remove(&mut self, id: ModelId) -> Option<Arc<LoadedModel>> {
        let pos = self.by_id.remove(&id)?;
        let model = self.models.remove(pos);
        for slot in self.by_id.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(model)
    }

    pub fn get(&self, id: ModelId) -> Option<&Arc<LoadedModel>> {
        self.by_id.get(&id).and_then(|&i| self.models.get(i))
    }

    /// All models in load order
    pub fn models(&self) -> &[Arc<LoadedModel>] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
