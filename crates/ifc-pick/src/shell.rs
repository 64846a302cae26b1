//! Viewer shell
//!
//! Owns everything the picking path needs and exposes it to the host as a
//! small set of input methods plus an event subscription. The host forwards
//! pointer and file-input events, drives the returned tasks on its executor,
//! and calls [`ViewerShell::update`] once per frame to apply whatever those
//! tasks have finished.

use crate::camera::Camera;
use crate::display::{DisplayState, PropertyDisplay};
use crate::highlight::{HighlightManager, HighlightState, HighlightTransition};
use crate::inspector::{InspectionCompletion, SelectionInspector};
use crate::raycast::{CanvasBounds, Hit, RayCaster};
use crate::registry::ModelRegistry;
use crate::resolver::resolve_nearest;
use crate::settings::ViewerSettings;
use futures_util::future::{BoxFuture, FutureExt};
use ifc_pick_model::{
    ElementRef, IfcFileKind, LoadError, ModelGeometry, ModelId, ModelLoader, ModelSource,
    OverlayRenderer, PropertySource,
};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Background work handed to the host; resolves once its result is queued
pub type ShellTask = BoxFuture<'static, ()>;

/// Something the host may want to react to
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    /// The hover highlight moved, appeared or disappeared
    HighlightChanged(HighlightTransition),
    /// A double-click changed the selected element
    SelectionChanged(Option<ElementRef>),
    /// A file was accepted and handed to the loader
    LoadStarted(ModelSource),
    /// A model was published and can be picked
    ModelLoaded {
        model_id: ModelId,
        name: Option<String>,
    },
    /// Loading failed; loaded models are untouched
    LoadFailed(String),
}

/// Handle returned by [`ViewerShell::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ViewerEvent)>;

/// Results sent back from background tasks
enum Completion {
    Load {
        source: ModelSource,
        result: Result<ModelGeometry, LoadError>,
    },
    Inspection(InspectionCompletion),
}

/// Picking core wired to its collaborators
pub struct ViewerShell {
    settings: ViewerSettings,
    camera: Camera,
    canvas: CanvasBounds,
    registry: ModelRegistry,
    ray_caster: RayCaster,
    highlight: HighlightManager,
    inspector: SelectionInspector,
    loader: Arc<dyn ModelLoader>,
    overlay: Box<dyn OverlayRenderer>,
    display: Box<dyn PropertyDisplay>,
    selection: Option<ElementRef>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    pending_loads: usize,
}

impl ViewerShell {
    pub fn new(
        settings: ViewerSettings,
        loader: Arc<dyn ModelLoader>,
        properties: Arc<dyn PropertySource>,
        overlay: Box<dyn OverlayRenderer>,
        display: Box<dyn PropertyDisplay>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            camera: Camera::from_settings(&settings.camera, 1.0),
            canvas: CanvasBounds::default(),
            registry: ModelRegistry::new(),
            ray_caster: RayCaster::from_settings(&settings.picking),
            highlight: HighlightManager::new(settings.picking.highlight.clone()),
            inspector: SelectionInspector::new(properties),
            loader,
            overlay,
            display,
            selection: None,
            subscribers: Vec::new(),
            next_subscription: 0,
            tx,
            rx,
            pending_loads: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera access for the host's navigation controls
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn canvas_bounds(&self) -> CanvasBounds {
        self.canvas
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn highlight_state(&self) -> HighlightState {
        self.highlight.state()
    }

    /// Element picked by the last double-click
    pub fn selection(&self) -> Option<ElementRef> {
        self.selection
    }

    /// Whether any model load is still running
    pub fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    /// Register an event callback
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ViewerEvent) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove an event callback, returning whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Place the canvas on screen and match the camera aspect to it
    pub fn set_canvas_bounds(&mut self, bounds: CanvasBounds) {
        self.canvas = bounds;
        self.camera.set_viewport(bounds.width(), bounds.height());
    }

    /// Viewport resized; the canvas keeps its top-left corner
    pub fn resize(&mut self, width: f32, height: f32) {
        let left = self.canvas.left;
        let top = self.canvas.top;
        self.set_canvas_bounds(CanvasBounds::new(left, top, left + width, top + height));
    }

    /// Enable or disable picking; disabling drops the highlight
    pub fn set_picking_enabled(&mut self, enabled: bool) {
        self.settings.picking.enabled = enabled;
        if !enabled {
            self.clear_highlight();
        }
    }

    /// All hits under a client position, nearest first
    pub fn cast(&self, client_x: f32, client_y: f32) -> Vec<Hit> {
        self.ray_caster.cast(
            client_x,
            client_y,
            &self.canvas,
            &self.camera,
            self.registry.models(),
        )
    }

    /// Element under a client position
    pub fn pick(&self, client_x: f32, client_y: f32) -> Option<ElementRef> {
        resolve_nearest(&self.cast(client_x, client_y), &self.registry)
    }

    /// Pointer moved over the canvas
    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        if !self.settings.picking.enabled {
            self.clear_highlight();
            return;
        }
        let target = self.pick(client_x, client_y);
        let transition = self.highlight.update(target, self.overlay.as_mut());
        self.emit_highlight(transition);
    }

    /// Pointer left the canvas
    pub fn pointer_leave(&mut self) {
        if self.settings.picking.clear_on_pointer_leave {
            self.clear_highlight();
        }
    }

    /// Double-click on the canvas
    ///
    /// Empty space shows the no-selection state right away and returns
    /// `None`. Otherwise one property request is issued; the returned task
    /// must be driven by the host and its result is shown on a later
    /// [`update`](Self::update).
    pub fn double_click(&mut self, client_x: f32, client_y: f32) -> Option<ShellTask> {
        if !self.settings.picking.enabled {
            return None;
        }
        let target = self.pick(client_x, client_y);
        if target != self.selection {
            self.selection = target;
            self.emit(ViewerEvent::SelectionChanged(target));
        }

        let Some(task) = self.inspector.inspect(target) else {
            self.display.show(&DisplayState::NoSelection);
            return None;
        };
        let tx = self.tx.clone();
        Some(
            async move {
                let completion = task.await;
                if tx.send(Completion::Inspection(completion)).is_err() {
                    log::debug!("[Inspector] Viewer dropped before properties arrived");
                }
            }
            .boxed(),
        )
    }

    /// File chosen in the file input
    ///
    /// Fails right away for files that are not an accepted IFC flavour.
    pub fn open_file(
        &mut self,
        file_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<ShellTask, LoadError> {
        let file_name = file_name.into();
        let kind = IfcFileKind::from_file_name(&file_name)
            .filter(|kind| self.settings.accepts(*kind))
            .ok_or_else(|| LoadError::UnsupportedFormat(file_name.clone()))?;

        let source = ModelSource {
            file_name,
            url: url.into(),
            kind,
        };
        log::debug!("[Loader] Loading {} as {}", source.file_name, kind);
        self.pending_loads += 1;
        self.emit(ViewerEvent::LoadStarted(source.clone()));

        let request = self.loader.load(source.clone());
        let tx = self.tx.clone();
        Ok(async move {
            let result = request.await;
            if tx.send(Completion::Load { source, result }).is_err() {
                log::debug!("[Loader] Viewer dropped before load finished");
            }
        }
        .boxed())
    }

    /// Remove a model, dropping highlight and selection that point into it
    pub fn remove_model(&mut self, model_id: ModelId) -> bool {
        if self.registry.remove(model_id).is_none() {
            return false;
        }
        if self.highlight.state().element().map(|e| e.model_id) == Some(model_id) {
            self.clear_highlight();
        }
        if self.selection.map(|e| e.model_id) == Some(model_id) {
            self.selection = None;
            self.emit(ViewerEvent::SelectionChanged(None));
            self.inspector.reset();
            self.display.show(&DisplayState::NoSelection);
        }
        true
    }

    /// Apply finished background work
    ///
    /// Returns the number of completions processed.
    pub fn update(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(completion) = self.rx.try_recv() {
            processed += 1;
            match completion {
                Completion::Load { source, result } => self.finish_load(source, result),
                Completion::Inspection(completion) => {
                    if let Some(state) = self.inspector.accept(completion) {
                        self.display.show(&state);
                    }
                }
            }
        }
        processed
    }

    fn finish_load(&mut self, source: ModelSource, result: Result<ModelGeometry, LoadError>) {
        self.pending_loads = self.pending_loads.saturating_sub(1);

        let published = result.and_then(|mut geometry| {
            geometry.name.get_or_insert_with(|| source.file_name.clone());
            self.registry.publish(geometry)
        });
        match published {
            Ok(model_id) => {
                let name = self.registry.get(model_id).and_then(|m| m.name.clone());
                log::debug!("[Loader] {} loaded as {}", source.file_name, model_id);
                self.emit(ViewerEvent::ModelLoaded { model_id, name });
            }
            Err(err) => {
                log::warn!("[Loader] {}", err);
                self.emit(ViewerEvent::LoadFailed(err.to_string()));
            }
        }
    }

    fn clear_highlight(&mut self) {
        let transition = self.highlight.clear(self.overlay.as_mut());
        self.emit_highlight(transition);
    }

    fn emit_highlight(&mut self, transition: HighlightTransition) {
        if transition.is_change() {
            self.emit(ViewerEvent::HighlightChanged(transition));
        }
    }

    fn emit(&mut self, event: ViewerEvent) {
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }
}

impl std::fmt::Debug for ViewerShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerShell")
            .field("settings", &self.settings)
            .field("camera", &self.camera)
            .field("canvas", &self.canvas)
            .field("models", &self.registry.len())
            .field("highlight", &self.highlight.state())
            .field("selection", &self.selection)
            .field("pending_loads", &self.pending_loads)
            .finish_non_exhaustive()
    }
}
