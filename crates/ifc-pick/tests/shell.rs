//! End-to-end picking through the viewer shell with in-memory collaborators

use futures_util::future::{self, BoxFuture, FutureExt};
use ifc_pick::ifc_pick_model::{
    ElementId, ElementIndex, ElementRef, HighlightMaterial, LoadError, MeshData, ModelGeometry,
    ModelId, ModelLoader, ModelMesh, ModelSource, OverlayRenderer, Property, PropertyError,
    PropertySet, PropertySource, SubsetRequest,
};
use ifc_pick::{
    CanvasBounds, DisplayState, HighlightState, HighlightTransition, PropertyDisplay,
    ViewerEvent, ViewerSettings, ViewerShell,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

// Camera at z=10 looking at the origin with a 90 degree field of view on a
// 100x100 canvas: pixel (50 + 5x, 50 - 5y) sees world point (x, y, 0).
const WALL_PX: (f32, f32) = (40.0, 47.5); // world (-2, 0.5)
const SLAB_LOWER_PX: (f32, f32) = (62.5, 52.5); // world (2.5, -0.5)
const SLAB_UPPER_PX: (f32, f32) = (57.5, 47.5); // world (1.5, 0.5)
const EMPTY_PX: (f32, f32) = (50.0, 50.0); // world (0, 0)

#[derive(Debug, PartialEq)]
enum Op {
    Create(ModelId, Vec<ElementId>),
    Remove(ModelId),
}

#[derive(Clone, Default)]
struct OverlayLog(Rc<RefCell<Vec<Op>>>);

impl OverlayRenderer for OverlayLog {
    fn create_subset(&mut self, request: SubsetRequest<'_>) {
        assert!(request.remove_previous);
        self.0.borrow_mut().push(Op::Create(request.model_id, request.ids));
    }

    fn remove_subset(&mut self, model_id: ModelId, _material: &HighlightMaterial) {
        self.0.borrow_mut().push(Op::Remove(model_id));
    }
}

impl OverlayLog {
    fn take(&self) -> Vec<Op> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    /// Overlays alive after replaying the log, checking it never exceeds one
    fn live_overlays(&self) -> usize {
        let mut live = 0usize;
        for op in self.0.borrow().iter() {
            match op {
                Op::Create(..) => live += 1,
                Op::Remove(_) => live = live.saturating_sub(1),
            }
            assert!(live <= 1, "more than one overlay alive");
        }
        live
    }
}

#[derive(Clone, Default)]
struct DisplayLog(Rc<RefCell<Vec<DisplayState>>>);

impl PropertyDisplay for DisplayLog {
    fn show(&mut self, state: &DisplayState) {
        self.0.borrow_mut().push(state.clone());
    }
}

impl DisplayLog {
    fn last(&self) -> Option<DisplayState> {
        self.0.borrow().last().cloned()
    }
}

#[derive(Default)]
struct MemoryLoader {
    files: Mutex<HashMap<String, ModelGeometry>>,
}

impl ModelLoader for MemoryLoader {
    fn load(&self, source: ModelSource) -> BoxFuture<'static, Result<ModelGeometry, LoadError>> {
        let result = self
            .files
            .lock()
            .unwrap()
            .get(&source.file_name)
            .cloned()
            .ok_or_else(|| LoadError::failed(&source.file_name, "not an IFC file"));
        future::ready(result).boxed()
    }
}

#[derive(Default)]
struct MemoryProperties {
    requests: Mutex<Vec<ElementRef>>,
}

impl PropertySource for MemoryProperties {
    fn item_properties(
        &self,
        model_id: ModelId,
        element_id: ElementId,
    ) -> BoxFuture<'static, Result<PropertySet, PropertyError>> {
        let element = ElementRef::new(model_id, element_id);
        self.requests.lock().unwrap().push(element);
        let mut set = PropertySet::new(element).with_type("IFCWALLSTANDARDCASE");
        set.add(Property::new("Name", format!("Wall {}", element_id.0)));
        future::ready(Ok(set)).boxed()
    }
}

fn quad(x0: f32, x1: f32, elements: &[(u32, u32)]) -> ModelMesh {
    let mut index = ElementIndex::builder();
    for &(id, count) in elements {
        index.push(ElementId(id), count);
    }
    ModelMesh::new(Arc::new(MeshData::from_buffers(
        vec![x0, -1.0, 0.0, x1, -1.0, 0.0, x1, 1.0, 0.0, x0, 1.0, 0.0],
        vec![0, 1, 2, 0, 2, 3],
    )))
    .with_index(index.build())
}

struct Harness {
    shell: ViewerShell,
    loader: Arc<MemoryLoader>,
    properties: Arc<MemoryProperties>,
    overlay: OverlayLog,
    display: DisplayLog,
    events: Rc<RefCell<Vec<ViewerEvent>>>,
}

impl Harness {
    fn new() -> Self {
        let mut settings = ViewerSettings::default();
        settings.camera.fov = 90.0;
        settings.camera.position = [0.0, 0.0, 10.0];
        settings.camera.target = [0.0, 0.0, 0.0];

        let loader = Arc::new(MemoryLoader::default());
        {
            let mut files = loader.files.lock().unwrap();
            files.insert("wall.ifc".into(), ModelGeometry::new(vec![quad(-3.0, -1.0, &[(100, 2)])]));
            files.insert(
                "slab.IFCZIP".into(),
                ModelGeometry::new(vec![quad(1.0, 3.0, &[(200, 1), (201, 1)])]),
            );
            files.insert(
                "pending.ifc".into(),
                ModelGeometry::new(vec![ModelMesh::new(Arc::new(MeshData::from_buffers(
                    vec![0.0; 9],
                    vec![0, 1, 2],
                )))]),
            );
        }
        let properties = Arc::new(MemoryProperties::default());
        let overlay = OverlayLog::default();
        let display = DisplayLog::default();

        let mut shell = ViewerShell::new(
            settings,
            loader.clone(),
            properties.clone(),
            Box::new(overlay.clone()),
            Box::new(display.clone()),
        );
        shell.resize(100.0, 100.0);

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        shell.subscribe(move |event| sink.borrow_mut().push(event.clone()));

        Self {
            shell,
            loader,
            properties,
            overlay,
            display,
            events,
        }
    }

    async fn load(&mut self, file_name: &str) -> ModelId {
        let task = self.shell.open_file(file_name, format!("blob:{}", file_name)).unwrap();
        task.await;
        self.shell.update();
        match self.events.borrow().last() {
            Some(ViewerEvent::ModelLoaded { model_id, .. }) => *model_id,
            other => panic!("expected ModelLoaded, got {:?}", other),
        }
    }

    async fn with_models() -> (Self, ModelId, ModelId) {
        let mut harness = Self::new();
        let wall = harness.load("wall.ifc").await;
        let slab = harness.load("slab.IFCZIP").await;
        harness.events.borrow_mut().clear();
        (harness, wall, slab)
    }

    fn requests(&self) -> Vec<ElementRef> {
        self.properties.requests.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_models_get_sequential_ids() {
    let (harness, wall, slab) = Harness::with_models().await;
    assert_eq!(wall, ModelId(0));
    assert_eq!(slab, ModelId(1));
    assert_eq!(harness.shell.registry().len(), 2);
    assert_eq!(
        harness.shell.registry().get(wall).and_then(|m| m.name.clone()),
        Some("wall.ifc".to_string())
    );
    assert!(!harness.shell.is_loading());
}

#[tokio::test]
async fn test_pointer_outside_models_has_no_hits() {
    let (mut harness, _, _) = Harness::with_models().await;
    assert!(harness.shell.cast(EMPTY_PX.0, EMPTY_PX.1).is_empty());
    assert!(harness.shell.cast(2.0, 2.0).is_empty());

    harness.shell.pointer_move(EMPTY_PX.0, EMPTY_PX.1);
    assert_eq!(harness.shell.highlight_state(), HighlightState::Idle);
    assert!(harness.overlay.take().is_empty());
    assert!(harness.events.borrow().is_empty());
}

#[tokio::test]
async fn test_pointer_inside_one_model_hits_it() {
    let (harness, wall, slab) = Harness::with_models().await;

    let hits = harness.shell.cast(WALL_PX.0, WALL_PX.1);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].model_id, wall);
    assert!((hits[0].distance - 104.25_f32.sqrt()).abs() < 1e-3);

    assert_eq!(
        harness.shell.pick(SLAB_LOWER_PX.0, SLAB_LOWER_PX.1),
        Some(ElementRef::new(slab, ElementId(200)))
    );
    assert_eq!(
        harness.shell.pick(SLAB_UPPER_PX.0, SLAB_UPPER_PX.1),
        Some(ElementRef::new(slab, ElementId(201)))
    );
}

#[tokio::test]
async fn test_same_position_twice_does_not_churn() {
    let (mut harness, wall, _) = Harness::with_models().await;
    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    harness.shell.pointer_move(WALL_PX.0 + 1.0, WALL_PX.1);

    assert_eq!(harness.overlay.take(), vec![Op::Create(wall, vec![ElementId(100)])]);
    assert_eq!(harness.events.borrow().len(), 1);
}

#[tokio::test]
async fn test_hover_sequence_across_models() {
    let (mut harness, wall, slab) = Harness::with_models().await;
    let a = ElementRef::new(wall, ElementId(100));
    let b = ElementRef::new(slab, ElementId(201));

    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    harness.shell.pointer_move(SLAB_UPPER_PX.0, SLAB_UPPER_PX.1);
    harness.shell.pointer_move(EMPTY_PX.0, EMPTY_PX.1);

    assert_eq!(
        harness.overlay.take(),
        vec![
            Op::Create(wall, vec![ElementId(100)]),
            Op::Remove(wall),
            Op::Create(slab, vec![ElementId(201)]),
            Op::Remove(slab),
        ]
    );
    assert_eq!(
        *harness.events.borrow(),
        vec![
            ViewerEvent::HighlightChanged(HighlightTransition::Created(a)),
            ViewerEvent::HighlightChanged(HighlightTransition::Replaced { from: a, to: b }),
            ViewerEvent::HighlightChanged(HighlightTransition::Cleared(b)),
        ]
    );
}

#[tokio::test]
async fn test_at_most_one_overlay() {
    let (mut harness, _, _) = Harness::with_models().await;
    let path = [
        WALL_PX,
        SLAB_LOWER_PX,
        SLAB_UPPER_PX,
        SLAB_UPPER_PX,
        EMPTY_PX,
        SLAB_LOWER_PX,
        WALL_PX,
        (0.0, 0.0),
        WALL_PX,
    ];
    for (x, y) in path {
        harness.shell.pointer_move(x, y);
    }
    assert_eq!(harness.overlay.live_overlays(), 1);
    harness.shell.pointer_leave();
    assert_eq!(harness.overlay.live_overlays(), 0);
    assert_eq!(harness.shell.highlight_state(), HighlightState::Idle);
}

#[tokio::test]
async fn test_double_click_empty_space() {
    let (mut harness, _, _) = Harness::with_models().await;
    assert!(harness.shell.double_click(EMPTY_PX.0, EMPTY_PX.1).is_none());
    assert!(harness.requests().is_empty());
    assert_eq!(harness.display.last(), Some(DisplayState::NoSelection));
    assert_eq!(harness.shell.selection(), None);
}

#[tokio::test]
async fn test_double_click_element_requests_once() {
    let (mut harness, wall, _) = Harness::with_models().await;
    let element = ElementRef::new(wall, ElementId(100));

    let task = harness.shell.double_click(WALL_PX.0, WALL_PX.1).unwrap();
    assert_eq!(harness.requests(), vec![element]);
    assert_eq!(harness.shell.selection(), Some(element));
    assert_eq!(
        *harness.events.borrow(),
        vec![ViewerEvent::SelectionChanged(Some(element))]
    );

    // Hovering keeps working while the request is pending
    harness.shell.pointer_move(SLAB_LOWER_PX.0, SLAB_LOWER_PX.1);
    assert!(harness.display.last().is_none());

    task.await;
    assert_eq!(harness.shell.update(), 1);
    match harness.display.last() {
        Some(DisplayState::Properties(set)) => {
            assert_eq!(set.element, element);
            assert_eq!(set.value("Name").and_then(|v| v.as_text()), Some("Wall 100"));
        }
        other => panic!("unexpected display state {:?}", other),
    }
    assert_eq!(harness.requests().len(), 1);
}

#[tokio::test]
async fn test_stale_inspection_is_dropped() {
    let (mut harness, wall, slab) = Harness::with_models().await;

    let first = harness.shell.double_click(WALL_PX.0, WALL_PX.1).unwrap();
    let second = harness.shell.double_click(SLAB_LOWER_PX.0, SLAB_LOWER_PX.1).unwrap();

    second.await;
    harness.shell.update();
    first.await;
    harness.shell.update();

    let shown: Vec<ElementRef> = harness
        .display
        .0
        .borrow()
        .iter()
        .filter_map(|state| match state {
            DisplayState::Properties(set) => Some(set.element),
            _ => None,
        })
        .collect();
    assert_eq!(shown, vec![ElementRef::new(slab, ElementId(200))]);
    assert_eq!(harness.requests()[0], ElementRef::new(wall, ElementId(100)));

    // An empty-space double-click also supersedes a pending request
    let pending = harness.shell.double_click(WALL_PX.0, WALL_PX.1).unwrap();
    assert!(harness.shell.double_click(EMPTY_PX.0, EMPTY_PX.1).is_none());
    pending.await;
    harness.shell.update();
    assert_eq!(harness.display.last(), Some(DisplayState::NoSelection));
}

#[tokio::test]
async fn test_open_file_rejects_unsupported_extension() {
    let mut harness = Harness::new();
    let err = harness.shell.open_file("plan.dwg", "blob:plan").err().unwrap();
    assert_eq!(err, LoadError::UnsupportedFormat("plan.dwg".into()));
    assert!(!harness.shell.is_loading());
    assert!(harness.events.borrow().is_empty());
}

#[tokio::test]
async fn test_load_failure_keeps_existing_models() {
    let (mut harness, _, _) = Harness::with_models().await;

    let task = harness.shell.open_file("broken.ifcXML", "blob:broken").unwrap();
    assert!(harness.shell.is_loading());
    task.await;
    harness.shell.update();

    assert!(!harness.shell.is_loading());
    assert_eq!(harness.shell.registry().len(), 2);
    let events = harness.events.borrow();
    assert!(matches!(events.first(), Some(ViewerEvent::LoadStarted(source)) if source.file_name == "broken.ifcXML"));
    assert_eq!(
        events.last(),
        Some(&ViewerEvent::LoadFailed(
            "Failed to load broken.ifcXML: not an IFC file".to_string()
        ))
    );
}

#[tokio::test]
async fn test_unindexed_model_is_not_published() {
    let mut harness = Harness::new();
    let task = harness.shell.open_file("pending.ifc", "blob:pending").unwrap();
    task.await;
    harness.shell.update();

    assert!(harness.shell.registry().is_empty());
    assert!(matches!(
        harness.events.borrow().last(),
        Some(ViewerEvent::LoadFailed(_))
    ));
    assert!(harness.loader.files.lock().unwrap().contains_key("pending.ifc"));
}

#[tokio::test]
async fn test_disabled_picking_clears_and_ignores_input() {
    let (mut harness, wall, _) = Harness::with_models().await;
    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    harness.shell.set_picking_enabled(false);

    assert_eq!(
        harness.overlay.take(),
        vec![Op::Create(wall, vec![ElementId(100)]), Op::Remove(wall)]
    );
    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    assert!(harness.shell.double_click(WALL_PX.0, WALL_PX.1).is_none());
    assert!(harness.overlay.take().is_empty());
    assert!(harness.requests().is_empty());
}

#[tokio::test]
async fn test_pointer_leave_can_keep_highlight() {
    let (mut harness, _, _) = Harness::with_models().await;
    let mut settings = harness.shell.settings().clone();
    settings.picking.clear_on_pointer_leave = false;

    let overlay = OverlayLog::default();
    let mut shell = ViewerShell::new(
        settings,
        harness.loader.clone(),
        harness.properties.clone(),
        Box::new(overlay.clone()),
        Box::new(DisplayLog::default()),
    );
    shell.resize(100.0, 100.0);
    let task = shell.open_file("wall.ifc", "blob:wall").unwrap();
    task.await;
    shell.update();

    shell.pointer_move(WALL_PX.0, WALL_PX.1);
    shell.pointer_leave();
    assert_eq!(overlay.live_overlays(), 1);

    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    harness.shell.pointer_leave();
    assert_eq!(harness.overlay.live_overlays(), 0);
}

#[tokio::test]
async fn test_canvas_offset_is_respected() {
    let (mut harness, wall, _) = Harness::with_models().await;
    harness
        .shell
        .set_canvas_bounds(CanvasBounds::new(200.0, 100.0, 300.0, 200.0));
    assert_eq!(harness.shell.pick(WALL_PX.0, WALL_PX.1), None);
    assert_eq!(
        harness.shell.pick(WALL_PX.0 + 200.0, WALL_PX.1 + 100.0),
        Some(ElementRef::new(wall, ElementId(100)))
    );

    harness.shell.resize(0.0, 0.0);
    assert!(harness.shell.cast(200.0, 100.0).is_empty());
}

#[tokio::test]
async fn test_remove_model_drops_its_highlight() {
    let (mut harness, wall, slab) = Harness::with_models().await;
    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    harness.overlay.take();

    assert!(harness.shell.remove_model(wall));
    assert_eq!(harness.overlay.take(), vec![Op::Remove(wall)]);
    assert_eq!(harness.shell.pick(WALL_PX.0, WALL_PX.1), None);
    assert!(harness.shell.registry().get(slab).is_some());
    assert!(!harness.shell.remove_model(wall));
}

#[tokio::test]
async fn test_remove_model_drops_pending_inspection() {
    let (mut harness, wall, _) = Harness::with_models().await;
    let pending = harness.shell.double_click(WALL_PX.0, WALL_PX.1).unwrap();

    assert!(harness.shell.remove_model(wall));
    assert_eq!(harness.shell.selection(), None);
    assert_eq!(harness.display.last(), Some(DisplayState::NoSelection));

    pending.await;
    harness.shell.update();
    assert_eq!(harness.display.last(), Some(DisplayState::NoSelection));
    assert_eq!(harness.requests().len(), 1);
}

#[tokio::test]
async fn test_unsubscribe_stops_events() {
    let (mut harness, _, _) = Harness::with_models().await;
    let count = Rc::new(RefCell::new(0));
    let counter = count.clone();
    let id = harness.shell.subscribe(move |_| *counter.borrow_mut() += 1);

    harness.shell.pointer_move(WALL_PX.0, WALL_PX.1);
    assert!(harness.shell.unsubscribe(id));
    harness.shell.pointer_move(EMPTY_PX.0, EMPTY_PX.1);

    assert_eq!(*count.borrow(), 1);
    assert!(!harness.shell.unsubscribe(id));
}
