#![forbid(unsafe_code)]

//! End-to-end behavior of the history tree with concrete domains.

use std::cell::RefCell;
use std::rc::Rc;

use tessera_history::{
    Change, Delta, DragSession, EditContext, FocusedFirst, HistoryConfig, HistoryGroup,
    HistoryManager, HistoryStack, LogicalClock, SnapshotRestore, Timestamp, TimestampOnly,
    shared,
};

// ============================================================================
// Domains
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Vertices {
    positions: Vec<[f32; 3]>,
}

impl EditContext for Vertices {
    type Snapshot = Vec<[f32; 3]>;

    fn snapshot(&self) -> Self::Snapshot {
        self.positions.clone()
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) {
        self.positions.clone_from(snapshot);
    }

    fn is_different(a: &Self::Snapshot, b: &Self::Snapshot) -> bool {
        a != b
    }
}

#[derive(Debug)]
struct MoveVertex {
    index: usize,
    old: [f32; 3],
    new: [f32; 3],
}

impl Delta<Vertices> for MoveVertex {
    fn apply(&self, context: &mut Vertices) {
        context.positions[self.index] = self.new;
    }

    fn revert(&self, context: &mut Vertices) {
        context.positions[self.index] = self.old;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Camera {
    distance: f32,
}

impl EditContext for Camera {
    type Snapshot = Camera;

    fn snapshot(&self) -> Camera {
        *self
    }

    fn restore(&mut self, snapshot: &Camera) {
        *self = *snapshot;
    }

    fn is_different(a: &Camera, b: &Camera) -> bool {
        (a.distance - b.distance).abs() > 1e-5
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Meshes {
    names: Vec<String>,
}

impl EditContext for Meshes {
    type Snapshot = Vec<String>;

    fn snapshot(&self) -> Vec<String> {
        self.names.clone()
    }

    fn restore(&mut self, snapshot: &Vec<String>) {
        self.names.clone_from(snapshot);
    }

    fn is_different(a: &Vec<String>, b: &Vec<String>) -> bool {
        a != b
    }
}

fn vertices() -> Vertices {
    Vertices {
        positions: vec![[0.0; 3]; 4],
    }
}

fn move_vertex_3(stack: &HistoryStack<Vertices>) {
    let old = stack.context().borrow().positions[3];
    let new = [old[0] + 1.0, old[1], old[2]];
    stack.execute(
        Change::delta(MoveVertex { index: 3, old, new }),
        "move vertex 3 by (1,0,0)",
    );
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn push_undo_redo_single_stack() {
    let stack = HistoryStack::standalone("VertexEdit", "Vertex Edit", shared(vertices()));
    move_vertex_3(&stack);
    assert!(stack.can_undo());
    assert!(!stack.can_redo());

    assert!(stack.undo());
    assert_eq!(stack.context().borrow().positions[3], [0.0, 0.0, 0.0]);
    assert!(!stack.can_undo());
    assert!(stack.can_redo());

    assert!(stack.redo());
    assert_eq!(stack.context().borrow().positions[3], [1.0, 0.0, 0.0]);
    assert_eq!(stack.cursor(), 1);
}

#[test]
fn new_edit_after_undo_discards_branch() {
    let stack = HistoryStack::standalone("VertexEdit", "Vertex Edit", shared(vertices()));
    move_vertex_3(&stack);
    stack.undo();
    assert_eq!(stack.cursor(), 0);

    let before = stack.context().borrow().snapshot();
    let after: Vec<_> = before.iter().map(|p| p.map(|c| c * 2.0)).collect();
    stack.execute(Change::snapshot(before, after), "scale selection");

    assert_eq!(stack.len(), 1);
    assert_eq!(stack.undo_descriptions(10), vec!["scale selection"]);
}

#[test]
fn timestamp_group_undoes_most_recent_domain() {
    let clock = LogicalClock::new();
    let vertex = HistoryStack::new("VertexEdit", "Vertex Edit", shared(vertices()), &clock);
    let camera = HistoryStack::new("Camera", "Camera", shared(Camera { distance: 5.0 }), &clock);
    let group = HistoryGroup::new("Window", "Window").with_policy(TimestampOnly);
    group.add_child(&vertex).unwrap();
    group.add_child(&camera).unwrap();

    clock.advance_to(4);
    move_vertex_3(&vertex);
    clock.advance_to(6);
    camera.context().borrow_mut().distance = 8.0;
    camera.record(
        Change::snapshot(Camera { distance: 5.0 }, Camera { distance: 8.0 }),
        "Dolly",
    );
    assert_eq!(vertex.last_edit_timestamp(), Some(Timestamp(5)));
    assert_eq!(camera.last_edit_timestamp(), Some(Timestamp(7)));

    assert!(group.perform_undo());
    assert_eq!(camera.context().borrow().distance, 5.0);
    assert!(vertex.can_undo());
    assert_eq!(vertex.context().borrow().positions[3], [1.0, 0.0, 0.0]);
}

#[test]
fn drag_back_to_start_records_nothing() {
    let stack = HistoryStack::standalone("VertexEdit", "Vertex Edit", shared(vertices()));
    let mut drag = DragSession::new(&stack);
    drag.begin_drag();
    stack.context().borrow_mut().positions[1] = [3.0, 2.0, 1.0];
    stack.context().borrow_mut().positions[1] = [0.0, 0.0, 0.0];
    assert_eq!(drag.end_drag("noop"), None);
    assert!(stack.is_empty());
}

#[test]
fn linked_record_restores_both_domains_in_order() {
    let meshes = shared(Meshes {
        names: vec!["Body".into()],
    });
    let camera = shared(Camera { distance: 5.0 });
    let stack = HistoryStack::standalone("MeshList", "Mesh List", Rc::clone(&meshes));

    let order = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&order);
    stack.on_navigate(move |info| log.borrow_mut().push(info.direction));

    meshes.borrow_mut().names.push("Head".into());
    camera.borrow_mut().distance = 2.0;
    stack.record(
        Change::snapshot(vec!["Body".into()], vec!["Body".into(), "Head".into()]).with_auxiliary(
            SnapshotRestore::new(Rc::clone(&camera), Camera { distance: 5.0 }, Camera {
                distance: 2.0,
            }),
        ),
        "Add mesh and frame it",
    );

    assert!(stack.undo());
    assert_eq!(meshes.borrow().names, vec!["Body"]);
    assert_eq!(camera.borrow().distance, 5.0);

    assert!(stack.redo());
    assert_eq!(meshes.borrow().names, vec!["Body", "Head"]);
    assert_eq!(camera.borrow().distance, 2.0);

    assert!(stack.undo());
    assert_eq!(meshes.borrow().names, vec!["Body"]);
    assert_eq!(camera.borrow().distance, 5.0);
    assert_eq!(order.borrow().len(), 3);
}

// ============================================================================
// Tree management
// ============================================================================

#[test]
fn detached_tool_window_is_unreachable() {
    let manager = HistoryManager::new(HistoryConfig::default());
    let window = manager.new_stack("VertexEdit", "Vertex Edit", shared(vertices()));
    manager.add_child(&window).unwrap();
    let tools = manager.new_group("Tools", "Tools").with_policy(FocusedFirst);
    manager.add_child(&tools).unwrap();

    let sculpt_group = manager.new_group("Sculpt", "Sculpt");
    let sculpt = manager.new_stack("SculptBrush", "Brush", shared(Camera { distance: 1.0 }));
    sculpt_group.add_child(&sculpt).unwrap();
    manager.attach_to("Tools", &sculpt_group).unwrap();
    manager.focus("Tools", "Sculpt").unwrap();

    move_vertex_3(&window);
    sculpt.execute(
        Change::snapshot(Camera { distance: 1.0 }, Camera { distance: 3.0 }),
        "Brush size",
    );
    assert_eq!(manager.peek_undo().unwrap().description, "Brush size");

    manager.detach("Sculpt").unwrap();
    assert_eq!(tools.focused_child_id(), None);
    assert!(manager.find_by_id("SculptBrush").is_none());

    assert!(manager.undo());
    assert_eq!(window.context().borrow().positions[3], [0.0, 0.0, 0.0]);
    assert!(!manager.undo());
    assert_eq!(sculpt.context().borrow().distance, 3.0);
}

#[test]
fn focused_tool_owns_undo_until_exhausted() {
    let manager = HistoryManager::default();
    let tools = manager.new_group("Tools", "Tools");
    manager.add_child(&tools).unwrap();
    let sculpt = manager.new_stack("Sculpt", "Sculpt", shared(Camera { distance: 0.0 }));
    let paint = manager.new_stack("Paint", "Paint", shared(Camera { distance: 0.0 }));
    tools.add_child(&sculpt).unwrap();
    tools.add_child(&paint).unwrap();

    let bump = |stack: &HistoryStack<Camera>, to: f32| {
        let before = stack.context().borrow().snapshot();
        stack.execute(Change::snapshot(before, Camera { distance: to }), "bump");
    };
    bump(&sculpt, 1.0);
    bump(&paint, 1.0);
    bump(&sculpt, 2.0);
    tools.focus("Paint").unwrap();

    assert!(manager.undo());
    assert!(!paint.can_undo());
    assert_eq!(sculpt.undo_depth(), 2);

    assert!(manager.undo());
    assert!(manager.undo());
    assert!(!manager.can_undo());
    assert!(!manager.undo());
}

#[test]
fn max_depth_from_config_applies_to_manager_stacks() {
    let manager = HistoryManager::new(HistoryConfig::default().with_max_depth(3));
    let stack = manager.new_stack("VertexEdit", "Vertex Edit", shared(vertices()));
    manager.add_child(&stack).unwrap();
    for _ in 0..5 {
        move_vertex_3(&stack);
    }
    assert_eq!(stack.len(), 3);
    while manager.undo() {}
    assert_eq!(stack.context().borrow().positions[3], [2.0, 0.0, 0.0]);
}

#[test]
fn squashed_group_undoes_as_one_global_step() {
    let manager = HistoryManager::default();
    let stack = manager.new_stack("VertexEdit", "Vertex Edit", shared(vertices()));
    manager.add_child(&stack).unwrap();

    stack.begin_group("Nudge x3");
    for _ in 0..3 {
        move_vertex_3(&stack);
    }
    stack.squash_group();

    assert!(manager.undo());
    assert_eq!(stack.context().borrow().positions[3], [0.0, 0.0, 0.0]);
    assert!(!manager.can_undo());
    assert!(manager.redo());
    assert_eq!(stack.context().borrow().positions[3], [3.0, 0.0, 0.0]);
}

#[test]
fn dirty_state_survives_global_navigation() {
    let manager = HistoryManager::default();
    let stack = manager.new_stack("VertexEdit", "Vertex Edit", shared(vertices()));
    manager.add_child(&stack).unwrap();
    move_vertex_3(&stack);
    stack.mark_clean();
    move_vertex_3(&stack);
    assert!(stack.is_dirty());
    manager.undo();
    assert!(!stack.is_dirty());
}
