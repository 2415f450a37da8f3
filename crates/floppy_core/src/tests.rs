use cgmath::{Deg, InnerSpace, Point3, Quaternion, Rotation3};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::*;

fn id(n: u8) -> PieceId {
    PieceId::from_raw(n)
}
fn ids(ns: &[u8]) -> Vec<PieceId> {
    ns.iter().map(|&n| id(n)).collect()
}

fn assert_near(a: Point3<f64>, b: Point3<f64>) {
    assert!((a - b).magnitude() < 1e-9, "{a:?} != {b:?}");
}

fn pick_pair(cube: &mut FloppyCube, layout: &Layout, a: u32, b: u32) -> PickOutcome {
    cube.on_pick(a, layout);
    cube.on_pick(b, layout)
}

#[test]
fn test_edge_half_turn_scenario() {
    let mut cube = FloppyCube::new();
    let layout = Layout::default();

    let PickOutcome::Resolved(group) = pick_pair(&mut cube, &layout, 2, 1) else {
        panic!("expected group");
    };
    assert_eq!(group.pivot, id(2));
    assert_eq!(group.members.to_vec(), ids(&[2, 1, 3]));

    let before = cube.graph().clone();
    cube.rotate(200.0).unwrap();
    assert_eq!(cube.current_rotation(id(2)), 20.0);
    assert_eq!(cube.current_rotation(id(1)), 20.0);
    assert_eq!(cube.current_rotation(id(3)), 20.0);

    // Exactly one swap of the corners' other parents.
    assert_eq!(cube.piece_topology(id(1)).parents.to_vec(), ids(&[6, 2]));
    assert_eq!(cube.piece_topology(id(3)).parents.to_vec(), ids(&[2, 4]));
    assert_eq!(cube.piece_topology(id(4)).children.to_vec(), ids(&[7, 3]));
    assert_eq!(cube.piece_topology(id(6)).children.to_vec(), ids(&[1, 9]));
    for n in [2, 5, 7, 8, 9] {
        assert_eq!(cube.piece_topology(id(n)), before.topology(id(n)));
    }
    cube.graph().check_invariants().unwrap();
}

#[test]
fn test_full_turn_in_one_call_keeps_links() {
    let mut cube = FloppyCube::new();
    let layout = Layout::default();
    pick_pair(&mut cube, &layout, 4, 7);
    cube.rotate(365.0).unwrap();
    assert_eq!(cube.current_rotation(id(4)), 5.0);
    for piece in PieceId::iter() {
        assert_eq!(cube.piece_topology(piece), PieceGraph::new().topology(piece));
    }
}

#[test]
fn test_layout_agrees_with_links_after_edge_half_turn() {
    let mut cube = FloppyCube::new();
    let mut layout = Layout::default();
    let solved = layout.clone();
    pick_pair(&mut cube, &layout, 2, 1);
    for _ in 0..6 {
        let step = cube.rotate(30.0).unwrap();
        layout.apply_step(&step);
    }

    // Corners traded places along the top row.
    assert_near(layout[id(1)], solved[id(3)]);
    assert_near(layout[id(3)], solved[id(1)]);
    assert_near(layout[id(2)], solved[id(2)]);

    // Corner #1 now sits beside the right arm.
    assert!(cube.graph()[id(1)].has_parent(id(6)));
    assert!(cube.graph()[id(6)].has_child(id(1)));
}

#[test]
fn test_layout_agrees_with_links_after_center_half_turn() {
    let mut cube = FloppyCube::new();
    let mut layout = Layout::default();
    let solved = layout.clone();
    let PickOutcome::Resolved(group) = pick_pair(&mut cube, &layout, 5, 2) else {
        panic!("expected group");
    };
    assert_eq!(group.counter_arms.to_vec(), ids(&[6, 4]));

    let step = cube.rotate(180.0).unwrap();
    layout.apply_step(&step);

    // The vertical column flipped over.
    assert_near(layout[id(2)], solved[id(8)]);
    assert_near(layout[id(8)], solved[id(2)]);
    assert_near(layout[id(1)], solved[id(1)]);

    // Each arm of the column now owns the corners beside it.
    assert_eq!(cube.graph()[id(2)].children(), ids(&[7, 9]));
    assert_eq!(cube.graph()[id(8)].children(), ids(&[3, 1]));
    for n in [6, 4, 1, 3, 7, 9] {
        assert_eq!(cube.current_rotation(id(n)), 0.0);
    }
    cube.graph().check_invariants().unwrap();
}

#[test]
fn test_selection_rejections() {
    let mut cube = FloppyCube::new();
    let layout = Layout::default();

    assert_eq!(cube.on_pick(3, &layout), PickOutcome::Pending(id(3)));
    assert_eq!(cube.on_pick(3, &layout), PickOutcome::Ignored);
    assert_eq!(
        cube.on_pick(7, &layout),
        PickOutcome::Rejected(Rejection::Unrelated(id(3), id(7))),
    );
    assert_eq!(
        cube.on_pick(5, &layout),
        PickOutcome::Rejected(Rejection::Unrelated(id(7), id(5))),
    );
    let outcome = cube.on_pick(8, &layout);
    assert!(matches!(
        outcome,
        PickOutcome::Resolved(group) if group.pivot == PieceId::CENTER,
    ));
    assert!(cube.last_group().is_some());
}

#[test]
fn test_inconsistent_group_is_rejected() {
    let mut cube = FloppyCube::new();
    let layout = Layout::default();
    pick_pair(&mut cube, &layout, 6, 9);
    cube.rotate(45.0).unwrap();
    cube.toggle_picking();
    assert_eq!(cube.current_rotation(id(6)), 45.0);

    // Corner #3 is tilted but edge #2 is not.
    let outcome = pick_pair(&mut cube, &layout, 2, 3);
    assert!(matches!(
        outcome,
        PickOutcome::Rejected(Rejection::InconsistentRotation { pivot, .. }) if pivot == id(2),
    ));
    assert_eq!(cube.last_group(), None);
}

#[test]
fn test_whole_cube_turn_then_drag() {
    let mut cube = FloppyCube::new();
    let mut layout = Layout::default();
    pick_pair(&mut cube, &layout, 8, 9);

    layout.rotate_all(Quaternion::from_angle_z(Deg(-90.0)));
    cube.refresh_axis(&layout);

    // The down arm now points left, so its axis points right, and a
    // vertical drag turns it.
    let drag = ArcballDrag {
        center: cgmath::point2(0.0, 0.0),
        radius: 100.0,
        from: cgmath::point2(0.0, 0.0),
        to: cgmath::point2(0.0, -50.0),
    };
    let step = cube.on_drag(&drag).unwrap();
    assert!((step.angle.abs() - 30.0).abs() < 1e-4, "{}", step.angle);
    assert_eq!(cube.current_rotation(id(8)), step.angle);
}

#[derive(Debug, Clone)]
enum Op {
    Pick(u32),
    Rotate(f64),
    Align,
    Toggle,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..=10_u32).prop_map(Op::Pick),
        4 => (-400.0..400.0_f64).prop_map(Op::Rotate),
        1 => Just(Op::Align),
        1 => Just(Op::Toggle),
    ]
}

fn assert_group_is_rigid(cube: &FloppyCube) {
    let GestureState::RotatingGroup(group) = cube.state() else {
        return;
    };
    let graph = cube.graph();
    let pivot_rotation = graph.rotation(group.pivot);
    for &m in &group.members {
        assert_eq!(graph.rotation(m), pivot_rotation, "member {m} of {group:?}");
    }
    for &arm in &group.counter_arms {
        for &child in graph[arm].children() {
            assert_eq!(graph.rotation(child), graph.rotation(arm), "child {child} of {arm}");
        }
    }
}

proptest! {
    #[test]
    fn proptest_gestures_preserve_invariants(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut cube = FloppyCube::new();
        let layout = Layout::default();
        for op in ops {
            match op {
                Op::Pick(raw) => {
                    cube.on_pick(raw, &layout);
                }
                Op::Rotate(delta) => {
                    cube.rotate(delta);
                }
                Op::Align => {
                    cube.on_align_request();
                }
                Op::Toggle => {
                    cube.toggle_picking();
                }
            }
            cube.graph().check_invariants().unwrap();
            assert_group_is_rigid(&cube);
        }
    }
}
