//! Gesture scripts, which replay a sequence of user interactions.

use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3, point2};
use eyre::{Result, WrapErr, ensure};
use floppy_core::{
    ArcballDrag, FloppyCube, GestureState, Layout, PickOutcome, PieceId, PieceKind,
    RotationGroup, RotationStep, Settings,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Single user interaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScriptEvent {
    /// Click that the frontend resolved to a piece ID, or 0 for background.
    Pick(u32),
    /// Rotation of the active group by an angle in degrees.
    Rotate(f64),
    /// Cursor drag over the arcball, relative to its center. Y points down.
    Drag { from: [f32; 2], to: [f32; 2] },
    /// Rotation of the whole puzzle around its center.
    Spin { axis: [f64; 3], angle: f64 },
    /// Request to align the active group.
    Align,
    /// Mode toggle key.
    Toggle,
}

/// Parses a YAML list of events. Events with data are single-key maps such
/// as `pick: 2`, and events without data are plain strings such as `align`.
pub(crate) fn parse_script(s: &str) -> Result<Vec<ScriptEvent>> {
    let de = serde_norway::Deserializer::from_str(s);
    serde_norway::with::singleton_map_recursive::deserialize(de)
        .wrap_err("error parsing gesture script")
}

/// Effect of a single event.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub(crate) enum EventResult {
    Ignored,
    Pending { piece: PieceId },
    Rejected { reason: String },
    Resolved { group: RotationGroup },
    Moved { steps: Vec<RotationStep> },
    Spun,
}

/// State of a single piece.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct PieceReport {
    pub id: PieceId,
    pub kind: PieceKind,
    pub rotation: f64,
    pub parents: Vec<PieceId>,
    pub children: Vec<PieceId>,
    pub position: [f64; 3],
}
impl PieceReport {
    pub fn all(cube: &FloppyCube, layout: &Layout) -> Vec<Self> {
        PieceId::iter()
            .map(|id| {
                let topology = cube.piece_topology(id);
                PieceReport {
                    id,
                    kind: id.kind(),
                    rotation: cube.current_rotation(id),
                    parents: topology.parents.into_vec(),
                    children: topology.children.into_vec(),
                    position: layout[id].into(),
                }
            })
            .collect_vec()
    }
}

/// Outcome of replaying a whole script.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct ReplayReport {
    pub events: Vec<EventResult>,
    pub state: GestureState,
    pub pieces: Vec<PieceReport>,
}

/// Puzzle plus the piece positions that a frontend would track.
#[derive(Debug)]
pub(crate) struct Replayer {
    cube: FloppyCube,
    layout: Layout,
    arcball_radius: f32,
}
impl Replayer {
    pub fn new(settings: Settings, arcball_radius: f32) -> Self {
        Self {
            cube: FloppyCube::with_settings(settings),
            layout: Layout::default(),
            arcball_radius,
        }
    }

    pub fn apply(&mut self, event: &ScriptEvent) -> Result<EventResult> {
        log::trace!("applying {event:?}");
        Ok(match *event {
            ScriptEvent::Pick(raw) => match self.cube.on_pick(raw, &self.layout) {
                PickOutcome::Ignored => EventResult::Ignored,
                PickOutcome::Pending(piece) => EventResult::Pending { piece },
                PickOutcome::Rejected(rejection) => EventResult::Rejected {
                    reason: rejection.to_string(),
                },
                PickOutcome::Resolved(group) => EventResult::Resolved { group },
            },
            ScriptEvent::Rotate(delta) => {
                ensure!(delta.is_finite(), "rotation angle {delta} is not finite");
                let steps = self.cube.rotate(delta).into_iter().collect();
                self.moved(steps)
            }
            ScriptEvent::Drag { from, to } => {
                let drag = ArcballDrag {
                    center: point2(0.0, 0.0),
                    radius: self.arcball_radius,
                    from: from.into(),
                    to: to.into(),
                };
                let steps = self.cube.on_drag(&drag).into_iter().collect();
                self.moved(steps)
            }
            ScriptEvent::Spin { axis, angle } => {
                let axis = Vector3::from(axis);
                ensure!(
                    axis.magnitude2() > 0.0 && angle.is_finite(),
                    "invalid spin of {angle} around {axis:?}"
                );
                let rot = Quaternion::from_axis_angle(axis.normalize(), Deg(angle));
                self.layout.rotate_all(rot);
                self.cube.refresh_axis(&self.layout);
                EventResult::Spun
            }
            ScriptEvent::Align => {
                let steps = self.cube.on_align_request();
                self.moved(steps)
            }
            ScriptEvent::Toggle => {
                let steps = self.cube.toggle_picking();
                self.moved(steps)
            }
        })
    }

    fn moved(&mut self, steps: Vec<RotationStep>) -> EventResult {
        for step in &steps {
            self.layout.apply_step(step);
        }
        EventResult::Moved { steps }
    }

    pub fn finish(self, events: Vec<EventResult>) -> Result<ReplayReport> {
        self.cube
            .graph()
            .check_invariants()
            .wrap_err("puzzle is in an invalid state")?;
        Ok(ReplayReport {
            events,
            state: self.cube.state().clone(),
            pieces: PieceReport::all(&self.cube, &self.layout),
        })
    }
}

/// Replays a script on a solved puzzle.
pub(crate) fn replay(
    script: &[ScriptEvent],
    settings: Settings,
    arcball_radius: f32,
) -> Result<ReplayReport> {
    let mut replayer = Replayer::new(settings, arcball_radius);
    let events = script
        .iter()
        .enumerate()
        .map(|(i, event)| {
            replayer
                .apply(event)
                .wrap_err_with(|| format!("error in event {i}"))
        })
        .collect::<Result<Vec<_>>>()?;
    replayer.finish(events)
}
