use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use serde::Serialize;
use smallvec::SmallVec;

use crate::group::{self, RotationGroup};
use crate::{
    ArcballDrag, DEFAULT_SNAP_TOLERANCE, InvalidPieceId, PieceGraph, PieceId, PiecePositions,
    PieceTopology, Rejection, TopologyError,
};

/// Tunable interaction behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Distance in degrees from a neutral orientation within which a piece
    /// snaps into alignment.
    pub snap_tolerance: f64,
    /// Multiplier applied to the angle of each drag.
    pub drag_sensitivity: f64,
    /// Whether to align the current group when toggling picking mode.
    pub realign_on_toggle: bool,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            drag_sensitivity: 1.0,
            realign_on_toggle: true,
        }
    }
}

/// What the user is currently doing with the puzzle.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GestureState {
    /// Picking is disabled and there is no group to rotate.
    Idle,
    /// Waiting for the user to pick two pieces.
    Selecting {
        /// Most recent pick, which pairs with the next one.
        pending: Option<PieceId>,
    },
    /// Drags rotate this group.
    RotatingGroup(RotationGroup),
}

/// Result of picking a piece.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// Pick was ignored.
    Ignored,
    /// Pick was recorded and awaits a second one.
    Pending(PieceId),
    /// Pair of picks did not form a rotation group.
    Rejected(Rejection),
    /// Pair of picks formed a rotation group, which is now active.
    Resolved(RotationGroup),
}

/// Visual rotation for the frontend to apply to its piece transforms.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RotationStep {
    /// Piece whose position is the center of rotation.
    pub pivot: PieceId,
    /// Pieces to rotate.
    pub pieces: SmallVec<[PieceId; 3]>,
    /// Angle in degrees.
    pub angle: f64,
    /// Axis of rotation, or `None` if it was degenerate.
    pub axis: Option<Vector3<f64>>,
}
impl RotationStep {
    /// Returns the rotation as a quaternion, or `None` if there is no valid
    /// axis.
    pub fn quaternion(&self) -> Option<Quaternion<f64>> {
        let axis = self.axis?;
        self.angle
            .is_finite()
            .then(|| Quaternion::from_axis_angle(axis, Deg(self.angle)))
    }
}

/// Floppy cube with gesture handling.
#[derive(Debug, Clone, PartialEq)]
pub struct FloppyCube {
    graph: PieceGraph,
    state: GestureState,
    last_group: Option<RotationGroup>,
    settings: Settings,
}
impl Default for FloppyCube {
    fn default() -> Self {
        Self::new()
    }
}
impl FloppyCube {
    /// Constructs a solved puzzle in picking mode with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }
    /// Constructs a solved puzzle in picking mode.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            graph: PieceGraph::new(),
            state: GestureState::Selecting { pending: None },
            last_group: None,
            settings,
        }
    }
    /// Constructs a solved puzzle in picking mode with a custom snap
    /// tolerance.
    pub fn with_snap_tolerance(snap_tolerance: f64) -> Self {
        Self::with_settings(Settings {
            snap_tolerance,
            ..Settings::default()
        })
    }

    /// Returns the piece graph.
    pub fn graph(&self) -> &PieceGraph {
        &self.graph
    }
    /// Returns the current gesture state.
    pub fn state(&self) -> &GestureState {
        &self.state
    }
    /// Returns the most recently resolved group, if the last pair of picks
    /// succeeded.
    pub fn last_group(&self) -> Option<&RotationGroup> {
        self.last_group.as_ref()
    }
    /// Returns the interaction settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    /// Replaces the interaction settings.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Returns the rotation of a piece, in degrees.
    pub fn current_rotation(&self, piece: PieceId) -> f64 {
        self.graph.rotation(piece)
    }
    /// Returns the links of a piece.
    pub fn piece_topology(&self, piece: PieceId) -> PieceTopology {
        self.graph.topology(piece)
    }

    /// Handles a click that the frontend resolved to `raw`, which is 0 for
    /// the background.
    pub fn on_pick(&mut self, raw: u32, positions: &impl PiecePositions) -> PickOutcome {
        let GestureState::Selecting { pending } = &mut self.state else {
            log::trace!("ignoring pick {raw} outside picking mode");
            return PickOutcome::Ignored;
        };
        let Some(newer) = PieceId::new(raw) else {
            if raw != 0 {
                log::debug!("{}", InvalidPieceId(raw));
            }
            return PickOutcome::Ignored;
        };
        if *pending == Some(newer) {
            return PickOutcome::Ignored;
        }
        let Some(older) = pending.replace(newer) else {
            return PickOutcome::Pending(newer);
        };

        match group::resolve(&self.graph, older, newer, positions) {
            Ok(group) => {
                log::debug!("picked {older} and {newer}; rotating around {}", group.pivot);
                self.last_group = Some(group.clone());
                self.state = GestureState::RotatingGroup(group.clone());
                PickOutcome::Resolved(group)
            }
            Err(rejection) => {
                match rejection {
                    Rejection::InconsistentRotation { .. } => log::warn!("{rejection}"),
                    _ => log::debug!("{rejection}"),
                }
                self.last_group = None;
                PickOutcome::Rejected(rejection)
            }
        }
    }

    /// Rotates the active group by `delta` degrees.
    ///
    /// Returns `None` if there is no active group.
    pub fn rotate(&mut self, delta: f64) -> Option<RotationStep> {
        let GestureState::RotatingGroup(group) = &self.state else {
            return None;
        };
        if !delta.is_finite() {
            log::trace!("ignoring non-finite rotation {delta}");
            return None;
        }
        let group = group.clone();
        self.transact(|graph| turn_group(graph, &group, delta))
    }

    /// Rotates the active group by the angle of a drag around its axis.
    ///
    /// Returns `None` if there is no active group or the drag has no
    /// component along the axis.
    pub fn on_drag(&mut self, drag: &ArcballDrag) -> Option<RotationStep> {
        let GestureState::RotatingGroup(group) = &self.state else {
            return None;
        };
        let Some(axis) = group.axis else {
            log::trace!("skipping drag around degenerate axis");
            return None;
        };
        let Some(angle) = drag.signed_angle(axis) else {
            log::trace!("skipping drag with no component along {axis:?}");
            return None;
        };
        self.rotate(angle * self.settings.drag_sensitivity)
    }

    /// Snaps the active group, or else the last resolved group, to its
    /// nearest neutral orientation if it is within tolerance.
    pub fn on_align_request(&mut self) -> Vec<RotationStep> {
        let group = match &self.state {
            GestureState::RotatingGroup(group) => group.clone(),
            _ => match &self.last_group {
                Some(group) => group.clone(),
                None => return vec![],
            },
        };
        self.align(&group)
    }

    /// Toggles between picking pieces and rotating a group.
    ///
    /// Returns any alignment steps applied along the way.
    pub fn toggle_picking(&mut self) -> Vec<RotationStep> {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::RotatingGroup(group) => {
                let steps = self.align_on_toggle(&group);
                self.last_group = Some(group);
                self.state = GestureState::Selecting { pending: None };
                steps
            }
            GestureState::Selecting { .. } => match self.last_group.clone() {
                Some(group) => {
                    let steps = self.align_on_toggle(&group);
                    self.state = GestureState::RotatingGroup(group);
                    steps
                }
                None => vec![],
            },
            GestureState::Idle => {
                self.state = GestureState::Selecting { pending: None };
                vec![]
            }
        }
    }

    /// Recomputes the axis of the active and last groups from current
    /// positions. Call this after moving the whole puzzle.
    pub fn refresh_axis(&mut self, positions: &impl PiecePositions) {
        if let GestureState::RotatingGroup(group) = &mut self.state {
            group.refresh_axis(positions);
        }
        if let Some(group) = &mut self.last_group {
            group.refresh_axis(positions);
        }
    }

    fn align_on_toggle(&mut self, group: &RotationGroup) -> Vec<RotationStep> {
        if self.settings.realign_on_toggle {
            self.align(group)
        } else {
            vec![]
        }
    }

    fn align(&mut self, group: &RotationGroup) -> Vec<RotationStep> {
        let tolerance = self.settings.snap_tolerance;
        self.transact(|graph| align_group(graph, group, tolerance))
            .unwrap_or_default()
    }

    /// Runs `f` on a copy of the graph and keeps the result only if it
    /// succeeds.
    fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut PieceGraph) -> Result<T, TopologyError>,
    ) -> Option<T> {
        let mut graph = self.graph.clone();
        match f(&mut graph) {
            Ok(ret) => {
                self.graph = graph;
                Some(ret)
            }
            Err(e) => {
                debug_panic!("error rotating floppy cube: {e}");
                None
            }
        }
    }
}

/// Rotates `piece` and sets the rotation of its children to match. Returns
/// the piece and its children.
fn turn_with_children(
    graph: &mut PieceGraph,
    piece: PieceId,
    delta: f64,
) -> Result<SmallVec<[PieceId; 3]>, TopologyError> {
    let outcome = graph.rotate(piece, delta)?;
    let mut pieces = SmallVec::new();
    pieces.push(piece);
    pieces.extend(graph[piece].children().iter().copied());
    for &child in &pieces[1..] {
        graph.set_rotation(child, outcome.rotation);
    }
    Ok(pieces)
}

fn turn_group(
    graph: &mut PieceGraph,
    group: &RotationGroup,
    delta: f64,
) -> Result<RotationStep, TopologyError> {
    if group.is_center_pivot() {
        // The center never turns. Instead, the arms beside the picked ones
        // turn the other way relative to it.
        for &arm in &group.counter_arms {
            turn_with_children(graph, arm, -delta)?;
        }
    } else {
        turn_with_children(graph, group.pivot, delta)?;
    }
    Ok(RotationStep {
        pivot: group.pivot,
        pieces: group.members.clone(),
        angle: delta,
        axis: group.axis,
    })
}

fn align_group(
    graph: &mut PieceGraph,
    group: &RotationGroup,
    tolerance: f64,
) -> Result<Vec<RotationStep>, TopologyError> {
    let mut steps = vec![];
    if group.is_center_pivot() {
        for &arm in &group.counter_arms {
            let angle = graph.align_angle(arm, tolerance);
            if angle != 0.0 {
                let pieces = turn_with_children(graph, arm, angle)?;
                steps.push(RotationStep {
                    pivot: arm,
                    pieces,
                    angle,
                    axis: group.axis,
                });
            }
        }
    } else {
        let angle = graph.align_angle(group.pivot, tolerance);
        if angle != 0.0 {
            steps.push(turn_group(graph, group, angle)?);
        }
    }
    Ok(steps)
}
