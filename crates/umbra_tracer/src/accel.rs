//! Overlap-bounded box partition over scene faces.
//!
//! The root box holds every face. Boxes with too many faces are cut at the
//! midpoint of their longest untried axis; each face goes to the half that
//! contains more of its vertices, and both halves are shrunk to fit their
//! faces. A split is kept only if the two shrunk boxes overlap by less than
//! the configured fraction, otherwise the box is retried on its next axis.
//! Boxes that run out of axes become leaves regardless of size.
//!
//! Boxes live in an arena and refer to each other by index. Leaves partition
//! the face set; interior boxes give their faces up to their children.

use std::collections::VecDeque;
use std::time::Instant;

use umbra_core::{AccelParams, ConfigResult, Geometry};
use umbra_math::{Aabb, Axis, Ray};

/// A box with the faces it owns and the axes it has already tried.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub bounds: Aabb,
    pub faces: Vec<usize>,
    /// Per axis (X, Y, Z): a split was attempted on this axis
    pub split_axes: [bool; 3],
}

impl BoundingBox {
    pub fn new(bounds: Aabb, faces: Vec<usize>) -> Self {
        Self {
            bounds,
            faces,
            split_axes: [false; 3],
        }
    }

    /// A box fitted to `faces`.
    pub fn covering(faces: Vec<usize>, split_axes: [bool; 3], geometry: &dyn Geometry) -> Self {
        let mut bbox = Self {
            bounds: Aabb::EMPTY,
            faces,
            split_axes,
        };
        bbox.recompute_from_faces(geometry);
        bbox
    }

    /// Shrink (or grow) the bounds to the vertices of the owned faces.
    ///
    /// A box without faces becomes `Aabb::EMPTY`.
    pub fn recompute_from_faces(&mut self, geometry: &dyn Geometry) {
        self.bounds = Aabb::enclosing(
            self.faces
                .iter()
                .flat_map(|&face| geometry.face_vertices(face)),
        );
    }

    /// How many of the face's three vertices lie inside the bounds.
    pub fn vertices_inside(&self, face: usize, geometry: &dyn Geometry) -> usize {
        count_inside(&self.bounds, face, geometry)
    }

    /// All three axes have been tried.
    pub fn is_terminal(&self) -> bool {
        self.split_axes.iter().all(|&tried| tried)
    }

    /// Longest axis not yet tried, ties resolved X, Y, Z.
    pub fn next_split_axis(&self) -> Option<Axis> {
        self.bounds.longest_axis_excluding(self.split_axes)
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

fn count_inside(bounds: &Aabb, face: usize, geometry: &dyn Geometry) -> usize {
    geometry
        .face_vertices(face)
        .into_iter()
        .filter(|&v| bounds.contains(v))
        .count()
}

/// Arena entry: a box plus its links.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxNode {
    pub bbox: BoundingBox,
    pub parent: Option<usize>,
    /// Lower and upper half, once the box has been split
    pub children: Option<[usize; 2]>,
}

impl BoxNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Counters collected while building.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    /// Boxes taken off the worklist
    pub pops: usize,
    /// Splits that produced two non-empty children
    pub accepted: usize,
    /// Splits refused for overlapping too much
    pub rejected: usize,
    /// Splits that sent every face to one side
    pub degenerate: usize,
    /// Boxes made leaves with more faces than allowed
    pub forced_leaves: usize,
}

/// Partition of the scene's faces into overlap-bounded leaf boxes.
#[derive(Debug, Clone)]
pub struct AccelerationStructure {
    nodes: Vec<BoxNode>,
    leaves: Vec<usize>,
    face_count: usize,
    max_overlap: f32,
    stats: BuildStats,
}

impl AccelerationStructure {
    /// Build the partition for every face of `geometry`.
    pub fn build(geometry: &dyn Geometry, params: &AccelParams) -> ConfigResult<Self> {
        params.validate()?;
        let start = Instant::now();

        let face_count = geometry.face_count();
        let mut accel = Self {
            nodes: Vec::new(),
            leaves: Vec::new(),
            face_count,
            max_overlap: 0.0,
            stats: BuildStats::default(),
        };
        if face_count == 0 {
            log::info!("Acceleration structure: empty scene, no boxes built");
            return Ok(accel);
        }

        let root = BoundingBox::covering((0..face_count).collect(), [false; 3], geometry);
        accel.nodes.push(BoxNode {
            bbox: root,
            parent: None,
            children: None,
        });

        let mut worklist = VecDeque::from([0usize]);
        while let Some(index) = worklist.pop_front() {
            accel.stats.pops += 1;
            accel.process(index, geometry, params, &mut worklist);
        }

        log::info!(
            "Acceleration structure: {} leaves over {} faces in {:.2?} (max overlap {:.1}%)",
            accel.leaves.len(),
            face_count,
            start.elapsed(),
            accel.max_overlap * 100.0
        );
        log::debug!("Acceleration build stats: {:?}", accel.stats);

        Ok(accel)
    }

    /// Handle one box taken off the worklist.
    fn process(
        &mut self,
        index: usize,
        geometry: &dyn Geometry,
        params: &AccelParams,
        worklist: &mut VecDeque<usize>,
    ) {
        let node = &mut self.nodes[index].bbox;
        if node.face_count() <= params.max_faces_per_leaf {
            self.leaves.push(index);
            return;
        }

        let Some(axis) = node.next_split_axis() else {
            log::trace!(
                "Box {} kept as leaf with {} faces after trying every axis",
                index,
                node.face_count()
            );
            self.stats.forced_leaves += 1;
            self.leaves.push(index);
            return;
        };
        node.split_axes[axis.index()] = true;

        let (lower, upper) = node.bounds.split(axis);
        let mut lower_faces = Vec::new();
        let mut upper_faces = Vec::new();
        for &face in &node.faces {
            // Ties go to the upper half
            if count_inside(&lower, face, geometry) > count_inside(&upper, face, geometry) {
                lower_faces.push(face);
            } else {
                upper_faces.push(face);
            }
        }

        let child_axes = if params.inherit_split_axes {
            node.split_axes
        } else {
            [false; 3]
        };
        let lower = BoundingBox::covering(lower_faces, child_axes, geometry);
        let upper = BoundingBox::covering(upper_faces, child_axes, geometry);

        let overlap = Aabb::overlap_fraction(&lower.bounds, &upper.bounds);
        if overlap >= params.max_overlap_fraction {
            log::trace!(
                "Box {} split on {:?} rejected: overlap {:.3} >= {:.3}",
                index,
                axis,
                overlap,
                params.max_overlap_fraction
            );
            self.stats.rejected += 1;
            worklist.push_back(index);
            return;
        }

        if lower.faces.is_empty() || upper.faces.is_empty() {
            log::trace!("Box {} split on {:?} left one side empty", index, axis);
            self.stats.degenerate += 1;
            worklist.push_back(index);
            return;
        }

        log::trace!(
            "Box {} split on {:?}: {} / {} faces, overlap {:.3}",
            index,
            axis,
            lower.face_count(),
            upper.face_count(),
            overlap
        );
        self.stats.accepted += 1;
        self.max_overlap = self.max_overlap.max(overlap);

        let first = self.nodes.len();
        for bbox in [lower, upper] {
            self.nodes.push(BoxNode {
                bbox,
                parent: Some(index),
                children: None,
            });
        }
        let parent = &mut self.nodes[index];
        parent.children = Some([first, first + 1]);
        parent.bbox.faces = Vec::new();
        worklist.push_back(first);
        worklist.push_back(first + 1);
    }

    /// Faces of every leaf whose box the ray passes through, leaf order.
    ///
    /// Duplicate-free since leaves partition the faces.
    pub fn candidate_faces(&self, ray: &Ray) -> Vec<usize> {
        let mut faces = Vec::new();
        for leaf in self.leaves() {
            if leaf.bounds.intersects(ray) {
                faces.extend_from_slice(&leaf.faces);
            }
        }
        faces
    }

    /// Leaf boxes in the order they were finalized.
    pub fn leaves(&self) -> impl Iterator<Item = &BoundingBox> + '_ {
        self.leaves.iter().map(|&index| &self.nodes[index].bbox)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Every box ever created, root first.
    pub fn nodes(&self) -> &[BoxNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&BoxNode> {
        self.nodes.first()
    }

    /// Number of faces the structure was built over.
    pub fn face_count(&self) -> usize {
        self.face_count
    }

    /// Largest overlap fraction among accepted splits.
    pub fn max_overlap(&self) -> f32 {
        self.max_overlap
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}
