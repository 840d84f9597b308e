use crate::grid::{Direction, DirectionSet, DIMENSIONS};
use crate::projection::project;
use crate::rotation::ViewFrame;
use crate::visibility::RetainedCell;
use bytemuck::{Pod, Zeroable};
use cgmath::Vector4;

/// Half the side of a drawn cell; cells are shrunk so neighbours don't touch.
pub const HALF_EXTENT: f32 = 0.4;
pub const NODE_SCALE: f32 = 0.2;
/// Edge thickness relative to the larger endpoint scale.
pub const EDGE_THICKNESS: f32 = 0.9;
/// Edges thinner than this are collapsed.
pub const EDGE_THRESHOLD: f32 = 0.01;

pub const VERTEX_COUNT: usize = 1 << DIMENSIONS;
pub const EDGE_COUNT: usize = DIMENSIONS << (DIMENSIONS - 1);

pub struct HyperCell;

impl HyperCell {
    /// Bit `d` of the index selects `+HALF_EXTENT` on axis `d`.
    pub fn generate_vertices() -> [Vector4<f32>; VERTEX_COUNT] {
        std::array::from_fn(|i| {
            let offset: [f32; DIMENSIONS] = std::array::from_fn(|d| {
                if (i >> d) & 1 == 1 {
                    HALF_EXTENT
                } else {
                    -HALF_EXTENT
                }
            });
            Vector4::from(offset)
        })
    }

    /// Returns `[base_vertex, other_vertex]` pairs, grouped by axis.
    pub fn generate_edges() -> Vec<[usize; 2]> {
        let mut edges = Vec::with_capacity(EDGE_COUNT);
        for axis in 0..DIMENSIONS {
            for base in 0..VERTEX_COUNT {
                if base & (1 << axis) == 0 {
                    edges.push([base, base | (1 << axis)]);
                }
            }
        }
        edges
    }
}

/// Bitmask of the vertices that lie on a face the observer can see through
/// an opening. Per axis the `-` face wins over the `+` face.
pub fn visible_vertices(center: Vector4<f32>, observer: Vector4<f32>, open: DirectionSet) -> u16 {
    let mut mask = 0u16;
    for axis in 0..DIMENSIONS {
        let face = if open.contains(Direction::from_axis(axis, false))
            && observer[axis] < center[axis] - HALF_EXTENT
        {
            Some(false)
        } else if open.contains(Direction::from_axis(axis, true))
            && observer[axis] > center[axis] + HALF_EXTENT
        {
            Some(true)
        } else {
            None
        };
        if let Some(positive) = face {
            for vertex in 0..VERTEX_COUNT {
                if ((vertex >> axis) & 1 == 1) == positive {
                    mask |= 1 << vertex;
                }
            }
        }
    }
    mask
}

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ProjectedNode {
    pub position: [f32; 3],
    pub scale: f32,
}

#[repr(C)]
#[derive(Default, Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ProjectedEdge {
    pub start: [f32; 3],
    pub thickness: f32,
    pub end: [f32; 3],
    pub color_index: u32,
}

#[derive(Clone, Debug)]
pub struct CellGeometry {
    pub nodes: [ProjectedNode; VERTEX_COUNT],
    pub edges: Vec<ProjectedEdge>,
    pub visible: u16,
    pub color: [f32; 3],
}

impl CellGeometry {
    /// Projects one retained cell. Hidden nodes get zero scale and edges
    /// touching them are omitted.
    pub fn build(cell: &RetainedCell, observer: Vector4<f32>, frame: &ViewFrame) -> CellGeometry {
        let center = cell.lattice.to_vector();
        let visible = visible_vertices(center, observer, cell.open);
        let fade = cell.fade();

        let mut nodes = [ProjectedNode::default(); VERTEX_COUNT];
        for (i, offset) in HyperCell::generate_vertices().into_iter().enumerate() {
            if visible & (1 << i) == 0 {
                continue;
            }
            let projection = project(center + offset, observer, frame);
            nodes[i] = ProjectedNode {
                position: projection.screen.into(),
                scale: NODE_SCALE * projection.radius * fade,
            };
        }

        let edges = HyperCell::generate_edges()
            .into_iter()
            .filter(|&[a, b]| visible & (1 << a) != 0 && visible & (1 << b) != 0)
            .map(|[a, b]| {
                let thickness = EDGE_THICKNESS * nodes[a].scale.max(nodes[b].scale);
                ProjectedEdge {
                    start: nodes[a].position,
                    thickness: if thickness < EDGE_THRESHOLD { 0.0 } else { thickness },
                    end: nodes[b].position,
                    color_index: cell.color.index(),
                }
            })
            .collect();

        CellGeometry {
            nodes,
            edges,
            visible,
            color: cell.color.rgb(),
        }
    }

    pub fn node_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.nodes)
    }

    pub fn edge_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.edges)
    }

    /// Any node large enough to show up on screen.
    pub fn is_drawn(&self) -> bool {
        self.nodes.iter().any(|node| node.scale > 0.0)
    }
}
