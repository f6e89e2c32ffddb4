//! Scene -> GPU-ready vertex data. Pure CPU tessellation so it can be tested
//! on the host without a device.

use crate::geometry::{arc_point, ArcRail, BorderGeometry, BoxSegment, PanelGeometry};
use crate::scene::{AxisIndicator, Scene, ViewerMarker};
use glam::{Quat, Vec3, Vec4};

const MARKER_RINGS: u32 = 12;
const MARKER_SECTORS: u32 = 16;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// One corner of a screen-space line ribbon. The vertex shader pushes
/// `position` sideways by `side * width_px / 2` pixels, perpendicular to the
/// projected direction toward `other`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub side: f32,
    pub other: [f32; 3],
    pub width_px: f32,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub _pad: [f32; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3, color: Vec4) -> u32 {
        let i = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position: position.to_array(),
            normal: normal.to_array(),
            color: color.to_array(),
        });
        i
    }

    /// Counter-clockwise quad as seen from the side `normal` points to.
    fn push_quad(&mut self, corners: [Vec3; 4], normal: Vec3, color: Vec4) {
        let base = self.push_vertex(corners[0], normal, color);
        for c in &corners[1..] {
            self.push_vertex(*c, normal, color);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Everything a renderer uploads for one scene revision.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneMesh {
    /// Borders and the viewer marker.
    pub opaque: MeshData,
    /// Panel surfaces; drawn after the opaque pass without depth writes.
    pub translucent: MeshData,
    /// Six vertices per dash, non-indexed.
    pub lines: Vec<LineVertex>,
    pub revision: u64,
}

impl SceneMesh {
    pub fn build(scene: &Scene) -> Self {
        let mut mesh = SceneMesh {
            revision: scene.revision,
            ..Default::default()
        };
        for screen in &scene.screens {
            push_panel(&mut mesh.translucent, &screen.panel, screen.panel_color);
            match &screen.border {
                BorderGeometry::Flat(segments) => {
                    for seg in segments {
                        push_box(&mut mesh.opaque, seg, screen.border_color);
                    }
                }
                BorderGeometry::Curved { rails, ends } => {
                    for rail in rails {
                        push_rail(&mut mesh.opaque, rail, screen.border_color);
                    }
                    for seg in ends {
                        push_box(&mut mesh.opaque, seg, screen.border_color);
                    }
                }
            }
        }
        push_marker(&mut mesh.opaque, &scene.marker);
        push_indicator(&mut mesh.lines, &scene.indicator);
        mesh
    }
}

fn push_panel(out: &mut MeshData, panel: &PanelGeometry, color: Vec4) {
    let hh = panel.half_height();
    match (panel.arc_center(), panel.curvature_radius_m) {
        (Some(center), Some(r)) => {
            let n = panel.arc_segments.max(1);
            let half = panel.arc_angle_rad * 0.5;
            let base = out.vertices.len() as u32;
            for i in 0..=n {
                let a = -half + panel.arc_angle_rad * i as f32 / n as f32;
                let bottom = arc_point(center, r, a, -hh);
                // Faces the cylinder axis, i.e. the viewer.
                let normal = Vec3::new(-a.sin(), 0.0, a.cos());
                out.push_vertex(bottom, normal, color);
                out.push_vertex(Vec3::new(bottom.x, hh, bottom.z), normal, color);
            }
            for i in 0..n {
                let b0 = base + i * 2;
                let (t0, b1, t1) = (b0 + 1, b0 + 2, b0 + 3);
                out.indices.extend_from_slice(&[b0, b1, t1, b0, t1, t0]);
            }
        }
        _ => {
            let z = panel.axis_position_m;
            let hw = panel.half_width();
            out.push_quad(
                [
                    Vec3::new(-hw, -hh, z),
                    Vec3::new(hw, -hh, z),
                    Vec3::new(hw, hh, z),
                    Vec3::new(-hw, hh, z),
                ],
                Vec3::Z,
                color,
            );
        }
    }
}

fn push_box(out: &mut MeshData, seg: &BoxSegment, color: Vec4) {
    let rot = Quat::from_rotation_y(seg.yaw);
    let h = seg.size * 0.5;
    let at = |x: f32, y: f32, z: f32| seg.center + rot * Vec3::new(x * h.x, y * h.y, z * h.z);
    // (normal, four corners counter-clockwise from outside)
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        (Vec3::Z, [at(-1., -1., 1.), at(1., -1., 1.), at(1., 1., 1.), at(-1., 1., 1.)]),
        (Vec3::NEG_Z, [at(1., -1., -1.), at(-1., -1., -1.), at(-1., 1., -1.), at(1., 1., -1.)]),
        (Vec3::X, [at(1., -1., 1.), at(1., -1., -1.), at(1., 1., -1.), at(1., 1., 1.)]),
        (Vec3::NEG_X, [at(-1., -1., -1.), at(-1., -1., 1.), at(-1., 1., 1.), at(-1., 1., -1.)]),
        (Vec3::Y, [at(-1., 1., 1.), at(1., 1., 1.), at(1., 1., -1.), at(-1., 1., -1.)]),
        (Vec3::NEG_Y, [at(-1., -1., -1.), at(1., -1., -1.), at(1., -1., 1.), at(-1., -1., 1.)]),
    ];
    for (normal, quad) in faces {
        out.push_quad(quad, rot * normal, color);
    }
}

fn push_rail(out: &mut MeshData, rail: &ArcRail, color: Vec4) {
    let n = rail.segments.max(1);
    let span = rail.end_angle - rail.start_angle;
    let at = |i: u32| rail.start_angle + span * i as f32 / n as f32;
    for i in 0..n {
        let (a0, a1) = (at(i), at(i + 1));
        let p = |r: f32, a: f32, y: f32| arc_point(rail.arc_center, r, a, y);
        let (ri, ro) = (rail.inner_radius, rail.outer_radius);
        let (y0, y1) = (rail.y_min, rail.y_max);
        let inward = |a: f32| Vec3::new(-a.sin(), 0.0, a.cos());
        let mid = (a0 + a1) * 0.5;
        out.push_quad(
            [p(ri, a0, y0), p(ri, a1, y0), p(ri, a1, y1), p(ri, a0, y1)],
            inward(mid),
            color,
        );
        out.push_quad(
            [p(ro, a1, y0), p(ro, a0, y0), p(ro, a0, y1), p(ro, a1, y1)],
            -inward(mid),
            color,
        );
        out.push_quad(
            [p(ri, a0, y1), p(ri, a1, y1), p(ro, a1, y1), p(ro, a0, y1)],
            Vec3::Y,
            color,
        );
        out.push_quad(
            [p(ro, a0, y0), p(ro, a1, y0), p(ri, a1, y0), p(ri, a0, y0)],
            Vec3::NEG_Y,
            color,
        );
    }
    let p = |r: f32, a: f32, y: f32| arc_point(rail.arc_center, r, a, y);
    let tangent = |a: f32| Vec3::new(a.cos(), 0.0, a.sin());
    let (a0, a1) = (rail.start_angle, rail.end_angle);
    let (ri, ro, y0, y1) = (rail.inner_radius, rail.outer_radius, rail.y_min, rail.y_max);
    out.push_quad(
        [p(ro, a0, y0), p(ri, a0, y0), p(ri, a0, y1), p(ro, a0, y1)],
        -tangent(a0),
        color,
    );
    out.push_quad(
        [p(ri, a1, y0), p(ro, a1, y0), p(ro, a1, y1), p(ri, a1, y1)],
        tangent(a1),
        color,
    );
}

fn push_marker(out: &mut MeshData, marker: &ViewerMarker) {
    let base = out.vertices.len() as u32;
    for ring in 0..=MARKER_RINGS {
        let polar = std::f32::consts::PI * ring as f32 / MARKER_RINGS as f32;
        for sector in 0..=MARKER_SECTORS {
            let azimuth = std::f32::consts::TAU * sector as f32 / MARKER_SECTORS as f32;
            let normal = Vec3::new(
                polar.sin() * azimuth.sin(),
                polar.cos(),
                polar.sin() * azimuth.cos(),
            );
            out.push_vertex(marker.position + normal * marker.radius, normal, marker.color);
        }
    }
    let stride = MARKER_SECTORS + 1;
    for ring in 0..MARKER_RINGS {
        for sector in 0..MARKER_SECTORS {
            let a = base + ring * stride + sector;
            let b = a + stride;
            // Outward-facing, so the inside is culled when the camera sits in
            // the marker (front view).
            out.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
}

fn push_indicator(out: &mut Vec<LineVertex>, indicator: &AxisIndicator) {
    let color = indicator.color.to_array();
    let v = |p: Vec3, other: Vec3, side: f32| LineVertex {
        position: p.to_array(),
        side,
        other: other.to_array(),
        width_px: indicator.width_px,
        color,
    };
    for &(a, b) in &indicator.dashes {
        // The end vertices look back at the start, which mirrors their
        // perpendicular, so their sides are negated.
        let (a_l, a_r) = (v(a, b, 1.0), v(a, b, -1.0));
        let (b_l, b_r) = (v(b, a, -1.0), v(b, a, 1.0));
        out.extend_from_slice(&[a_r, a_l, b_l, a_r, b_l, b_r]);
    }
}
