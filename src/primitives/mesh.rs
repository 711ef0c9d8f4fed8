/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use anyhow::ensure;
use cgmath::{Matrix4, SquareMatrix};

use super::geometry::{Geometry, axes_helper};
use super::{Object3D, Object3DUniforms};
use crate::draw_context::{
    BindingSlot, DrawContext, DrawModeParams, Drawable, DrawableBuilder, Uniform,
};
use crate::materials::{BasicMaterial, StandardMaterial, StandardMaterialUniform};
use crate::plugins::scene_3d::Scene3DUniforms;
use crate::textures::{Texture, TextureOptions};

const BASIC_SHADER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/shaders/basic.wgsl"
));
const LINE_SHADER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/shaders/line.wgsl"
));
const STANDARD_SHADER: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/src/shaders/standard.wgsl"
));

fn vertex_count(geometry: &Geometry) -> anyhow::Result<u32> {
    Ok(u32::try_from(geometry.vertex_count())?)
}

fn surface_draw_mode(geometry: &Geometry) -> anyhow::Result<DrawModeParams<'_>> {
    Ok(match &geometry.indices {
        Some(indices) => DrawModeParams::Indexed {
            indices,
        },
        None => DrawModeParams::Direct {
            vertex_count: vertex_count(geometry)?,
        },
    })
}

fn model_uniforms(draw_context: &DrawContext, with_normals: bool) -> Object3DUniforms {
    Object3DUniforms {
        model: Uniform::new(draw_context, Matrix4::identity().into()),
        normals: with_normals.then(|| Uniform::new(draw_context, [[1., 0., 0.], [0., 1., 0.], [0., 0., 1.]])),
        color: None,
    }
}

/// Camera at group 0, model matrix and color at group 1.
fn add_basic_bindings<'a>(
    builder: &mut DrawableBuilder<'a>,
    scene_uniforms: &'a Scene3DUniforms,
    model: &'a Uniform<[[f32; 4]; 4]>,
    color: &'a Uniform<[f32; 4]>,
) -> anyhow::Result<()> {
    builder
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.camera_mat,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: model,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 1,
            resource: color,
        })?;
    Ok(())
}

/// Unlit mesh. Both a surface and a wireframe drawable are built so that
/// [`Object3D::set_wireframe`] can switch between them later.
pub fn create_basic_mesh(
    draw_context: &DrawContext,
    scene_uniforms: &Scene3DUniforms,
    geometry: &Geometry,
    material: &BasicMaterial,
) -> anyhow::Result<Object3D> {
    let shader_module = draw_context.create_shader_module(BASIC_SHADER);
    let mut uniforms = model_uniforms(draw_context, false);
    let color = Uniform::new(draw_context, material.color.to_linear_rgba());

    let mut surface_builder = DrawableBuilder::new(
        draw_context,
        &shader_module,
        &shader_module,
        surface_draw_mode(geometry)?,
    );
    surface_builder.add_attribute(
        0,
        wgpu::VertexStepMode::Vertex,
        &geometry.positions,
        wgpu::VertexFormat::Float32x3,
    )?;
    add_basic_bindings(&mut surface_builder, scene_uniforms, &uniforms.model, &color)?;
    let surface = surface_builder.build();

    let edges = geometry.wireframe_edges()?;
    let mut wireframe_builder = DrawableBuilder::new(
        draw_context,
        &shader_module,
        &shader_module,
        DrawModeParams::Indexed {
            indices: &edges,
        },
    );
    wireframe_builder
        .set_topology(wgpu::PrimitiveTopology::LineList)
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            &geometry.positions,
            wgpu::VertexFormat::Float32x3,
        )?;
    add_basic_bindings(&mut wireframe_builder, scene_uniforms, &uniforms.model, &color)?;
    let wireframe = wireframe_builder.build();

    uniforms.color = Some(color);
    let mut object = Object3D::new(Some(surface), Some(wireframe), uniforms)
        .with_color(material.color);
    object.set_wireframe(material.wireframe);
    Ok(object)
}

fn texture_or_placeholder<'a>(
    draw_context: &DrawContext,
    texture: Option<&'a Texture>,
    storage: &'a mut Option<Texture>,
    options: &TextureOptions,
) -> &'a Texture {
    match texture {
        Some(texture) => texture,
        None => storage.insert(Texture::placeholder(draw_context, options)),
    }
}

/// Lit mesh, shaded by the lights of the scene. The geometry needs normals
/// and texture coordinates.
pub fn create_standard_mesh(
    draw_context: &DrawContext,
    scene_uniforms: &Scene3DUniforms,
    geometry: &Geometry,
    material: &StandardMaterial,
) -> anyhow::Result<Object3D> {
    ensure!(
        geometry.normals.len() == geometry.vertex_count(),
        "Standard material needs one normal per vertex"
    );
    ensure!(
        geometry.uvs.len() == geometry.vertex_count(),
        "Standard material needs one texture coordinate per vertex"
    );
    let shader_module = draw_context.create_shader_module(STANDARD_SHADER);
    let mut uniforms = model_uniforms(draw_context, true);
    let color = Uniform::new(draw_context, material.color.to_linear_rgba());
    let material_uniform = Uniform::new(draw_context, StandardMaterialUniform::from(material));

    let (mut map_storage, mut normal_storage, mut roughness_storage) = (None, None, None);
    let map = texture_or_placeholder(
        draw_context,
        material.map.as_ref(),
        &mut map_storage,
        &TextureOptions::default(),
    );
    let normal_map = texture_or_placeholder(
        draw_context,
        material.normal_map.as_ref(),
        &mut normal_storage,
        &TextureOptions::normal_map(),
    );
    let roughness_map = texture_or_placeholder(
        draw_context,
        material.roughness_map.as_ref(),
        &mut roughness_storage,
        &TextureOptions::data_map(),
    );

    let normals = uniforms
        .normals
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Normal matrix uniform missing"))?;
    let mut builder = DrawableBuilder::new(
        draw_context,
        &shader_module,
        &shader_module,
        surface_draw_mode(geometry)?,
    );
    builder
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            &geometry.positions,
            wgpu::VertexFormat::Float32x3,
        )?
        .add_attribute(
            1,
            wgpu::VertexStepMode::Vertex,
            &geometry.normals,
            wgpu::VertexFormat::Float32x3,
        )?
        .add_attribute(
            2,
            wgpu::VertexStepMode::Vertex,
            &geometry.uvs,
            wgpu::VertexFormat::Float32x2,
        )?;
    builder
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.camera_mat,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 1,
            resource: &scene_uniforms.camera_pos,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 2,
            resource: &scene_uniforms.lights,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: &uniforms.model,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 1,
            resource: normals,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 2,
            resource: &color,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 3,
            resource: &material_uniform,
        })?;
    for (index, texture) in [map, normal_map, roughness_map].into_iter().enumerate() {
        let binding = u32::try_from(index * 2)?;
        builder
            .add_binding_slot(&BindingSlot {
                bind_group: 2,
                binding,
                resource: &texture.view,
            })?
            .add_binding_slot(&BindingSlot {
                bind_group: 2,
                binding: binding + 1,
                resource: &texture.sampler,
            })?;
    }
    let surface = builder.build();

    uniforms.color = Some(color);
    Ok(Object3D::new(Some(surface), None, uniforms).with_color(material.color))
}

/// Line list where each vertex carries its own color.
pub fn create_line_segments(
    draw_context: &DrawContext,
    scene_uniforms: &Scene3DUniforms,
    positions: &[[f32; 3]],
    colors: &[[f32; 3]],
) -> anyhow::Result<Object3D> {
    ensure!(
        positions.len() == colors.len(),
        "Expected one color per vertex, got {} colors for {} vertices",
        colors.len(),
        positions.len()
    );
    ensure!(positions.len() % 2 == 0, "Line segments need pairs of vertices");
    let shader_module = draw_context.create_shader_module(LINE_SHADER);
    let uniforms = model_uniforms(draw_context, false);
    let lines = build_lines(
        draw_context,
        &shader_module,
        scene_uniforms,
        &uniforms.model,
        positions,
        colors,
    )?;
    Ok(Object3D::new(None, Some(lines), uniforms))
}

fn build_lines(
    draw_context: &DrawContext,
    shader_module: &wgpu::ShaderModule,
    scene_uniforms: &Scene3DUniforms,
    model: &Uniform<[[f32; 4]; 4]>,
    positions: &[[f32; 3]],
    colors: &[[f32; 3]],
) -> anyhow::Result<Drawable> {
    let mut builder = DrawableBuilder::new(
        draw_context,
        shader_module,
        shader_module,
        DrawModeParams::Direct {
            vertex_count: u32::try_from(positions.len())?,
        },
    );
    builder
        .set_topology(wgpu::PrimitiveTopology::LineList)
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            positions,
            wgpu::VertexFormat::Float32x3,
        )?
        .add_attribute(
            1,
            wgpu::VertexStepMode::Vertex,
            colors,
            wgpu::VertexFormat::Float32x3,
        )?;
    builder
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.camera_mat,
        })?
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: model,
        })?;
    Ok(builder.build())
}

/// X, Y and Z axes drawn in red, green and blue from the origin.
pub fn create_axes_helper(
    draw_context: &DrawContext,
    scene_uniforms: &Scene3DUniforms,
    size: f32,
) -> anyhow::Result<Object3D> {
    let (positions, colors) = axes_helper(size);
    create_line_segments(draw_context, scene_uniforms, &positions, &colors)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use cgmath::{Point3, Transform as _};
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    use super::*;
    use crate::draw_context::headless_test_context;
    use crate::plugins::scene_3d::Scene3D;
    use crate::primitives::color::Color;
    use crate::primitives::geometry::{box_geometry, sphere_geometry};
    use crate::primitives::{Group, SceneNode, Shareable};

    #[test]
    fn basic_mesh_switches_to_wireframe_and_recolors() {
        let Some(context) = headless_test_context() else {
            return;
        };
        let scene = Scene3D::new(&context);
        let material = BasicMaterial::new(Color::from_hex(0x00ff00));
        let mut mesh = create_basic_mesh(
            &context,
            scene.scene_uniforms(),
            &box_geometry(1., 1., 1.),
            &material,
        )
        .expect("box mesh");
        assert!(!mesh.is_wireframe());
        mesh.set_wireframe(true);
        assert!(mesh.is_wireframe());
        mesh.set_color(Color::from_hex(0xfc7e01));
        assert_eq!(mesh.color().map(|c| c.to_hex_string()), Some(String::from("fc7e01")));
    }

    #[test]
    fn group_transform_reaches_nested_children() {
        let Some(context) = headless_test_context() else {
            return;
        };
        let scene = Scene3D::new(&context);
        let material = BasicMaterial::new(Color::WHITE);
        let mesh = create_basic_mesh(
            &context,
            scene.scene_uniforms(),
            &box_geometry(1., 1., 1.),
            &material,
        )
        .expect("box mesh")
        .into_shareable();
        mesh.borrow_mut().transform.set_position(1., 0., -2.);

        let inner = Group::new().into_shareable();
        inner.borrow_mut().transform.set_position(0., 1., 0.);
        inner.borrow_mut().add(Rc::clone(&mesh));
        let outer = Group::new().into_shareable();
        outer.borrow_mut().transform.rotate_y(FRAC_PI_2);
        outer.borrow_mut().add(Rc::clone(&inner));

        SceneNode::from(outer).update_world_matrix(&Matrix4::identity());
        let origin = mesh
            .borrow()
            .world_matrix()
            .transform_point(Point3::new(0., 0., 0.));
        assert_abs_diff_eq!(origin, Point3::new(-2., 1., -1.), epsilon = 1e-5);
    }

    #[test]
    fn line_segments_ignore_recoloring() {
        let Some(context) = headless_test_context() else {
            return;
        };
        let scene = Scene3D::new(&context);
        let mut axes = create_axes_helper(&context, scene.scene_uniforms(), 3.).expect("axes");
        axes.set_color(Color::WHITE);
        assert_eq!(axes.color(), None);
        assert!(axes.is_wireframe());
    }

    #[test]
    fn standard_mesh_needs_normals_and_uvs() {
        let Some(context) = headless_test_context() else {
            return;
        };
        let scene = Scene3D::new(&context);
        let material = StandardMaterial::default();
        let loose = Geometry::from_flat_positions(&[0.0; 9]).expect("one triangle");
        assert!(create_standard_mesh(&context, scene.scene_uniforms(), &loose, &material).is_err());
        let sphere = sphere_geometry(1., 32, 32);
        assert!(create_standard_mesh(&context, scene.scene_uniforms(), &sphere, &material).is_ok());
    }
}
