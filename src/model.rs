use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use gltf::buffer;
use itertools::izip;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec4,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

pub struct Model {
    pub name: String,
    /// Whether any primitive uses a lit material. Unlit meshes neither
    /// cast nor receive shadows.
    pub lit: bool,
    pub primitives: Vec<ModelPrimitive>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: Buffers,
    ) -> anyhow::Result<Model> {
        let mut model = Model {
            name: name.into(),
            lit: false,
            primitives: Vec::new(),
        };

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                return Err(anyhow::anyhow!(
                    "Unsupported primitive mode: {:?}",
                    primitive.mode()
                ));
            }

            let material = primitive.material();
            model.lit |= !material.unlit();
            let base_color = Vec4::from(material.pbr_metallic_roughness().base_color_factor());

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let position_reader = reader.read_positions().context("Mesh has no positions")?;
            let normal_reader = reader.read_normals().context("Mesh has no normals")?;

            let vertices = izip!(position_reader, normal_reader)
                .map(|(position, normal)| Vertex {
                    position: Vec3::from(position),
                    normal: Vec3::from(normal),
                    color: base_color,
                })
                .collect::<Vec<Vertex>>();

            let indices = match reader.read_indices() {
                Some(index_reader) => index_reader.into_u32().collect::<Vec<u32>>(),
                None => (0..vertices.len() as u32).collect(),
            };

            model.primitives.push(ModelPrimitive {
                index: primitive.index(),
                vertices,
                indices,
            });
        }

        if model.primitives.is_empty() {
            return Err(anyhow::anyhow!("Mesh without primitives: {}", model.name));
        }

        Ok(model)
    }
}
