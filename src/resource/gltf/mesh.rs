use std::collections::HashMap;

use anyhow::Result;
use cgmath::{InnerSpace, Transform as _};

use crate::data::transform::{normal_matrix, Transform};
use crate::error::Error;
use crate::resource::gltf::loader::GltfLoader;
use crate::resource::mesh::{MaterialData, MeshData, PrimitiveData};

/// Bakes every mesh instance of a glTF scene into one [`MeshData`], with node transforms
/// applied to positions and normals.
pub struct GltfMeshReader<'a, T: GltfLoader> {
    gltf_loader: &'a mut T,
    primitives: Vec<PrimitiveData>,
    materials: Vec<MaterialData>,
    material_registry: HashMap<Option<usize>, usize>,
}

impl<'a, T: GltfLoader> GltfMeshReader<'a, T> {
    pub fn read(name: String, scene: &gltf::Scene, gltf_loader: &'a mut T) -> Result<MeshData> {
        log::debug!(
            "Reading glTF scene: {} - [{}]",
            scene.name().unwrap_or("<UNNAMED>"),
            scene.index(),
        );

        let mut reader = Self {
            gltf_loader,
            primitives: vec![],
            materials: vec![],
            material_registry: HashMap::new(),
        };

        for node in scene.nodes() {
            reader.read_node(&node, None)?;
        }

        if reader.primitives.is_empty() {
            return Err(Error::new(format!("The glTF scene of {name} contains no triangles.")).into());
        }

        Ok(MeshData::new(name, reader.primitives, reader.materials))
    }

    fn read_node(
        &mut self,
        node: &gltf::Node,
        parent_transform_matrix: Option<cgmath::Matrix4<f32>>,
    ) -> Result<()> {
        let (translation, rotation, scale) = node.transform().decomposed();

        let local_transform = Transform {
            translation: translation.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        };
        let local_transform_matrix = cgmath::Matrix4::from(local_transform);

        let global_transform_matrix = match parent_transform_matrix {
            Some(parent_transform_matrix) => parent_transform_matrix * local_transform_matrix,
            None => local_transform_matrix,
        };

        if let Some(mesh) = node.mesh() {
            log::debug!(
                "Reading glTF mesh {} - [{}] of node {} - [{}]",
                mesh.name().unwrap_or("<UNNAMED>"),
                mesh.index(),
                node.name().unwrap_or("<UNNAMED>"),
                node.index(),
            );

            for primitive in mesh.primitives() {
                self.read_primitive(&primitive, &global_transform_matrix)?;
            }
        }

        for child in node.children() {
            self.read_node(&child, Some(global_transform_matrix))?;
        }

        Ok(())
    }

    fn read_primitive(
        &mut self,
        primitive: &gltf::Primitive,
        transform_matrix: &cgmath::Matrix4<f32>,
    ) -> Result<()> {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping glTF primitive {} with unsupported topology: {:?}",
                primitive.index(),
                primitive.mode()
            );
            return Ok(());
        }

        let mut positions = None;
        let mut normals = None;
        let mut tex_coords = None;

        for (semantic, accessor) in primitive.attributes() {
            match semantic {
                gltf::Semantic::Positions => {
                    positions = Some(self.read_vec3_accessor(&accessor)?);
                }
                gltf::Semantic::Normals => {
                    normals = Some(self.read_vec3_accessor(&accessor)?);
                }
                gltf::Semantic::TexCoords(0) => {
                    tex_coords = Some(self.read_tex_coord_accessor(&accessor)?);
                }
                _ => {}
            }
        }

        let positions = match positions {
            Some(positions) => positions,
            None => {
                return Err(
                    Error::new("The given primitive has no position attribute.".to_string())
                        .into(),
                )
            }
        };

        let positions = positions
            .into_iter()
            .map(|position| {
                transform_matrix
                    .transform_point(cgmath::Point3::from(position))
                    .into()
            })
            .collect();

        let normal_transform_matrix = normal_matrix(transform_matrix);
        let normals = normals.map(|normals| {
            normals
                .into_iter()
                .map(|normal| {
                    let normal =
                        normal_transform_matrix.transform_vector(cgmath::Vector3::from(normal));
                    if normal.magnitude2() > 0.0 {
                        normal.normalize().into()
                    } else {
                        [0.0, 1.0, 0.0]
                    }
                })
                .collect()
        });

        let indices = match primitive.indices() {
            Some(accessor) => Some(self.read_index_accessor(&accessor)?),
            None => None,
        };

        let material = self.read_material(&primitive.material())?;

        self.primitives.push(PrimitiveData::new(
            positions,
            normals,
            tex_coords,
            indices,
            Some(material),
        )?);

        Ok(())
    }

    fn read_vec3_accessor(&mut self, accessor: &gltf::Accessor) -> Result<Vec<[f32; 3]>> {
        if accessor.data_type() != gltf::accessor::DataType::F32
            || accessor.dimensions() != gltf::accessor::Dimensions::Vec3
        {
            return Err(Error::new(format!(
                "Accessor {} must hold float vec3 data, found {:?} {:?}",
                accessor.index(),
                accessor.data_type(),
                accessor.dimensions()
            ))
            .into());
        }

        let data = self.gltf_loader.load_accessor_data(accessor.index())?;

        Ok(read_f32s(&data)
            .chunks_exact(3)
            .map(|v| [v[0], v[1], v[2]])
            .collect())
    }

    fn read_tex_coord_accessor(&mut self, accessor: &gltf::Accessor) -> Result<Vec<[f32; 2]>> {
        if accessor.dimensions() != gltf::accessor::Dimensions::Vec2 {
            return Err(Error::new(format!(
                "Texture coordinate accessor {} is not vec2: {:?}",
                accessor.index(),
                accessor.dimensions()
            ))
            .into());
        }

        let data = self.gltf_loader.load_accessor_data(accessor.index())?;

        let values: Vec<f32> = match (accessor.data_type(), accessor.normalized()) {
            (gltf::accessor::DataType::F32, _) => read_f32s(&data),
            (gltf::accessor::DataType::U8, true) => {
                data.iter().map(|value| *value as f32 / 255.0).collect()
            }
            (gltf::accessor::DataType::U16, true) => data
                .chunks_exact(2)
                .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]) as f32 / 65535.0)
                .collect(),
            (data_type, _) => {
                return Err(Error::new(format!(
                    "Texture coordinate accessor {} uses an unsupported data type: {data_type:?}",
                    accessor.index()
                ))
                .into())
            }
        };

        Ok(values.chunks_exact(2).map(|v| [v[0], v[1]]).collect())
    }

    fn read_index_accessor(&mut self, accessor: &gltf::Accessor) -> Result<Vec<u32>> {
        let data = self.gltf_loader.load_accessor_data(accessor.index())?;

        match accessor.data_type() {
            gltf::accessor::DataType::U8 => Ok(data.iter().map(|index| *index as u32).collect()),
            gltf::accessor::DataType::U16 => Ok(data
                .chunks_exact(2)
                .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]) as u32)
                .collect()),
            gltf::accessor::DataType::U32 => Ok(data
                .chunks_exact(4)
                .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
                .collect()),
            data_type => Err(Error::new(format!(
                "The index accessor {} uses an invalid data type: {data_type:?}",
                accessor.index()
            ))
            .into()),
        }
    }

    fn read_material(&mut self, material: &gltf::Material) -> Result<usize> {
        if let Some(slot) = self.material_registry.get(&material.index()) {
            return Ok(*slot);
        }

        let name = match material.name() {
            Some(name) => name.to_string(),
            None => format!(
                "MATERIAL_{}",
                match material.index() {
                    Some(index) => index.to_string(),
                    None => String::from("<DEFAULT>"),
                }
            ),
        };

        log::debug!("Reading glTF material: {name}");

        let pbr = material.pbr_metallic_roughness();
        let base_color_image = match pbr.base_color_texture() {
            Some(texture_info) => {
                let image_id = texture_info.texture().source().index();
                match self.gltf_loader.load_image(image_id) {
                    Ok(image) => Some(image),
                    Err(err) => {
                        log::warn!("Unable to load base color image {image_id} of {name}: {err}");
                        None
                    }
                }
            }
            None => None,
        };

        let slot = self.materials.len();
        self.materials.push(MaterialData {
            name,
            base_color_factor: pbr.base_color_factor(),
            base_color_image,
        });
        self.material_registry.insert(material.index(), slot);

        Ok(slot)
    }
}

fn read_f32s(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}
