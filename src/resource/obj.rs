//! Wavefront OBJ loading through `tobj`.

use std::path::Path;

use anyhow::Result;

use crate::error::Error;
use crate::resource::mesh::{MaterialData, MeshData, PrimitiveData};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

pub fn load_mesh(path: &Path) -> Result<MeshData> {
    let (models, materials) = tobj::load_obj(path, &load_options())?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(err) => {
            log::warn!("Unable to load materials for {}: {err}", path.display());
            vec![]
        }
    };

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("<UNNAMED>")
        .to_string();

    convert(name, models, materials, path.parent())
}

/// Parses OBJ text without touching the filesystem; material libraries are ignored.
pub fn load_mesh_from_reader(name: String, reader: &mut impl std::io::BufRead) -> Result<MeshData> {
    let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    convert(name, models, vec![], None)
}

fn convert(
    name: String,
    models: Vec<tobj::Model>,
    materials: Vec<tobj::Material>,
    base_directory: Option<&Path>,
) -> Result<MeshData> {
    let mut loaded_materials: Vec<MaterialData> = materials
        .iter()
        .map(|material| convert_material(material, base_directory))
        .collect();

    let mut primitives = vec![];
    let mut default_material = None;

    for model in models {
        let mesh = model.mesh;

        if mesh.positions.is_empty() || mesh.indices.is_empty() {
            log::debug!("Skipping empty OBJ object: {}", model.name);
            continue;
        }

        let positions = mesh
            .positions
            .chunks_exact(3)
            .map(|v| [v[0], v[1], v[2]])
            .collect::<Vec<_>>();

        let normals = if mesh.normals.is_empty() {
            None
        } else {
            Some(
                mesh.normals
                    .chunks_exact(3)
                    .map(|v| [v[0], v[1], v[2]])
                    .collect(),
            )
        };

        // OBJ texture space starts at the bottom left.
        let tex_coords = if mesh.texcoords.is_empty() {
            None
        } else {
            Some(
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|v| [v[0], 1.0 - v[1]])
                    .collect(),
            )
        };

        let material = match mesh.material_id {
            Some(id) if id < loaded_materials.len() => id,
            _ => *default_material.get_or_insert_with(|| {
                loaded_materials.push(MaterialData::default());
                loaded_materials.len() - 1
            }),
        };

        let primitive = PrimitiveData::new(
            positions,
            normals,
            tex_coords,
            Some(mesh.indices),
            Some(material),
        )
        .map_err(|err| Error::new(format!("Invalid OBJ object {}: {err}", model.name)))?;

        primitives.push(primitive);
    }

    if primitives.is_empty() {
        return Err(Error::new(format!("The OBJ file {name} contains no faces.")).into());
    }

    Ok(MeshData::new(name, primitives, loaded_materials))
}

fn convert_material(material: &tobj::Material, base_directory: Option<&Path>) -> MaterialData {
    let diffuse = material.diffuse.unwrap_or([1.0, 1.0, 1.0]);
    let dissolve = material.dissolve.unwrap_or(1.0);

    let base_color_image = match (&material.diffuse_texture, base_directory) {
        (Some(texture), Some(base_directory)) => {
            let texture_path = base_directory.join(texture);
            match image::open(&texture_path) {
                Ok(image) => Some(image.to_rgba8()),
                Err(err) => {
                    log::warn!(
                        "Unable to load diffuse texture {}: {err}",
                        texture_path.display()
                    );
                    None
                }
            }
        }
        _ => None,
    };

    MaterialData {
        name: material.name.clone(),
        base_color_factor: [diffuse[0], diffuse[1], diffuse[2], dissolve],
        base_color_image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn quad_is_triangulated_with_flipped_tex_coords() {
        let mesh = load_mesh_from_reader(String::from("quad"), &mut QUAD.as_bytes()).unwrap();

        assert_eq!(mesh.primitives.len(), 1);
        assert_eq!(mesh.triangle_count(), 2);

        let primitive = &mesh.primitives[0];
        let tex_coords = primitive.tex_coords.as_ref().unwrap();
        assert_eq!(tex_coords[0], [0.0, 1.0]);
        assert_eq!(tex_coords[2], [1.0, 0.0]);

        for normal in &primitive.normals {
            assert_eq!(*normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn objects_without_materials_share_a_default_material() {
        let source = format!("{QUAD}o second\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 5 6 7\n");
        let mesh = load_mesh_from_reader(String::from("two"), &mut source.as_bytes()).unwrap();

        assert_eq!(mesh.primitives.len(), 2);
        assert_eq!(mesh.materials.len(), 1);
        assert_eq!(mesh.primitives[0].material, Some(0));
        assert_eq!(mesh.primitives[1].material, Some(0));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(load_mesh_from_reader(String::from("empty"), &mut "# nothing\n".as_bytes()).is_err());
    }
}
