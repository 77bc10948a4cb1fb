use serde::{Deserialize, Serialize};

/// Which cubemap models sample for their reflections.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeMapType {
    Static,
    #[default]
    Dynamic,
}

impl CubeMapType {
    pub const ALL: [CubeMapType; 2] = [CubeMapType::Static, CubeMapType::Dynamic];

    pub fn label(&self) -> &'static str {
        match self {
            CubeMapType::Static => "Static",
            CubeMapType::Dynamic => "Dynamic",
        }
    }
}

/// How the sampled environment colour is combined with the lit surface colour.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMappingType {
    Add,
    Multiply,
    Average,
    #[default]
    Mix,
}

impl EnvironmentMappingType {
    pub const ALL: [EnvironmentMappingType; 4] = [
        EnvironmentMappingType::Add,
        EnvironmentMappingType::Multiply,
        EnvironmentMappingType::Average,
        EnvironmentMappingType::Mix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EnvironmentMappingType::Add => "Add",
            EnvironmentMappingType::Multiply => "Multiply",
            EnvironmentMappingType::Average => "Average",
            EnvironmentMappingType::Mix => "Mix",
        }
    }

    /// Value of the `mapping_type` shader uniform.
    pub fn shader_value(&self) -> u32 {
        match self {
            EnvironmentMappingType::Add => 0,
            EnvironmentMappingType::Multiply => 1,
            EnvironmentMappingType::Average => 2,
            EnvironmentMappingType::Mix => 3,
        }
    }
}

/// Cubemap a model samples for its reflections in a given frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EnvironmentMapSource {
    Static,
    /// The model's own render-target cubemap.
    Dynamic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub show_materials: bool,
    pub renderer_color: [f32; 4],
    pub show_reference_sphere: bool,
    pub enable_environment_mapping: bool,
    pub cubemap_type: CubeMapType,
    pub mapping_type: EnvironmentMappingType,
    pub light_direction: [f32; 3],
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            show_materials: true,
            renderer_color: [0.75, 0.75, 0.75, 1.0],
            show_reference_sphere: true,
            enable_environment_mapping: true,
            cubemap_type: CubeMapType::Dynamic,
            mapping_type: EnvironmentMappingType::Mix,
            light_direction: [-0.3, -1.0, -0.5],
        }
    }
}

impl ViewerSettings {
    /// Dynamic cubemaps are only worth re-rendering when something samples them.
    pub fn uses_dynamic_cubemaps(&self) -> bool {
        self.enable_environment_mapping && self.cubemap_type == CubeMapType::Dynamic
    }

    pub fn environment_map_source(&self) -> EnvironmentMapSource {
        match self.uses_dynamic_cubemaps() {
            true => EnvironmentMapSource::Dynamic,
            false => EnvironmentMapSource::Static,
        }
    }

    pub fn object_alpha(&self) -> f32 {
        self.renderer_color[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_dynamic_mix_reflections() {
        let settings = ViewerSettings::default();

        assert!(settings.show_materials);
        assert!(settings.show_reference_sphere);
        assert_eq!(settings.mapping_type, EnvironmentMappingType::Mix);
        assert!(settings.uses_dynamic_cubemaps());
        assert_eq!(settings.object_alpha(), 1.0);
    }

    #[test]
    fn dynamic_cubemaps_need_environment_mapping() {
        let mut settings = ViewerSettings {
            enable_environment_mapping: false,
            ..Default::default()
        };
        assert!(!settings.uses_dynamic_cubemaps());

        settings.enable_environment_mapping = true;
        settings.cubemap_type = CubeMapType::Static;
        assert!(!settings.uses_dynamic_cubemaps());
    }

    #[test]
    fn cubemap_type_selects_environment_map() {
        let mut settings = ViewerSettings::default();
        assert_eq!(settings.environment_map_source(), EnvironmentMapSource::Dynamic);

        settings.cubemap_type = CubeMapType::Static;
        assert_eq!(settings.environment_map_source(), EnvironmentMapSource::Static);

        settings.cubemap_type = CubeMapType::Dynamic;
        settings.enable_environment_mapping = false;
        assert_eq!(settings.environment_map_source(), EnvironmentMapSource::Static);
    }

    #[test]
    fn mapping_types_have_distinct_shader_values() {
        let values: Vec<u32> = EnvironmentMappingType::ALL
            .iter()
            .map(EnvironmentMappingType::shader_value)
            .collect();

        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let settings: ViewerSettings =
            serde_json::from_str(r#"{ "cubemap_type": "static", "mapping_type": "add" }"#).unwrap();

        assert_eq!(settings.cubemap_type, CubeMapType::Static);
        assert_eq!(settings.mapping_type, EnvironmentMappingType::Add);
        assert_eq!(settings.renderer_color, [0.75, 0.75, 0.75, 1.0]);
    }
}
