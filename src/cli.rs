use std::path::PathBuf;

use clap::Parser;

/// A viewer for static and dynamic cubemap reflections
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Model files (.gltf, .glb, .obj) to add to the scene at the origin
    pub models: Vec<PathBuf>,

    /// Path to a JSON scene description
    #[arg(short = 's', long)]
    pub scene: Option<PathBuf>,

    /// Directory containing the skybox faces right, left, top, bottom, front and back
    #[arg(short = 'S', long)]
    pub skybox: Option<PathBuf>,

    /// Edge length in pixels of every dynamic cubemap face
    #[arg(
        short = 'r',
        long,
        default_value_t = envmap_viewer::args::DEFAULT_CUBEMAP_RESOLUTION,
        value_parser = clap::value_parser!(u32).range(16..=4096)
    )]
    pub cubemap_resolution: u32,
}

impl From<Cli> for envmap_viewer::args::Args {
    fn from(value: Cli) -> Self {
        envmap_viewer::args::Args {
            models: value.models,
            scene: value.scene,
            skybox: value.skybox,
            cubemap_resolution: value.cubemap_resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["envmap_viewer"]).unwrap();

        assert!(cli.models.is_empty());
        assert!(cli.scene.is_none());
        assert!(cli.skybox.is_none());
        assert_eq!(cli.cubemap_resolution, 256);
    }

    #[test]
    fn parses_models_and_options() {
        let cli = Cli::try_parse_from([
            "envmap_viewer",
            "teapot.obj",
            "duck.glb",
            "--skybox",
            "sky",
            "-r",
            "512",
            "--scene",
            "scene.json",
        ])
        .unwrap();

        assert_eq!(
            cli.models,
            vec![PathBuf::from("teapot.obj"), PathBuf::from("duck.glb")]
        );
        assert_eq!(cli.skybox, Some(PathBuf::from("sky")));
        assert_eq!(cli.scene, Some(PathBuf::from("scene.json")));
        assert_eq!(cli.cubemap_resolution, 512);
    }

    #[test]
    fn rejects_out_of_range_resolution() {
        assert!(Cli::try_parse_from(["envmap_viewer", "-r", "0"]).is_err());
        assert!(Cli::try_parse_from(["envmap_viewer", "-r", "8192"]).is_err());
    }
}
