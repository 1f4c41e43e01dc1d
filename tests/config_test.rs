use std::{path::PathBuf, time::Duration};

use basic_viewer::{
    config::{Args, DEFAULT_DIFFUSE, DEFAULT_NORMAL, DEFAULT_SHADER, ViewerConfig},
    context::choose_present_mode,
};
use clap::Parser;

#[test]
fn model_path_is_required() {
    assert!(Args::try_parse_from(["basic-viewer"]).is_err());
}

#[test]
fn defaults_match_the_bundled_assets() {
    let args = Args::try_parse_from(["basic-viewer", "scene.gltf"]).unwrap();

    let config = ViewerConfig::from(args);

    assert_eq!(config.model, PathBuf::from("scene.gltf"));
    assert_eq!(config.shader, PathBuf::from(DEFAULT_SHADER));
    assert_eq!(config.diffuse, PathBuf::from(DEFAULT_DIFFUSE));
    assert_eq!(config.normal, PathBuf::from(DEFAULT_NORMAL));
    assert_eq!((config.width, config.height), (800, 800));
    assert_eq!(config.frame_interval, Duration::from_millis(15));
    assert!(config.vsync);
    assert!(!config.debug_scene);
    assert_eq!(config.max_frames, None);
    assert_eq!(config, ViewerConfig::default().with_model("scene.gltf"));
}

#[test]
fn flags_override_the_defaults() {
    let args = Args::try_parse_from([
        "basic-viewer",
        "cube.obj",
        "--shader",
        "other.wgsl",
        "--diffuse",
        "d.jpg",
        "--normal",
        "n.png",
        "--width",
        "0",
        "--height",
        "600",
        "--frame-interval-ms",
        "33",
        "--no-vsync",
        "--debug-scene",
        "--max-frames",
        "10",
    ])
    .unwrap();

    let config = ViewerConfig::from(args);

    let expected = ViewerConfig::default()
        .with_model("cube.obj")
        .with_shader("other.wgsl")
        .with_textures("d.jpg", "n.png")
        .with_size(1, 600)
        .with_frame_interval(Duration::from_millis(33))
        .with_vsync(false)
        .with_debug_scene(true)
        .with_max_frames(Some(10));
    assert_eq!(config, expected);
}

#[test]
fn present_mode_follows_vsync() {
    use wgpu::PresentMode;

    let all = [PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate];
    assert_eq!(choose_present_mode(&all, true), PresentMode::Fifo);
    assert_eq!(choose_present_mode(&all, false), PresentMode::Immediate);
    assert_eq!(
        choose_present_mode(&[PresentMode::Fifo, PresentMode::Mailbox], false),
        PresentMode::Mailbox
    );
    assert_eq!(choose_present_mode(&[PresentMode::Fifo], false), PresentMode::Fifo);
}
