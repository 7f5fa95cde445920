//! glTF model and sky texture loading for both platforms.
//!
//! Parsing is shared; only fetching bytes differs. The browser pulls the
//! document and its external buffers with `fetch`, native reads them from disk
//! on a worker thread so the frame loop keeps running while the model loads.

use glam::Mat4;
use tracing::{debug, info};

use crate::model::AnimationClip;
use crate::utils::{Mesh, Vertex};

/// Base color used when a primitive carries neither vertex colors nor a material.
const DEFAULT_MODEL_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },
    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("glTF buffer {0} is missing")]
    MissingBuffer(usize),
    #[error("glTF buffer {index} uses unsupported uri {uri}")]
    UnsupportedUri { index: usize, uri: String },
    #[error("model contains no triangle meshes")]
    NoMesh,
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Everything the scene needs from a loaded character model.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub mesh: Mesh,
    pub clips: Vec<AnimationClip>,
}

/// Decoded RGBA8 sky background.
pub struct SkyImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Flatten the default scene of a document into one mesh and list its clips.
pub fn extract_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<LoadedModel, AssetError> {
    for buffer in document.buffers() {
        if buffer.index() >= buffers.len() {
            return Err(AssetError::MissingBuffer(buffer.index()));
        }
    }

    let mut mesh = Mesh::empty();
    let scene = document.default_scene().or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, buffers, &mut mesh);
        }
    }
    if mesh.is_empty() {
        return Err(AssetError::NoMesh);
    }

    let clips = document
        .animations()
        .enumerate()
        .map(|(i, anim)| {
            let duration = anim
                .channels()
                .filter_map(|channel| {
                    let reader = channel.reader(|b| buffers.get(b.index()).map(|d| &d.0[..]));
                    reader.read_inputs().map(|inputs| inputs.fold(0.0f32, f32::max))
                })
                .fold(0.0f32, f32::max);
            AnimationClip {
                name: anim.name().map(str::to_string).unwrap_or_else(|| format!("clip{i}")),
                duration,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        vertices = mesh.vertices.len(),
        triangles = mesh.indices.len() / 3,
        clips = clips.len(),
        "extracted glTF model"
    );
    Ok(LoadedModel { mesh, clips })
}

fn collect_node(node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data], out: &mut Mesh) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            if let Some(part) = read_primitive(&primitive, buffers) {
                out.append_transformed(&part, world);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn read_primitive(primitive: &gltf::Primitive, buffers: &[gltf::buffer::Data]) -> Option<Mesh> {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|d| &d.0[..]));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|n| n.collect())
        .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
    let base_color = primitive.material().pbr_metallic_roughness().base_color_factor();
    let colors: Vec<[f32; 4]> = reader
        .read_colors(0)
        .map(|c| c.into_rgba_f32().collect())
        .unwrap_or_else(|| vec![base_color; positions.len()]);
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, pos)| Vertex {
            pos: *pos,
            normal: normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            color: colors.get(i).copied().unwrap_or(DEFAULT_MODEL_COLOR),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();

    Some(Mesh { vertices, indices })
}

/// Largest sky edge uploaded; WebGL2 devices only guarantee 2048.
pub const SKY_MAX_DIMENSION: u32 = 2048;

/// Decode an encoded image (jpeg/png) into RGBA8, downscaled to fit
/// [`SKY_MAX_DIMENSION`].
pub fn decode_sky(bytes: &[u8]) -> Result<SkyImage, AssetError> {
    let mut image = image::load_from_memory(bytes)?;
    if image.width() > SKY_MAX_DIMENSION || image.height() > SKY_MAX_DIMENSION {
        debug!(width = image.width(), height = image.height(), "downscaling sky");
        image = image.resize(
            SKY_MAX_DIMENSION,
            SKY_MAX_DIMENSION,
            image::imageops::FilterType::Triangle,
        );
    }
    let rgba = image.to_rgba8();
    Ok(SkyImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Directory part of a slash-separated path, including the trailing slash.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn base_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::*;
    use std::path::Path;
    use std::sync::mpsc::{self, Receiver};

    /// Load and flatten a `.gltf`/`.glb` file from disk.
    pub fn load_model(path: &Path) -> Result<LoadedModel, AssetError> {
        info!(path = %path.display(), "loading model");
        let (document, buffers, _images) = gltf::import(path)?;
        extract_model(&document, &buffers)
    }

    /// Load the model on a worker thread; the result arrives on the returned channel.
    pub fn spawn_model_load(path: String) -> Receiver<Result<LoadedModel, AssetError>> {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = load_model(Path::new(&path));
            let _ = tx.send(result);
        });
        rx
    }

    pub fn load_sky(path: &Path) -> Result<SkyImage, AssetError> {
        let bytes = std::fs::read(path)?;
        decode_sky(&bytes)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
        let fail = |reason: String| AssetError::Fetch { url: url.to_string(), reason };

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        let request = Request::new_with_str_and_init(url, &opts).map_err(|e| fail(format!("{e:?}")))?;

        let window = web_sys::window().ok_or_else(|| fail("no window".into()))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| fail(format!("{e:?}")))?;
        let response: Response = response.dyn_into().map_err(|e| fail(format!("{e:?}")))?;
        if !response.ok() {
            return Err(fail(format!("HTTP {}", response.status())));
        }

        let buffer = response.array_buffer().map_err(|e| fail(format!("{e:?}")))?;
        let buffer = JsFuture::from(buffer).await.map_err(|e| fail(format!("{e:?}")))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }

    /// Fetch a glTF document and its buffers, then flatten it.
    pub async fn load_model(url: &str) -> Result<LoadedModel, AssetError> {
        info!(url, "loading model");
        let bytes = fetch_bytes(url).await?;
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(&bytes)?;

        let base = base_of(url);
        let mut buffers = Vec::new();
        for buffer in document.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => blob.clone().ok_or(AssetError::MissingBuffer(buffer.index()))?,
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                    return Err(AssetError::UnsupportedUri { index: buffer.index(), uri: uri.to_string() });
                }
                gltf::buffer::Source::Uri(uri) => fetch_bytes(&format!("{base}{uri}")).await?,
            };
            buffers.push(gltf::buffer::Data(data));
        }

        extract_model(&document, &buffers)
    }

    pub async fn load_sky(url: &str) -> Result<SkyImage, AssetError> {
        let bytes = fetch_bytes(url).await?;
        decode_sky(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// One triangle, one animation channel whose keyframes end at 1.5 s.
    fn triangle_gltf() -> (gltf::Document, Vec<gltf::buffer::Data>) {
        let mut bin = Vec::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for t in [0.0f32, 1.5] {
            bin.extend_from_slice(&t.to_le_bytes());
        }
        for q in [[0.0f32, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0, 1.0]] {
            for c in q {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }

        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "mesh": 0, "translation": [0.0, 2.0, 0.0] }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
  "animations": [{{
    "name": "Walk",
    "channels": [{{ "sampler": 0, "target": {{ "node": 0, "path": "rotation" }} }}],
    "samplers": [{{ "input": 1, "output": 2 }}]
  }}],
  "buffers": [{{ "byteLength": {len} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 44, "byteLength": 32 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR",
       "min": [0.0], "max": [1.5] }},
    {{ "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC4" }}
  ]
}}"#,
            len = bin.len()
        );

        let gltf = gltf::Gltf::from_slice(json.as_bytes()).expect("valid glTF json");
        (gltf.document, vec![gltf::buffer::Data(bin)])
    }

    #[test]
    fn extracts_mesh_with_node_transform() {
        let (document, buffers) = triangle_gltf();
        let model = extract_model(&document, &buffers).unwrap();

        assert_eq!(model.mesh.vertices.len(), 3);
        assert_eq!(model.mesh.indices, vec![0, 1, 2]);
        let (lo, hi) = model.mesh.bounds().unwrap();
        assert_eq!(lo, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(hi, Vec3::new(1.0, 3.0, 0.0));
    }

    #[test]
    fn clip_duration_is_last_keyframe() {
        let (document, buffers) = triangle_gltf();
        let model = extract_model(&document, &buffers).unwrap();
        assert_eq!(model.clips.len(), 1);
        assert_eq!(model.clips[0].name, "Walk");
        assert!((model.clips[0].duration - 1.5).abs() < 1e-6);
    }

    #[test]
    fn missing_buffer_is_an_error() {
        let (document, _) = triangle_gltf();
        let err = extract_model(&document, &[]).unwrap_err();
        assert!(matches!(err, AssetError::MissingBuffer(0)));
    }

    #[test]
    fn buffer_uris_resolve_next_to_the_document() {
        assert_eq!(base_of("assets/robot_dog/scene.gltf"), "assets/robot_dog/");
        assert_eq!(base_of("scene.gltf"), "");
    }

    #[test]
    fn sky_decodes_png() {
        let mut bytes = Vec::new();
        let img = image::RgbaImage::from_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let sky = decode_sky(&bytes).unwrap();
        assert_eq!((sky.width, sky.height), (2, 1));
        assert_eq!(&sky.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn oversized_sky_is_downscaled_keeping_aspect() {
        let mut bytes = Vec::new();
        let img = image::RgbaImage::from_pixel(4096, 1024, image::Rgba([0, 0, 255, 255]));
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let sky = decode_sky(&bytes).unwrap();
        assert_eq!((sky.width, sky.height), (2048, 512));
        assert_eq!(sky.rgba.len(), 2048 * 512 * 4);
    }
}
