//! Body mesh estimator running an exported model through ONNX Runtime (`ort`).
//!
//! Handles letterbox preprocessing, inference, score filtering and mapping
//! projected vertices back into frame coordinates.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::estimation::domain::inference_output::{InferenceOutput, MeshTopology, PersonEstimate};
use crate::estimation::domain::pose_estimator::PoseEstimator;
use crate::shared::frame::{Frame, PixelOrder};

use super::execution_provider::preferred_execution_providers;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 512;

/// People scored below this are dropped.
pub const DEFAULT_MIN_SCORE: f32 = 0.5;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

pub struct OnnxBodyEstimator {
    session: ort::session::Session,
    faces: MeshTopology,
    input_size: u32,
    min_score: f32,
}

impl OnnxBodyEstimator {
    /// Load the model and its mesh topology.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 512 if the shape is dynamic or unreadable.
    pub fn new(
        model_path: &Path,
        faces_path: &Path,
        min_score: f32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let faces = load_mesh_faces(faces_path)?;

        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Loaded {} ({} mesh faces, input {input_size}x{input_size})",
            model_path.display(),
            faces.faces.len()
        );

        Ok(Self {
            session,
            faces,
            input_size,
            min_score,
        })
    }
}

impl PoseEstimator for OnnxBodyEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<InferenceOutput, Box<dyn std::error::Error>> {
        if frame.order() != PixelOrder::Rgb {
            return Err(format!("frame {} must be RGB for inference", frame.index()).into());
        }
        if frame.width() == 0 || frame.height() == 0 {
            return Err(format!("frame {} is empty", frame.index()).into());
        }

        let letterbox = Letterbox::fit(frame.width(), frame.height(), self.input_size);
        let input_tensor = preprocess(frame, &letterbox)?;
        let min_score = self.min_score;

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("body model produced no outputs".into());
        }

        let vertices = outputs[0].try_extract_array::<f32>()?;
        let shape = vertices.shape().to_vec();
        let data = vertices.as_slice().ok_or("Cannot get vertex slice")?;

        let scores = if outputs.len() > 1 {
            let scores = outputs[1].try_extract_array::<f32>()?;
            Some(scores.iter().copied().collect::<Vec<f32>>())
        } else {
            None
        };

        let people = decode_people(data, &shape, scores.as_deref(), min_score, &letterbox)?;
        Ok(InferenceOutput {
            frame_index: frame.index(),
            people,
        })
    }

    fn faces(&self) -> &MeshTopology {
        &self.faces
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Placement of a frame inside the square model input.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    size: u32,
    scale: f32,
    new_w: u32,
    new_h: u32,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn fit(width: u32, height: u32, size: u32) -> Self {
        let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
        let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
        let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);
        Self {
            size,
            scale,
            new_w,
            new_h,
            pad_x: (size - new_w) / 2,
            pad_y: (size - new_h) / 2,
        }
    }

    /// Maps a point in model-input pixels back to frame pixels.
    fn to_frame(&self, x: f32, y: f32) -> [f32; 2] {
        [
            (x - self.pad_x as f32) / self.scale,
            (y - self.pad_y as f32) / self.scale,
        ]
    }
}

/// Letterboxes an RGB frame into a normalized NCHW float32 tensor.
///
/// Padding is zero, i.e. the dataset mean after normalization.
fn preprocess(
    frame: &Frame,
    letterbox: &Letterbox,
) -> Result<ndarray::Array4<f32>, ndarray::ShapeError> {
    let size = letterbox.size as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));

    let src = frame.as_ndarray()?; // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let scale = letterbox.scale as f64;

    // Nearest-neighbor resize + copy into padded region
    for y in 0..letterbox.new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..letterbox.new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = letterbox.pad_y as usize + y;
            let tx = letterbox.pad_x as usize + x;
            for c in 0..3 {
                let v = src[[src_y, src_x, c]] as f32 / 255.0;
                tensor[[0, c, ty, tx]] = (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            }
        }
    }

    Ok(tensor)
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Decodes projected vertices shaped `[N, V, C]` (or `[V, C]` for a single
/// person), `C >= 2`, keeping people whose score reaches `min_score`.
///
/// People without a score are kept.
fn decode_people(
    data: &[f32],
    shape: &[usize],
    scores: Option<&[f32]>,
    min_score: f32,
    letterbox: &Letterbox,
) -> Result<Vec<PersonEstimate>, Box<dyn std::error::Error>> {
    let (num_people, num_vertices, coords) = match *shape {
        [n, v, c] => (n, v, c),
        [v, c] => (1, v, c),
        _ => return Err(format!("Unexpected vertex output shape: {shape:?}").into()),
    };
    if coords < 2 {
        return Err(format!("Vertex output needs at least 2 coordinates, got {shape:?}").into());
    }
    if data.len() != num_people * num_vertices * coords {
        return Err(format!(
            "Vertex output has {} values, shape {shape:?} needs {}",
            data.len(),
            num_people * num_vertices * coords
        )
        .into());
    }

    let mut people = Vec::with_capacity(num_people);
    for p in 0..num_people {
        let score = scores.and_then(|s| s.get(p).copied()).unwrap_or(1.0);
        if score < min_score {
            continue;
        }

        let person = &data[p * num_vertices * coords..(p + 1) * num_vertices * coords];
        let vertices = person
            .chunks_exact(coords)
            .map(|v| letterbox.to_frame(v[0], v[1]))
            .collect();
        people.push(PersonEstimate { vertices, score });
    }
    Ok(people)
}

/// `faces.json` is either a bare triangle list or `{"faces": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum FacesFile {
    Bare(Vec<[u32; 3]>),
    Wrapped { faces: Vec<[u32; 3]> },
}

fn load_mesh_faces(path: &Path) -> Result<MeshTopology, Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let parsed: FacesFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("{}: {e}", path.display()))?;
    let faces = match parsed {
        FacesFile::Bare(faces) | FacesFile::Wrapped { faces } => faces,
    };
    Ok(MeshTopology::new(faces))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rgb_frame(width: u32, height: u32, value: u8) -> Frame {
        let data = vec![value; (width * height * 3) as usize];
        Frame::new(data, width, height, PixelOrder::Rgb, 0)
    }

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 512: scale 2.56, content 512x256, pad_y 128
        let lb = Letterbox::fit(200, 100, 512);
        assert_relative_eq!(lb.scale, 2.56);
        assert_eq!((lb.new_w, lb.new_h), (512, 256));
        assert_eq!((lb.pad_x, lb.pad_y), (0, 128));
    }

    #[test]
    fn test_letterbox_inverse_mapping() {
        let lb = Letterbox::fit(200, 100, 512);
        let [x, y] = lb.to_frame(256.0, 128.0 + 128.0);
        assert_relative_eq!(x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(y, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn test_preprocess_shape_and_normalization() {
        let frame = rgb_frame(100, 50, 255);
        let lb = Letterbox::fit(100, 50, 64);
        let tensor = preprocess(&frame, &lb).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 64, 64]);

        // Padding rows stay at the normalized mean
        assert_relative_eq!(tensor[[0, 0, 0, 0]], 0.0);

        let y = lb.pad_y as usize + 1;
        for c in 0..3 {
            let expected = (1.0 - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            assert_relative_eq!(tensor[[0, c, y, 1]], expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_preprocess_rejects_short_buffer() {
        let frame = Frame::new(vec![0u8; 10], 4, 2, PixelOrder::Rgb, 0);
        let lb = Letterbox::fit(4, 2, 16);
        assert!(preprocess(&frame, &lb).is_err());
    }

    #[test]
    fn test_decode_people_filters_by_score() {
        let lb = Letterbox::fit(64, 64, 64);
        // 2 people, 2 vertices, 3 coords
        let data: [f32; 12] = [
            1.0, 2.0, 9.0, 3.0, 4.0, 9.0, //
            5.0, 6.0, 9.0, 7.0, 8.0, 9.0,
        ];
        let people = decode_people(&data, &[2, 2, 3], Some(&[0.9, 0.1][..]), 0.5, &lb).unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].vertices, vec![[1.0, 2.0], [3.0, 4.0]]);
        assert_relative_eq!(people[0].score, 0.9);
    }

    #[test]
    fn test_decode_people_without_scores_keeps_all() {
        let lb = Letterbox::fit(64, 64, 64);
        let data = [0.0f32; 2 * 3 * 2];
        let people = decode_people(&data, &[2, 3, 2], None, 0.5, &lb).unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].vertices.len(), 3);
    }

    #[test]
    fn test_decode_people_single_person_shape() {
        let lb = Letterbox::fit(64, 64, 64);
        let people = decode_people(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], None, 0.5, &lb).unwrap();
        assert_eq!(people.len(), 1);
        assert_eq!(people[0].vertices, vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_decode_people_maps_out_of_letterbox() {
        // 128x64 frame in a 64 input: scale 0.5, pad_y 16
        let lb = Letterbox::fit(128, 64, 64);
        let people = decode_people(&[32.0f32, 32.0], &[1, 1, 2], None, 0.5, &lb).unwrap();
        assert_eq!(people[0].vertices, vec![[64.0, 32.0]]);
    }

    #[test]
    fn test_decode_people_rejects_bad_shapes() {
        let lb = Letterbox::fit(64, 64, 64);
        assert!(decode_people(&[0.0f32; 4], &[4], None, 0.5, &lb).is_err());
        assert!(decode_people(&[0.0f32; 4], &[1, 4, 1], None, 0.5, &lb).is_err());
        assert!(decode_people(&[0.0f32; 3], &[1, 2, 2], None, 0.5, &lb).is_err());
    }

    #[test]
    fn test_decode_people_empty_result() {
        let lb = Letterbox::fit(64, 64, 64);
        let people = decode_people(&[], &[0, 10, 2], None, 0.5, &lb).unwrap();
        assert!(people.is_empty());
    }

    #[test]
    fn test_load_mesh_faces_bare_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.json");
        std::fs::write(&path, "[[0, 1, 2], [2, 1, 3]]").unwrap();

        let topology = load_mesh_faces(&path).unwrap();
        assert_eq!(topology.faces, vec![[0, 1, 2], [2, 1, 3]]);
    }

    #[test]
    fn test_load_mesh_faces_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.json");
        std::fs::write(&path, r#"{"faces": [[4, 5, 6]]}"#).unwrap();

        let topology = load_mesh_faces(&path).unwrap();
        assert_eq!(topology.faces, vec![[4, 5, 6]]);
    }

    #[test]
    fn test_load_mesh_faces_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_mesh_faces(&path).is_err());
    }

    #[test]
    fn test_load_mesh_faces_missing_file() {
        assert!(load_mesh_faces(Path::new("/nonexistent/faces.json")).is_err());
    }
}
