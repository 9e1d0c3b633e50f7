/// One person's estimate for a single frame.
///
/// `vertices` are mesh vertices projected into the pixel space of the frame
/// that was passed to the estimator.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonEstimate {
    pub vertices: Vec<[f32; 2]>,
    pub score: f32,
}

/// Estimator result keyed to exactly one input frame.
///
/// Consumed by the compositor and dropped before the next frame is read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InferenceOutput {
    pub frame_index: usize,
    pub people: Vec<PersonEstimate>,
}

impl InferenceOutput {
    pub fn empty(frame_index: usize) -> Self {
        Self {
            frame_index,
            people: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

/// Triangle list shared by every estimated mesh. Indices refer to
/// `PersonEstimate::vertices`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshTopology {
    pub faces: Vec<[u32; 3]>,
}

impl MeshTopology {
    pub fn new(faces: Vec<[u32; 3]>) -> Self {
        Self { faces }
    }

    /// Unique undirected edges, each reported once with the smaller index first.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<(u32, u32)> = self
            .faces
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
            .filter(|(a, b)| a != b)
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Largest vertex index referenced, if any.
    pub fn max_index(&self) -> Option<u32> {
        self.faces.iter().flatten().copied().max()
    }
}
