use std::thread::{self, JoinHandle};

use tracing::info;

use common::{progress::Progress, slice::SliceResult};
use mesh_format::Mesh;

use crate::{
    mesh::NormalizedMesh,
    slicer::{SliceSettings, Slicer},
    SliceError,
};

/// Owned state for one loaded model: the raw mesh, its normalized form, the
/// active settings, and the latest slice result. Every transition replaces
/// state wholesale; nothing is patched in place, and a settings change
/// invalidates any in-flight or completed slice.
pub struct SlicerSession {
    mesh: Mesh,
    normalized: NormalizedMesh,
    settings: SliceSettings,
    result: Option<SliceResult>,
    active: Option<SliceOperation>,
}

/// Handle to a background slicing run.
struct SliceOperation {
    progress: Progress,
    handle: JoinHandle<Result<SliceResult, SliceError>>,
}

impl SlicerSession {
    /// Parses a mesh file buffer and normalizes it to the settings' target
    /// height.
    pub fn load(buffer: &[u8], settings: SliceSettings) -> Result<Self, SliceError> {
        let mesh = mesh_format::load_mesh(buffer)?;
        info!("loaded mesh with {} triangles", mesh.triangles.len());
        Self::from_mesh(mesh, settings)
    }

    /// Builds a session around an already parsed mesh.
    pub fn from_mesh(mesh: Mesh, settings: SliceSettings) -> Result<Self, SliceError> {
        settings.layer_plan()?;
        let normalized = NormalizedMesh::new(&mesh, settings.target_height)?;

        Ok(Self {
            mesh,
            normalized,
            settings,
            result: None,
            active: None,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn normalized(&self) -> &NormalizedMesh {
        &self.normalized
    }

    pub fn settings(&self) -> SliceSettings {
        self.settings
    }

    /// The latest completed result, if any.
    pub fn result(&self) -> Option<&SliceResult> {
        self.result.as_ref()
    }

    pub fn is_slicing(&self) -> bool {
        self.active.is_some()
    }

    /// Replaces the slicing settings. Any run in flight is cancelled and any
    /// previous result discarded; a change of target height renormalizes the
    /// mesh before anything else may run against it.
    pub fn set_settings(&mut self, settings: SliceSettings) -> Result<(), SliceError> {
        settings.layer_plan()?;
        self.cancel_slice();
        self.result = None;

        if settings.target_height != self.settings.target_height {
            self.normalized = NormalizedMesh::new(&self.mesh, settings.target_height)?;
        }
        self.settings = settings;

        Ok(())
    }

    pub fn set_target_height(&mut self, target_height: f32) -> Result<(), SliceError> {
        self.set_settings(SliceSettings {
            target_height,
            ..self.settings
        })
    }

    /// Starts a background slicing run, returning its progress monitor. At
    /// most one run is in flight per session; a run already active is
    /// cancelled and discarded before the new one starts.
    pub fn start_slice(&mut self) -> Result<Progress, SliceError> {
        self.cancel_slice();
        self.result = None;

        let slicer = Slicer::new(self.settings, self.normalized.clone())?;
        let progress = slicer.progress();
        let handle = thread::spawn(move || slicer.slice());

        self.active = Some(SliceOperation {
            progress: progress.clone(),
            handle,
        });
        Ok(progress)
    }

    /// Blocks until the active run finishes, stores its result, and returns
    /// it.
    pub fn wait_slice(&mut self) -> Result<&SliceResult, SliceError> {
        let operation = self.active.take().ok_or(SliceError::NoActiveRun)?;
        let result = operation.handle.join().expect("slicing thread panicked")?;

        info!(
            "sliced {} layers ({} degenerate intersections dropped)",
            result.layers.len(),
            result.degenerate_drops
        );
        Ok(self.result.insert(result))
    }

    /// Cancels any run in flight and discards whatever it produced.
    pub fn cancel_slice(&mut self) {
        if let Some(operation) = self.active.take() {
            operation.progress.cancel();
            let _ = operation.handle.join();
            info!("cancelled in-flight slicing run");
        }
    }
}
