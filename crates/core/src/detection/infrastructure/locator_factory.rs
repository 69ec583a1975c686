use std::path::PathBuf;

use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::face_locator::FaceLocator;
use crate::pipeline::diagnostics::DiagnosticsSink;
use crate::shared::asset_resolver;
use crate::shared::constants::{
    BLAZEFACE_MODEL_NAME, BLAZEFACE_MODEL_URL, PERSON_MODEL_NAME, PERSON_MODEL_URL,
};

use super::haar_locator::HaarLocator;
use super::onnx_blazeface_locator::{self, OnnxBlazefaceLocator};
use super::onnx_person_locator::{self, OnnxPersonLocator};

/// Creates locator instances on demand.
///
/// The seam between the pipeline and locator construction. The default
/// provider resolves model weights through the asset cache (possibly
/// over the network); hosts and tests substitute their own.
pub trait LocatorProvider: Send {
    /// Build a locator for `kind`. Never fails: when the requested
    /// backend cannot be constructed, the dependency-free cascade is
    /// returned instead, with the degradation reported through `sink`
    /// and reflected in the returned kind. Detection is always
    /// available — degraded, not absent.
    fn create(
        &mut self,
        kind: BackendKind,
        sink: &mut dyn DiagnosticsSink,
    ) -> (Box<dyn FaceLocator>, BackendKind);
}

/// Default provider: ONNX-backed locators with weights resolved through
/// the platform asset cache.
pub struct OnnxLocatorProvider {
    bundled_dir: Option<PathBuf>,
}

impl OnnxLocatorProvider {
    pub fn new() -> Self {
        Self { bundled_dir: None }
    }

    /// Also look for weights in `dir` (pre-packaged installs).
    pub fn with_bundled_dir(dir: PathBuf) -> Self {
        Self {
            bundled_dir: Some(dir),
        }
    }

    fn try_create(
        &self,
        kind: BackendKind,
    ) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
        match kind {
            BackendKind::Haar => Ok(Box::new(HaarLocator::new())),
            BackendKind::DnnPerson => {
                let path = asset_resolver::resolve(
                    PERSON_MODEL_NAME,
                    PERSON_MODEL_URL,
                    self.bundled_dir.as_deref(),
                    None,
                )?;
                Ok(Box::new(OnnxPersonLocator::new(
                    &path,
                    onnx_person_locator::DEFAULT_CONFIDENCE,
                )?))
            }
            BackendKind::MediaPipe => {
                let path = asset_resolver::resolve(
                    BLAZEFACE_MODEL_NAME,
                    BLAZEFACE_MODEL_URL,
                    self.bundled_dir.as_deref(),
                    None,
                )?;
                Ok(Box::new(OnnxBlazefaceLocator::new(
                    &path,
                    onnx_blazeface_locator::DEFAULT_CONFIDENCE,
                )?))
            }
        }
    }
}

impl Default for OnnxLocatorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocatorProvider for OnnxLocatorProvider {
    fn create(
        &mut self,
        kind: BackendKind,
        sink: &mut dyn DiagnosticsSink,
    ) -> (Box<dyn FaceLocator>, BackendKind) {
        match self.try_create(kind) {
            Ok(locator) => (locator, kind),
            Err(err) => {
                sink.warning(&format!(
                    "backend {kind} unavailable ({err}), falling back to haar"
                ));
                (Box::new(HaarLocator::new()), BackendKind::Haar)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::diagnostics::NullDiagnostics;
    use crate::shared::frame::Frame;

    #[test]
    fn test_haar_kind_constructs_without_assets() {
        let mut provider = OnnxLocatorProvider::new();
        let (mut locator, kind) = provider.create(BackendKind::Haar, &mut NullDiagnostics);
        assert_eq!(kind, BackendKind::Haar);
        // The instance is usable immediately
        let boxes = locator.locate(&Frame::filled(64, 64, [0, 0, 0])).unwrap();
        assert!(boxes.is_empty());
    }

    #[test]
    fn test_onnx_kinds_degrade_but_never_fail() {
        // May download weights when the environment allows it; skipped
        // in CI to stay off the network.
        if std::env::var("CI").is_ok() {
            return;
        }
        struct Recording(Vec<String>);
        impl DiagnosticsSink for Recording {
            fn warning(&mut self, message: &str) {
                self.0.push(message.to_string());
            }
            fn info(&mut self, _message: &str) {}
        }

        let mut provider = OnnxLocatorProvider::new();
        let mut sink = Recording(Vec::new());
        let (_, kind) = provider.create(BackendKind::DnnPerson, &mut sink);
        match kind {
            BackendKind::DnnPerson => assert!(sink.0.is_empty()),
            BackendKind::Haar => assert!(sink.0[0].contains("falling back to haar")),
            other => panic!("unexpected effective kind: {other}"),
        }
    }
}
