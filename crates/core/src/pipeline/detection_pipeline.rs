use std::time::Instant;

use crate::annotation::frame_annotator::FrameAnnotator;
use crate::classification::domain::emotion_classifier::EmotionClassifier;
use crate::classification::infrastructure::classifier_factory;
use crate::detection::domain::backend_kind::BackendKind;
use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::infrastructure::locator_factory::{LocatorProvider, OnnxLocatorProvider};
use crate::pipeline::diagnostics::{DiagnosticsSink, LogDiagnostics};
use crate::shared::constants::{CROP_MARGIN, MAX_WORKING_HEIGHT, MAX_WORKING_WIDTH};
use crate::shared::frame::Frame;

/// Per-frame orchestrator: locate faces, classify each, draw the result.
///
/// Owns the live locator and replaces it wholesale on a backend switch;
/// the classifier is backend-independent and survives switches. All
/// processing is synchronous and non-reentrant — one caller thread
/// drives both `process_frame` and `switch_backend`, and pacing is the
/// caller's job. `process_frame` is total under operating failures:
/// detector errors, classification errors, and degenerate regions
/// degrade per frame or per face, never panic or propagate.
pub struct DetectionPipeline {
    backend: BackendKind,
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn EmotionClassifier>,
    annotator: FrameAnnotator,
    provider: Box<dyn LocatorProvider>,
    diagnostics: Box<dyn DiagnosticsSink>,
}

impl DetectionPipeline {
    /// Wire the pipeline from explicit collaborators.
    ///
    /// Construction always succeeds and always lands in a usable state:
    /// the provider degrades to the cascade backend rather than fail.
    pub fn new(
        requested: BackendKind,
        mut provider: Box<dyn LocatorProvider>,
        classifier: Box<dyn EmotionClassifier>,
        annotator: FrameAnnotator,
        mut diagnostics: Box<dyn DiagnosticsSink>,
    ) -> Self {
        let (locator, backend) = provider.create(requested, diagnostics.as_mut());
        Self {
            backend,
            locator,
            classifier,
            annotator,
            provider,
            diagnostics,
        }
    }

    /// Production wiring: ONNX locators and emotion model resolved
    /// through the asset cache, label font for annotation, diagnostics
    /// through the `log` facade.
    pub fn with_default_components(requested: BackendKind) -> Self {
        let mut diagnostics: Box<dyn DiagnosticsSink> = Box::new(LogDiagnostics);
        let classifier = classifier_factory::create_classifier(None, diagnostics.as_mut());
        let annotator = FrameAnnotator::with_resolved_font(None, diagnostics.as_mut());
        Self::new(
            requested,
            Box::new(OnnxLocatorProvider::new()),
            classifier,
            annotator,
            diagnostics,
        )
    }

    /// The backend actually in use — after any construction fallback,
    /// not necessarily the one last requested.
    pub fn active_backend(&self) -> BackendKind {
        self.backend
    }

    /// Annotate one frame.
    ///
    /// Empty frames come back as untouched copies. Otherwise the frame
    /// is downsampled to the working resolution when larger, every
    /// located face is classified and drawn, and the working copy is
    /// returned. The caller's frame is never mutated.
    pub fn process_frame(&mut self, frame: &Frame) -> Frame {
        if frame.is_empty() {
            return frame.clone();
        }

        let mut working = frame.downscaled_to_fit(MAX_WORKING_WIDTH, MAX_WORKING_HEIGHT);
        let (fw, fh) = (working.width(), working.height());

        let start = Instant::now();
        let boxes = match self.locator.locate(&working) {
            Ok(boxes) => boxes,
            Err(err) => {
                self.diagnostics
                    .warning(&format!("detection failed for this frame: {err}"));
                Vec::new()
            }
        };
        self.diagnostics.timing("locate", elapsed_ms(start));

        let start = Instant::now();
        let mut detections = Vec::with_capacity(boxes.len());
        for raw in boxes {
            // The strict box is drawn; the crop gets margin for context.
            let outline = raw.clip(fw, fh);
            let roi = raw.expand(CROP_MARGIN, fw, fh);
            let Some(crop) = working.crop(&roi) else {
                continue;
            };
            detections.push((outline, self.classifier.classify(&crop)));
        }
        self.diagnostics.timing("classify", elapsed_ms(start));

        let start = Instant::now();
        for (outline, result) in &detections {
            self.annotator.draw(
                &mut working,
                outline,
                result.label.display_name(),
                result.confidence,
                self.backend,
            );
        }
        self.diagnostics.timing("annotate", elapsed_ms(start));

        working
    }

    /// Replace the active locator with one for `kind`.
    ///
    /// Returns `true` when the requested backend is now active; `false`
    /// when it could not be constructed and the cascade is active in
    /// its place. Either way the pipeline stays usable, the replacement
    /// takes effect on the next `process_frame`, and the previous
    /// locator (with its loaded weights) is released immediately. The
    /// classifier is untouched.
    pub fn switch_backend(&mut self, kind: BackendKind) -> bool {
        let (locator, effective) = self.provider.create(kind, self.diagnostics.as_mut());
        self.locator = locator;
        self.backend = effective;
        effective == kind
    }

    /// String-keyed switch for UI hosts. Unknown names are rejected
    /// with `false` and leave the pipeline state untouched.
    pub fn switch_backend_named(&mut self, name: &str) -> bool {
        match name.parse::<BackendKind>() {
            Ok(kind) => self.switch_backend(kind),
            Err(err) => {
                self.diagnostics
                    .warning(&format!("rejected backend switch: {err}"));
                false
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
