//! Test doubles shared by the unit tests.

use std::cell::RefCell;

use crate::engine::{FractalEngine, RenderRequest};
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineCall {
    InitialiseGraphics(u32),
    Render(RenderRequest),
    GenerateAndSave(RenderRequest),
    SaveImage,
    ReadFile(String),
}

/// Records every call and serves canned image bytes.
#[derive(Debug, Default)]
pub(crate) struct RecordingEngine {
    pub(crate) calls: RefCell<Vec<EngineCall>>,
    pub(crate) fail_renders: bool,
    pub(crate) fail_saves: bool,
}

impl RecordingEngine {
    pub(crate) const IMAGE_BYTES: &'static [u8] = b"BM-canned";

    pub(crate) fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn renders(&self) -> Vec<RenderRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Render(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: EngineCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl FractalEngine for RecordingEngine {
    fn initialise_graphics(&mut self, canvas_size: u32) -> Result<(), EngineError> {
        self.record(EngineCall::InitialiseGraphics(canvas_size));
        Ok(())
    }

    fn render(&mut self, request: &RenderRequest) -> Result<(), EngineError> {
        self.record(EngineCall::Render(*request));
        if self.fail_renders {
            return Err(EngineError::NotInitialised);
        }
        Ok(())
    }

    fn generate_and_save(&mut self, request: &RenderRequest) -> Result<(), EngineError> {
        self.record(EngineCall::GenerateAndSave(*request));
        if self.fail_saves {
            return Err(EngineError::Encode("disk full".into()));
        }
        Ok(())
    }

    fn save_image(&mut self) -> Result<(), EngineError> {
        self.record(EngineCall::SaveImage);
        if self.fail_saves {
            return Err(EngineError::Encode("disk full".into()));
        }
        Ok(())
    }

    fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        self.record(EngineCall::ReadFile(name.to_string()));
        Ok(Self::IMAGE_BYTES.to_vec())
    }
}
