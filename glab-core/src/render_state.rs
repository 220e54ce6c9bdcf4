//! Global pipeline state: clear color, depth testing, face culling and the viewport.

use crate::{
    abs::{Capability, ClearMask, DriverRef, DriverString},
    config::GraphicsConfig,
};

/// Identification strings reported by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
}

impl DriverInfo {
    pub fn query(driver: &DriverRef) -> Self {
        Self {
            vendor: driver.driver_string(DriverString::Vendor),
            renderer: driver.driver_string(DriverString::Renderer),
            version: driver.driver_string(DriverString::Version),
            shading_language_version: driver.driver_string(DriverString::ShadingLanguageVersion),
        }
    }
}

pub struct RenderState {
    driver: DriverRef,
    info: DriverInfo,
    clear_color: [f32; 4],
    depth_test: bool,
    cull_face: bool,
}

impl RenderState {
    pub fn new(driver: &DriverRef, config: &GraphicsConfig) -> Self {
        let info = DriverInfo::query(driver);
        if config.log_driver_info {
            log::info!("Renderer: {}", info.renderer);
            log::info!("OpenGL version: {}", info.version);
            log::info!("GLSL version: {}", info.shading_language_version);
            log::info!("Vendor: {}", info.vendor);
        }

        let mut state = Self {
            driver: DriverRef::clone(driver),
            info,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            depth_test: false,
            cull_face: false,
        };
        if config.depth_test {
            state.enable_depth_test();
            driver.depth_func(config.depth_func);
        }
        if config.cull_face {
            state.enable_cull_face();
            driver.cull_face(config.cull_face_mode);
        }
        state
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
        let [r, g, b, a] = color;
        self.driver.clear_color(r, g, b, a);
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    /// Clears the color buffer, and the depth buffer while depth testing is on.
    pub fn clear(&self) {
        let mut mask = ClearMask::COLOR;
        if self.depth_test {
            mask |= ClearMask::DEPTH;
        }
        self.driver.clear(mask);
    }

    pub fn enable_depth_test(&mut self) {
        self.depth_test = true;
        self.driver.enable(Capability::DepthTest);
    }

    pub fn disable_depth_test(&mut self) {
        self.depth_test = false;
        self.driver.disable(Capability::DepthTest);
    }

    pub fn enable_cull_face(&mut self) {
        self.cull_face = true;
        self.driver.enable(Capability::CullFace);
    }

    pub fn disable_cull_face(&mut self) {
        self.cull_face = false;
        self.driver.disable(Capability::CullFace);
    }

    /// Re-applies the tracked depth test and culling switches after another renderer, such
    /// as the GUI painter, has changed them.
    pub fn apply(&self) {
        for (capability, enabled) in [
            (Capability::DepthTest, self.depth_test),
            (Capability::CullFace, self.cull_face),
        ] {
            if enabled {
                self.driver.enable(capability);
            } else {
                self.driver.disable(capability);
            }
        }
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    pub fn cull_face(&self) -> bool {
        self.cull_face
    }

    pub fn set_viewport(&self, width: u32, height: u32) {
        self.driver.viewport(0, 0, width as i32, height as i32);
    }

    pub fn info(&self) -> &DriverInfo {
        &self.info
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::abs::{Call, DepthFunc, Face, RecordingDriver};

    #[test]
    fn test_config_toggles_state() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let state = RenderState::new(&driver, &GraphicsConfig::default());

        let calls = recording.calls();
        assert!(calls.contains(&Call::Enable(Capability::DepthTest)));
        assert!(calls.contains(&Call::DepthFunc(DepthFunc::Less)));
        assert!(calls.contains(&Call::Enable(Capability::CullFace)));
        assert!(calls.contains(&Call::CullFace(Face::Back)));
        assert_eq!(state.info().renderer, "recording driver");
    }

    #[test]
    fn test_clear_includes_depth_only_when_enabled() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let config = GraphicsConfig {
            depth_test: false,
            cull_face: false,
            ..Default::default()
        };
        let mut state = RenderState::new(&driver, &config);
        recording.clear_calls();

        state.set_clear_color([0.2, 0.3, 0.8, 1.0]);
        state.clear();
        state.enable_depth_test();
        state.clear();

        assert_eq!(
            recording.calls(),
            vec![
                Call::ClearColor([0.2, 0.3, 0.8, 1.0]),
                Call::Clear(ClearMask::COLOR),
                Call::Enable(Capability::DepthTest),
                Call::Clear(ClearMask::COLOR | ClearMask::DEPTH),
            ]
        );
        assert_eq!(state.clear_color(), [0.2, 0.3, 0.8, 1.0]);
    }

    #[test]
    fn test_apply_restores_tracked_switches() {
        let recording = Arc::new(RecordingDriver::new());
        let driver: DriverRef = recording.clone();
        let mut state = RenderState::new(&driver, &GraphicsConfig::default());
        state.disable_cull_face();
        recording.clear_calls();

        state.apply();
        assert_eq!(
            recording.calls(),
            vec![
                Call::Enable(Capability::DepthTest),
                Call::Disable(Capability::CullFace),
            ]
        );
    }
}
