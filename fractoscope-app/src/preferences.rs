use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use fractoscope_core::{GenerationParams, ImageFormat, StartupRamp, Viewport, ZoomSettings};

// ---------------------------------------------------------------------------
// Last-view snapshot
// ---------------------------------------------------------------------------

/// View and parameters captured on exit so the next session can resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastView {
    pub viewport: Viewport,
    pub params: GenerationParams,
}

// ---------------------------------------------------------------------------
// Application preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppPreferences {
    #[serde(default = "default_window_width")]
    pub window_width: f32,
    #[serde(default = "default_window_height")]
    pub window_height: f32,
    /// Largest canvas side in points.
    #[serde(default = "default_canvas_size")]
    pub canvas_size: f32,
    #[serde(default = "default_zoom_damping")]
    pub zoom_damping: f64,
    #[serde(default = "default_zoom_max_factor")]
    pub zoom_max_factor: f64,
    #[serde(default = "default_ramp_duration_ms")]
    pub ramp_duration_ms: u64,
    /// Iteration count the startup ramp climbs to.
    #[serde(default = "default_final_max_iterations")]
    pub final_max_iterations: u32,
    /// Zero renders at most once per frame.
    #[serde(default)]
    pub min_render_interval_ms: u64,
    #[serde(default = "default_export_scale")]
    pub export_scale: f64,
    #[serde(default)]
    pub export_format: ImageFormat,
    #[serde(default = "default_true")]
    pub restore_last_view: bool,
    #[serde(default)]
    pub last_view: Option<LastView>,
}

fn default_window_width() -> f32 {
    1000.0
}
fn default_window_height() -> f32 {
    640.0
}
fn default_canvas_size() -> f32 {
    500.0
}
fn default_zoom_damping() -> f64 {
    ZoomSettings::DEFAULT_DAMPING
}
fn default_zoom_max_factor() -> f64 {
    ZoomSettings::DEFAULT_MAX_FACTOR
}
fn default_ramp_duration_ms() -> u64 {
    StartupRamp::DEFAULT_DURATION.as_millis() as u64
}
fn default_final_max_iterations() -> u32 {
    GenerationParams::DEFAULT_MAX_ITERATIONS
}
fn default_export_scale() -> f64 {
    4.0
}
fn default_true() -> bool {
    true
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            canvas_size: default_canvas_size(),
            zoom_damping: default_zoom_damping(),
            zoom_max_factor: default_zoom_max_factor(),
            ramp_duration_ms: default_ramp_duration_ms(),
            final_max_iterations: default_final_max_iterations(),
            min_render_interval_ms: 0,
            export_scale: default_export_scale(),
            export_format: ImageFormat::default(),
            restore_last_view: true,
            last_view: None,
        }
    }
}

impl AppPreferences {
    /// Load preferences from the OS config directory, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!("No preferences file at {}", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<AppPreferences>(&json) {
                Ok(prefs) => {
                    info!("Loaded preferences from {}", path.display());
                    return prefs;
                }
                Err(e) => error!("Failed to parse preferences: {e}"),
            },
            Err(e) => error!("Failed to read preferences file: {e}"),
        }
        Self::default()
    }

    /// Persist preferences to disk.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, &json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    debug!("Saved preferences");
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }

    /// Wheel-zoom tuning, or the defaults if the stored values are unusable.
    pub fn zoom_settings(&self) -> ZoomSettings {
        ZoomSettings::new(self.zoom_damping, self.zoom_max_factor).unwrap_or_else(|e| {
            warn!("Ignoring stored zoom settings: {e}");
            ZoomSettings::default()
        })
    }

    pub fn ramp_duration(&self) -> Duration {
        Duration::from_millis(self.ramp_duration_ms)
    }

    pub fn min_render_interval(&self) -> Duration {
        Duration::from_millis(self.min_render_interval_ms)
    }

    /// View to open with: the stored one if enabled and valid, else defaults.
    pub fn initial_view(&self) -> (Viewport, GenerationParams) {
        let fresh = GenerationParams::default().with_max_iterations(self.final_max_iterations);
        match &self.last_view {
            Some(last) if self.restore_last_view && last.viewport.is_valid() => {
                (last.viewport, last.params)
            }
            _ => (Viewport::default(), fresh),
        }
    }
}

fn config_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "Fractoscope")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
        .join("preferences.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fractoscope_core::FractalMode;

    #[test]
    fn empty_json_gives_defaults() {
        let prefs: AppPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, AppPreferences::default());
        assert_eq!(prefs.canvas_size, 500.0);
        assert_eq!(prefs.zoom_settings(), ZoomSettings::default());
        assert_eq!(prefs.ramp_duration(), Duration::from_millis(500));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = std::env::temp_dir().join("fractoscope_test_prefs");
        let path = dir.join("preferences.json");
        let mut prefs = AppPreferences {
            export_format: ImageFormat::Png,
            ..AppPreferences::default()
        };
        prefs.last_view = Some(LastView {
            viewport: Viewport::new(-0.75, 0.1, 0.2).unwrap(),
            params: GenerationParams::default().with_mode(FractalMode::Julia),
        });
        prefs.save_to(&path);
        assert_eq!(AppPreferences::load_from(&path), prefs);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join("fractoscope_test_prefs_garbage");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("preferences.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(AppPreferences::load_from(&path), AppPreferences::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unusable_zoom_settings_fall_back_to_defaults() {
        let prefs: AppPreferences =
            serde_json::from_str(r#"{"zoom_damping": -100.0, "zoom_max_factor": 1.3}"#).unwrap();
        assert_eq!(prefs.zoom_settings(), ZoomSettings::default());

        let prefs = AppPreferences {
            zoom_max_factor: 0.5,
            ..AppPreferences::default()
        };
        assert_eq!(prefs.zoom_settings(), ZoomSettings::default());

        let prefs = AppPreferences {
            zoom_damping: 40.0,
            zoom_max_factor: 2.0,
            ..AppPreferences::default()
        };
        assert_eq!(prefs.zoom_settings(), ZoomSettings::new(40.0, 2.0).unwrap());
    }

    #[test]
    fn initial_view_respects_restore_flag() {
        let last = LastView {
            viewport: Viewport::new(0.1, 0.2, 0.3).unwrap(),
            params: GenerationParams::default().with_max_iterations(900),
        };
        let mut prefs = AppPreferences {
            final_max_iterations: 120,
            last_view: Some(last.clone()),
            ..AppPreferences::default()
        };
        assert_eq!(prefs.initial_view(), (last.viewport, last.params));

        prefs.restore_last_view = false;
        let (viewport, params) = prefs.initial_view();
        assert_eq!(viewport, Viewport::default());
        assert_eq!(params.max_iterations, 120);
    }
}
