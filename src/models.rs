// src/models.rs
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::StudioError;

/// An uploaded image held in memory for the lifetime of its session.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub filename: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub data: Bytes,
}

// API views only ever describe an attachment; the bytes go to the model and nowhere else.
impl Serialize for ImageAttachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ImageAttachment", 5)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("mime_type", &self.mime_type)?;
        state.serialize_field("width", &self.width)?;
        state.serialize_field("height", &self.height)?;
        state.serialize_field("size", &self.data.len())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetAspect {
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "21:9")]
    UltraWide,
    #[serde(rename = "2.39:1")]
    Anamorphic,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "1:1")]
    Square,
}

impl TargetAspect {
    /// Dropdown order.
    pub const ALL: [TargetAspect; 5] = [
        TargetAspect::Widescreen,
        TargetAspect::UltraWide,
        TargetAspect::Anamorphic,
        TargetAspect::Standard,
        TargetAspect::Square,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetAspect::Widescreen => "16:9",
            TargetAspect::UltraWide => "21:9",
            TargetAspect::Anamorphic => "2.39:1",
            TargetAspect::Standard => "4:3",
            TargetAspect::Square => "1:1",
        }
    }

    /// Width and height terms of the ratio.
    pub fn ratio(&self) -> (f64, f64) {
        match self {
            TargetAspect::Widescreen => (16.0, 9.0),
            TargetAspect::UltraWide => (21.0, 9.0),
            TargetAspect::Anamorphic => (2.39, 1.0),
            TargetAspect::Standard => (4.0, 3.0),
            TargetAspect::Square => (1.0, 1.0),
        }
    }

    /// Common output sizes shown next to the aspect dropdown.
    pub fn size_suggestions(&self) -> &'static str {
        match self {
            TargetAspect::Widescreen => "1920×1080, 2560×1440, 3840×2160",
            TargetAspect::UltraWide => "2560×1080, 3440×1440",
            TargetAspect::Anamorphic => "2560×1071, 3840×1607",
            TargetAspect::Standard => "1600×1200, 2048×1536",
            TargetAspect::Square => "1080×1080, 2048×2048",
        }
    }
}

impl fmt::Display for TargetAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WoodGrainDirection {
    Vertical,
    Horizontal,
}

impl WoodGrainDirection {
    pub const ALL: [WoodGrainDirection; 2] =
        [WoodGrainDirection::Vertical, WoodGrainDirection::Horizontal];

    pub fn as_str(&self) -> &'static str {
        match self {
            WoodGrainDirection::Vertical => "vertical",
            WoodGrainDirection::Horizontal => "horizontal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorMaterial {
    Wood,
    Marble,
    Tile,
    Concrete,
}

impl FloorMaterial {
    pub const ALL: [FloorMaterial; 4] = [
        FloorMaterial::Wood,
        FloorMaterial::Marble,
        FloorMaterial::Tile,
        FloorMaterial::Concrete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FloorMaterial::Wood => "wood",
            FloorMaterial::Marble => "marble",
            FloorMaterial::Tile => "tile",
            FloorMaterial::Concrete => "concrete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LampStyle {
    Downlight,
    Track,
    Chandelier,
    Panel,
}

impl LampStyle {
    pub const ALL: [LampStyle; 4] = [
        LampStyle::Downlight,
        LampStyle::Track,
        LampStyle::Chandelier,
        LampStyle::Panel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LampStyle::Downlight => "downlight",
            LampStyle::Track => "track",
            LampStyle::Chandelier => "chandelier",
            LampStyle::Panel => "panel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BathStyle {
    Modern,
    Minimal,
    Classic,
}

impl BathStyle {
    pub const ALL: [BathStyle; 3] = [BathStyle::Modern, BathStyle::Minimal, BathStyle::Classic];

    pub fn as_str(&self) -> &'static str {
        match self {
            BathStyle::Modern => "modern",
            BathStyle::Minimal => "minimal",
            BathStyle::Classic => "classic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    Auto,
    Manual,
}

impl MaskMode {
    pub const ALL: [MaskMode; 2] = [MaskMode::Auto, MaskMode::Manual];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CinematicLook {
    TealOrange,
    FilmNoir,
    VintageFilm,
    CyberpunkNeon,
}

impl CinematicLook {
    pub const ALL: [CinematicLook; 4] = [
        CinematicLook::TealOrange,
        CinematicLook::FilmNoir,
        CinematicLook::VintageFilm,
        CinematicLook::CyberpunkNeon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CinematicLook::TealOrange => "teal_orange",
            CinematicLook::FilmNoir => "film_noir",
            CinematicLook::VintageFilm => "vintage_film",
            CinematicLook::CyberpunkNeon => "cyberpunk_neon",
        }
    }
}

/// The complete set of user-adjustable generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorConfiguration {
    pub base_image: Option<ImageAttachment>,
    pub target_aspect: TargetAspect,
    pub output_px_w: u32,
    pub output_px_h: u32,
    pub variations: u32,
    pub seed: u32,
    pub use_fixed_seed: bool,

    pub ceiling_color_hex: String,
    pub wall_color_hex: String,
    pub wall_texture_image: Option<ImageAttachment>,
    pub cabinet_color_hex: String,
    pub cabinet_texture_image: Option<ImageAttachment>,
    pub wood_grain_direction: WoodGrainDirection,
    pub floor_material: Option<FloorMaterial>,
    pub floor_texture_image: Option<ImageAttachment>,
    pub roughness: f64,
    pub glossiness: f64,

    pub light_color_hex: String,
    pub light_temp_k: u32,
    pub use_light_temp: bool,
    pub light_intensity: f64,
    pub lamp_style: Option<LampStyle>,
    pub shadow_softness: f64,
    pub contact_shadows: bool,

    pub bathroom_replace: bool,
    pub bath_style: Option<BathStyle>,
    pub fixture_color_hex: String,

    pub mask_mode: MaskMode,
    pub mask_image: Option<ImageAttachment>,
    pub negative_prompts: String,

    pub selected_style: String,
    pub night_mode: bool,

    pub cinematic_look: Option<CinematicLook>,
    pub film_grain: f64,
    pub vignette: f64,
    pub bloom: f64,
    pub lens_flare: bool,
}

/// The five places an uploaded image can go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    BaseImage,
    WallTextureImage,
    CabinetTextureImage,
    FloorTextureImage,
    MaskImage,
}

impl FromStr for ImageSlot {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base_image" => Ok(ImageSlot::BaseImage),
            "wall_texture_image" => Ok(ImageSlot::WallTextureImage),
            "cabinet_texture_image" => Ok(ImageSlot::CabinetTextureImage),
            "floor_texture_image" => Ok(ImageSlot::FloorTextureImage),
            "mask_image" => Ok(ImageSlot::MaskImage),
            other => Err(StudioError::Validation(format!("Unknown image slot: {}", other))),
        }
    }
}

/// Named partial overlay. Fields left `None` keep the current value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresetSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_aspect: Option<TargetAspect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_px_w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_px_h: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_fixed_seed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceiling_color_hex: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_color_hex: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet_color_hex: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wood_grain_direction: Option<WoodGrainDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_material: Option<FloorMaterial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossiness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_color_hex: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_temp_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_light_temp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_intensity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lamp_style: Option<LampStyle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub settings: PresetSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleDefinition {
    pub name: &'static str,
    pub preview_image: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    /// Anything other than `zh` is treated as English.
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("zh") {
            Language::Zh
        } else {
            Language::En
        }
    }

    pub fn base_image_missing(&self) -> &'static str {
        match self {
            Language::En => "Please upload a base image before generating.",
            Language::Zh => "請先上傳基礎圖片再進行生成。",
        }
    }

    pub fn model_did_not_return_image(&self) -> &'static str {
        match self {
            Language::En => "The model did not return an image. Please try again.",
            Language::Zh => "模型沒有返回圖片，請再試一次。",
        }
    }
}

/// Output of one submission: image and/or the metadata block echoed by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationResult {
    pub image_b64: Option<String>,
    pub image_mime_type: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub config: EditorConfiguration,
    pub status: SubmissionStatus,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_serializes_as_ratio_string() {
        let json = serde_json::to_string(&TargetAspect::Anamorphic).unwrap();
        assert_eq!(json, "\"2.39:1\"");

        let parsed: TargetAspect = serde_json::from_str("\"21:9\"").unwrap();
        assert_eq!(parsed, TargetAspect::UltraWide);
    }

    #[test]
    fn attachment_view_omits_bytes() {
        let attachment = ImageAttachment {
            filename: "room.png".to_string(),
            mime_type: "image/png".to_string(),
            width: 640,
            height: 480,
            data: Bytes::from_static(&[1, 2, 3, 4]),
        };
        let value = serde_json::to_value(&attachment).unwrap();
        assert_eq!(value["size"], 4);
        assert_eq!(value["filename"], "room.png");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn unknown_language_codes_fall_back_to_english() {
        assert_eq!(Language::from_code("zh"), Language::Zh);
        assert_eq!(Language::from_code("ZH"), Language::Zh);
        assert_eq!(Language::from_code("fr"), Language::En);
        assert_eq!(Language::from_code(""), Language::En);
    }

    #[test]
    fn parses_image_slots_from_path_segments() {
        assert_eq!(
            "mask_image".parse::<ImageSlot>().unwrap(),
            ImageSlot::MaskImage
        );
        assert!("ceiling_image".parse::<ImageSlot>().is_err());
    }
}
