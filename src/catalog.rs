// src/catalog.rs
// Compiled-in defaults, presets and option lists.
use serde::Serialize;
use std::sync::LazyLock;

use crate::models::*;

pub const BASE_OUTPUT_WIDTH: u32 = 1920;

impl Default for EditorConfiguration {
    fn default() -> Self {
        Self {
            base_image: None,
            target_aspect: TargetAspect::Widescreen,
            output_px_w: BASE_OUTPUT_WIDTH,
            output_px_h: 1080,
            variations: 1,
            seed: 42,
            use_fixed_seed: true,

            ceiling_color_hex: "#FFFFFF".to_string(),
            wall_color_hex: String::new(),
            wall_texture_image: None,
            cabinet_color_hex: String::new(),
            cabinet_texture_image: None,
            wood_grain_direction: WoodGrainDirection::Vertical,
            floor_material: None,
            floor_texture_image: None,
            roughness: 0.4,
            glossiness: 0.35,

            light_color_hex: String::new(),
            light_temp_k: 4000,
            use_light_temp: true,
            light_intensity: 0.6,
            lamp_style: None,
            shadow_softness: 0.5,
            contact_shadows: true,

            bathroom_replace: false,
            bath_style: None,
            fixture_color_hex: "#FFFFFF".to_string(),

            mask_mode: MaskMode::Auto,
            mask_image: None,
            negative_prompts: "cartoon, over-saturated, plastic, distorted perspective".to_string(),

            selected_style: String::new(),
            night_mode: false,

            cinematic_look: None,
            film_grain: 0.1,
            vignette: 0.2,
            bloom: 0.15,
            lens_flare: false,
        }
    }
}

pub static PRESETS: LazyLock<Vec<Preset>> = LazyLock::new(|| {
    vec![
        Preset {
            name: "presetMinimal",
            settings: PresetSettings {
                wall_color_hex: Some("#F5F5F3"),
                ceiling_color_hex: Some("#FFFFFF"),
                cabinet_color_hex: Some("#C6AE8B"),
                wood_grain_direction: Some(WoodGrainDirection::Vertical),
                floor_material: Some(FloorMaterial::Wood),
                roughness: Some(0.45),
                glossiness: Some(0.25),
                use_light_temp: Some(true),
                light_temp_k: Some(3200),
                light_intensity: Some(0.6),
                lamp_style: Some(LampStyle::Downlight),
                target_aspect: Some(TargetAspect::Widescreen),
                output_px_w: Some(1920),
                output_px_h: Some(1080),
                seed: Some(42),
                use_fixed_seed: Some(true),
                ..Default::default()
            },
        },
        Preset {
            name: "presetBusiness",
            settings: PresetSettings {
                wall_color_hex: Some("#EDEDED"),
                ceiling_color_hex: Some("#FFFFFF"),
                cabinet_color_hex: Some("#3A3A3A"),
                floor_material: Some(FloorMaterial::Marble),
                glossiness: Some(0.6),
                use_light_temp: Some(true),
                light_temp_k: Some(3800),
                lamp_style: Some(LampStyle::Panel),
                light_intensity: Some(0.55),
                seed: Some(101),
                use_fixed_seed: Some(true),
                ..Default::default()
            },
        },
        Preset {
            name: "presetIndustrial",
            settings: PresetSettings {
                wall_color_hex: Some("#D9D9D9"),
                ceiling_color_hex: Some("#2B2B2B"),
                cabinet_color_hex: Some("#4A4A4A"),
                floor_material: Some(FloorMaterial::Concrete),
                roughness: Some(0.65),
                glossiness: Some(0.15),
                use_light_temp: Some(false),
                light_color_hex: Some("#FFD8A8"),
                lamp_style: Some(LampStyle::Track),
                light_intensity: Some(0.7),
                seed: Some(204),
                use_fixed_seed: Some(true),
                ..Default::default()
            },
        },
    ]
});

macro_rules! style {
    ($name:literal, $seed:literal) => {
        StyleDefinition {
            name: $name,
            preview_image: concat!("https://picsum.photos/seed/", $seed, "/100/75"),
        }
    };
}

pub static INTERIOR_STYLES: [StyleDefinition; 21] = [
    style!("Modern", "modern"),
    style!("Minimalist", "minimalist"),
    style!("Industrial", "industrial"),
    style!("Scandinavian", "scandinavian"),
    style!("Bohemian", "bohemian"),
    style!("Coastal", "coastal"),
    style!("Farmhouse", "farmhouse"),
    style!("MidCenturyModern", "midcentury"),
    style!("ArtDeco", "artdeco"),
    style!("Japandi", "japandi"),
    style!("Maximalist", "maximalist"),
    style!("Gothic", "gothic"),
    style!("Cyberpunk", "cyberpunk"),
    style!("Steampunk", "steampunk"),
    style!("HollywoodRegency", "hollywood"),
    style!("Rustic", "rustic"),
    style!("ShabbyChic", "shabbychic"),
    style!("Transitional", "transitional"),
    style!("Tropical", "tropical"),
    style!("Victorian", "victorian"),
    style!("Zen", "zen"),
];

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|preset| preset.name == name)
}

pub fn is_known_style(name: &str) -> bool {
    INTERIOR_STYLES.iter().any(|style| style.name == name)
}

#[derive(Debug, Serialize)]
pub struct AspectOption {
    pub value: TargetAspect,
    pub size_suggestions: &'static str,
}

/// Everything the form needs to render its controls.
#[derive(Debug, Serialize)]
pub struct Catalog {
    pub defaults: EditorConfiguration,
    pub presets: &'static [Preset],
    pub styles: &'static [StyleDefinition],
    pub aspect_ratios: Vec<AspectOption>,
    pub wood_grain_directions: &'static [WoodGrainDirection],
    pub floor_materials: &'static [FloorMaterial],
    pub lamp_styles: &'static [LampStyle],
    pub bath_styles: &'static [BathStyle],
    pub mask_modes: &'static [MaskMode],
    pub cinematic_looks: &'static [CinematicLook],
}

pub fn catalog() -> Catalog {
    Catalog {
        defaults: EditorConfiguration::default(),
        presets: PRESETS.as_slice(),
        styles: &INTERIOR_STYLES,
        aspect_ratios: TargetAspect::ALL
            .iter()
            .map(|aspect| AspectOption {
                value: *aspect,
                size_suggestions: aspect.size_suggestions(),
            })
            .collect(),
        wood_grain_directions: &WoodGrainDirection::ALL,
        floor_materials: &FloorMaterial::ALL,
        lamp_styles: &LampStyle::ALL,
        bath_styles: &BathStyle::ALL,
        mask_modes: &MaskMode::ALL,
        cinematic_looks: &CinematicLook::ALL,
    }
}
