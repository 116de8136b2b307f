// src/services/editor.rs
// Field-by-field and bulk updates of an editor configuration. Every
// operation returns a fresh record; callers swap it in wholesale.
use serde::Deserialize;

use crate::catalog::{BASE_OUTPUT_WIDTH, is_known_style};
use crate::errors::StudioError;
use crate::models::*;

/// Upper bound (exclusive) for seeds drawn at submission time.
const RANDOM_SEED_LIMIT: u32 = 1_000_000;

/// One change event from a form control, keyed by field name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    TargetAspect(TargetAspect),
    Seed(u32),
    UseFixedSeed(bool),
    CeilingColorHex(String),
    WallColorHex(String),
    CabinetColorHex(String),
    WoodGrainDirection(WoodGrainDirection),
    FloorMaterial(Option<FloorMaterial>),
    Roughness(f64),
    Glossiness(f64),
    LightColorHex(String),
    LightTempK(u32),
    UseLightTemp(bool),
    LightIntensity(f64),
    LampStyle(Option<LampStyle>),
    ShadowSoftness(f64),
    ContactShadows(bool),
    BathroomReplace(bool),
    BathStyle(Option<BathStyle>),
    FixtureColorHex(String),
    MaskMode(MaskMode),
    NegativePrompts(String),
    SelectedStyle(String),
    NightMode(bool),
    CinematicLook(Option<CinematicLook>),
    FilmGrain(f64),
    Vignette(f64),
    Bloom(f64),
    LensFlare(bool),
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<f64, StudioError> {
    if !value.is_finite() || value < min || value > max {
        return Err(StudioError::Validation(format!(
            "{} must be between {} and {}, got {}",
            field, min, max, value
        )));
    }
    Ok(value)
}

/// Pixel size for an aspect ratio at the fixed base width.
pub fn derive_dimensions(aspect: TargetAspect) -> (u32, u32) {
    let (w, h) = aspect.ratio();
    let height = (f64::from(BASE_OUTPUT_WIDTH) * h / w).round() as u32;
    (BASE_OUTPUT_WIDTH, height)
}

pub fn apply_update(
    config: &EditorConfiguration,
    update: FieldUpdate,
) -> Result<EditorConfiguration, StudioError> {
    let mut next = config.clone();

    match update {
        FieldUpdate::TargetAspect(aspect) => {
            let (width, height) = derive_dimensions(aspect);
            next.target_aspect = aspect;
            next.output_px_w = width;
            next.output_px_h = height;
        }
        FieldUpdate::Seed(seed) => {
            // generationConfig.seed is an int32 on the wire
            check_range("seed", f64::from(seed), 0.0, f64::from(i32::MAX))?;
            next.seed = seed;
        }
        FieldUpdate::UseFixedSeed(fixed) => next.use_fixed_seed = fixed,
        FieldUpdate::CeilingColorHex(color) => next.ceiling_color_hex = color,
        FieldUpdate::WallColorHex(color) => next.wall_color_hex = color,
        FieldUpdate::CabinetColorHex(color) => next.cabinet_color_hex = color,
        FieldUpdate::WoodGrainDirection(direction) => next.wood_grain_direction = direction,
        FieldUpdate::FloorMaterial(material) => next.floor_material = material,
        FieldUpdate::Roughness(value) => next.roughness = check_range("roughness", value, 0.0, 1.0)?,
        FieldUpdate::Glossiness(value) => {
            next.glossiness = check_range("glossiness", value, 0.0, 1.0)?
        }
        FieldUpdate::LightColorHex(color) => next.light_color_hex = color,
        FieldUpdate::LightTempK(kelvin) => {
            check_range("light_temp_k", f64::from(kelvin), 1000.0, 10000.0)?;
            next.light_temp_k = kelvin;
        }
        FieldUpdate::UseLightTemp(use_temp) => next.use_light_temp = use_temp,
        FieldUpdate::LightIntensity(value) => {
            next.light_intensity = check_range("light_intensity", value, 0.0, 2.0)?
        }
        FieldUpdate::LampStyle(style) => next.lamp_style = style,
        FieldUpdate::ShadowSoftness(value) => {
            next.shadow_softness = check_range("shadow_softness", value, 0.0, 1.0)?
        }
        FieldUpdate::ContactShadows(enabled) => next.contact_shadows = enabled,
        FieldUpdate::BathroomReplace(enabled) => next.bathroom_replace = enabled,
        FieldUpdate::BathStyle(style) => next.bath_style = style,
        FieldUpdate::FixtureColorHex(color) => next.fixture_color_hex = color,
        FieldUpdate::MaskMode(mode) => next.mask_mode = mode,
        FieldUpdate::NegativePrompts(text) => next.negative_prompts = text,
        FieldUpdate::SelectedStyle(style) => {
            if !style.is_empty() && !is_known_style(&style) {
                return Err(StudioError::Validation(format!("Unknown style: {}", style)));
            }
            next.selected_style = style;
        }
        FieldUpdate::NightMode(enabled) => next.night_mode = enabled,
        FieldUpdate::CinematicLook(look) => next.cinematic_look = look,
        FieldUpdate::FilmGrain(value) => {
            next.film_grain = check_range("film_grain", value, 0.0, 1.0)?
        }
        FieldUpdate::Vignette(value) => next.vignette = check_range("vignette", value, 0.0, 1.0)?,
        FieldUpdate::Bloom(value) => next.bloom = check_range("bloom", value, 0.0, 1.0)?,
        FieldUpdate::LensFlare(enabled) => next.lens_flare = enabled,
    }

    Ok(next)
}

pub fn set_image(
    config: &EditorConfiguration,
    slot: ImageSlot,
    image: Option<ImageAttachment>,
) -> EditorConfiguration {
    let mut next = config.clone();
    let target = match slot {
        ImageSlot::BaseImage => &mut next.base_image,
        ImageSlot::WallTextureImage => &mut next.wall_texture_image,
        ImageSlot::CabinetTextureImage => &mut next.cabinet_texture_image,
        ImageSlot::FloorTextureImage => &mut next.floor_texture_image,
        ImageSlot::MaskImage => &mut next.mask_image,
    };
    *target = image;
    next
}

/// Shallow merge of the preset over the current values. The selected style
/// is always cleared so it cannot contradict the preset's palette.
pub fn apply_preset(config: &EditorConfiguration, preset: &Preset) -> EditorConfiguration {
    let mut next = config.clone();
    let settings = &preset.settings;

    if let Some(aspect) = settings.target_aspect {
        next.target_aspect = aspect;
    }
    if let Some(width) = settings.output_px_w {
        next.output_px_w = width;
    }
    if let Some(height) = settings.output_px_h {
        next.output_px_h = height;
    }
    if let Some(seed) = settings.seed {
        next.seed = seed;
    }
    if let Some(fixed) = settings.use_fixed_seed {
        next.use_fixed_seed = fixed;
    }
    if let Some(color) = settings.ceiling_color_hex {
        next.ceiling_color_hex = color.to_string();
    }
    if let Some(color) = settings.wall_color_hex {
        next.wall_color_hex = color.to_string();
    }
    if let Some(color) = settings.cabinet_color_hex {
        next.cabinet_color_hex = color.to_string();
    }
    if let Some(direction) = settings.wood_grain_direction {
        next.wood_grain_direction = direction;
    }
    if let Some(material) = settings.floor_material {
        next.floor_material = Some(material);
    }
    if let Some(roughness) = settings.roughness {
        next.roughness = roughness;
    }
    if let Some(glossiness) = settings.glossiness {
        next.glossiness = glossiness;
    }
    if let Some(color) = settings.light_color_hex {
        next.light_color_hex = color.to_string();
    }
    if let Some(kelvin) = settings.light_temp_k {
        next.light_temp_k = kelvin;
    }
    if let Some(use_temp) = settings.use_light_temp {
        next.use_light_temp = use_temp;
    }
    if let Some(intensity) = settings.light_intensity {
        next.light_intensity = intensity;
    }
    if let Some(style) = settings.lamp_style {
        next.lamp_style = Some(style);
    }

    next.selected_style.clear();
    next
}

/// Copy of the configuration as it should be sent. The caller's seed is
/// left alone; only the snapshot gets a fresh one.
pub fn submission_snapshot(config: &EditorConfiguration) -> EditorConfiguration {
    let mut snapshot = config.clone();
    if !snapshot.use_fixed_seed {
        snapshot.seed = rand::random_range(0..RANDOM_SEED_LIMIT);
    }
    snapshot
}
