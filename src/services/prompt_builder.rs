// src/services/prompt_builder.rs
// Turns an editor configuration into the instruction text sent alongside the
// images. Locale differences live entirely in the phrase tables; the
// assembly routine is shared.
use crate::models::*;

/// Style echoed in the metadata block when none is selected.
const FALLBACK_STYLE_KEY: &str = "modern";

struct PromptPhrases {
    header: &'static str,

    grading_label: &'static str,
    grading_named: fn(&str) -> String,
    grading_generic: &'static str,
    look_name: fn(CinematicLook) -> String,

    effects_intro: &'static str,
    bloom_label: &'static str,
    bloom_on: fn(f64) -> String,
    bloom_off: &'static str,
    vignette_label: &'static str,
    vignette_on: fn(f64) -> String,
    vignette_off: &'static str,
    film_grain_label: &'static str,
    film_grain_on: fn(f64) -> String,
    film_grain_off: &'static str,
    lens_flare_label: &'static str,
    lens_flare_on: &'static str,
    lens_flare_off: &'static str,

    immutable_rules: &'static str,

    specs_title: &'static str,
    aspect: fn(&str) -> String,
    realism_first: &'static str,
    style: fn(&str) -> String,
    style_fallback: &'static str,

    ambiance_label: &'static str,
    night_block: &'static str,
    day_line: &'static str,

    color: fn(&str) -> String,
    ceiling_label: &'static str,
    no_ceiling_color: &'static str,
    walls_label: &'static str,
    no_wall_color: &'static str,
    wall_texture_hint: &'static str,
    cabinets_label: &'static str,
    no_cabinet_color: &'static str,
    cabinet_texture_hint: &'static str,
    wood_grain: fn(WoodGrainDirection) -> String,
    floor_label: &'static str,
    floor_material: fn(&str) -> String,
    no_floor_material: &'static str,
    floor_texture_hint: &'static str,
    surface: fn(f64, f64) -> String,

    lighting_label: &'static str,
    light_temp: fn(u32) -> String,
    light_color: fn(&str) -> String,
    light_intensity: fn(f64) -> String,
    shadows: fn(f64) -> String,
    contact_shadows_on: &'static str,
    contact_shadows_off: &'static str,
    lamp_label: &'static str,
    lamp: fn(&str) -> String,
    lamp_none: &'static str,

    bathroom_label: &'static str,
    bathroom_replace: fn(&str, &str) -> String,
    bathroom_keep: &'static str,

    negatives_label: &'static str,
    // user list first, fixed terms after
    negatives: fn(&str) -> String,

    json_intro: &'static str,
}

const EN_HEADER: &str = r#"**PRIME DIRECTIVE: ABSOLUTE PHOTOREALISM (Enscape/V-Ray Quality)**

**Core Task: Photorealistic "Overpainting" of a Geometric Guide**
The user has provided a **GEOMETRIC GUIDE** image (a 3D model with visible wireframe lines). Your task is to act as a master digital artist performing a photorealistic "render pass" over this guide. You are NOT just editing colors; you are **completely painting over every pixel** of the original image with new, hyper-realistic materials and lighting. The goal is to create an image indistinguishable from a photograph taken of a real space, with the quality of a top-tier rendering engine like **Enscape** or V-Ray.

**NON-NEGOTIABLE RULE #1: OBLITERATE THE WIREFRAME**
This is the most critical instruction. The original wireframe lines are for geometric reference ONLY. They MUST be **completely covered and obliterated** in the final output.
- **FAILURE CONDITION:** If a single artificial line from the guide is visible, the task is a FAILURE.
- **HOW EDGES ARE FORMED:** In your final "painting," edges are defined **ONLY** by the meeting of different material planes and the realistic interaction of light and shadow (especially soft contact shadows). There are NO lines in a photograph.
- **FORBIDDEN ACTION:** Do not trace or preserve the wireframe. Your new "paint" must be so thick and opaque that the underlying guide is 100% invisible.

**Mandatory Rendering Workflow:**
You must follow this professional CGI process strictly.

**Step 1: SCENE RECONSTRUCTION & HYPER-REALISTIC PBR MATERIALS**
- Reconstruct the 3D geometry from the blueprint, but without any of the lines.
- Apply high-quality Physically-Based Rendering (PBR) materials to all surfaces. These materials **MUST** have realistic properties and imperfections.
- **Imperfection is Key:** Surfaces must NOT be perfectly uniform. Add microscopic imperfections: subtle dust, faint scratches, minor smudges, and natural variations in glossiness and color.
- **Material Specifics:** Wood should have visible grain, pores, and slight variations in stain. Metal should have faint anisotropic reflections. Concrete and plaster should show subtle trowel marks and color variations. Fabrics must have visible weave and texture.
- **Reflections:** Shiny surfaces (glass, polished metal, marble) must clearly and accurately reflect their environment with proper Fresnel falloff.

**Step 2: PHYSICALLY-ACCURATE GLOBAL ILLUMINATION (GI)**
- **DISCARD** the original blueprint's lighting.
- Light the scene from scratch using physically accurate GI. Light must behave like real-world photons.
- **Light Bouncing & Color Bleed:** Light must bounce realistically off surfaces, subtly taking on the color of those surfaces and casting it onto nearby objects (color bleed).
- **Shadows:** Ensure soft, diffuse shadows from large light sources (like windows) and sharper, more defined shadows from small, intense sources (like a downlight).

**Step 3: VIRTUAL CAMERA & POST-PROCESSING**
- "Photograph" the rendered scene with a virtual high-end camera (e.g., Sony A7R IV with a 24mm G Master lens).
- Apply subtle, professional camera effects as specified below.

**Cinematic Post-Processing:**"#;

const EN_IMMUTABLE_RULES: &str = r#"**Immutable Rules:**
- **Window Integrity:** Do NOT alter the window frames, glass, or structure. Treat windows as transparent portals.
- **Outdoor View:** Preserve the original daytime outdoor scenery unless Night Mode is ON, in which case the view must be a realistic nighttime scene.
- **Interior-Only Edits:** All material/style changes apply ONLY to the interior."#;

const EN_NIGHT_BLOCK: &str = "
- Render a highly realistic and atmospheric nighttime scene.
- Illumination MUST ONLY come from artificial light sources located within the room (e.g., lamps, chandeliers, specified lamp style).
- Do NOT use any ambient daylight. The scene must be lit as if it were completely dark outside.
- This lighting should create a high-contrast effect with distinct, realistic highlights and deep, natural shadows. Areas not directly illuminated by a fixture must be appropriately dark.
";

const EN_JSON_INTRO: &str = "**JSON Output Requirement:**
After your main instructions, provide a single, clean, parsable JSON object that summarizes the key parameters you applied. Do not include any other text before or after the JSON block.";

const ZH_HEADER: &str = r#"**首要指令：絕對的照片級真實感 (Enscape/V-Ray 品質)**

**核心任務：對幾何指南進行照片級“覆蓋繪製”**
使用者提供了一張「幾何指南」圖像（一個帶有可見線框的3D模型）。你的任務是扮演一位大師級的數位藝術家，對這份指南進行照片級的“渲染遍歷”。你不僅僅是編輯顏色；你是在用全新的、超真實的材質和光影「完全覆蓋繪製原始圖像的每一個像素」。目標是創造出一張與真實空間的照片無法區分的圖像，其品質要達到像 **Enscape** 或 V-Ray 這樣的頂級渲染引擎水準。

**不可協商規則 #1：徹底消除線框**
這是最關鍵的指令。原始的線框線條「僅供幾何參考」。在最終輸出中，它們必須被「完全覆蓋並徹底清除」。
- **失敗條件：** 如果最終成品中出現任何一條來自指南的人工線條，則任務視為「失敗」。
- **邊緣的形成方式：** 在你最終的“畫作”中，邊緣「只能」由不同材質平面的交界以及光影的真實互動（特別是柔和的接觸陰影）來定義。照片中沒有線條。
- **禁止行為：** 不要描摹或保留線框。你新的“顏料”必須厚實且不透明，以至於底層的指南100%不可見。

**強制性渲染工作流程：**
你必須嚴格遵循這個專業的CGI流程。

**步驟一：場景重建與超真實的PBR材質**
- 根據藍圖重建3D幾何結構，但要完全去掉所有線條。
- 為所有表面應用高品質的基於物理的渲染 (PBR) 材質。這些材質「必須」具有真實的屬性和瑕疵。
- **瑕疵是關鍵：** 表面「絕不能」是完美均勻的。加入微觀的瑕疵：細微的灰塵、輕微的刮痕、微小的污跡，以及光澤度和顏色上的自然變化。
- **材質細節：** 木材應有可見的紋理、毛孔和染色上的輕微變化。金屬應有微弱的各向異性反射。混凝土和石膏應顯示出細微的鏝刀痕跡和顏色變化。織物必須有可見的編織紋理。
- **反射：** 光亮的表面（玻璃、拋光金屬、大理石）必須清晰且準確地反射其周遭環境，並具有正確的菲涅爾衰減效果。

**步驟二：物理準確的全域照明 (GI)**
- 「拋棄」藍圖原始的燈光設定。
- 使用物理準確的全域照明從頭開始為場景布光。光線的行為必須如同真實世界的光子。
- **光線反彈與色彩溢出：** 光線必須能夠在物體表面之間真實地反彈，並巧妙地吸收這些表面的顏色，將其投射到附近的物體上（色彩溢出）。
- **陰影：** 確保來自大型光源（如窗戶）的陰影是柔和、漫反射的，而來自小型、強烈光源（如嵌燈）的陰影則更為銳利、清晰。

**步驟三：虛擬相機與後期處理**
- 用一個虛擬的高階相機（例如：配備 24mm G Master 鏡頭的 Sony A7R IV）來「拍攝」渲染好的場景。
- 應用下方指定的微妙且專業的相機效果。

**電影級後期處理:**"#;

const ZH_IMMUTABLE_RULES: &str = "**不變的規則：**
- **窗戶完整性：** 「絕對不能」更改窗框、玻璃或其結構。將窗戶視為透明的通道。
- **戶外景觀：** 保留原始的白天戶外景色，除非「夜間模式」開啟，此時景觀必須是真實的夜景。
- **僅限室內編輯：** 所有的材質/風格變更「僅適用於」室內。";

const ZH_NIGHT_BLOCK: &str = "
- 渲染一個高度真實且富有氛圍的夜間場景。
- 照明「只能」來自房間內部的人造光源（例如：檯燈、吊燈、指定的燈具風格）。
- 「絕對不要」使用任何環境日光。場景必須被照亮得如同室外完全黑暗一樣。
- 這種照明應創造出高對比度的效果，具有清晰、真實的高光和深邃、自然的陰影。未被燈具直接照射的區域必須是適當的暗度。
";

const ZH_JSON_INTRO: &str = "**JSON 輸出要求：**
在主要說明之後，提供一個單一、乾淨、可解析的 JSON 物件，總結您為此次生成所套用的關鍵參數。請勿在 JSON 區塊前後包含任何其他文字。";

static EN_PHRASES: PromptPhrases = PromptPhrases {
    header: EN_HEADER,

    grading_label: "*   **Color Grading:** ",
    grading_named: |look| {
        format!("Apply a professional '{look}' cinematic color grade.")
    },
    grading_generic: "Apply standard professional color grading for a cohesive, atmospheric final image.",
    look_name: |look| look.as_str().replace('_', " "),

    effects_intro: "*   **Effects:**\n    *   Depth of Field: A slight, natural depth of field (bokeh) is required.",
    bloom_label: "Bloom",
    bloom_on: |v| {
        format!("Apply a soft, physically-based bloom effect to highlights and light sources with an intensity of approximately {v}.")
    },
    bloom_off: "No excessive bloom effect.",
    vignette_label: "Vignette",
    vignette_on: |v| {
        format!("Add a subtle, optical-style dark vignette at the corners of the image with an intensity of approximately {v}.")
    },
    vignette_off: "No noticeable vignette.",
    film_grain_label: "Film Grain",
    film_grain_on: |v| format!("Overlay a fine, realistic film grain with an intensity of approximately {v}."),
    film_grain_off: "The image should be clean, without digital noise or artificial grain.",
    lens_flare_label: "Lens Flare",
    lens_flare_on: "If there are bright, visible light sources, add a natural and subtle lens flare effect appropriate to a high-end lens.",
    lens_flare_off: "Avoid adding any artificial lens flare effects.",

    immutable_rules: EN_IMMUTABLE_RULES,

    specs_title: "**User Specifications for Reconstruction:**",
    aspect: |aspect| {
        format!("*   **Image Aspect Ratio:** The final image must be strictly rendered in a **{aspect}** aspect ratio.")
    },
    realism_first: "*   **Photorealism Framework FIRST:** Before considering style, establish the baseline of absolute photorealism.",
    style: |style| {
        format!("*   **Aesthetic Style (Secondary Influence):** After achieving photorealism, use the following style as a guideline for decor, furniture choices, and color palette. The aesthetic style of '{style}' must be expressed *through* realistic objects and lighting, not by sacrificing realism itself.")
    },
    style_fallback: FALLBACK_STYLE_KEY,

    ambiance_label: "*   **Ambiance:** ",
    night_block: EN_NIGHT_BLOCK,
    day_line: "- Render the scene in a bright, natural daylight setting.",

    color: |hex| format!("Color: {hex}."),
    ceiling_label: "*   **Ceiling:** ",
    no_ceiling_color: "No specific ceiling color.",
    walls_label: "*   **Walls:** ",
    no_wall_color: "No specific wall color.",
    wall_texture_hint: " If wall texture is provided, use it.",
    cabinets_label: "*   **Cabinets/Woodwork:** ",
    no_cabinet_color: "No specific cabinet color.",
    cabinet_texture_hint: " If cabinet texture is provided, use it.",
    wood_grain: |direction| format!(" Wood grain direction: **{}**.", direction.as_str()),
    floor_label: "*   **Floor:** ",
    floor_material: |material| format!("Material: {material}."),
    no_floor_material: "No specific floor material.",
    floor_texture_hint: " If floor texture is provided, use it.",
    surface: |roughness, glossiness| {
        format!("*   **Surface Finish:** Overall roughness of **{roughness}** and glossiness of **{glossiness}**.")
    },

    lighting_label: "*   **Lighting:** ",
    light_temp: |kelvin| format!("Primary light temperature: {kelvin}K."),
    light_color: |hex| format!("Primary light color: {hex}."),
    light_intensity: |v| format!(" Intensity: **{v}**."),
    shadows: |softness| {
        format!("*   **Shadows:** Overall shadow softness/diffusion must be **{softness}** (0.0 for sharp, 1.0 for very soft). ")
    },
    contact_shadows_on: "Ensure prominent and realistic contact shadows (ambient occlusion) are present where surfaces meet to ground objects.",
    contact_shadows_off: "Use natural, subtle contact shadows.",
    lamp_label: "*   **Lamp Fixtures:** ",
    lamp: |style| format!("Incorporate '{style}' style fixtures."),
    lamp_none: "Use subtle, integrated lighting.",

    bathroom_label: "*   **Bathroom:** ",
    bathroom_replace: |style, color| {
        format!("Replace fixtures with new ones in a **'{style}'** style, colored **{color}**.")
    },
    bathroom_keep: "Do not modify bathroom fixtures.",

    negatives_label: "*   **AVOID (Negative Prompts):** ",
    negatives: |user| {
        format!("{user}, flat lighting, sterile CG look, perfectly clean surfaces, artificial lines.")
    },

    json_intro: EN_JSON_INTRO,
};

static ZH_PHRASES: PromptPhrases = PromptPhrases {
    header: ZH_HEADER,

    grading_label: "*   **色彩分級:** ",
    grading_named: |look| format!("套用專業的 '{look}' 電影色彩風格。"),
    grading_generic: "套用標準的專業色彩分級，以打造有凝聚力、有氛圍的最終圖像。",
    look_name: |look| {
        match look {
            CinematicLook::TealOrange => "青橙色調 (Teal & Orange)",
            CinematicLook::FilmNoir => "黑色電影 (Film Noir)",
            CinematicLook::VintageFilm => "復古膠片 (Vintage Film)",
            CinematicLook::CyberpunkNeon => "賽博龐克霓虹 (Cyberpunk Neon)",
        }
        .to_string()
    },

    effects_intro: "*   **效果:**\n    *   景深: 需要輕微、自然的景深效果 (散景)。",
    bloom_label: "光暈 (Bloom)",
    bloom_on: |v| format!("為高光和光源應用基於物理的柔和光暈效果，強度約為 {v}。"),
    bloom_off: "無過度的光暈效果。",
    vignette_label: "暗角 (Vignette)",
    vignette_on: |v| format!("在圖像角落添加細微、光學風格的暗角，強度約為 {v}。"),
    vignette_off: "無明顯的暗角。",
    film_grain_label: "膠片顆粒 (Film Grain)",
    film_grain_on: |v| format!("疊加一層細膩、真實的膠片顆粒，強度約為 {v}。"),
    film_grain_off: "圖像應該乾淨，沒有數位雜訊或人工顆粒。",
    lens_flare_label: "鏡頭光暈 (Lens Flare)",
    lens_flare_on: "如果有明亮可見的光源，從它們發出適合高階鏡頭的自然且細微的鏡頭光暈效果。",
    lens_flare_off: "避免添加任何人工的鏡頭光暈效果。",

    immutable_rules: ZH_IMMUTABLE_RULES,

    specs_title: "**使用者指定的重建參數：**",
    aspect: |aspect| format!("*   **圖片長寬比：** 最終圖片必須嚴格以 **{aspect}** 的長寬比渲染。"),
    realism_first: "*   **照片真實感框架優先：** 在考慮風格之前，先建立絕對照片級真實感的基準。",
    style: |style| {
        format!("*   **美學風格 (次要影響)：** 在實現照片真實感之後，使用以下風格作為裝飾、家具選擇和調色板的指導方針。'{style}' 的美學風格必須「透過」真實的物體和光線來表達，而不是犧牲真實感本身。")
    },
    style_fallback: "現代風",

    ambiance_label: "*   **氛圍：** ",
    night_block: ZH_NIGHT_BLOCK,
    day_line: "- 在明亮的自然日光設定下渲染場景。",

    color: |hex| format!("顏色: {hex}。"),
    ceiling_label: "*   **天花板：** ",
    no_ceiling_color: "不指定天花板顏色。",
    walls_label: "*   **牆壁：** ",
    no_wall_color: "不指定牆壁顏色。",
    wall_texture_hint: " 如果提供了牆壁紋理，請使用它。",
    cabinets_label: "*   **櫥櫃/木製品：** ",
    no_cabinet_color: "不指定櫥櫃顏色。",
    cabinet_texture_hint: " 如果提供了櫥櫃紋理，請使用它。",
    wood_grain: |direction| {
        let label = match direction {
            WoodGrainDirection::Vertical => "垂直",
            WoodGrainDirection::Horizontal => "水平",
        };
        format!("木紋方向: **{label}**。")
    },
    floor_label: "*   **地板：** ",
    floor_material: |material| format!("材質: {material}。"),
    no_floor_material: "不指定地板材質。",
    floor_texture_hint: " 如果提供了地板紋理，請使用它。",
    surface: |roughness, glossiness| {
        format!("*   **表面處理：** 整體粗糙度為 **{roughness}**，光澤度為 **{glossiness}**。")
    },

    lighting_label: "*   **照明：** ",
    light_temp: |kelvin| format!("主要光溫: {kelvin}K。"),
    light_color: |hex| format!("主要光色: {hex}。"),
    light_intensity: |v| format!(" 強度: **{v}**。"),
    shadows: |softness| {
        format!("*   **陰影:** 整體陰影的柔和/擴散度必須為 **{softness}** (0.0 為銳利, 1.0 為非常柔和)。")
    },
    contact_shadows_on: "確保在物體表面相接處有顯著且真實的接觸陰影（環境光遮蔽），以增加物體的落地感。",
    contact_shadows_off: "使用自然、細膩的接觸陰影。",
    lamp_label: "*   **燈具：** ",
    lamp: |style| format!("融入 '{style}' 風格的燈具。"),
    lamp_none: "使用細微的、整合式的照明。",

    bathroom_label: "*   **浴室：** ",
    bathroom_replace: |style, color| {
        format!("將衛浴設備更換為 **'{style}'** 風格、顏色為 **{color}** 的新設備。")
    },
    bathroom_keep: "不要修改浴室設備。",

    negatives_label: "*   **避免 (負面提示):** ",
    negatives: |user| format!("{user}，平面光，呆板的 CG 感，過於乾淨的表面，人工線條。"),

    json_intro: ZH_JSON_INTRO,
};

fn phrases(language: Language) -> &'static PromptPhrases {
    match language {
        Language::En => &EN_PHRASES,
        Language::Zh => &ZH_PHRASES,
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

/// JSON string literal, quotes included.
fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// The metadata block the model is asked to echo back. Identical in both
/// locales.
fn metadata_template(config: &EditorConfiguration) -> String {
    let light_value = if config.use_light_temp {
        config.light_temp_k.to_string()
    } else {
        config.light_color_hex.clone()
    };

    let lines = [
        "```json".to_string(),
        "{".to_string(),
        format!(
            "  \"applied_style\": {},",
            quote(non_empty_or(&config.selected_style, FALLBACK_STYLE_KEY))
        ),
        format!(
            "  \"ambiance\": {},",
            quote(if config.night_mode { "night" } else { "day" })
        ),
        "  \"materials\": {".to_string(),
        format!(
            "    \"wall_color\": {},",
            quote(non_empty_or(&config.wall_color_hex, "unchanged"))
        ),
        format!(
            "    \"ceiling_color\": {},",
            quote(non_empty_or(&config.ceiling_color_hex, "unchanged"))
        ),
        format!(
            "    \"floor_material\": {}",
            quote(config.floor_material.map(|m| m.as_str()).unwrap_or("unchanged"))
        ),
        "  },".to_string(),
        "  \"lighting\": {".to_string(),
        format!(
            "    \"type\": {},",
            quote(if config.use_light_temp { "temperature" } else { "hex" })
        ),
        format!("    \"value\": {},", quote(&light_value)),
        format!("    \"intensity\": {},", config.light_intensity),
        format!("    \"shadow_softness\": {},", config.shadow_softness),
        format!("    \"contact_shadows\": {}", config.contact_shadows),
        "  },".to_string(),
        "  \"cinematic_effects\": {".to_string(),
        format!(
            "    \"look\": {},",
            quote(config.cinematic_look.map(|l| l.as_str()).unwrap_or("none"))
        ),
        format!("    \"film_grain\": {},", config.film_grain),
        format!("    \"vignette\": {},", config.vignette),
        format!("    \"bloom\": {},", config.bloom),
        format!("    \"lens_flare\": {}", config.lens_flare),
        "  }".to_string(),
        "}".to_string(),
        "```".to_string(),
    ];

    lines.join("\n")
}

/// Builds the full instruction text for one submission.
pub fn build_prompt(config: &EditorConfiguration, language: Language) -> String {
    let p = phrases(language);
    let mut lines: Vec<String> = Vec::new();

    lines.push(p.header.to_string());

    let grading = match config.cinematic_look {
        Some(look) => (p.grading_named)(&(p.look_name)(look)),
        None => p.grading_generic.to_string(),
    };
    lines.push(format!("{}{}", p.grading_label, grading));
    lines.push(p.effects_intro.to_string());

    let bloom = if config.bloom > 0.0 {
        (p.bloom_on)(config.bloom)
    } else {
        p.bloom_off.to_string()
    };
    let vignette = if config.vignette > 0.0 {
        (p.vignette_on)(config.vignette)
    } else {
        p.vignette_off.to_string()
    };
    let film_grain = if config.film_grain > 0.0 {
        (p.film_grain_on)(config.film_grain)
    } else {
        p.film_grain_off.to_string()
    };
    let lens_flare = if config.lens_flare {
        p.lens_flare_on
    } else {
        p.lens_flare_off
    };
    lines.push(format!("    *   {}: {}", p.bloom_label, bloom));
    lines.push(format!("    *   {}: {}", p.vignette_label, vignette));
    lines.push(format!("    *   {}: {}", p.film_grain_label, film_grain));
    lines.push(format!("    *   {}: {lens_flare}", p.lens_flare_label));
    lines.push(String::new());

    lines.push(p.immutable_rules.to_string());
    lines.push(String::new());

    lines.push(p.specs_title.to_string());
    lines.push((p.aspect)(config.target_aspect.as_str()));
    lines.push(p.realism_first.to_string());
    lines.push((p.style)(non_empty_or(&config.selected_style, p.style_fallback)));

    let ambiance = if config.night_mode {
        p.night_block
    } else {
        p.day_line
    };
    lines.push(format!("{}{}", p.ambiance_label, ambiance));

    let ceiling = if config.ceiling_color_hex.is_empty() {
        p.no_ceiling_color.to_string()
    } else {
        (p.color)(&config.ceiling_color_hex)
    };
    lines.push(format!("{}{}", p.ceiling_label, ceiling));

    let walls = if config.wall_color_hex.is_empty() {
        p.no_wall_color.to_string()
    } else {
        (p.color)(&config.wall_color_hex)
    };
    lines.push(format!("{}{}{}", p.walls_label, walls, p.wall_texture_hint));

    let cabinets = if config.cabinet_color_hex.is_empty() {
        p.no_cabinet_color.to_string()
    } else {
        (p.color)(&config.cabinet_color_hex)
    };
    lines.push(format!(
        "{}{}{}{}",
        p.cabinets_label,
        cabinets,
        p.cabinet_texture_hint,
        (p.wood_grain)(config.wood_grain_direction)
    ));

    let floor = match config.floor_material {
        Some(material) => (p.floor_material)(material.as_str()),
        None => p.no_floor_material.to_string(),
    };
    lines.push(format!("{}{}{}", p.floor_label, floor, p.floor_texture_hint));
    lines.push((p.surface)(config.roughness, config.glossiness));

    let light_source = if config.use_light_temp {
        (p.light_temp)(config.light_temp_k)
    } else {
        (p.light_color)(&config.light_color_hex)
    };
    lines.push(format!(
        "{}{}{}",
        p.lighting_label,
        light_source,
        (p.light_intensity)(config.light_intensity)
    ));

    let contact = if config.contact_shadows {
        p.contact_shadows_on
    } else {
        p.contact_shadows_off
    };
    lines.push(format!("{}{}", (p.shadows)(config.shadow_softness), contact));

    let lamp = match config.lamp_style {
        Some(style) => (p.lamp)(style.as_str()),
        None => p.lamp_none.to_string(),
    };
    lines.push(format!("{}{}", p.lamp_label, lamp));

    let bathroom = if config.bathroom_replace {
        (p.bathroom_replace)(
            config.bath_style.map(|s| s.as_str()).unwrap_or(""),
            &config.fixture_color_hex,
        )
    } else {
        p.bathroom_keep.to_string()
    };
    lines.push(format!("{}{}", p.bathroom_label, bathroom));

    lines.push(format!(
        "{}{}",
        p.negatives_label,
        (p.negatives)(&config.negative_prompts)
    ));
    lines.push(String::new());

    lines.push(p.json_intro.to_string());
    lines.push(metadata_template(config));

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIGHT_CLAUSE_EN: &str =
        "Illumination MUST ONLY come from artificial light sources located within the room";
    const NIGHT_CLAUSE_ZH: &str = "照明「只能」來自房間內部的人造光源";

    fn metadata_of(prompt: &str) -> serde_json::Value {
        let start = prompt.find("```json\n").unwrap() + "```json\n".len();
        let end = prompt[start..].find("\n```").unwrap() + start;
        serde_json::from_str(&prompt[start..end]).unwrap()
    }

    fn zen_night() -> EditorConfiguration {
        EditorConfiguration {
            target_aspect: TargetAspect::Widescreen,
            bloom: 0.15,
            night_mode: true,
            selected_style: "Zen".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn builder_is_deterministic() {
        let config = zen_night();
        assert_eq!(
            build_prompt(&config, Language::En),
            build_prompt(&config, Language::En)
        );
        assert_eq!(
            build_prompt(&config, Language::Zh),
            build_prompt(&config, Language::Zh)
        );
    }

    #[test]
    fn zen_night_example_in_english() {
        let prompt = build_prompt(&zen_night(), Language::En);

        assert!(prompt.contains("The aesthetic style of 'Zen'"));
        assert!(prompt.contains(NIGHT_CLAUSE_EN));
        assert!(prompt.contains("**16:9** aspect ratio"));
        assert!(prompt.contains("intensity of approximately 0.15."));

        let metadata = metadata_of(&prompt);
        assert_eq!(metadata["applied_style"], "Zen");
        assert_eq!(metadata["ambiance"], "night");
        assert_eq!(metadata["cinematic_effects"]["bloom"], 0.15);
    }

    #[test]
    fn night_clause_only_when_night_mode() {
        let day = EditorConfiguration::default();
        let night = zen_night();

        let day_en = build_prompt(&day, Language::En);
        assert!(!day_en.contains(NIGHT_CLAUSE_EN));
        assert!(day_en.contains("bright, natural daylight setting"));
        assert!(build_prompt(&night, Language::En).contains(NIGHT_CLAUSE_EN));

        assert!(!build_prompt(&day, Language::Zh).contains(NIGHT_CLAUSE_ZH));
        assert!(build_prompt(&night, Language::Zh).contains(NIGHT_CLAUSE_ZH));
        assert_eq!(metadata_of(&day_en)["ambiance"], "day");
    }

    #[test]
    fn disabled_effects_use_avoid_phrasing() {
        let config = EditorConfiguration {
            bloom: 0.0,
            vignette: 0.0,
            film_grain: 0.0,
            lens_flare: false,
            ..Default::default()
        };
        let prompt = build_prompt(&config, Language::En);

        assert!(prompt.contains("Bloom: No excessive bloom effect."));
        assert!(prompt.contains("Vignette: No noticeable vignette."));
        assert!(prompt.contains("without digital noise or artificial grain"));
        assert!(prompt.contains("Avoid adding any artificial lens flare effects."));

        assert!(!prompt.contains("bloom effect to highlights"));
        assert!(!prompt.contains("dark vignette at the corners"));
        assert!(!prompt.contains("Overlay a fine, realistic film grain"));
        assert!(!prompt.contains("add a natural and subtle lens flare"));
    }

    #[test]
    fn enabled_effects_interpolate_values_verbatim() {
        let config = EditorConfiguration {
            bloom: 0.35,
            vignette: 1.0,
            film_grain: 0.07,
            lens_flare: true,
            ..Default::default()
        };
        let prompt = build_prompt(&config, Language::En);

        assert!(prompt.contains("light sources with an intensity of approximately 0.35."));
        assert!(prompt.contains("corners of the image with an intensity of approximately 1."));
        assert!(prompt.contains("film grain with an intensity of approximately 0.07."));
        assert!(prompt.contains("add a natural and subtle lens flare"));

        assert!(!prompt.contains("No excessive bloom effect."));
        assert!(!prompt.contains("No noticeable vignette."));
        assert!(!prompt.contains("Avoid adding any artificial lens flare effects."));

        let zh = build_prompt(&config, Language::Zh);
        assert!(zh.contains("強度約為 0.35。"));
        assert!(!zh.contains("避免添加任何人工的鏡頭光暈效果。"));
    }

    #[test]
    fn empty_colors_use_unset_clauses() {
        let config = EditorConfiguration {
            ceiling_color_hex: String::new(),
            ..Default::default()
        };
        let prompt = build_prompt(&config, Language::En);
        assert!(prompt.contains("*   **Ceiling:** No specific ceiling color."));
        assert!(prompt.contains("*   **Walls:** No specific wall color. If wall texture is provided"));
        assert!(prompt.contains("No specific cabinet color."));
        assert_eq!(metadata_of(&prompt)["materials"]["wall_color"], "unchanged");

        let colored = EditorConfiguration {
            wall_color_hex: "#EDEDED".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&colored, Language::En);
        assert!(prompt.contains("*   **Walls:** Color: #EDEDED."));
        assert!(prompt.contains("*   **Ceiling:** Color: #FFFFFF."));
    }

    #[test]
    fn lighting_cites_temperature_or_color() {
        let temp = EditorConfiguration::default();
        let prompt = build_prompt(&temp, Language::En);
        assert!(prompt.contains("Primary light temperature: 4000K. Intensity: **0.6**."));
        assert_eq!(metadata_of(&prompt)["lighting"]["value"], "4000");

        let hex = EditorConfiguration {
            use_light_temp: false,
            light_color_hex: "#FFD8A8".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&hex, Language::En);
        assert!(prompt.contains("Primary light color: #FFD8A8. Intensity: **0.6**."));
        assert!(!prompt.contains("Primary light temperature"));
        let metadata = metadata_of(&prompt);
        assert_eq!(metadata["lighting"]["type"], "hex");
        assert_eq!(metadata["lighting"]["value"], "#FFD8A8");
    }

    #[test]
    fn bathroom_block_follows_replace_flag() {
        let keep = build_prompt(&EditorConfiguration::default(), Language::En);
        assert!(keep.contains("Do not modify bathroom fixtures."));

        let replace = EditorConfiguration {
            bathroom_replace: true,
            bath_style: Some(BathStyle::Classic),
            fixture_color_hex: "#C0C0C0".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&replace, Language::En);
        assert!(prompt.contains("in a **'classic'** style, colored **#C0C0C0**."));
        assert!(!prompt.contains("Do not modify bathroom fixtures."));
    }

    #[test]
    fn negative_prompts_keep_user_text_and_boilerplate() {
        let config = EditorConfiguration {
            negative_prompts: "people, clutter".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&config, Language::En);
        assert!(prompt.contains(
            "AVOID (Negative Prompts):** people, clutter, flat lighting, sterile CG look, perfectly clean surfaces, artificial lines."
        ));
    }

    #[test]
    fn chinese_prompt_localizes_look_and_grain() {
        let config = EditorConfiguration {
            cinematic_look: Some(CinematicLook::FilmNoir),
            wood_grain_direction: WoodGrainDirection::Horizontal,
            ..Default::default()
        };
        let zh = build_prompt(&config, Language::Zh);
        assert!(zh.contains("套用專業的 '黑色電影 (Film Noir)' 電影色彩風格。"));
        assert!(zh.contains("木紋方向: **水平**。"));
        assert!(zh.contains("'現代風' 的美學風格"));
        // the echoed block stays language-neutral
        let metadata = metadata_of(&zh);
        assert_eq!(metadata["applied_style"], "modern");
        assert_eq!(metadata["cinematic_effects"]["look"], "film_noir");

        let en = build_prompt(&config, Language::En);
        assert!(en.contains("Apply a professional 'film noir' cinematic color grade."));
    }

    #[test]
    fn generic_grading_without_look() {
        let prompt = build_prompt(&EditorConfiguration::default(), Language::En);
        assert!(prompt.contains("Apply standard professional color grading"));
        assert_eq!(metadata_of(&prompt)["cinematic_effects"]["look"], "none");
    }

    #[test]
    fn metadata_block_escapes_free_text() {
        let config = EditorConfiguration {
            wall_color_hex: "warm \"greige\"".to_string(),
            ..Default::default()
        };
        let prompt = build_prompt(&config, Language::En);
        assert_eq!(
            metadata_of(&prompt)["materials"]["wall_color"],
            "warm \"greige\""
        );
    }
}
