use crate::params::{
    Color, ControlEvent, ParamField, RenderParameters, EMISSIVE_RANGE, EMISSIVE_STEP,
    LIGHT_INTENSITY_RANGE,
};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(210, 64, 64);
const TEXTURED_HINT: &str = "(Hidden/Disabled when texture is applied)";
const NUMBER_ENTRY_WIDTH: f32 = 36.0;
const COLOR_ENTRY_WIDTH: f32 = 64.0;

/// What the control panel shows about the selected image.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureStatus {
    Idle,
    Loading {
        name: String,
    },
    Applied {
        name: String,
        width: u32,
        height: u32,
        fingerprint: String,
    },
    Failed {
        name: String,
        message: String,
    },
}

/// Everything the panel asked for during one frame.
#[derive(Debug, Default)]
pub struct PanelOutput {
    pub events: Vec<ControlEvent>,
    /// "Upload Texture" was clicked; the caller owns the file dialog.
    pub pick_texture: bool,
}

/// Top-right "Controls" window. Reads a parameter snapshot and reports edits
/// as [`ControlEvent`]s; it never writes parameters itself.
#[derive(Debug, Default)]
pub struct ControlPanel {
    object_color_text: String,
    glow_text: String,
    light_color_text: String,
    intensity_text: String,
    input_error: Option<String>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        params: &RenderParameters,
        status: &TextureStatus,
    ) -> PanelOutput {
        let mut output = PanelOutput::default();
        egui::Window::new("Controls")
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                self.controls(ui, params, status, &mut output);
            });
        output
    }

    fn controls(
        &mut self,
        ui: &mut egui::Ui,
        params: &RenderParameters,
        status: &TextureStatus,
        output: &mut PanelOutput,
    ) {
        if ui.button("Reset").clicked() {
            output.events.push(ControlEvent::Reset);
        }
        ui.separator();

        ui.heading("Ball");
        if ui.button("Upload Texture").clicked() {
            output.pick_texture = true;
        }
        let textured = params.texture_source.is_some();
        if let Some((text, is_error)) = status_line(textured, status) {
            if is_error {
                ui.colored_label(ERROR_COLOR, text);
            } else {
                ui.label(text);
            }
        }
        if textured {
            ui.horizontal(|ui| {
                if !matches!(status, TextureStatus::Failed { .. } | TextureStatus::Loading { .. })
                {
                    ui.label("✓ Texture applied");
                }
                if ui.button("Remove").clicked() {
                    output.events.push(ControlEvent::ClearTexture);
                }
            });
        }

        ui.add_enabled_ui(!textured, |ui| {
            ui.horizontal(|ui| {
                ui.label("Color");
                if let Some(color) = color_picker(ui, &params.object_color) {
                    output.events.push(ControlEvent::SetObjectColor(color));
                }
                let shown = params.object_color.as_str().to_string();
                if let Some(result) = text_entry(
                    ui,
                    &mut self.object_color_text,
                    shown,
                    ParamField::ObjectColor,
                    COLOR_ENTRY_WIDTH,
                ) {
                    self.accept(result, output);
                }
                if textured {
                    ui.weak(TEXTURED_HINT);
                }
            });
            ui.horizontal(|ui| {
                ui.label("Glow");
                let mut glow = params.emissive_intensity;
                let slider = egui::Slider::new(&mut glow, EMISSIVE_RANGE.0..=EMISSIVE_RANGE.1)
                    .step_by(EMISSIVE_STEP as f64)
                    .show_value(false);
                if ui.add(slider).changed() {
                    output.events.push(ControlEvent::SetEmissiveIntensity(glow));
                }
                let shown = format!("{:.1}", params.emissive_intensity);
                if let Some(result) = text_entry(
                    ui,
                    &mut self.glow_text,
                    shown,
                    ParamField::EmissiveIntensity,
                    NUMBER_ENTRY_WIDTH,
                ) {
                    self.accept(result, output);
                }
                if textured {
                    ui.weak(TEXTURED_HINT);
                }
            });
        });
        ui.separator();

        ui.heading("Light");
        let power = if params.is_light_on {
            "Turn Light Off"
        } else {
            "Turn Light On"
        };
        if ui.button(power).clicked() {
            output
                .events
                .push(ControlEvent::SetLightOn(!params.is_light_on));
        }
        ui.horizontal(|ui| {
            ui.label("Color");
            if let Some(color) = color_picker(ui, &params.light_color) {
                output.events.push(ControlEvent::SetLightColor(color));
            }
            let shown = params.light_color.as_str().to_string();
            if let Some(result) = text_entry(
                ui,
                &mut self.light_color_text,
                shown,
                ParamField::LightColor,
                COLOR_ENTRY_WIDTH,
            ) {
                self.accept(result, output);
            }
        });
        ui.horizontal(|ui| {
            ui.label("Intensity");
            let mut intensity = params.light_intensity.round() as i32;
            let slider =
                egui::Slider::new(&mut intensity, LIGHT_INTENSITY_RANGE.0..=LIGHT_INTENSITY_RANGE.1)
                    .show_value(false);
            if ui.add(slider).changed() {
                output
                    .events
                    .push(ControlEvent::SetLightIntensity(intensity as f32));
            }
            let shown = format!("{}", params.light_intensity);
            if let Some(result) = text_entry(
                ui,
                &mut self.intensity_text,
                shown,
                ParamField::LightIntensity,
                NUMBER_ENTRY_WIDTH,
            ) {
                self.accept(result, output);
            }
        });

        if let Some(message) = &self.input_error {
            ui.colored_label(ERROR_COLOR, message);
        }
    }

    fn accept(
        &mut self,
        result: Result<ControlEvent, crate::params::ParamError>,
        output: &mut PanelOutput,
    ) {
        match result {
            Ok(event) => {
                self.input_error = None;
                output.events.push(event);
            }
            Err(err) => {
                log::warn!("Rejected control input: {}", err);
                self.input_error = Some(err.to_string());
            }
        }
    }
}

/// Status text for the texture row and whether it is an error.
fn status_line(textured: bool, status: &TextureStatus) -> Option<(String, bool)> {
    match status {
        TextureStatus::Idle => None,
        TextureStatus::Loading { name } => Some((format!("Loading {name}..."), false)),
        TextureStatus::Applied {
            name,
            width,
            height,
            fingerprint,
        } if textured => Some((format!("{name} {width}x{height} [{fingerprint}]"), false)),
        TextureStatus::Applied { .. } => None,
        TextureStatus::Failed { name, message } => {
            Some((format!("Could not load {name}: {message}"), true))
        }
    }
}

/// Unparsable strings edit as white.
fn color_picker(ui: &mut egui::Ui, color: &Color) -> Option<Color> {
    let mut rgb = color.to_srgb8().unwrap_or([255, 255, 255]);
    if ui.color_edit_button_srgb(&mut rgb).changed() {
        Some(Color::from_srgb8(rgb))
    } else {
        None
    }
}

fn entry_id(field: ParamField) -> egui::Id {
    egui::Id::new(("control entry", field.name()))
}

/// Small text box echoing `shown`; edited text is parsed when focus leaves.
fn text_entry(
    ui: &mut egui::Ui,
    buffer: &mut String,
    shown: String,
    field: ParamField,
    width: f32,
) -> Option<Result<ControlEvent, crate::params::ParamError>> {
    let id = entry_id(field);
    if !ui.memory(|memory| memory.has_focus(id)) {
        buffer.clone_from(&shown);
    }
    let response = ui.add(egui::TextEdit::singleline(buffer).id(id).desired_width(width));
    if response.lost_focus() {
        commit_entry(field, buffer, &shown)
    } else {
        None
    }
}

/// Text still equal to the displayed value commits nothing.
fn commit_entry(
    field: ParamField,
    buffer: &str,
    shown: &str,
) -> Option<Result<ControlEvent, crate::params::ParamError>> {
    if buffer.trim() == shown {
        None
    } else {
        Some(ControlEvent::parse(field, buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::{commit_entry, entry_id, status_line, ControlPanel, PanelOutput, TextureStatus};
    use crate::params::{Color, ControlEvent, ParamError, ParamField, RenderParameters};

    /// Runs one egui frame, calling `before` inside the pass ahead of the panel.
    fn run_frame(
        ctx: &egui::Context,
        panel: &mut ControlPanel,
        params: &RenderParameters,
        input: egui::RawInput,
        before: impl Fn(&egui::Context),
    ) -> PanelOutput {
        let mut output = PanelOutput::default();
        let _ = ctx.run(input, |ctx| {
            before(ctx);
            let pass = panel.show(ctx, params, &TextureStatus::Idle);
            output.events.extend(pass.events);
            output.pick_texture |= pass.pick_texture;
        });
        output
    }

    fn run_headless(panel: &mut ControlPanel, params: &RenderParameters) -> PanelOutput {
        let ctx = egui::Context::default();
        run_frame(&ctx, panel, params, egui::RawInput::default(), |_| {})
    }

    fn enter_pressed() -> egui::RawInput {
        egui::RawInput {
            events: vec![egui::Event::Key {
                key: egui::Key::Enter,
                physical_key: None,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::NONE,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn untouched_panel_emits_nothing() {
        let mut panel = ControlPanel::new();
        let output = run_headless(&mut panel, &RenderParameters::default());
        assert!(output.events.is_empty());
        assert!(!output.pick_texture);
        assert_eq!(panel.glow_text, "0.0");
        assert_eq!(panel.intensity_text, "5");
        assert_eq!(panel.object_color_text, "#F8F8FF");
        assert_eq!(panel.light_color_text, "#ffffff");
    }

    #[test]
    fn focus_and_blur_without_typing_keeps_stored_value() {
        let params = RenderParameters {
            emissive_intensity: 0.75,
            ..RenderParameters::default()
        };
        let id = entry_id(ParamField::EmissiveIntensity);
        let ctx = egui::Context::default();
        let mut panel = ControlPanel::new();

        run_frame(&ctx, &mut panel, &params, egui::RawInput::default(), |_| {});
        let focused = run_frame(&ctx, &mut panel, &params, egui::RawInput::default(), |ctx| {
            ctx.memory_mut(|memory| memory.request_focus(id));
        });
        assert!(ctx.memory(|memory| memory.has_focus(id)));
        assert!(focused.events.is_empty());
        assert_eq!(panel.glow_text, "0.8");

        let blurred = run_frame(&ctx, &mut panel, &params, egui::RawInput::default(), |ctx| {
            ctx.memory_mut(|memory| memory.surrender_focus(id));
        });
        assert!(!ctx.memory(|memory| memory.has_focus(id)));
        assert!(blurred.events.is_empty());
        assert!(panel.input_error.is_none());
    }

    #[test]
    fn edited_entry_commits_on_enter() {
        let params = RenderParameters::default();
        let id = entry_id(ParamField::EmissiveIntensity);
        let ctx = egui::Context::default();
        let mut panel = ControlPanel::new();

        run_frame(&ctx, &mut panel, &params, egui::RawInput::default(), |_| {});
        run_frame(&ctx, &mut panel, &params, egui::RawInput::default(), |ctx| {
            ctx.memory_mut(|memory| memory.request_focus(id));
        });
        panel.glow_text = "0.25".to_string();

        let output = run_frame(&ctx, &mut panel, &params, enter_pressed(), |_| {});
        assert_eq!(output.events, vec![ControlEvent::SetEmissiveIntensity(0.25)]);
        assert!(!ctx.memory(|memory| memory.has_focus(id)));
    }

    #[test]
    fn only_edited_text_is_committed() {
        assert_eq!(commit_entry(ParamField::EmissiveIntensity, "0.8", "0.8"), None);
        assert_eq!(commit_entry(ParamField::EmissiveIntensity, " 0.8 ", "0.8"), None);
        assert_eq!(
            commit_entry(ParamField::EmissiveIntensity, "0.75", "0.8"),
            Some(Ok(ControlEvent::SetEmissiveIntensity(0.75)))
        );
        assert_eq!(
            commit_entry(ParamField::LightColor, "#ff8800", "#ffffff"),
            Some(Ok(ControlEvent::SetLightColor(Color::new("#ff8800"))))
        );
        assert!(matches!(
            commit_entry(ParamField::ObjectColor, "", "#F8F8FF"),
            Some(Err(ParamError::InvalidInput { field: "objectColor", .. }))
        ));
    }

    #[test]
    fn rejected_input_is_reported_not_emitted() {
        let mut panel = ControlPanel::new();
        let mut output = PanelOutput::default();
        panel.accept(
            Err(ParamError::InvalidInput {
                field: "lightIntensity",
                value: "bright".to_string(),
            }),
            &mut output,
        );
        assert!(output.events.is_empty());
        assert!(panel.input_error.as_deref().unwrap_or("").contains("bright"));

        panel.accept(Ok(ControlEvent::SetLightIntensity(3.0)), &mut output);
        assert_eq!(output.events, vec![ControlEvent::SetLightIntensity(3.0)]);
        assert!(panel.input_error.is_none());
    }

    #[test]
    fn status_lines() {
        assert_eq!(status_line(false, &TextureStatus::Idle), None);
        let applied = TextureStatus::Applied {
            name: "moon.png".to_string(),
            width: 64,
            height: 32,
            fingerprint: "0011223344556677".to_string(),
        };
        assert_eq!(
            status_line(true, &applied),
            Some(("moon.png 64x32 [0011223344556677]".to_string(), false))
        );
        assert_eq!(status_line(false, &applied), None);
        let failed = TextureStatus::Failed {
            name: "bad.png".to_string(),
            message: "unsupported".to_string(),
        };
        assert!(matches!(status_line(false, &failed), Some((_, true))));
    }
}
