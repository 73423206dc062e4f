use crate::router::{View, NAV_LINKS};
use crate::scene::ScenePhase;

/// Something the user asked for through the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    Navigate(&'static str),
    Retry,
}

/// Scene status shown on top of the 3D view
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStatus {
    pub phase: ScenePhase,
    pub progress: f32,
    pub error: Option<String>,
}

/// Inputs for one overlay pass
#[derive(Debug, Clone)]
pub struct Overlay<'a> {
    pub path: &'a str,
    pub view: View,
    pub scene: Option<SceneStatus>,
}

impl Overlay<'_> {
    /// Build the overlay, returning any actions triggered this frame
    pub fn show(&self, ctx: &egui::Context) -> Vec<UiAction> {
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Book Viewer");
                ui.separator();
                for (path, label) in NAV_LINKS {
                    if ui.selectable_label(self.path == *path, *label).clicked() {
                        actions.push(UiAction::Navigate(*path));
                    }
                }
            });
        });

        match self.view {
            View::About => about_page(ctx),
            View::NotFound => not_found_page(ctx, &mut actions),
            View::Scene => {
                if let Some(status) = &self.scene {
                    scene_status(ctx, status, &mut actions);
                }
            }
        }

        actions
    }
}

fn about_page(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("About");
        ui.label("An animated book you can walk around.");
        ui.add_space(8.0);
        ui.label("Drag with the left button to orbit, the right button to pan, and scroll to zoom.");
        ui.label("Arrow keys move the camera in steps of five units.");
        ui.label("The camera position is saved when you leave the scene.");
    });
}

fn not_found_page(ctx: &egui::Context, actions: &mut Vec<UiAction>) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Page not found");
        if ui.link("Go to the scene").clicked() {
            actions.push(UiAction::Navigate("/scene"));
        }
    });
}

// Areas, not panels: the scene underneath must keep receiving pointer input
fn scene_status(ctx: &egui::Context, status: &SceneStatus, actions: &mut Vec<UiAction>) {
    match status.phase {
        ScenePhase::LoadingState | ScenePhase::InitializingSurface | ScenePhase::LoadingAsset => {
            egui::Area::new(egui::Id::new("loading"))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .interactable(false)
                .show(ctx, |ui| {
                    ui.add(
                        egui::ProgressBar::new(status.progress / 100.0)
                            .desired_width(240.0)
                            .show_percentage(),
                    );
                });
        }
        ScenePhase::Failed => {
            egui::Window::new("Scene unavailable")
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(status.error.as_deref().unwrap_or("Unknown error"));
                    ui.add_space(8.0);
                    if ui.button("Retry").clicked() {
                        actions.push(UiAction::Retry);
                    }
                    ui.small("or press R");
                });
        }
        ScenePhase::Uninitialized | ScenePhase::Running | ScenePhase::Disposed => {}
    }
}
