use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::slider_bounds;
use crate::state::AppState;
use crate::ui::charts;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters and Options");
    ui.label("Explore Airbnb listings in SF!");
    ui.separator();

    let (neighborhoods, room_types, bounds) = match &state.dataset {
        Some(ds) => (ds.neighborhood_options(), ds.room_types.clone(), slider_bounds(ds)),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };
    let Some(filter) = state.filter.clone() else {
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Neighbourhood selector ----
            ui.strong("Select Neighborhood");
            let current = filter.neighborhood.label().to_string();
            let mut picked = None;
            egui::ComboBox::from_id_salt("neighborhood")
                .selected_text(&current)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in &neighborhoods {
                        if ui.selectable_label(current == *option, option).clicked() {
                            picked = Some(option.clone());
                        }
                    }
                });
            if let Some(option) = picked {
                state.set_neighborhood(&option);
            }
            ui.add_space(6.0);

            // ---- Room type selector (no "All") ----
            ui.strong("Select Room Type");
            let mut picked = None;
            egui::ComboBox::from_id_salt("room_type")
                .selected_text(&filter.room_type)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for room in &room_types {
                        if ui.selectable_label(filter.room_type == *room, room).clicked() {
                            picked = Some(room.clone());
                        }
                    }
                });
            if let Some(room) = picked {
                state.set_room_type(&room);
            }
            ui.add_space(6.0);

            // ---- Price range ----
            ui.strong("Select Price Range");
            if let Some((lo, hi)) = bounds {
                let (mut lower, mut upper) = filter.price_range;
                let mut changed = ui
                    .add(
                        egui::Slider::new(&mut lower, lo..=hi)
                            .integer()
                            .prefix("$")
                            .text("min"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut upper, lo..=hi)
                            .integer()
                            .prefix("$")
                            .text("max"),
                    )
                    .changed();
                if changed {
                    state.set_price_range(lower, upper);
                }
            }

            ui.separator();
            charts::room_type_legend(ui, state);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} match the filters",
                ds.len(),
                state.views.filtered.len()
            ));
            if ds.is_empty() {
                ui.weak("(no complete rows)");
            } else if ds.dropped > 0 {
                ui.weak(format!("({} incomplete rows skipped)", ds.dropped));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, &path);
    }
}

/// Load `path` into the state, reporting failure in the status line.
pub fn load_into(state: &mut AppState, path: &std::path::Path) {
    match crate::data::loader::load_file(path) {
        Ok(dataset) => state.set_dataset(dataset),
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", path.display());
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
