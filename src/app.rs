use std::time::Duration;

use eframe::egui::{self, ScrollArea, Ui};

use crate::data::boundary::BoundaryStatus;
use crate::state::AppState;
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep repainting until the boundary download settles.
        if matches!(self.state.boundaries.poll(), BoundaryStatus::Pending) {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a listings file to begin  (File → Open…)");
                });
                return;
            }

            let state = &self.state;
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading("San Francisco Airbnb Listings Dashboard");
                    ui.separator();

                    ui.columns(2, |cols| {
                        charts::price_by_neighborhood_chart(&mut cols[0], state);
                        charts::availability_revenue_chart(&mut cols[1], state);
                    });
                    ui.add_space(12.0);
                    charts::reviews_revenue_chart(ui, state);
                    ui.add_space(12.0);
                    charts::listings_map(ui, state);
                });
        });
    }
}
