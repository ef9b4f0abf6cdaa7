// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The Vault page: search bar with filter menu, the resource card grid
//! and the upload dialog.

use crate::io::media::{self, LoadedImage};
use crate::models::resource::{Resource, ResourceType, UploadDraft, Visibility};
use crate::util::task::TaskSlot;
use crate::vault::{FilterMode, Vault};
use std::collections::HashMap;
use std::path::PathBuf;

const COLUMNS: usize = 3;
const CARD_HEIGHT: f32 = 230.0;
const EMPTY_TEXT: &str = "No resources found. Try a different search key or upload new content.";

/// What the user did on the page this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum VaultAction {
    None,
    Upload(UploadDraft),
    Upvote(String),
    Delete(String),
    Import(PathBuf),
    Export(PathBuf),
}

/// Cards at these positions (mod 7) take two columns.
pub fn card_span(idx: usize) -> usize {
    if idx % 7 == 1 || idx % 7 == 5 {
        2
    } else {
        1
    }
}

/// Pack `count` cards into rows of `COLUMNS`, as `(index, span)` pairs.
/// A card that does not fit the remaining width starts a new row.
pub fn layout_rows(count: usize) -> Vec<Vec<(usize, usize)>> {
    let mut rows: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut used = COLUMNS;
    for idx in 0..count {
        let span = card_span(idx);
        if used + span > COLUMNS {
            rows.push(Vec::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push((idx, span));
        }
        used += span;
    }
    rows
}

enum Thumb {
    Loading(TaskSlot<Result<LoadedImage, String>>),
    Ready(egui::TextureHandle),
    Failed,
}

/// Card thumbnails, fetched once in the background and kept as textures.
struct Thumbnails {
    client: reqwest::blocking::Client,
    entries: HashMap<String, Thumb>,
}

impl Thumbnails {
    fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, ctx: &egui::Context, url: &str) -> Option<&egui::TextureHandle> {
        let client = self.client.clone();
        let entry = self.entries.entry(url.to_string()).or_insert_with(|| {
            let mut slot = TaskSlot::default();
            let source = url.to_string();
            slot.spawn(move || {
                let result = if source.starts_with("http://") || source.starts_with("https://") {
                    media::fetch_image(&client, &source)
                } else {
                    media::load_image(std::path::Path::new(&source))
                };
                result.map_err(|e| e.to_string())
            });
            Thumb::Loading(slot)
        });

        if let Thumb::Loading(slot) = entry {
            match slot.poll() {
                Some(Ok(image)) => {
                    let size = [image.width as usize, image.height as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
                    *entry = Thumb::Ready(ctx.load_texture(
                        format!("thumb_{url}"),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                Some(Err(e)) => {
                    log::warn!("Thumbnail {} unavailable: {}", url, e);
                    *entry = Thumb::Failed;
                }
                None if slot.is_pending() => ctx.request_repaint(),
                None => *entry = Thumb::Failed,
            }
        }

        match entry {
            Thumb::Ready(texture) => Some(&*texture),
            _ => None,
        }
    }
}

pub struct VaultPage {
    pub query: String,
    pub mode: FilterMode,
    /// Open upload dialog and its contents.
    pub draft: Option<UploadDraft>,
    pub status: Option<String>,
    thumbnails: Thumbnails,
}

impl Default for VaultPage {
    fn default() -> Self {
        Self {
            query: String::new(),
            mode: FilterMode::All,
            draft: None,
            status: None,
            thumbnails: Thumbnails::new(),
        }
    }
}

fn type_icon(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::Pdf => "📄",
        ResourceType::Image => "🖼",
        ResourceType::Link => "🔗",
    }
}

pub fn show(ctx: &egui::Context, ui: &mut egui::Ui, page: &mut VaultPage, vault: &Vault) -> VaultAction {
    let mut action = VaultAction::None;

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading(egui::RichText::new("The Vault").size(30.0).strong());
            ui.label(egui::RichText::new("Manage your documents, images, and links.").weak());
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("➕ Upload Resource").clicked() {
                page.draft = Some(UploadDraft::default());
            }
            ui.menu_button("⋯", |ui| {
                if ui.button("Import...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Vault", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        action = VaultAction::Import(path);
                    }
                    ui.close_menu();
                }
                ui.menu_button("Export", |ui| {
                    for (label, ext, name) in [
                        ("Export as YAML...", "yaml", "vault.yaml"),
                        ("Export as JSON...", "json", "vault.json"),
                    ] {
                        if ui.button(label).clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter(ext.to_uppercase(), &[ext])
                                .set_file_name(name)
                                .save_file()
                            {
                                action = VaultAction::Export(path);
                            }
                            ui.close_menu();
                        }
                    }
                });
            });
        });
    });
    ui.add_space(16.0);

    search_bar(ui, page);
    if let Some(status) = &page.status {
        ui.add_space(6.0);
        ui.colored_label(ui.visuals().warn_fg_color, status);
    }
    ui.add_space(16.0);

    let visible = vault.filtered(&page.query, page.mode);
    if visible.is_empty() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(EMPTY_TEXT).weak());
        });
    } else {
        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            let spacing = 12.0;
            let unit = (ui.available_width() - spacing * (COLUMNS as f32 - 1.0)) / COLUMNS as f32;
            for row in layout_rows(visible.len()) {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = spacing;
                    for (idx, span) in row {
                        let width = unit * span as f32 + spacing * (span as f32 - 1.0);
                        let resource = visible[idx];
                        ui.allocate_ui(egui::vec2(width, CARD_HEIGHT), |ui| {
                            if let Some(card_action) = card(ctx, ui, &mut page.thumbnails, resource, width) {
                                action = card_action;
                            }
                        });
                    }
                });
                ui.add_space(spacing);
            }
        });
    }

    if let Some(upload) = upload_dialog(ctx, page) {
        action = VaultAction::Upload(upload);
    }

    action
}

fn search_bar(ui: &mut egui::Ui, page: &mut VaultPage) {
    ui.horizontal(|ui| {
        ui.label("🔍");
        ui.add(
            egui::TextEdit::singleline(&mut page.query)
                .hint_text(page.mode.placeholder())
                .desired_width(ui.available_width() - 120.0),
        );
        egui::ComboBox::from_id_source("vault_filter")
            .selected_text(page.mode.label())
            .width(100.0)
            .show_ui(ui, |ui| {
                for mode in FilterMode::ALL {
                    ui.selectable_value(&mut page.mode, mode, mode.label());
                }
            });
    });
}

fn card(
    ctx: &egui::Context,
    ui: &mut egui::Ui,
    thumbnails: &mut Thumbnails,
    resource: &Resource,
    width: f32,
) -> Option<VaultAction> {
    let mut action = None;
    egui::Frame::group(ui.style())
        .rounding(16.0)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_width(width - 34.0);
            ui.set_min_height(CARD_HEIGHT - 34.0);

            if let Some(texture) = resource.thumbnail.as_deref().and_then(|url| thumbnails.get(ctx, url)) {
                let size = texture.size_vec2();
                let height = 80.0;
                let scaled = egui::vec2((size.x * height / size.y.max(1.0)).min(ui.available_width()), height);
                ui.add(egui::Image::new((texture.id(), scaled)).rounding(8.0));
            }

            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(type_icon(resource.resource_type)).size(20.0));
                let badge = match resource.visibility {
                    Visibility::Public => "🌐 Public",
                    Visibility::Private => "🔒 Private",
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                        action = Some(VaultAction::Delete(resource.id.clone()));
                    }
                    ui.label(egui::RichText::new(badge).small().weak());
                });
            });

            let title = egui::RichText::new(&resource.title).size(18.0).strong();
            if resource.url != "#" {
                if ui.link(title).on_hover_text(&resource.url).clicked() {
                    ctx.open_url(egui::OpenUrl::new_tab(&resource.url));
                }
            } else {
                ui.label(title);
            }
            ui.label(egui::RichText::new(&resource.description).weak());
            if let Some(module) = &resource.module {
                ui.label(egui::RichText::new(format!("Module: {module}")).small());
            }

            ui.horizontal_wrapped(|ui| {
                for tag in resource.badge_tags() {
                    ui.label(egui::RichText::new(format!("#{tag}")).small().monospace());
                }
            });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&resource.author).small().weak());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button(format!("⬆ {}", resource.upvotes)).clicked() {
                            action = Some(VaultAction::Upvote(resource.id.clone()));
                        }
                    });
                });
            });
        });
    action
}

/// Draw the upload dialog if it is open. Returns the draft when submitted.
fn upload_dialog(ctx: &egui::Context, page: &mut VaultPage) -> Option<UploadDraft> {
    let mut open = page.draft.is_some();
    let mut submitted = false;
    let mut cancelled = false;

    if let Some(draft) = page.draft.as_mut() {
        egui::Window::new("Upload to Vault")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .default_width(440.0)
            .show(ctx, |ui| {
                ui.label("Type");
                ui.horizontal(|ui| {
                    for kind in ResourceType::ALL {
                        ui.radio_value(&mut draft.resource_type, kind, kind.to_string());
                    }
                });
                ui.add_space(6.0);

                ui.label("Visibility");
                ui.horizontal(|ui| {
                    ui.radio_value(&mut draft.visibility, Visibility::Public, "Public");
                    ui.radio_value(&mut draft.visibility, Visibility::Private, "Private");
                });
                ui.add_space(6.0);

                ui.label("Title");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.title)
                        .hint_text("e.g. Calculus Notes")
                        .desired_width(f32::INFINITY),
                );
                ui.label("Description");
                ui.add(
                    egui::TextEdit::multiline(&mut draft.description)
                        .hint_text("Brief description...")
                        .desired_rows(3)
                        .desired_width(f32::INFINITY),
                );
                ui.label("Tags");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.tags)
                        .hint_text("Math, Calculus, Finals (comma separated)")
                        .desired_width(f32::INFINITY),
                );
                ui.label("Module");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.module)
                        .hint_text("Optional")
                        .desired_width(f32::INFINITY),
                );

                ui.label(if draft.resource_type == ResourceType::Link { "URL" } else { "File" });
                ui.horizontal(|ui| {
                    let hint = if draft.resource_type == ResourceType::Link {
                        "https://..."
                    } else {
                        "Path or URL"
                    };
                    ui.add(egui::TextEdit::singleline(&mut draft.url).hint_text(hint).desired_width(300.0));
                    if draft.resource_type != ResourceType::Link && ui.button("Browse...").clicked() {
                        let extensions: &[&str] = match draft.resource_type {
                            ResourceType::Pdf => &["pdf"],
                            _ => &["png", "jpg", "jpeg", "gif", "webp"],
                        };
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter(draft.resource_type.to_string(), extensions)
                            .pick_file()
                        {
                            draft.url = path.display().to_string();
                        }
                    }
                });

                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_enabled(draft.is_submittable(), egui::Button::new("Upload")).clicked() {
                        submitted = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
    }

    if submitted {
        return page.draft.take();
    }
    if cancelled || !open {
        page.draft = None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_pattern() {
        let spans: Vec<usize> = (0..8).map(card_span).collect();
        assert_eq!(spans, vec![1, 2, 1, 1, 1, 2, 1, 1]);
    }

    #[test]
    fn test_rows_never_overflow() {
        for count in 0..30 {
            let rows = layout_rows(count);
            let placed: Vec<usize> = rows.iter().flatten().map(|&(idx, _)| idx).collect();
            assert_eq!(placed, (0..count).collect::<Vec<_>>());
            for row in &rows {
                assert!(row.iter().map(|&(_, span)| span).sum::<usize>() <= COLUMNS);
            }
        }
    }

    #[test]
    fn test_seed_layout() {
        let rows = layout_rows(7);
        assert_eq!(rows[0], vec![(0, 1), (1, 2)]);
        assert_eq!(rows[1], vec![(2, 1), (3, 1), (4, 1)]);
        assert_eq!(rows[2], vec![(5, 2), (6, 1)]);
    }
}
