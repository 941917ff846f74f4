use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point, Polygon, Rgb,
};

use mediarisk::models::{EvidenceFilter, RiskBand, RiskProfile, Severity};

use super::{excerpt, truncate, EXCERPT_CHARS};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const COVER_HDR_H: f32 = 72.0;
const T_END: f32 = PAGE_W - MARGIN;

type Rgb3 = (f32, f32, f32);

const BG: Rgb3 = (1.00, 1.00, 1.00);
const PANEL: Rgb3 = (1.00, 1.00, 1.00);
const PANEL_ALT: Rgb3 = (0.95, 0.96, 0.99);
const PANEL_BORDER: Rgb3 = (0.85, 0.87, 0.92);
const ACCENT_NAVY: Rgb3 = (0.06, 0.09, 0.16);
const ACCENT_SLATE: Rgb3 = (0.20, 0.25, 0.38);
const TEXT_PRI: Rgb3 = (0.07, 0.08, 0.14);
const TEXT_SEC: Rgb3 = (0.36, 0.40, 0.52);
const TEXT_MUT: Rgb3 = (0.58, 0.63, 0.72);
const WHITE: Rgb3 = (1.00, 1.00, 1.00);
const WHITE_DIM: Rgb3 = (0.82, 0.86, 0.94);

const LOW_BG: Rgb3 = (0.82, 0.98, 0.90);
const LOW_FG: Rgb3 = (0.02, 0.37, 0.27);
const MED_BG: Rgb3 = (1.00, 0.95, 0.78);
const MED_FG: Rgb3 = (0.57, 0.25, 0.05);
const HIGH_BG: Rgb3 = (1.00, 0.89, 0.89);
const HIGH_FG: Rgb3 = (0.60, 0.11, 0.11);

const R_BADGE: f32 = 1.5;

/// Render a PDF risk report: cover with score and typologies, then the evidence table.
pub fn render(
    profile: &RiskProfile,
    display_name: Option<&str>,
    filter: &EvidenceFilter,
    output_path: &Path,
) -> Result<()> {
    let doc = PdfDocument::empty("Adverse Media Risk Report");

    add_cover_page(&doc, profile, display_name)?;
    add_evidence_pages(&doc, profile, filter)?;

    let bytes = doc.save_to_bytes()?;
    std::fs::write(output_path, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", output_path.display()))?;

    println!("PDF report written to: {}", output_path.display());
    Ok(())
}

fn severity_colors(severity: Severity) -> (Rgb3, Rgb3) {
    match severity {
        Severity::High => (HIGH_FG, HIGH_BG),
        Severity::Medium => (MED_FG, MED_BG),
        Severity::Low => (LOW_FG, LOW_BG),
    }
}

fn band_color(band: RiskBand) -> Rgb3 {
    match band {
        RiskBand::High => HIGH_FG,
        RiskBand::Medium => MED_FG,
        RiskBand::Low => LOW_FG,
    }
}

// ── Cover page ────────────────────────────────────────────────────────────────

fn add_cover_page(
    doc: &PdfDocumentReference,
    profile: &RiskProfile,
    display_name: Option<&str>,
) -> Result<()> {
    let (page_idx, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Profile");
    let layer = doc.get_page(page_idx).get_layer(layer_idx);

    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
    let hdr_bot = PAGE_H - COVER_HDR_H;
    fill_gradient_h(&layer, 0.0, hdr_bot, PAGE_W, COVER_HDR_H, ACCENT_NAVY, ACCENT_SLATE, 28);

    set_color(&layer, WHITE_DIM);
    layer.use_text(
        format!("mediarisk v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(PAGE_W - MARGIN - 30.0), Mm(PAGE_H - 10.5), &font_r,
    );
    set_color(&layer, WHITE);
    layer.use_text("Adverse Media", 28.0, Mm(MARGIN), Mm(PAGE_H - 26.0), &font_b);
    set_color(&layer, WHITE_DIM);
    layer.use_text("Risk Profile", 28.0, Mm(MARGIN), Mm(PAGE_H - 41.0), &font_b);

    // Entity chip
    let chip_y = hdr_bot - 18.0;
    let chip_h = 12.0f32;
    let chip_w = 120.0f32;
    fill_rounded_rect(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL);
    stroke_rounded_rect(&layer, MARGIN, chip_y, chip_w, chip_h, R_BADGE, PANEL_BORDER);
    fill_rect(&layer, MARGIN, chip_y, 2.5, chip_h, band_color(profile.band()));

    set_color(&layer, TEXT_MUT);
    layer.use_text("ENTITY", 6.0, Mm(MARGIN + 5.0), Mm(chip_y + chip_h - 3.8), &font_b);
    set_color(&layer, TEXT_PRI);
    let entity_label = match display_name {
        Some(name) => format!("{} ({})", name, profile.entity),
        None => profile.entity.to_string(),
    };
    layer.use_text(truncate(&entity_label, 52), 9.5, Mm(MARGIN + 5.0), Mm(chip_y + 2.8), &font_b);

    set_color(&layer, TEXT_SEC);
    layer.use_text(
        format!("Assessed  {}", Utc::now().format("%Y-%m-%d")),
        9.0, Mm(MARGIN), Mm(chip_y - 8.0), &font_r,
    );

    // Stat cards
    let rule_y = chip_y - 16.5;
    draw_hline(&layer, MARGIN, T_END, rule_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("OVERVIEW", 6.5, Mm(MARGIN), Mm(rule_y - 7.0), &font_b);

    let card_y = rule_y - 42.0;
    let card_h = 26.0f32;
    let gap = 4.0f32;
    let card_w = (T_END - MARGIN - gap * 3.0) / 4.0;
    let relevant = profile.non_neutral_evidence().count();

    let cards: [(&str, String, Rgb3); 4] = [
        ("RISK SCORE", format!("{:.0}", profile.score), band_color(profile.band())),
        ("BAND", profile.band().to_string(), band_color(profile.band())),
        ("RELEVANT", relevant.to_string(), ACCENT_SLATE),
        ("ARTICLES", profile.evidence.len().to_string(), ACCENT_SLATE),
    ];
    for (i, (label, value, accent)) in cards.iter().enumerate() {
        let cx = MARGIN + (card_w + gap) * i as f32;
        draw_stat_card(&layer, cx, card_y, card_w, card_h, label, value, *accent, &font_r, &font_b);
    }

    // Typology bars
    let section_y = card_y - 13.0;
    draw_hline(&layer, MARGIN, T_END, section_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("RISK TYPOLOGIES", 6.5, Mm(MARGIN), Mm(section_y - 7.5), &font_b);

    let max_weight = profile
        .top_typologies
        .iter()
        .map(|t| t.weight)
        .fold(0.0f64, f64::max);
    let bar_x = MARGIN + 42.0;
    let bar_max_w = T_END - bar_x - 16.0;
    let mut y = section_y - 16.0;

    if profile.top_typologies.is_empty() {
        set_color(&layer, TEXT_SEC);
        layer.use_text("No risk typologies detected.", 9.0, Mm(MARGIN), Mm(y), &font_r);
        y -= 9.0;
    }
    for tw in &profile.top_typologies {
        let (fg, bg) = severity_colors(tw.typology.severity());
        set_color(&layer, TEXT_PRI);
        layer.use_text(tw.typology.to_string(), 8.5, Mm(MARGIN), Mm(y + 0.8), &font_b);

        fill_rounded_rect(&layer, bar_x, y, bar_max_w, 4.5, R_BADGE, bg);
        let w = if max_weight > 0.0 {
            (tw.weight / max_weight) as f32 * bar_max_w
        } else {
            0.0
        };
        fill_rounded_rect(&layer, bar_x, y, w.max(1.0), 4.5, R_BADGE, fg);

        set_color(&layer, TEXT_SEC);
        layer.use_text(format!("{:.2}", tw.weight), 8.0, Mm(T_END - 12.0), Mm(y + 0.8), &font_r);
        y -= 9.0;
    }

    // Score breakdown
    let b = &profile.breakdown;
    let bd_y = y - 6.0;
    draw_hline(&layer, MARGIN, T_END, bd_y, PANEL_BORDER);
    set_color(&layer, TEXT_MUT);
    layer.use_text("SCORE BREAKDOWN", 6.5, Mm(MARGIN), Mm(bd_y - 7.5), &font_b);
    let lines = [
        format!("Average confidence  {:.3}  x 0.5", b.avg_confidence),
        format!(
            "Volume  {:.3}  (ln({} + 1) = {:.3})  x 0.3",
            b.volume_score, b.non_neutral_count, b.volume_term
        ),
        format!("Recency  {:.3}  x 0.2", b.recency_score),
    ];
    set_color(&layer, TEXT_SEC);
    for (j, line) in lines.iter().enumerate() {
        layer.use_text(line.as_str(), 8.5, Mm(MARGIN), Mm(bd_y - 15.0 - j as f32 * 6.0), &font_r);
    }

    set_color(&layer, TEXT_PRI);
    for (j, line) in wrap_text(&profile.summary(), 90).iter().enumerate() {
        layer.use_text(line.as_str(), 9.0, Mm(MARGIN), Mm(bd_y - 40.0 - j as f32 * 5.0), &font_b);
    }

    draw_footer(&layer, &font_r);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_stat_card(
    layer: &PdfLayerReference,
    x: f32, y: f32, w: f32, h: f32,
    label: &str,
    value: &str,
    accent: Rgb3,
    font_r: &IndirectFontRef,
    font_b: &IndirectFontRef,
) {
    fill_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL);
    stroke_rounded_rect(layer, x, y, w, h, R_BADGE, PANEL_BORDER);
    fill_rect(layer, x, y + h - 2.0, w, 2.0, accent);

    set_color(layer, accent);
    layer.use_text(value, 20.0, Mm(x + 5.0), Mm(y + h * 0.38), font_b);
    set_color(layer, TEXT_MUT);
    layer.use_text(label, 6.5, Mm(x + 5.0), Mm(y + 3.5), font_r);
}

fn draw_footer(layer: &PdfLayerReference, font_r: &IndirectFontRef) {
    draw_hline(layer, MARGIN, T_END, 22.0, PANEL_BORDER);
    set_color(layer, TEXT_MUT);
    layer.use_text(
        format!("Generated by mediarisk v{}", env!("CARGO_PKG_VERSION")),
        7.5, Mm(MARGIN), Mm(15.0), font_r,
    );
}

// ── Evidence table pages ──────────────────────────────────────────────────────

fn add_evidence_pages(
    doc: &PdfDocumentReference,
    profile: &RiskProfile,
    filter: &EvidenceFilter,
) -> Result<()> {
    let font_b = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let font_r = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    const BASE_ROW_H: f32 = 7.0;
    const EXTRA_LINE_H: f32 = 3.5;
    const HDR_Y: f32 = 268.5;
    const FIRST_Y: f32 = 259.5;
    const BOT_MARGIN: f32 = 25.0;
    const HEADLINE_WRAP: usize = 48;
    const EXCERPT_WRAP: usize = 58;

    //  HEADLINE   SOURCE     DATE       TYPOLOGY   CONF
    //  18…98      98…128     128…148    148…178    178…192  (mm)
    let col_x = [MARGIN, MARGIN + 80.0, MARGIN + 110.0, MARGIN + 130.0, MARGIN + 162.0];
    let headers = ["HEADLINE", "SOURCE", "DATE", "TYPOLOGY", "CONF"];

    let rows: Vec<_> = profile
        .filtered_evidence(filter)
        .map(|item| {
            let lines = wrap_text(&item.snippet.headline, HEADLINE_WRAP);
            let body = excerpt(&item.snippet.body_text, EXCERPT_CHARS);
            let body_lines = if body.is_empty() { Vec::new() } else { wrap_text(&body, EXCERPT_WRAP) };
            let extra = lines.len().saturating_sub(1) + body_lines.len();
            let h = BASE_ROW_H + extra as f32 * EXTRA_LINE_H;
            (item, lines, body_lines, h)
        })
        .collect();

    let mut cur_y = FIRST_Y;
    let mut page_state: Option<(PdfPageIndex, PdfLayerIndex)> = None;
    let mut page_num: u32 = 0;

    for (row_idx, (item, headline_lines, body_lines, row_h)) in rows.iter().enumerate() {
        let row_h = *row_h;

        let (pi, li) = match page_state {
            Some(state) if cur_y - row_h >= BOT_MARGIN => state,
            _ => {
                page_num += 1;
                let (pi, li) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Evidence");
                let layer = doc.get_page(pi).get_layer(li);

                fill_rect(&layer, 0.0, 0.0, PAGE_W, PAGE_H, BG);
                fill_gradient_h(&layer, 0.0, PAGE_H - 2.5, PAGE_W, 2.5, ACCENT_NAVY, ACCENT_SLATE, 21);

                set_color(&layer, TEXT_PRI);
                layer.use_text(
                    truncate(&format!("Audit Trail: {}", profile.entity), 46),
                    14.0, Mm(MARGIN), Mm(282.5), &font_b,
                );
                set_color(&layer, TEXT_MUT);
                layer.use_text(format!("Page {}", page_num), 8.0, Mm(T_END - 14.0), Mm(283.0), &font_r);
                draw_hline(&layer, MARGIN, T_END, 277.5, PANEL_BORDER);

                fill_rounded_rect(&layer, MARGIN, HDR_Y - 7.5, T_END - MARGIN, 9.5, R_BADGE, PANEL);
                stroke_rounded_rect(&layer, MARGIN, HDR_Y - 7.5, T_END - MARGIN, 9.5, R_BADGE, PANEL_BORDER);
                set_color(&layer, TEXT_MUT);
                for (i, h) in headers.iter().enumerate() {
                    layer.use_text(*h, 7.0, Mm(col_x[i] + 1.5), Mm(HDR_Y - 4.0), &font_b);
                }
                draw_footer(&layer, &font_r);

                cur_y = FIRST_Y;
                page_state = Some((pi, li));
                (pi, li)
            }
        };
        let layer = doc.get_page(pi).get_layer(li);

        if row_idx % 2 == 0 {
            fill_rect(&layer, MARGIN, cur_y - row_h + 1.5, T_END - MARGIN, row_h, PANEL_ALT);
        }

        let text_y = cur_y - 4.0;
        set_color(&layer, TEXT_PRI);
        for (j, line) in headline_lines.iter().enumerate() {
            let line_y = text_y - j as f32 * EXTRA_LINE_H;
            layer.use_text(line.as_str(), 8.0, Mm(col_x[0] + 1.5), Mm(line_y), &font_r);
        }
        set_color(&layer, TEXT_SEC);
        for (j, line) in body_lines.iter().enumerate() {
            let line_y = text_y - (headline_lines.len() + j) as f32 * EXTRA_LINE_H;
            layer.use_text(line.as_str(), 6.5, Mm(col_x[0] + 1.5), Mm(line_y), &font_r);
        }

        set_color(&layer, TEXT_SEC);
        layer.use_text(
            truncate(item.snippet.source.as_deref().unwrap_or("-"), 16),
            8.0, Mm(col_x[1] + 1.5), Mm(text_y), &font_r,
        );
        let date = item
            .snippet
            .published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        layer.use_text(date, 8.0, Mm(col_x[2] + 1.5), Mm(text_y), &font_r);

        let (fg, bg) = severity_colors(item.typology.severity());
        let badge_y = cur_y - row_h + 2.2;
        fill_rounded_rect(&layer, col_x[3] + 1.0, badge_y, 30.0, 4.8, R_BADGE, bg);
        set_color(&layer, fg);
        layer.use_text(
            truncate(&item.typology.to_string().to_uppercase(), 18),
            6.5, Mm(col_x[3] + 2.5), Mm(badge_y + 1.3), &font_b,
        );

        set_color(&layer, TEXT_PRI);
        layer.use_text(
            format!("{:.0}%", item.confidence * 100.0),
            8.0, Mm(col_x[4] + 1.5), Mm(text_y), &font_b,
        );

        draw_hline(&layer, MARGIN, T_END, cur_y - row_h + 1.5, PANEL_BORDER);
        cur_y -= row_h;
    }

    Ok(())
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

fn rgb((r, g, b): Rgb3) -> Color {
    Color::Rgb(Rgb { r, g, b, icc_profile: None })
}

fn set_color(layer: &PdfLayerReference, color: Rgb3) {
    layer.set_fill_color(rgb(color));
}

fn fill_polygon(layer: &PdfLayerReference, ring: Vec<(Point, bool)>, color: Rgb3) {
    layer.set_fill_color(rgb(color));
    layer.add_polygon(Polygon {
        rings: vec![ring],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, color: Rgb3) {
    let ring = vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y)), false),
        (Point::new(Mm(x + w), Mm(y + h)), false),
        (Point::new(Mm(x), Mm(y + h)), false),
    ];
    fill_polygon(layer, ring, color);
}

/// Clockwise ring approximating a rounded rectangle, 8 segments per corner.
fn rounded_rect_ring(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<(Point, bool)> {
    const SEGS: usize = 8;
    let r = r.min(w / 2.0).min(h / 2.0);
    let corners = [
        (x + w - r, y + r, 270.0f32, 360.0f32),
        (x + w - r, y + h - r, 0.0, 90.0),
        (x + r, y + h - r, 90.0, 180.0),
        (x + r, y + r, 180.0, 270.0),
    ];

    corners
        .iter()
        .flat_map(|&(cx, cy, start, end)| {
            (0..=SEGS).map(move |i| {
                let angle = (start + (end - start) * i as f32 / SEGS as f32).to_radians();
                (Point::new(Mm(cx + r * angle.cos()), Mm(cy + r * angle.sin())), false)
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn fill_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgb3) {
    fill_polygon(layer, rounded_rect_ring(x, y, w, h, r), color);
}

#[allow(clippy::too_many_arguments)]
fn stroke_rounded_rect(layer: &PdfLayerReference, x: f32, y: f32, w: f32, h: f32, r: f32, color: Rgb3) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.4);
    layer.add_polygon(Polygon {
        rings: vec![rounded_rect_ring(x, y, w, h, r)],
        mode: PaintMode::Stroke,
        winding_order: WindingOrder::NonZero,
    });
    layer.set_outline_color(rgb((0.0, 0.0, 0.0)));
    layer.set_outline_thickness(1.0);
}

fn draw_hline(layer: &PdfLayerReference, x1: f32, x2: f32, y: f32, color: Rgb3) {
    layer.set_outline_color(rgb(color));
    layer.set_outline_thickness(0.3);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(x1), Mm(y)), false),
            (Point::new(Mm(x2), Mm(y)), false),
        ],
        is_closed: false,
    });
    layer.set_outline_color(rgb((0.0, 0.0, 0.0)));
    layer.set_outline_thickness(1.0);
}

/// Left-to-right gradient drawn as `steps` overlapping vertical strips.
#[allow(clippy::too_many_arguments)]
fn fill_gradient_h(
    layer: &PdfLayerReference,
    x: f32, y: f32, w: f32, h: f32,
    from: Rgb3,
    to: Rgb3,
    steps: usize,
) {
    let step_w = w / steps as f32;
    for i in 0..steps {
        let t = i as f32 / (steps - 1).max(1) as f32;
        let color = (
            from.0 + (to.0 - from.0) * t,
            from.1 + (to.1 - from.1) * t,
            from.2 + (to.2 - from.2) * t,
        );
        fill_rect(layer, x + i as f32 * step_w, y, step_w + 0.6, h, color);
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("short", 10), vec!["short"]);
        assert_eq!(
            wrap_text("Northstar linked to trade blacklist", 16),
            vec!["Northstar linked", "to trade", "blacklist"]
        );
    }
}
