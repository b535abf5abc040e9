//! レポート HTML の組み立て

use super::script;
use crate::render::PlaneSnapshots;
use fetal_qc_common::ManifestRow;

/// 評価フォームのアーチファクト項目 (value, 表示名)
pub const ARTEFACTS: &[(&str, &str)] = &[
    ("motion", "Motion"),
    ("bias_field", "Bias field"),
    ("signal_dropout", "Signal dropout"),
    ("aliasing", "Aliasing"),
    ("mask_error", "Mask error"),
];

/// 評価スコアの範囲（0〜4）
const SCORE_LEVELS: std::ops::RangeInclusive<u8> = 0..=4;

const STYLE: &str = r#"<style>
  body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 0; background: #111; color: #eee; }
  header { padding: 1rem 2rem; border-bottom: 1px solid #333; display: flex; justify-content: space-between; align-items: center; }
  main { padding: 1rem 2rem; }
  table.meta { border-collapse: collapse; margin-bottom: 1rem; }
  table.meta th, table.meta td { border: 1px solid #333; padding: 0.25rem 0.75rem; text-align: left; }
  .gallery { display: flex; flex-wrap: wrap; gap: 4px; margin-bottom: 1.5rem; }
  .gallery figure { margin: 0; }
  .gallery figcaption { font-size: 0.75rem; color: #999; text-align: center; }
  .gallery img.overlay { display: none; }
  body.show-overlay .gallery img.overlay { display: block; }
  body.show-overlay .gallery img.plain { display: none; }
  form.rating fieldset { border: 1px solid #333; margin-bottom: 0.75rem; }
  form.rating textarea { width: 100%; min-height: 5rem; }
  #qc-nav a { margin-left: 1rem; color: #6af; }
  #rating-status { margin-left: 1rem; color: #8c8; }
</style>
"#;

const REPORT_SCRIPT: &str = r#"<script>
(function () {
  var name = document.body.getAttribute("data-report");
  var key = "fetal-qc:rating:" + name;

  function collect(form) {
    var artefacts = [];
    form.querySelectorAll("input[name=artefact]:checked").forEach(function (el) { artefacts.push(el.value); });
    var quality = form.querySelector("input[name=quality]:checked");
    var mask = form.querySelector("input[name=mask]:checked");
    return {
      report: name,
      quality: quality ? Number(quality.value) : null,
      mask: mask ? Number(mask.value) : null,
      artefacts: artefacts,
      comments: form.comments.value,
      saved_at: new Date().toISOString()
    };
  }

  function restore(form, rating) {
    if (rating.quality !== null) {
      var q = form.querySelector("input[name=quality][value='" + rating.quality + "']");
      if (q) { q.checked = true; }
    }
    if (rating.mask !== null) {
      var m = form.querySelector("input[name=mask][value='" + rating.mask + "']");
      if (m) { m.checked = true; }
    }
    (rating.artefacts || []).forEach(function (value) {
      var a = form.querySelector("input[name=artefact][value='" + value + "']");
      if (a) { a.checked = true; }
    });
    form.comments.value = rating.comments || "";
  }

  document.addEventListener("DOMContentLoaded", function () {
    var toggle = document.getElementById("overlay-toggle");
    toggle.addEventListener("change", function () {
      document.body.classList.toggle("show-overlay", toggle.checked);
    });

    var form = document.getElementById("rating-form");
    var status = document.getElementById("rating-status");
    try {
      var saved = JSON.parse(localStorage.getItem(key) || "null");
      if (saved) { restore(form, saved); status.textContent = "saved " + saved.saved_at; }
    } catch (e) {}

    form.addEventListener("submit", function (ev) {
      ev.preventDefault();
      var rating = collect(form);
      localStorage.setItem(key, JSON.stringify(rating));
      status.textContent = "saved " + rating.saved_at;
    });

    document.getElementById("rating-download").addEventListener("click", function () {
      var rating = collect(form);
      var blob = new Blob([JSON.stringify(rating, null, 2)], { type: "application/json" });
      var a = document.createElement("a");
      a.href = URL.createObjectURL(blob);
      a.download = name + "_rating.json";
      a.click();
      URL.revokeObjectURL(a.href);
    });
  });
})();
</script>
"#;

/// レポート1件分の表示内容
pub struct ReportPage<'a> {
    pub row: &'a ManifestRow,
    pub shape: [usize; 3],
    pub voxel_mm: [f32; 3],
    pub mask_volume_ml: f64,
    pub planes: &'a [PlaneSnapshots],
    /// ナビゲーションスクリプトを埋め込む
    pub add_js: bool,
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn meta_row(html: &mut String, label: &str, value: &str) {
    html.push_str(&format!(
        "      <tr><th>{}</th><td>{}</td></tr>\n",
        label,
        escape_html(value)
    ));
}

fn build_metadata(page: &ReportPage, html: &mut String) {
    let s = &page.row.series;
    html.push_str("    <table class=\"meta\">\n");
    meta_row(html, "Report", &page.row.display_name());
    // 匿名化時は実IDとパスを出さない
    if !page.row.is_anonymized() {
        meta_row(html, "Subject", &s.subject);
        for (label, value) in [
            ("Session", &s.session),
            ("Acquisition", &s.acquisition),
            ("Run", &s.run),
        ] {
            if let Some(v) = value {
                meta_row(html, label, v);
            }
        }
        meta_row(html, "Image", &s.path.display().to_string());
        meta_row(html, "Mask", &page.row.mask.display().to_string());
    }
    let [x, y, z] = page.shape;
    meta_row(html, "Dimensions", &format!("{} × {} × {}", x, y, z));
    let [vx, vy, vz] = page.voxel_mm;
    meta_row(
        html,
        "Voxel size (mm)",
        &format!("{:.2} × {:.2} × {:.2}", vx, vy, vz),
    );
    meta_row(html, "Mask volume (mL)", &format!("{:.1}", page.mask_volume_ml));
    html.push_str("    </table>\n");
}

fn build_galleries(page: &ReportPage, html: &mut String) {
    for plane in page.planes {
        html.push_str(&format!(
            "    <h2>{}</h2>\n    <div class=\"gallery\" id=\"{}\">\n",
            plane.plane.display_name(),
            plane.plane.name()
        ));
        for snap in &plane.snapshots {
            html.push_str("      <figure>\n");
            html.push_str(&format!(
                "        <img class=\"plain\" src=\"data:image/png;base64,{}\" alt=\"{} {}\">\n",
                snap.plain,
                plane.plane.name(),
                snap.index
            ));
            html.push_str(&format!(
                "        <img class=\"overlay\" src=\"data:image/png;base64,{}\" alt=\"{} {} mask\">\n",
                snap.overlay,
                plane.plane.name(),
                snap.index
            ));
            html.push_str(&format!(
                "        <figcaption>{}</figcaption>\n      </figure>\n",
                snap.index
            ));
        }
        html.push_str("    </div>\n");
    }
}

fn build_score_fieldset(html: &mut String, name: &str, legend: &str) {
    html.push_str(&format!("      <fieldset>\n        <legend>{}</legend>\n", legend));
    for level in SCORE_LEVELS {
        html.push_str(&format!(
            "        <label><input type=\"radio\" name=\"{}\" value=\"{}\"> {}</label>\n",
            name, level, level
        ));
    }
    html.push_str("      </fieldset>\n");
}

fn build_rating_form(html: &mut String) {
    html.push_str("    <h2>Rating</h2>\n");
    html.push_str("    <form id=\"rating-form\" class=\"rating\">\n");
    build_score_fieldset(html, "quality", "Overall image quality (0 = unusable, 4 = excellent)");
    build_score_fieldset(html, "mask", "Mask quality (0 = unusable, 4 = excellent)");
    html.push_str("      <fieldset>\n        <legend>Artefacts</legend>\n");
    for (value, label) in ARTEFACTS {
        html.push_str(&format!(
            "        <label><input type=\"checkbox\" name=\"artefact\" value=\"{}\"> {}</label>\n",
            value, label
        ));
    }
    html.push_str("      </fieldset>\n");
    html.push_str("      <fieldset>\n        <legend>Comments</legend>\n");
    html.push_str("        <textarea name=\"comments\"></textarea>\n      </fieldset>\n");
    html.push_str("      <button type=\"submit\">Save</button>\n");
    html.push_str("      <button type=\"button\" id=\"rating-download\">Download JSON</button>\n");
    html.push_str("      <span id=\"rating-status\"></span>\n");
    html.push_str("    </form>\n");
}

pub fn build_html(page: &ReportPage) -> String {
    let name = escape_html(&page.row.display_name());
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("  <meta charset=\"UTF-8\">\n");
    html.push_str(&format!("  <title>QC report: {}</title>\n", name));
    html.push_str(STYLE);
    html.push_str("</head>\n");
    html.push_str(&format!("<body data-report=\"{}\">\n", name));
    html.push_str("  <header>\n");
    html.push_str(&format!("    <h1>{}</h1>\n", name));
    html.push_str("    <nav id=\"qc-nav\"></nav>\n");
    html.push_str("  </header>\n  <main>\n");
    html.push_str(&format!(
        "    <p class=\"generated\">Generated {}</p>\n",
        generated
    ));

    build_metadata(page, &mut html);
    html.push_str(
        "    <label><input type=\"checkbox\" id=\"overlay-toggle\"> Show mask overlay</label>\n",
    );
    build_galleries(page, &mut html);
    build_rating_form(&mut html);

    html.push_str("  </main>\n");
    html.push_str(REPORT_SCRIPT);
    if page.add_js {
        html.push_str(&script::nav_script());
    }
    html.push_str("</body>\n</html>\n");
    html
}
