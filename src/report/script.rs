//! レポート間ナビゲーション用スクリプト
//!
//! インデックスはレポートの並び順を `localStorage` に保存し、
//! 各レポートはその順序から前後へのリンクを作り、自身を確認済みにする。

/// 挿入済みかどうかの判定に使う目印
pub const SCRIPT_MARKER: &str = "<!-- fetal-qc:nav-script -->";

/// 並び順を保存するキー
pub const ORDER_KEY: &str = "fetal-qc:order";

/// 確認済みフラグのキー接頭辞（後ろにファイル名が付く）
pub const REVIEWED_PREFIX: &str = "fetal-qc:reviewed:";

const NAV_SCRIPT_BODY: &str = r#"<script>
(function () {
  var ORDER_KEY = "fetal-qc:order";
  var REVIEWED_PREFIX = "fetal-qc:reviewed:";
  var current = decodeURIComponent(location.pathname.split("/").pop() || "");

  function load(key) {
    try { return JSON.parse(localStorage.getItem(key) || "null"); } catch (e) { return null; }
  }

  function link(href, text) {
    var a = document.createElement("a");
    a.href = encodeURIComponent(href);
    a.textContent = text;
    return a;
  }

  document.addEventListener("DOMContentLoaded", function () {
    var list = document.getElementById("qc-index");
    if (list) {
      var order = [];
      list.querySelectorAll("a.qc-report").forEach(function (a) {
        var file = a.getAttribute("data-file");
        order.push(file);
        if (localStorage.getItem(REVIEWED_PREFIX + file)) {
          a.parentNode.classList.add("reviewed");
        }
      });
      localStorage.setItem(ORDER_KEY, JSON.stringify(order));
      return;
    }

    localStorage.setItem(REVIEWED_PREFIX + current, new Date().toISOString());
    var nav = document.getElementById("qc-nav");
    var order = load(ORDER_KEY);
    if (!nav || !Array.isArray(order)) { return; }
    var pos = order.indexOf(current);
    if (pos < 0) { return; }
    if (pos > 0) { nav.appendChild(link(order[pos - 1], "← 前へ")); }
    nav.appendChild(link("index.html", "一覧 (" + (pos + 1) + "/" + order.length + ")"));
    if (pos + 1 < order.length) { nav.appendChild(link(order[pos + 1], "次へ →")); }
  });
})();
</script>"#;

/// 目印付きのナビゲーションスクリプト
pub fn nav_script() -> String {
    format!("{}\n{}\n", SCRIPT_MARKER, NAV_SCRIPT_BODY)
}

pub fn has_script(html: &str) -> bool {
    html.contains(SCRIPT_MARKER)
}

/// `</body>` の直前にスクリプトを挿入する。挿入済みなら None。
pub fn inject_script(html: &str) -> Option<String> {
    if has_script(html) {
        return None;
    }
    let script = nav_script();
    let injected = match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], script, &html[pos..]),
        None => format!("{}{}", html, script),
    };
    Some(injected)
}
