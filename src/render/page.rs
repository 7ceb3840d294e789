//! Página completa del dashboard: formulario, insignia, logs y pestañas.
//!
//! El script embebido sólo hace de pegamento: reenvía los eventos a la API y
//! sustituye los fragmentos HTML que devuelve. Todo el marcado sale de Rust.

use crate::demo::DemoReport;
use crate::html::Html;
use crate::markup;
use crate::session::DashboardSession;

const FREQUENCIES: [(&str, &str); 5] = [
    ("D", "Daily"),
    ("W", "Weekly"),
    ("M", "Monthly"),
    ("3M", "Quarterly"),
    ("Y", "Yearly"),
];

const DEFAULT_FREQUENCY: &str = "Y";
const DEFAULT_LLM_MODEL: &str = "openai::gpt-4o-mini";
const DEFAULT_DOCUMENT_TYPE: &str = "TRANSCRIPTS";

const PAGE_STYLE: &str = r#"<style>
.hidden{display:none}
.error{color:#f87171}
.heatmap-theme-label{writing-mode:vertical-rl;transform:rotate(180deg);max-height:160px}
#logViewer{font-family:ui-monospace,monospace;font-size:12px;max-height:240px;overflow-y:auto}
[data-pan-zoom]{cursor:grab}
</style>"#;

const PAGE_SCRIPT: &str = r##"<script>
(() => {
  const body = document.body;
  const token = body.dataset.token || "";
  const withToken = (path) => token ? `${path}${path.includes("?") ? "&" : "?"}token=${encodeURIComponent(token)}` : path;
  const $ = (sel) => document.querySelector(sel);
  let refreshTimer = null;

  async function api(method, path, payload) {
    const opts = { method, headers: {} };
    if (payload !== undefined) {
      opts.headers["Content-Type"] = "application/json";
      opts.body = JSON.stringify(payload);
    }
    const resp = await fetch(withToken(path), opts);
    const type = resp.headers.get("content-type") || "";
    const data = type.includes("application/json") ? await resp.json() : await resp.text();
    return { ok: resp.ok, data };
  }

  function applyState(state) {
    $("#logViewer").innerHTML = state.logs_html;
    $("#output").innerHTML = state.output_html;
    $("#currentConfigBadge").innerHTML = state.badge_html;
    $("#dashboard").innerHTML = state.dashboard_html;
    const submit = $("#submitBtn");
    submit.disabled = !state.submit_enabled;
    submit.textContent = state.submit_label;
    $("#showJsonBtn").classList.toggle("hidden", !state.has_report);
    $("#cancelBtn").classList.toggle("hidden", state.phase !== "polling");
    const busy = state.phase === "submitting" || state.phase === "polling";
    if (busy && !refreshTimer) {
      refreshTimer = setInterval(refresh, 1000);
    } else if (!busy && refreshTimer) {
      clearInterval(refreshTimer);
      refreshTimer = null;
    }
  }

  async function refresh() {
    const { ok, data } = await api("GET", "/api/state");
    if (ok) applyState(data);
  }

  function setPanel(tab, html) {
    const panel = document.querySelector(`[data-tab-content="${tab}"]`);
    if (panel) panel.innerHTML = html;
  }

  function formPayload() {
    const data = {};
    new FormData($("#screenerForm")).forEach((value, key) => { data[key] = String(value); });
    return data;
  }

  async function validateDates() {
    const form = formPayload();
    const params = new URLSearchParams({ start_date: form.start_date, end_date: form.end_date, frequency: form.frequency });
    const { data } = await api("GET", `/api/validate-dates?${params}`);
    $("#dateRangeError").innerHTML = data.html || "";
  }

  async function loadEvidence() {
    const params = new URLSearchParams({
      company: $("#filterCompany")?.value || "",
      theme: $("#filterTheme")?.value || "",
      search: $("#searchEvidence")?.value || "",
    });
    const { data } = await api("GET", `/api/evidence?${params}`);
    setPanel("evidence", data);
  }

  async function loadCompanies() {
    const params = new URLSearchParams({
      sort: $("#sortCompanies")?.value || "score_desc",
      search: $("#companySearch")?.value || "",
    });
    const { data } = await api("GET", `/api/companies?${params}`);
    setPanel("companies", data);
    const input = $("#companySearch");
    if (input) { input.focus(); input.setSelectionRange(input.value.length, input.value.length); }
  }

  $("#screenerForm").addEventListener("submit", async (e) => {
    e.preventDefault();
    await api("POST", "/api/screener", formPayload());
    await refresh();
  });
  ["start_date", "end_date", "frequency"].forEach((name) => {
    document.querySelector(`[name="${name}"]`).addEventListener("change", validateDates);
  });
  $("#cancelBtn").addEventListener("click", async () => { await api("POST", "/api/cancel"); await refresh(); });
  $("#showJsonBtn").addEventListener("click", () => window.open(withToken("/api/report"), "_blank"));
  $("#loadRequestBtn").addEventListener("click", async () => {
    const id = $("#requestIdInput").value.trim();
    if (!id) return;
    await api("POST", `/api/requests/${encodeURIComponent(id)}/load`);
    await refresh();
  });

  document.addEventListener("click", async (e) => {
    const el = e.target.closest("[data-close-modal],[data-tab],[data-toggle],[data-demo],[data-mindmap-view],[data-page-delta],[data-focus-theme],[data-company],[data-document-id],#clearEvidenceFilters");
    if (!el) return;
    if (el.hasAttribute("data-close-modal")) {
      if (e.target === el || el.tagName === "BUTTON") $("#infoModalsContainer").innerHTML = "";
    } else if (el.dataset.tab) {
      await api("POST", `/api/tabs/${el.dataset.tab}/activate`);
      await refresh();
    } else if (el.dataset.toggle === "tree-node") {
      const children = el.closest(".tree-node").querySelector(".tree-children");
      if (children) children.classList.toggle("hidden");
    } else if (el.dataset.toggle) {
      const card = el.closest(".company-card,.dashboard-company-item");
      const section = card && card.querySelector(`.${el.dataset.toggle}-section`);
      if (section) section.classList.toggle("hidden");
    } else if (el.dataset.demo) {
      await api("POST", `/api/demo/${el.dataset.demo}`);
      await refresh();
    } else if (el.dataset.mindmapView) {
      const { data } = await api("POST", `/api/mindmap/${el.dataset.mindmapView}`);
      setPanel("mindmap", data);
    } else if (el.dataset.pageDelta) {
      const { data } = await api("POST", `/api/evidence/page/${el.dataset.pageDelta}`);
      setPanel("evidence", data);
    } else if (el.dataset.focusTheme) {
      await api("POST", `/api/themes/${encodeURIComponent(el.dataset.focusTheme)}/focus`);
      await refresh();
    } else if (el.dataset.company) {
      await api("POST", `/api/companies/${encodeURIComponent(el.dataset.company)}/focus`);
      await refresh();
      const card = document.querySelector('[data-focused="true"]');
      if (card) card.scrollIntoView({ behavior: "smooth", block: "center" });
    } else if (el.dataset.documentId) {
      const { data } = await api("GET", `/api/documents/${encodeURIComponent(el.dataset.documentId)}`);
      $("#infoModalsContainer").innerHTML = data;
    } else if (el.id === "clearEvidenceFilters") {
      const { data } = await api("POST", "/api/evidence/clear");
      setPanel("evidence", data);
    }
  });

  document.addEventListener("change", (e) => {
    if (e.target.id === "filterCompany" || e.target.id === "filterTheme") loadEvidence();
    if (e.target.id === "sortCompanies") loadCompanies();
  });
  document.addEventListener("input", (e) => {
    if (e.target.id === "searchEvidence") loadEvidence();
    if (e.target.id === "companySearch") loadCompanies();
  });

  let drag = null;
  document.addEventListener("wheel", (e) => {
    const box = e.target.closest("[data-pan-zoom]");
    if (!box) return;
    e.preventDefault();
    const g = box.querySelector(".graph-viewport");
    const scale = Math.min(4, Math.max(0.1, (parseFloat(g.dataset.scale) || 1) * (e.deltaY < 0 ? 1.1 : 0.9)));
    g.dataset.scale = scale;
    g.setAttribute("transform", `translate(${g.dataset.x},${g.dataset.y}) scale(${scale})`);
  }, { passive: false });
  document.addEventListener("mousedown", (e) => {
    const box = e.target.closest("[data-pan-zoom]");
    if (box) drag = { g: box.querySelector(".graph-viewport"), x: e.clientX, y: e.clientY };
  });
  document.addEventListener("mousemove", (e) => {
    if (!drag) return;
    const g = drag.g;
    const x = parseFloat(g.dataset.x) + e.clientX - drag.x;
    const y = parseFloat(g.dataset.y) + e.clientY - drag.y;
    g.dataset.x = x; g.dataset.y = y;
    drag.x = e.clientX; drag.y = e.clientY;
    g.setAttribute("transform", `translate(${x},${y}) scale(${g.dataset.scale || 1})`);
  });
  document.addEventListener("mouseup", () => { drag = null; });

  refresh();
})();
</script>"##;

fn text_input(name: &'static str, label: &'static str, value: &str, placeholder: &'static str) -> Html {
    markup!(
        r#"<label class="block text-sm font-medium text-zinc-300 mb-1" for="{}">{}</label><input type="text" id="{}" name="{}" value="{}" placeholder="{}" class="w-full mb-3 px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm">"#,
        name,
        label,
        name,
        name,
        value,
        placeholder
    )
}

fn date_input(name: &'static str, label: &'static str) -> Html {
    markup!(
        r#"<div><label class="block text-sm font-medium text-zinc-300 mb-1" for="{}">{}</label><input type="date" id="{}" name="{}" class="w-full px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm"></div>"#,
        name,
        label,
        name,
        name
    )
}

fn render_form(session: &DashboardSession) -> Html {
    let watchlists: Html = session
        .watchlists()
        .iter()
        .map(|w| markup!(r#"<option value="{}"></option>"#, w.name))
        .collect();
    let frequencies: Html = FREQUENCIES
        .into_iter()
        .map(|(code, name)| {
            let selected = if code == DEFAULT_FREQUENCY { " selected" } else { "" };
            markup!(r#"<option value="{}"{}>{}</option>"#, code, Html::from_static(selected), name)
        })
        .collect();
    let form = session.form();
    let disabled = if form.submit_enabled { "" } else { " disabled" };

    let mut html = Html::from_static(r#"<form id="screenerForm" class="bg-zinc-800/50 rounded-lg border border-zinc-700 p-4">"#);
    html.push(text_input("theme", "Theme", "", "Supply Chain Reshaping"));
    html.push(text_input("focus", "Focus", "", "Logistics automation, nearshoring strategies"));
    html.push(markup!(
        r#"<label class="block text-sm font-medium text-zinc-300 mb-1" for="companies">Company Universe</label><input type="text" id="companies" name="companies" list="watchlistOptions" placeholder="Watchlist name, watchlist ID or comma-separated entity IDs" class="w-full mb-3 px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm"><datalist id="watchlistOptions">{}</datalist>"#,
        watchlists
    ));
    html.push_static(r#"<div class="grid grid-cols-2 gap-3 mb-3">"#);
    html.push(date_input("start_date", "Start Date"));
    html.push(date_input("end_date", "End Date"));
    html.push_static("</div>");
    html.push(markup!(
        r#"<label class="block text-sm font-medium text-zinc-300 mb-1" for="frequency">Frequency</label><select id="frequency" name="frequency" class="w-full mb-3 px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm">{}</select><div id="dateRangeError"></div>"#,
        frequencies
    ));
    html.push(text_input("fiscal_year", "Fiscal Year", "", "2024 or 2023,2024"));
    html.push(text_input("llm_model", "LLM Model", DEFAULT_LLM_MODEL, ""));
    html.push(markup!(
        r#"<input type="hidden" name="document_type" value="{}">"#,
        DEFAULT_DOCUMENT_TYPE
    ));
    html.push_static(r#"<div class="grid grid-cols-3 gap-3">"#);
    html.push(text_input("rerank_threshold", "Rerank Threshold", "", "0-1"));
    html.push(text_input("document_limit", "Document Limit", "100", ""));
    html.push(text_input("batch_size", "Batch Size", "10", ""));
    html.push_static("</div>");
    html.push(markup!(
        r#"<div class="flex gap-2 mt-2"><button type="submit" id="submitBtn" class="px-4 py-2 bg-blue-600 hover:bg-blue-700 text-white rounded-lg text-sm font-semibold"{}>{}</button><button type="button" id="cancelBtn" class="hidden px-4 py-2 bg-zinc-700 text-white rounded-lg text-sm">Cancel</button></div></form>"#,
        Html::from_static(disabled),
        form.submit_label
    ));
    html
}

fn render_quick_start() -> Html {
    let buttons: Html = DemoReport::ALL
        .into_iter()
        .map(|demo| {
            markup!(
                r#"<button type="button" data-demo="{}" class="w-full text-left px-3 py-2 mb-2 bg-zinc-800 hover:bg-zinc-700 rounded-lg border border-zinc-700"><div class="text-white text-sm font-semibold">{}</div><div class="text-zinc-400 text-xs">{}</div></button>"#,
                demo.slug(),
                demo.theme(),
                demo.universe()
            )
        })
        .collect();
    markup!(
        r#"<div class="mt-4"><h3 class="text-sm font-bold text-zinc-300 uppercase mb-2">Quick Start</h3>{}<div class="flex gap-2 mt-3"><input type="text" id="requestIdInput" placeholder="Request ID" class="flex-1 px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm"><button type="button" id="loadRequestBtn" class="px-3 py-2 bg-zinc-700 text-white rounded-lg text-sm">Load</button></div></div>"#,
        buttons
    )
}

/// Página inicial con el estado actual de la sesión.
pub fn render_dashboard_page(session: &DashboardSession, token: Option<&str>) -> Html {
    let has_report = if session.last_report().is_some() { "" } else { " hidden" };
    markup!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>Thematic Screener</title><script src="https://cdn.tailwindcss.com"></script>{}</head><body class="bg-zinc-950 text-zinc-200" data-token="{}"><div class="flex min-h-screen"><aside class="w-96 p-4 border-r border-zinc-800"><h1 class="text-2xl font-bold text-white mb-4">Thematic Screener</h1><div id="currentConfigBadge" class="mb-4 px-3 py-2 bg-zinc-800 rounded-lg text-sm">{}</div>{}{}</aside><main class="flex-1 p-6"><div id="output" class="mb-4">{}</div><div class="mb-6"><div class="flex justify-between items-center mb-2"><h2 class="text-lg font-semibold text-white">Logs</h2><button type="button" id="showJsonBtn" class="text-sm text-blue-400{}">Show JSON</button></div><div id="logViewer" class="bg-zinc-900 rounded-lg border border-zinc-700 p-3">{}</div></div><div id="dashboard">{}</div></main></div><div id="infoModalsContainer"></div>{}</body></html>"#,
        Html::from_static(PAGE_STYLE),
        token.unwrap_or(""),
        session.render_badge(),
        render_form(session),
        render_quick_start(),
        session.output(),
        Html::from_static(has_report),
        session.log_panel(),
        session.render_dashboard(),
        Html::from_static(PAGE_SCRIPT)
    )
}
