//! Tabla de evidencias con filtros, exportación y paginación.

use crate::evidence::EvidenceStore;
use crate::html::Html;
use crate::markup;
use crate::models::EvidenceRecord;

const COLUMNS: [&str; 7] = [
    "Time Period",
    "Date",
    "Company",
    "Headline",
    "Quote",
    "Motivation",
    "Theme",
];

fn select_options(values: &[&str], current: Option<&str>, all_label: &str) -> Html {
    let current = current.map(str::to_lowercase).unwrap_or_default();
    let mut html = markup!(r#"<option value="">{} ({})</option>"#, all_label, values.len());
    for value in values {
        let selected = if !current.is_empty() && value.to_lowercase() == current {
            " selected"
        } else {
            ""
        };
        html.push(markup!(
            r#"<option value="{}"{}>{}</option>"#,
            *value,
            Html::from_static(selected),
            *value
        ));
    }
    html
}

fn render_row(idx: usize, item: &EvidenceRecord) -> Html {
    let bg = if idx % 2 == 0 { "bg-zinc-900" } else { "bg-zinc-800/50" };
    markup!(
        r#"<tr class="{} hover:bg-zinc-700/50"><td class="px-4 py-3 text-sm text-zinc-300">{}</td><td class="px-4 py-3 text-sm text-zinc-300">{}</td><td class="px-4 py-3 text-sm font-medium text-zinc-200">{}</td><td class="px-4 py-3 text-sm text-blue-400"><button type="button" class="hover:text-blue-300 hover:underline text-left" data-document-id="{}">{}</button></td><td class="px-4 py-3 text-sm text-zinc-300 italic max-w-md">{}</td><td class="px-4 py-3 text-sm text-zinc-300 max-w-md">{}</td><td class="px-4 py-3 text-sm font-medium text-emerald-400">{}</td></tr>"#,
        Html::from_static(bg),
        item.time_period,
        item.date,
        item.company,
        item.document_id,
        item.headline,
        item.quote,
        item.motivation,
        item.theme
    )
}

fn disabled(flag: bool) -> Html {
    if flag {
        Html::from_static(" disabled")
    } else {
        Html::new()
    }
}

/// Pestaña de evidencias para el estado actual del almacén.
pub fn render_evidence_tab(store: &EvidenceStore) -> Html {
    if store.all().is_empty() {
        return Html::from_static(r#"<p class="text-zinc-400">No evidence data available</p>"#);
    }

    let filter = store.filter();
    let companies = store.companies();
    let themes = store.themes();

    let mut html = markup!(
        r#"<div class="mb-6"><div class="flex justify-between items-start mb-4"><div><h3 class="text-2xl font-bold text-white mb-1">Evidence &amp; Supporting Quotes</h3><p class="text-zinc-400 text-sm">Source documents and quotes backing thematic assessments</p></div><div class="flex gap-2"><a href="/api/evidence/export/csv" class="px-3 py-2 bg-emerald-600 hover:bg-emerald-700 text-white rounded-lg text-sm font-medium">Export CSV</a><a href="/api/evidence/export/json" class="px-3 py-2 bg-blue-600 hover:bg-blue-700 text-white rounded-lg text-sm font-medium">Export JSON</a></div></div><div class="bg-zinc-800/50 rounded-lg border border-zinc-700 p-4 mb-4"><div class="grid grid-cols-1 md:grid-cols-3 gap-4"><div><label class="block text-sm font-medium text-zinc-300 mb-2" for="filterCompany">Filter by Company</label><select id="filterCompany" class="w-full px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm">{}</select></div><div><label class="block text-sm font-medium text-zinc-300 mb-2" for="filterTheme">Filter by Theme</label><select id="filterTheme" class="w-full px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm">{}</select></div><div><label class="block text-sm font-medium text-zinc-300 mb-2" for="searchEvidence">Search</label><input type="text" id="searchEvidence" placeholder="Search quotes, headlines..." value="{}" class="w-full px-3 py-2 bg-zinc-900 border border-zinc-600 rounded-lg text-zinc-200 text-sm"></div></div><div class="mt-3 flex justify-between items-center"><div class="text-sm text-zinc-400">Showing <span id="evidenceCount" class="font-bold text-blue-400">{}</span> of {} items</div><button type="button" id="clearEvidenceFilters" class="text-sm text-blue-400 hover:text-blue-300 font-medium">Clear Filters</button></div></div></div>"#,
        select_options(&companies, filter.company.as_deref(), "All Companies"),
        select_options(&themes, filter.theme.as_deref(), "All Themes"),
        filter.search.as_deref().unwrap_or(""),
        store.filtered().len(),
        store.all().len()
    );

    html.push_static(r#"<div class="overflow-x-auto bg-zinc-800/50 rounded-lg border border-zinc-700"><table class="w-full border-collapse"><thead class="bg-gradient-to-r from-zinc-800 to-zinc-700"><tr>"#);
    for column in COLUMNS {
        html.push(markup!(
            r#"<th class="sticky top-0 z-10 px-4 py-3 text-left text-sm font-semibold text-white border-b border-zinc-600">{}</th>"#,
            column
        ));
    }
    html.push_static(r#"</tr></thead><tbody id="evidenceTableBody" class="divide-y divide-zinc-700 bg-zinc-900">"#);
    for (idx, item) in store.page_items().iter().enumerate() {
        html.push(render_row(idx, item));
    }
    html.push_static("</tbody></table></div>");

    html.push(markup!(
        r#"<div id="evidencePagination" class="mt-4 flex justify-between items-center"><div class="text-sm text-zinc-400">Page <span id="currentPage" class="font-bold text-white">{}</span> of <span id="totalPages" class="font-bold text-white">{}</span></div><div class="flex gap-2"><button type="button" id="prevPageBtn" data-page-delta="-1" class="px-3 py-2 bg-zinc-700 hover:bg-zinc-600 text-white rounded-lg text-sm font-medium disabled:opacity-50"{}>Previous</button><button type="button" id="nextPageBtn" data-page-delta="1" class="px-3 py-2 bg-zinc-700 hover:bg-zinc-600 text-white rounded-lg text-sm font-medium disabled:opacity-50"{}>Next</button></div></div>"#,
        store.page(),
        store.display_total_pages(),
        disabled(!store.can_go_prev()),
        disabled(!store.can_go_next())
    ));
    html
}

/// Ventana modal con el identificador del documento de una evidencia.
pub fn render_document_modal(document_id: &str, record: Option<&EvidenceRecord>) -> Html {
    let details = match record {
        Some(item) => markup!(
            r#"<div class="text-sm text-zinc-400 mt-3">{} | {} | {}</div><div class="text-sm text-zinc-200 mt-1">{}</div>"#,
            item.company,
            item.date,
            item.time_period,
            item.headline
        ),
        None => Html::new(),
    };
    markup!(
        r#"<div class="fixed inset-0 z-50 flex items-center justify-center bg-black/70" data-close-modal><div class="bg-zinc-900 rounded-xl w-full max-w-2xl p-6 relative border border-zinc-700"><button type="button" class="absolute top-4 right-4 text-zinc-400 hover:text-white text-2xl font-bold" data-close-modal>&times;</button><div class="text-lg font-bold text-white mb-3">DOCUMENT ID</div><div class="text-base text-zinc-200 font-mono bg-zinc-800 p-3 rounded-lg border border-zinc-600">{}</div>{}</div></div>"#,
        document_id,
        details
    )
}
