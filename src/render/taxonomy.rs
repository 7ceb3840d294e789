//! Taxonomía del tema: vista en árbol y grafo SVG de izquierda a derecha.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::html::Html;
use crate::markup;
use crate::models::TaxonomyNode;

const TREE_DEPTH_CLASSES: [&str; 5] = [
    "text-blue-400",
    "text-emerald-400",
    "text-purple-400",
    "text-amber-400",
    "text-pink-400",
];

const GRAPH_DEPTH_FILLS: [&str; 5] = ["#60a5fa", "#34d399", "#a78bfa", "#fbbf24", "#f472b6"];

/// Separación horizontal entre niveles.
const COLUMN_GAP: f64 = 220.0;
/// Separación vertical entre hojas consecutivas.
const ROW_GAP: f64 = 48.0;
const MARGIN: f64 = 50.0;
/// Espacio reservado a la derecha para las etiquetas de las hojas.
const LABEL_ROOM: f64 = 320.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MindmapView {
    #[default]
    Tree,
    Graph,
}

impl MindmapView {
    pub fn as_str(self) -> &'static str {
        match self {
            MindmapView::Tree => "tree",
            MindmapView::Graph => "graph",
        }
    }
}

impl FromStr for MindmapView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(MindmapView::Tree),
            "graph" => Ok(MindmapView::Graph),
            other => Err(format!("Vista de taxonomía desconocida: {other}")),
        }
    }
}

fn render_tree_node(node: &TaxonomyNode, depth: usize) -> Html {
    let color = TREE_DEPTH_CLASSES[depth % TREE_DEPTH_CLASSES.len()];
    let toggle = if node.has_children() {
        Html::from_static(r#"<button type="button" data-toggle="tree-node" class="flex-shrink-0 w-6 h-6 flex items-center justify-center rounded bg-zinc-700 hover:bg-zinc-600 text-zinc-300">&#9662;</button>"#)
    } else {
        Html::from_static(r#"<div class="w-6 h-6 flex-shrink-0"></div>"#)
    };
    let summary = match node.summary.as_deref() {
        Some(summary) if !summary.is_empty() => {
            markup!(r#"<p class="text-zinc-300 text-sm mt-1">{}</p>"#, summary)
        }
        _ => Html::new(),
    };
    let keywords = if node.keywords().is_empty() {
        Html::new()
    } else {
        let chips: Html = node
            .keywords()
            .iter()
            .map(|kw| markup!(r#"<span class="text-xs bg-zinc-700 text-zinc-300 px-2 py-1 rounded">{}</span>"#, kw))
            .collect();
        markup!(r#"<div class="flex flex-wrap gap-1 mt-2">{}</div>"#, chips)
    };
    let children = if node.has_children() {
        let inner: Html = node
            .children()
            .iter()
            .map(|child| render_tree_node(child, depth + 1))
            .collect();
        markup!(r#"<div class="tree-children mt-2">{}</div>"#, inner)
    } else {
        Html::new()
    };

    markup!(
        r#"<div class="tree-node mb-2" data-depth="{}" style="margin-left: {}rem"><div class="flex items-start gap-2 p-3 bg-zinc-800/50 rounded-lg border border-zinc-700">{}<div class="flex-1 min-w-0"><div class="flex items-center gap-2 mb-1"><span class="font-bold {} text-lg">{}</span><span class="text-xs text-zinc-500 font-mono">Node {}</span></div>{}{}</div></div>{}</div>"#,
        depth,
        depth * 2,
        toggle,
        Html::from_static(color),
        node.label,
        node.node.to_string(),
        summary,
        keywords,
        children
    )
}

/// Árbol indentado con subárboles plegables (desplegados al inicio).
pub fn render_tree(node: &TaxonomyNode) -> Html {
    markup!(
        r#"<div class="bg-zinc-800/30 rounded-lg border border-zinc-700 p-6 max-h-[600px] overflow-y-auto">{}</div>"#,
        render_tree_node(node, 0)
    )
}

/// Nodo posicionado del grafo.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode<'a> {
    pub node: &'a TaxonomyNode,
    pub depth: usize,
    pub parent: Option<usize>,
    pub x: f64,
    pub y: f64,
}

/// Disposición ordenada de izquierda a derecha: `x` según la profundidad,
/// hojas repartidas a intervalos regulares y cada padre centrado sobre sus
/// hijos. El primer elemento es la raíz; los nodos aparecen en preorden.
pub fn layout_graph(root: &TaxonomyNode) -> Vec<GraphNode<'_>> {
    let mut nodes = Vec::new();
    let mut next_leaf = 0usize;
    place(root, 0, None, &mut next_leaf, &mut nodes);
    nodes
}

fn place<'a>(
    node: &'a TaxonomyNode,
    depth: usize,
    parent: Option<usize>,
    next_leaf: &mut usize,
    nodes: &mut Vec<GraphNode<'a>>,
) -> f64 {
    let idx = nodes.len();
    nodes.push(GraphNode {
        node,
        depth,
        parent,
        x: depth as f64 * COLUMN_GAP,
        y: 0.0,
    });

    let y = if node.has_children() {
        let ys: Vec<f64> = node
            .children()
            .iter()
            .map(|child| place(child, depth + 1, Some(idx), next_leaf, nodes))
            .collect();
        let first = ys.first().copied().unwrap_or(0.0);
        let last = ys.last().copied().unwrap_or(first);
        (first + last) / 2.0
    } else {
        let y = *next_leaf as f64 * ROW_GAP;
        *next_leaf += 1;
        y
    };
    nodes[idx].y = y;
    y
}

fn tooltip(node: &TaxonomyNode) -> String {
    let mut text = format!("{} (Node {})", node.label, node.node);
    if let Some(summary) = node.summary.as_deref().filter(|s| !s.is_empty()) {
        text.push_str("\n\n");
        text.push_str(summary);
    }
    if !node.keywords().is_empty() {
        text.push_str("\n\nKeywords: ");
        text.push_str(&node.keywords().join(", "));
    }
    text
}

/// Grafo SVG de la taxonomía dentro de un contenedor con zoom y desplazamiento.
pub fn render_graph(root: &TaxonomyNode) -> Html {
    let nodes = layout_graph(root);
    let max_x = nodes.iter().map(|n| n.x).fold(0.0, f64::max);
    let max_y = nodes.iter().map(|n| n.y).fold(0.0, f64::max);
    let width = max_x + LABEL_ROOM + MARGIN * 2.0;
    let height = max_y + MARGIN * 2.0;

    let mut links = Html::new();
    for node in &nodes {
        if let Some(parent) = node.parent.map(|p| &nodes[p]) {
            let mid = (parent.x + node.x) / 2.0;
            links.push(markup!(
                r#"<path d="M{},{}C{},{} {},{} {},{}"></path>"#,
                parent.x,
                parent.y,
                mid,
                parent.y,
                mid,
                node.y,
                node.x,
                node.y
            ));
        }
    }

    let mut circles = Html::new();
    for node in &nodes {
        let is_root = node.depth == 0;
        let (radius, label_x, font_size, weight) = if is_root {
            (12, 16, "18px", "bold")
        } else {
            (8, 12, "15px", "normal")
        };
        circles.push(markup!(
            r##"<g class="graph-node" transform="translate({},{})"><title>{}</title><circle r="{}" fill="{}" stroke="#fff" stroke-width="2"></circle><text x="{}" dy="0.32em" font-size="{}" font-weight="{}" fill="#fff">{}</text></g>"##,
            node.x,
            node.y,
            tooltip(node.node),
            radius,
            GRAPH_DEPTH_FILLS[node.depth % GRAPH_DEPTH_FILLS.len()],
            label_x,
            font_size,
            weight,
            node.node.label
        ));
    }

    markup!(
        r##"<div class="bg-zinc-800/30 rounded-lg border border-zinc-700 p-4"><div class="mb-3 text-sm text-zinc-400">Scroll to zoom, drag to pan, hover for details</div><div id="graphSvgContainer" class="bg-zinc-900 rounded overflow-hidden" style="height: 600px;" data-pan-zoom><svg width="100%" height="100%" viewBox="0 0 {} {}"><g class="graph-viewport" data-x="{}" data-y="{}" transform="translate({},{})"><g fill="none" stroke="#4b5563" stroke-width="2">{}</g><g>{}</g></g></svg></div></div>"##,
        width,
        height,
        MARGIN,
        MARGIN,
        MARGIN,
        MARGIN,
        links,
        circles
    )
}

/// Vistas de la taxonomía construidas bajo demanda a partir del mismo nodo raíz.
#[derive(Debug, Clone, Default)]
pub struct MindmapViews {
    tree: Option<Html>,
    graph: Option<Html>,
}

impl MindmapViews {
    /// Construye la vista pedida si aún no existe.
    pub fn ensure(&mut self, view: MindmapView, root: &TaxonomyNode) {
        match view {
            MindmapView::Tree => {
                self.tree.get_or_insert_with(|| render_tree(root));
            }
            MindmapView::Graph => {
                self.graph.get_or_insert_with(|| render_graph(root));
            }
        }
    }

    pub fn is_built(&self, view: MindmapView) -> bool {
        match view {
            MindmapView::Tree => self.tree.is_some(),
            MindmapView::Graph => self.graph.is_some(),
        }
    }

    pub fn clear(&mut self) {
        self.tree = None;
        self.graph = None;
    }
}

fn view_button(view: MindmapView, active: MindmapView, label: &'static str) -> Html {
    let classes = if view == active {
        "bg-blue-500 text-white"
    } else {
        "text-zinc-400 hover:text-zinc-200"
    };
    markup!(
        r#"<button type="button" data-mindmap-view="{}" class="px-4 py-2 rounded text-sm font-medium {}">{}</button>"#,
        view.as_str(),
        Html::from_static(classes),
        label
    )
}

fn view_container(id: &'static str, content: Option<&Html>, visible: bool) -> Html {
    let hidden = if visible { "" } else { " hidden" };
    markup!(
        r#"<div id="{}" class="mindmap-view{}">{}</div>"#,
        Html::from_static(id),
        Html::from_static(hidden),
        content
    )
}

/// Pestaña de taxonomía con el selector de vista; sólo se muestran las vistas
/// ya construidas.
pub fn render_mindmap(views: &MindmapViews, active: MindmapView) -> Html {
    markup!(
        r#"<div class="mb-6"><div class="flex justify-between items-center mb-4"><div><h3 class="text-2xl font-bold text-white mb-1">Theme Taxonomy</h3><p class="text-zinc-400 text-sm">Hierarchical breakdown of the investment theme</p></div><div class="flex gap-2 bg-zinc-800 p-1 rounded-lg border border-zinc-700">{}{}</div></div></div>{}{}"#,
        view_button(MindmapView::Tree, active, "Tree View"),
        view_button(MindmapView::Graph, active, "Interactive Graph"),
        view_container("mindmapTreeView", views.tree.as_ref(), active == MindmapView::Tree),
        view_container("mindmapGraphView", views.graph.as_ref(), active == MindmapView::Graph)
    )
}
