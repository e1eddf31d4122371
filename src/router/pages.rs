//! Page producers bound to route ids.
//!
//! `learning-paths` and `resources` render cards from whatever the catalog
//! holds when the page is first visited; the other known pages are static.
//! Unknown ids (including `home`) get the placeholder body.

use std::fmt::Write;
use std::sync::Arc;

use futures::FutureExt;

use super::route::RouteEntry;
use crate::catalog::{CatalogStore, LearningPath, Resource, ResourceFilter};
use crate::embed::page::{
    ABOUT_HTML, CAREER_GUIDE_HTML, DEFAULT_HTML, LEARNING_PATHS_HTML, PathCardsVars,
    RESOURCES_HTML, ResourceCardsVars,
};
use crate::utils::html::{escape, escape_attr};

/// Audience levels shown on the learning paths page.
pub const AUDIENCES: [(&str, &str); 3] = [
    ("beginner", "医学小白"),
    ("student", "医学生"),
    ("professional", "医学从业者"),
];

/// Resource cards shown per category.
const CARDS_PER_CATEGORY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    LearningPaths,
    Resources,
    CareerGuide,
    About,
    Placeholder,
}

impl PageKind {
    fn of(route: &str) -> Self {
        match route {
            "learning-paths" => Self::LearningPaths,
            "resources" => Self::Resources,
            "career-guide" => Self::CareerGuide,
            "about" => Self::About,
            _ => Self::Placeholder,
        }
    }
}

/// Route entry with the producer registered for `id`.
pub fn entry_for(
    id: &str,
    title: &str,
    description: &str,
    catalog: &Arc<CatalogStore>,
) -> RouteEntry {
    let kind = PageKind::of(id);
    let catalog = Arc::clone(catalog);
    RouteEntry::new(id, title, description, move || {
        let catalog = Arc::clone(&catalog);
        async move { Ok(render(kind, &catalog)) }.boxed()
    })
}

fn render(kind: PageKind, catalog: &CatalogStore) -> String {
    match kind {
        PageKind::LearningPaths => LEARNING_PATHS_HTML.render(&PathCardsVars {
            cards: path_cards(catalog),
        }),
        PageKind::Resources => RESOURCES_HTML.render(&ResourceCardsVars {
            cards: resource_cards(catalog),
        }),
        PageKind::CareerGuide => CAREER_GUIDE_HTML.render(&()),
        PageKind::About => ABOUT_HTML.render(&()),
        PageKind::Placeholder => DEFAULT_HTML.render(&()),
    }
}

fn path_cards(catalog: &CatalogStore) -> String {
    let mut html = String::new();
    for (level, label) in AUDIENCES {
        let paths = catalog.recommended_paths(level);
        if paths.is_empty() {
            continue;
        }
        let _ = writeln!(
            html,
            "<div class=\"path-group\" data-level=\"{}\">\n<h3>{}</h3>",
            escape_attr(level),
            escape(label)
        );
        for path in &paths {
            write_path_card(&mut html, path);
        }
        let _ = writeln!(html, "</div>");
    }
    html
}

fn write_path_card(html: &mut String, path: &LearningPath) {
    let _ = writeln!(
        html,
        "<div class=\"path-card\" data-path=\"{}\"><h4>{}</h4><p>{}</p><span class=\"path-duration\">{}</span></div>",
        escape_attr(&path.id),
        escape(&path.title),
        escape(&path.description),
        escape(&path.duration),
    );
}

fn resource_cards(catalog: &CatalogStore) -> String {
    let mut html = String::new();
    let all = ResourceFilter::new();
    for category in catalog.categories() {
        for resource in catalog
            .resources_by_category(&category, &all)
            .iter()
            .take(CARDS_PER_CATEGORY)
        {
            write_resource_card(&mut html, resource);
        }
    }
    html
}

fn write_resource_card(html: &mut String, resource: &Resource) {
    let url = resource
        .extra
        .get("url")
        .and_then(|v| v.as_str())
        .unwrap_or("#");
    let featured = if resource.featured { " featured" } else { "" };
    let _ = writeln!(
        html,
        "<div class=\"resource-card{featured}\" data-resource=\"{id}\">\n  \
         <h3>{title}</h3>\n  <p>{description}</p>\n  \
         <div class=\"resource-meta\"><span class=\"resource-level\">{difficulty}</span><span class=\"resource-rating\">{rating:.1}</span></div>\n  \
         <a href=\"{url}\" class=\"resource-link\">查看资源</a>\n</div>",
        id = escape_attr(&resource.id),
        title = escape(&resource.title),
        description = escape(&resource.description),
        difficulty = escape(&resource.difficulty),
        rating = resource.rating,
        url = escape_attr(url),
    );
}
