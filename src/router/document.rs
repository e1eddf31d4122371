//! Headless stand-in for the browser document.
//!
//! Holds exactly the state the router and the app shell touch: title,
//! theme, loading indicator, page elements, navigation links, mobile menu,
//! the inline error view and the fatal view. [`Document::to_html`] renders
//! a snapshot.

use std::fmt::Write;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::embed::MessageVars;
use crate::embed::page::{ERROR_PANEL_HTML, ErrorPanelVars, FATAL_HTML};
use crate::utils::html::{escape, escape_attr};

pub type SharedDocument = Arc<Mutex<Document>>;

/// One materialized page, `<section id="<route>-page" class="page">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    pub route: String,
    pub html: String,
    pub active: bool,
}

impl PageElement {
    pub fn element_id(&self) -> String {
        format!("{}-page", self.route)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub page: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomeStats {
    pub resources: usize,
    pub paths: usize,
    pub languages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ErrorPanel {
    message: String,
    home: String,
}

#[derive(Debug, Default)]
pub struct Document {
    title: String,
    theme: String,
    loading: usize,
    pages: IndexMap<String, PageElement>,
    nav_links: Vec<NavLink>,
    menu_open: bool,
    error_panel: Option<ErrorPanel>,
    fatal: Option<String>,
    stats: Option<HomeStats>,
    scroll_resets: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedDocument {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: &str) {
        self.theme = theme.to_string();
    }

    // ------------------------------------------------------------------------
    // loading indicator
    // ------------------------------------------------------------------------

    /// Visible while any show is unmatched by a hide.
    pub fn is_loading(&self) -> bool {
        self.loading > 0
    }

    pub fn show_loading(&mut self) {
        self.loading += 1;
    }

    pub fn hide_loading(&mut self) {
        self.loading = self.loading.saturating_sub(1);
    }

    // ------------------------------------------------------------------------
    // pages
    // ------------------------------------------------------------------------

    pub fn has_page(&self, route: &str) -> bool {
        self.pages.contains_key(route)
    }

    pub fn page(&self, route: &str) -> Option<&PageElement> {
        self.pages.get(route)
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageElement> {
        self.pages.values()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a page unless one already exists for `route`.
    ///
    /// Returns false (and keeps the existing element) on a duplicate.
    pub fn insert_page(&mut self, route: &str, html: String) -> bool {
        if self.pages.contains_key(route) {
            return false;
        }
        self.pages.insert(
            route.to_string(),
            PageElement {
                route: route.to_string(),
                html,
                active: false,
            },
        );
        true
    }

    /// Make `route` the only active page and drop the error view.
    ///
    /// Returns false when no page exists for `route`.
    pub fn activate(&mut self, route: &str) -> bool {
        if !self.pages.contains_key(route) {
            return false;
        }
        for page in self.pages.values_mut() {
            page.active = page.route == route;
        }
        self.error_panel = None;
        true
    }

    pub fn active_page(&self) -> Option<&PageElement> {
        self.pages.values().find(|p| p.active)
    }

    // ------------------------------------------------------------------------
    // navigation chrome
    // ------------------------------------------------------------------------

    pub fn set_nav_links<I, S>(&mut self, links: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.nav_links = links
            .into_iter()
            .map(|(page, label)| NavLink {
                page: page.into(),
                label: label.into(),
                active: false,
            })
            .collect();
    }

    pub fn nav_links(&self) -> &[NavLink] {
        &self.nav_links
    }

    /// Mark the link for `route` active, clear every other.
    pub fn update_nav(&mut self, route: &str) {
        for link in &mut self.nav_links {
            link.active = link.page == route;
        }
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }

    /// Returns the new state.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    // ------------------------------------------------------------------------
    // error views
    // ------------------------------------------------------------------------

    /// Hide every page and show the inline error view.
    ///
    /// Cached pages survive and are shown again by the next activation.
    pub fn show_error(&mut self, message: &str, home: &str) {
        for page in self.pages.values_mut() {
            page.active = false;
        }
        self.error_panel = Some(ErrorPanel {
            message: message.to_string(),
            home: home.to_string(),
        });
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_panel.as_ref().map(|e| e.message.as_str())
    }

    /// Route the error view's return button leads to.
    pub fn error_action(&self) -> Option<&str> {
        self.error_panel.as_ref().map(|e| e.home.as_str())
    }

    /// Replace the main content with the reload prompt.
    pub fn show_fatal(&mut self, message: &str) {
        self.fatal = Some(message.to_string());
        self.loading = 0;
    }

    pub fn fatal_message(&self) -> Option<&str> {
        self.fatal.as_deref()
    }

    // ------------------------------------------------------------------------
    // shell state
    // ------------------------------------------------------------------------

    pub fn set_stats(&mut self, stats: HomeStats) {
        self.stats = Some(stats);
    }

    pub fn stats(&self) -> Option<HomeStats> {
        self.stats
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_resets += 1;
    }

    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets
    }

    // ------------------------------------------------------------------------
    // snapshot
    // ------------------------------------------------------------------------

    /// Render the whole document.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(4096);

        let _ = writeln!(html, "<!DOCTYPE html>");
        let _ = writeln!(
            html,
            "<html lang=\"zh-CN\" data-theme=\"{}\">",
            escape_attr(&self.theme)
        );
        let _ = writeln!(html, "<head><title>{}</title></head>", escape(&self.title));
        let _ = writeln!(html, "<body>");

        let hidden = if self.is_loading() { "" } else { " hidden" };
        let _ = writeln!(html, "<div id=\"loading-indicator\" class=\"loading{hidden}\"></div>");

        self.write_nav(&mut html);

        let _ = writeln!(html, "<main id=\"main-content\">");
        match &self.fatal {
            Some(message) => html.push_str(&FATAL_HTML.render(&MessageVars {
                message: message.clone(),
            })),
            None => self.write_pages(&mut html),
        }
        let _ = writeln!(html, "</main>");

        let _ = writeln!(html, "</body>\n</html>");
        html
    }

    fn write_nav(&self, html: &mut String) {
        let open = if self.menu_open { " active" } else { "" };
        let _ = writeln!(html, "<nav class=\"main-nav{open}\">");
        for link in &self.nav_links {
            let active = if link.active { " active" } else { "" };
            let _ = writeln!(
                html,
                "  <a href=\"#{page}\" class=\"nav-link{active}\" data-page=\"{page}\">{label}</a>",
                page = escape_attr(&link.page),
                label = escape(&link.label),
            );
        }
        let _ = writeln!(html, "</nav>");
    }

    fn write_pages(&self, html: &mut String) {
        if let Some(stats) = self.stats {
            let _ = writeln!(
                html,
                "<div id=\"homepage-stats\">\n  \
                 <div class=\"stat-item\"><div class=\"stat-number\">{}+</div><div class=\"stat-label\">精选学习资源</div></div>\n  \
                 <div class=\"stat-item\"><div class=\"stat-number\">{}</div><div class=\"stat-label\">个性化学习路径</div></div>\n  \
                 <div class=\"stat-item\"><div class=\"stat-number\">{}</div><div class=\"stat-label\">支持语言</div></div>\n\
                 </div>",
                stats.resources, stats.paths, stats.languages
            );
        }

        let _ = writeln!(html, "<div id=\"page-container\">");
        for page in self.pages.values() {
            let active = if page.active { " active" } else { "" };
            let _ = writeln!(
                html,
                "<section id=\"{id}\" class=\"page{active}\" data-page=\"{route}\">\n{body}\n</section>",
                id = escape_attr(&page.element_id()),
                route = escape_attr(&page.route),
                body = page.html.trim_end(),
            );
        }
        if let Some(panel) = &self.error_panel {
            html.push_str(&ERROR_PANEL_HTML.render(&ErrorPanelVars {
                message: panel.message.clone(),
                home: panel.home.clone(),
            }));
        }
        let _ = writeln!(html, "</div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_page_keeps_first() {
        let mut doc = Document::new();
        assert!(doc.insert_page("about", "first".into()));
        assert!(!doc.insert_page("about", "second".into()));
        assert_eq!(doc.page("about").unwrap().html, "first");
        assert_eq!(doc.page("about").unwrap().element_id(), "about-page");
    }

    #[test]
    fn test_activate_is_exclusive() {
        let mut doc = Document::new();
        doc.insert_page("home", String::new());
        doc.insert_page("about", String::new());

        assert!(doc.activate("home"));
        assert!(doc.activate("about"));
        assert!(!doc.activate("missing"));

        let active: Vec<_> = doc.pages().filter(|p| p.active).map(|p| &p.route).collect();
        assert_eq!(active, ["about"]);
    }

    #[test]
    fn test_error_panel_hides_pages_until_next_activation() {
        let mut doc = Document::new();
        doc.insert_page("home", String::new());
        doc.activate("home");

        doc.show_error("boom", "home");
        assert!(doc.active_page().is_none());
        assert_eq!(doc.error_message(), Some("boom"));
        assert_eq!(doc.error_action(), Some("home"));
        assert!(doc.to_html().contains("页面加载失败"));

        doc.activate("home");
        assert!(doc.error_message().is_none());
        assert_eq!(doc.page_count(), 1);
    }

    #[test]
    fn test_loading_indicator_counts() {
        let mut doc = Document::new();
        doc.show_loading();
        doc.show_loading();
        doc.hide_loading();
        assert!(doc.is_loading());
        doc.hide_loading();
        doc.hide_loading();
        assert!(!doc.is_loading());
    }

    #[test]
    fn test_nav_links() {
        let mut doc = Document::new();
        doc.set_nav_links([("home", "首页"), ("about", "关于项目")]);
        doc.update_nav("about");

        let active: Vec<_> = doc.nav_links().iter().filter(|l| l.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].page, "about");
        assert!(
            doc.to_html()
                .contains("class=\"nav-link active\" data-page=\"about\"")
        );
    }

    #[test]
    fn test_fatal_view_replaces_content() {
        let mut doc = Document::new();
        doc.insert_page("home", "<p>home body</p>".into());
        doc.activate("home");
        doc.show_loading();

        doc.show_fatal("config missing");
        let html = doc.to_html();
        assert!(html.contains("应用加载失败"));
        assert!(html.contains("重新加载"));
        assert!(!html.contains("home body"));
        assert!(!doc.is_loading());
    }

    #[test]
    fn test_snapshot_escapes_title_and_theme() {
        let mut doc = Document::new();
        doc.set_title("A & B");
        doc.set_theme("dark");
        let html = doc.to_html();
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("data-theme=\"dark\""));
        assert!(html.contains("class=\"loading hidden\""));
    }
}
