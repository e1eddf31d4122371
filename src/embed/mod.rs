//! Embedded HTML templates.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server error pages (403, 404, 405, 500)
//! - `page` - Router page bodies, the inline error view and the fatal view
//!
//! Placeholder values are HTML-escaped by the `TemplateVars` impls, so
//! callers pass raw text.
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{NOT_FOUND_HTML, NotFoundVars};
//!
//! let html = NOT_FOUND_HTML.render(&NotFoundVars { path: "/missing.css".into() });
//! ```

mod template;

pub use template::{Template, TemplateVars};

use crate::utils::html::escape;

/// Variables for templates that show an error message.
pub struct MessageVars {
    pub message: String,
}

impl TemplateVars for MessageVars {
    fn apply(&self, content: &str) -> String {
        content.replace("__MESSAGE__", &escape(&self.message))
    }
}

pub mod serve {
    use super::{MessageVars, Template, TemplateVars, escape};

    /// Variables for 404.html.
    pub struct NotFoundVars {
        pub path: String,
    }

    impl TemplateVars for NotFoundVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__PATH__", &escape(&self.path))
        }
    }

    pub const FORBIDDEN_HTML: Template<()> = Template::new(include_str!("serve/403.html"));

    pub const NOT_FOUND_HTML: Template<NotFoundVars> =
        Template::new(include_str!("serve/404.html"));

    pub const METHOD_NOT_ALLOWED_HTML: Template<()> =
        Template::new(include_str!("serve/405.html"));

    pub const SERVER_ERROR_HTML: Template<MessageVars> =
        Template::new(include_str!("serve/500.html"));
}

pub mod page {
    use super::{MessageVars, Template, TemplateVars, escape};

    /// Variables for the learning paths page. `cards` is trusted markup.
    pub struct PathCardsVars {
        pub cards: String,
    }

    impl TemplateVars for PathCardsVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__PATH_CARDS__", &self.cards)
        }
    }

    /// Variables for the resources page. `cards` is trusted markup.
    pub struct ResourceCardsVars {
        pub cards: String,
    }

    impl TemplateVars for ResourceCardsVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__RESOURCE_CARDS__", &self.cards)
        }
    }

    /// Variables for the inline error view.
    pub struct ErrorPanelVars {
        pub message: String,
        pub home: String,
    }

    impl TemplateVars for ErrorPanelVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__MESSAGE__", &escape(&self.message))
                .replace("__HOME__", &escape(&self.home))
        }
    }

    pub const LEARNING_PATHS_HTML: Template<PathCardsVars> =
        Template::new(include_str!("page/learning-paths.html"));

    pub const RESOURCES_HTML: Template<ResourceCardsVars> =
        Template::new(include_str!("page/resources.html"));

    pub const CAREER_GUIDE_HTML: Template<()> =
        Template::new(include_str!("page/career-guide.html"));

    pub const ABOUT_HTML: Template<()> = Template::new(include_str!("page/about.html"));

    /// Body for routes without a dedicated page.
    pub const DEFAULT_HTML: Template<()> = Template::new(include_str!("page/default.html"));

    pub const ERROR_PANEL_HTML: Template<ErrorPanelVars> =
        Template::new(include_str!("page/error.html"));

    pub const FATAL_HTML: Template<MessageVars> =
        Template::new(include_str!("page/fatal.html"));
}
