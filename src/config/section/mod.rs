//! Configuration section definitions.
//!
//! Each module corresponds to a section in `mlg.toml`:
//!
//! | Module     | TOML Section   | Purpose                              |
//! |------------|----------------|--------------------------------------|
//! | `app`      | `[app]`        | Name, version, storage location      |
//! | `data`     | `[data]`       | Dataset root, remote base URL        |
//! | `features` | `[features]`   | Feature switches                     |
//! | `language` | `[language]`   | Default and supported languages      |
//! | `routing`  | `[routing]`    | Route table (`[routing.pages.<id>]`) |
//! | `serve`    | `[serve]`      | Development server                   |
//! | `theme`    | `[theme]`      | Available and default themes         |

mod app;
mod data;
mod features;
mod language;
mod routing;
mod serve;
mod theme;

pub use app::AppConfig;
pub use data::DataConfig;
pub use features::FeaturesConfig;
pub use language::LanguageConfig;
pub use routing::{PageConfig, RoutingConfig};
pub use serve::{ServeConfig, StaticMapping};
pub use theme::ThemeConfig;
