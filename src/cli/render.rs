//! `mlg render`: drive the app headlessly and print the document.

use std::sync::Arc;

use anyhow::Result;

use super::query::open_catalog;
use crate::app::App;
use crate::config::SiteConfig;
use crate::router::Navigation;
use crate::storage::PersistentStore;
use crate::{debug, log};

/// Start the app, visit `routes` in order, then step back `back` entries.
/// Returns the document snapshot.
pub async fn render_routes(config: SiteConfig, routes: &[String], back: usize) -> Result<String> {
    let catalog = open_catalog(&config)?;
    let storage = Arc::new(PersistentStore::open(&config.app.storage));
    let app = App::new(config, storage, catalog);

    app.start().await?;

    for route in routes {
        let navigation = app.router().navigate(route, true).await?;
        report(route, &navigation);
    }

    for step in 0..back {
        match app.router().back().await? {
            Some(navigation) => report("(back)", &navigation),
            None => {
                debug!("router"; "history start reached after {} steps", step);
                break;
            }
        }
    }

    let html = app.document().lock().to_html();
    Ok(html)
}

fn report(requested: &str, navigation: &Navigation) {
    match navigation {
        Navigation::Activated { to, .. } if to != requested => {
            log!("router"; "{} resolved to {}", requested, to)
        }
        Navigation::Failed(err) => log!("warning"; "{}", err),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> SiteConfig {
        let data = dir.path().join("public/data/categories");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("basic_sciences.json"),
            r#"{"resources": [{"id": "a1", "title": "Anatomy", "category": "basic_sciences", "rating": 4.5}]}"#,
        )
        .unwrap();

        let mut config = SiteConfig {
            root: dir.path().to_path_buf(),
            ..SiteConfig::default()
        };
        config.normalize_paths();
        config
    }

    #[tokio::test]
    async fn test_render_home_by_default() {
        let dir = TempDir::new().unwrap();
        let html = render_routes(config_in(&dir), &[], 0).await.unwrap();

        assert!(html.contains("<title>首页 - 医学学习指南</title>"));
        assert!(html.contains("class=\"page active\" data-page=\"home\""));
        assert!(html.contains("id=\"homepage-stats\""));
    }

    #[tokio::test]
    async fn test_render_routes_then_back() {
        let dir = TempDir::new().unwrap();
        let routes = ["resources".to_string(), "about".to_string()];
        let html = render_routes(config_in(&dir), &routes, 1).await.unwrap();

        assert!(html.contains("class=\"page active\" data-page=\"resources\""));
        assert!(html.contains("data-resource=\"a1\""));
        assert!(html.contains("data-page=\"about\""));
        assert!(!html.contains("class=\"page active\" data-page=\"about\""));
    }

    #[tokio::test]
    async fn test_back_past_start_stops() {
        let dir = TempDir::new().unwrap();
        let routes = ["about".to_string()];
        let html = render_routes(config_in(&dir), &routes, 5).await.unwrap();
        assert!(html.contains("class=\"page active\" data-page=\"home\""));
    }

    #[tokio::test]
    async fn test_render_restores_stored_theme() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        PersistentStore::open(&config.app.storage)
            .set(crate::app::THEME_KEY, "dark")
            .unwrap();

        let html = render_routes(config, &[], 0).await.unwrap();
        assert!(html.contains("data-theme=\"dark\""));
    }
}
