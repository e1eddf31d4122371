use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::*;
use crate::catalog::testing::MemorySource;
use crate::events::EventKind;

type Transitions = Arc<Mutex<Vec<(Option<String>, String)>>>;

struct Fixture {
    router: Router,
    document: SharedDocument,
    transitions: Transitions,
}

fn fixture_at(fragment: &str) -> Fixture {
    let events = Arc::new(EventBus::new());
    let transitions: Transitions = Arc::default();
    let seen = Arc::clone(&transitions);
    events.subscribe(EventKind::RouteChange, move |event| {
        if let Event::RouteChange { from, to } = event {
            seen.lock().push((from.clone(), to.clone()));
        }
        Ok(())
    });

    let document = Document::shared();
    let catalog = Arc::new(CatalogStore::new(Arc::new(MemorySource::new())));
    let router = Router::new("home", catalog, events, Arc::clone(&document)).with_location(fragment);
    Fixture {
        router,
        document,
        transitions,
    }
}

async fn ready() -> Fixture {
    let fixture = fixture_at("");
    fixture.router.initialize(None).await.unwrap();
    fixture
}

fn failing_entry(id: &str) -> RouteEntry {
    let route = id.to_string();
    RouteEntry::new(id, "Broken - 医学学习指南", "", move || {
        let route = route.clone();
        async move { Err(RenderError::new(route, "template missing")) }.boxed()
    })
}

#[tokio::test]
async fn test_initialize_loads_home_for_empty_location() {
    let f = fixture_at("");
    let nav = f.router.initialize(None).await.unwrap();

    assert_eq!(
        nav,
        Navigation::Activated {
            from: None,
            to: "home".into()
        }
    );
    assert_eq!(f.router.state(), RouterState::Ready);
    assert_eq!(f.router.route_count(), 5);
    assert_eq!(f.router.history_len(), 1);

    let doc = f.document.lock();
    assert_eq!(doc.title(), "首页 - 医学学习指南");
    assert_eq!(doc.active_page().unwrap().element_id(), "home-page");
    assert!(!doc.is_loading());
    let active: Vec<_> = doc.nav_links().iter().filter(|l| l.active).collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].page, "home");
}

#[tokio::test]
async fn test_initialize_uses_location_fragment() {
    let f = fixture_at("#about");
    f.router.initialize(None).await.unwrap();

    assert_eq!(f.router.current_route().as_deref(), Some("about"));
    assert_eq!(f.document.lock().title(), "关于项目 - 医学学习指南");
}

#[tokio::test]
async fn test_repeated_navigation_is_a_no_op() {
    let f = ready().await;

    let first = f.router.navigate("resources", true).await.unwrap();
    let second = f.router.navigate("resources", true).await.unwrap();

    assert!(matches!(first, Navigation::Activated { .. }));
    assert_eq!(second, Navigation::Unchanged);
    assert_eq!(f.router.history_len(), 2);

    let resources_events = f
        .transitions
        .lock()
        .iter()
        .filter(|(_, to)| to == "resources")
        .count();
    assert_eq!(resources_events, 1);

    let doc = f.document.lock();
    let resource_pages = doc.pages().filter(|p| p.route == "resources").count();
    assert_eq!(resource_pages, 1);
}

#[tokio::test]
async fn test_concurrent_navigation_to_same_route() {
    let f = ready().await;

    let (a, b) = tokio::join!(
        f.router.navigate("resources", true),
        f.router.navigate("resources", true)
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let activated = outcomes
        .iter()
        .filter(|n| matches!(n, Navigation::Activated { .. }))
        .count();
    assert_eq!(activated, 1);
    assert_eq!(
        f.transitions.lock().iter().filter(|(_, to)| to == "resources").count(),
        1
    );
    assert_eq!(f.document.lock().page_count(), 2);
}

#[tokio::test]
async fn test_pages_are_materialized_once() {
    let f = ready().await;
    f.router.navigate("about", true).await.unwrap();
    let first_html = f.document.lock().page("about").unwrap().html.clone();

    f.router.navigate("home", true).await.unwrap();
    f.router.navigate("about", true).await.unwrap();

    let doc = f.document.lock();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.page("about").unwrap().html, first_html);
    assert_eq!(doc.active_page().unwrap().route, "about");
}

#[tokio::test]
async fn test_transitions_carry_previous_route() {
    let f = ready().await;
    f.router.navigate("learning-paths", true).await.unwrap();
    f.router.navigate("about", true).await.unwrap();

    assert_eq!(
        *f.transitions.lock(),
        [
            (None, "home".to_string()),
            (Some("home".to_string()), "learning-paths".to_string()),
            (Some("learning-paths".to_string()), "about".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unknown_route_resolves_to_home() {
    let f = ready().await;
    f.router.navigate("about", true).await.unwrap();

    let nav = f.router.navigate("no-such-page", true).await.unwrap();
    assert_eq!(
        nav,
        Navigation::Activated {
            from: Some("about".into()),
            to: "home".into()
        }
    );
    assert_eq!(f.router.location(), "home");

    // Resolves to the active route, so nothing happens.
    let again = f.router.navigate("still-missing", true).await.unwrap();
    assert_eq!(again, Navigation::Unchanged);
}

#[tokio::test]
async fn test_pop_state_with_empty_fragment_loads_home() {
    let f = ready().await;
    f.router.navigate("about", true).await.unwrap();
    assert_eq!(f.router.history_len(), 2);

    let nav = f.router.back().await.unwrap();

    assert_eq!(
        nav,
        Some(Navigation::Activated {
            from: Some("about".into()),
            to: "home".into()
        })
    );
    assert_eq!(f.router.location(), "");
    assert_eq!(f.router.history_len(), 2);
    assert_eq!(f.document.lock().active_page().unwrap().route, "home");
}

#[tokio::test]
async fn test_back_and_forward() {
    let f = ready().await;
    f.router.navigate("resources", true).await.unwrap();
    f.router.navigate("about", true).await.unwrap();

    f.router.back().await.unwrap();
    assert_eq!(f.router.current_route().as_deref(), Some("resources"));

    f.router.forward().await.unwrap();
    assert_eq!(f.router.current_route().as_deref(), Some("about"));

    assert_eq!(f.router.forward().await.unwrap(), None);
    assert_eq!(f.router.history_len(), 3);
}

#[tokio::test]
async fn test_navigation_closes_menu_and_hides_indicator() {
    let f = ready().await;
    f.document.lock().set_menu_open(true);

    f.router.navigate("career-guide", true).await.unwrap();

    let doc = f.document.lock();
    assert!(!doc.is_menu_open());
    assert!(!doc.is_loading());
    assert_eq!(doc.title(), "职业规划 - 医学学习指南");
}

#[tokio::test]
async fn test_missing_home_is_a_configuration_error() {
    let f = fixture_at("#about");
    let mut pages = IndexMap::new();
    pages.insert(
        "about".to_string(),
        PageConfig {
            title: "About".into(),
            description: String::new(),
        },
    );
    f.router.initialize(Some(&pages)).await.unwrap();

    let err = f.router.navigate("missing", true).await.unwrap_err();

    assert!(matches!(err, RouterError::Configuration { .. }));
    assert_eq!(f.router.state(), RouterState::ErrorDisplayed);
    let doc = f.document.lock();
    assert!(doc.error_message().is_some());
    assert!(!doc.is_loading());
}

#[tokio::test]
async fn test_initialize_without_home_fails() {
    let f = fixture_at("");
    let mut pages = IndexMap::new();
    pages.insert("about".to_string(), PageConfig::default());

    // Empty location resolves to `home`, which is not registered.
    let err = f.router.initialize(Some(&pages)).await.unwrap_err();
    assert_eq!(
        err,
        RouterError::Configuration {
            requested: "home".into(),
            home: "home".into()
        }
    );
}

#[tokio::test]
async fn test_producer_failure_shows_error_view() {
    let f = ready().await;
    f.router.register(failing_entry("broken"));

    let nav = f.router.navigate("broken", true).await.unwrap();

    let Navigation::Failed(err) = nav else {
        panic!("expected a render failure, got {nav:?}");
    };
    assert_eq!(err.route, "broken");
    assert_eq!(f.router.state(), RouterState::ErrorDisplayed);
    assert_eq!(f.router.current_route(), None);
    {
        let doc = f.document.lock();
        assert!(doc.active_page().is_none());
        assert!(!doc.is_loading());
        assert!(doc.error_message().unwrap().contains("template missing"));
        assert_eq!(doc.error_action(), Some("home"));
        assert!(!doc.has_page("broken"));
    }
    // No routeChange for the failed navigation.
    assert_eq!(f.transitions.lock().len(), 1);

    let back_home = f.router.return_home().await.unwrap();
    assert_eq!(
        back_home,
        Navigation::Activated {
            from: None,
            to: "home".into()
        }
    );
    assert_eq!(f.router.state(), RouterState::Ready);
    assert!(f.document.lock().error_message().is_none());
}

#[tokio::test]
async fn test_superseded_navigation_caches_but_does_not_activate() {
    let f = ready().await;

    let gate = Arc::new(Notify::new());
    let waiter = Arc::clone(&gate);
    f.router.register(RouteEntry::new("slow", "Slow", "", move || {
        let waiter = Arc::clone(&waiter);
        async move {
            waiter.notified().await;
            Ok(String::from("<p>slow</p>"))
        }
        .boxed()
    }));

    let slow = f.router.navigate("slow", true);
    let fast = async {
        tokio::task::yield_now().await;
        let nav = f.router.navigate("about", true).await;
        gate.notify_one();
        nav
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), Navigation::Superseded);
    assert!(matches!(fast.unwrap(), Navigation::Activated { .. }));

    assert_eq!(f.router.current_route().as_deref(), Some("about"));
    assert_eq!(f.router.state(), RouterState::Ready);
    {
        let doc = f.document.lock();
        assert!(doc.has_page("slow"));
        assert!(!doc.page("slow").unwrap().active);
        assert_eq!(doc.active_page().unwrap().route, "about");
        assert!(!doc.is_loading());
    }
    let targets: Vec<_> = f.transitions.lock().iter().map(|(_, to)| to.clone()).collect();
    assert_eq!(targets, ["home", "about"]);

    // The cached page is reused without running the producer again.
    let nav = f.router.navigate("slow", true).await.unwrap();
    assert!(matches!(nav, Navigation::Activated { .. }));
}

#[tokio::test]
async fn test_returning_to_active_route_supersedes_pending_load() {
    let f = ready().await;

    let gate = Arc::new(Notify::new());
    let waiter = Arc::clone(&gate);
    f.router.register(RouteEntry::new("slow", "Slow", "", move || {
        let waiter = Arc::clone(&waiter);
        async move {
            waiter.notified().await;
            Ok(String::from("<p>slow</p>"))
        }
        .boxed()
    }));

    let slow = f.router.navigate("slow", true);
    let home = async {
        tokio::task::yield_now().await;
        let nav = f.router.navigate("home", true).await;
        gate.notify_one();
        nav
    };
    let (slow, home) = tokio::join!(slow, home);

    assert_eq!(home.unwrap(), Navigation::Unchanged);
    assert_eq!(slow.unwrap(), Navigation::Superseded);

    assert_eq!(f.router.current_route().as_deref(), Some("home"));
    assert_eq!(f.router.location(), "home");
    assert_eq!(f.router.state(), RouterState::Ready);
    {
        let doc = f.document.lock();
        assert_eq!(doc.active_page().unwrap().route, "home");
        assert_eq!(doc.title(), "首页 - 医学学习指南");
        assert!(doc.has_page("slow"));
        assert!(!doc.is_loading());
    }
    let targets: Vec<_> = f.transitions.lock().iter().map(|(_, to)| to.clone()).collect();
    assert_eq!(targets, ["home"]);
}

#[tokio::test]
async fn test_pending_target_counts_as_latest() {
    let f = ready().await;

    let gate = Arc::new(Notify::new());
    let waiter = Arc::clone(&gate);
    f.router.register(RouteEntry::new("slow", "Slow", "", move || {
        let waiter = Arc::clone(&waiter);
        async move {
            waiter.notified().await;
            Ok(String::from("<p>slow</p>"))
        }
        .boxed()
    }));

    let first = f.router.navigate("slow", true);
    let second = async {
        tokio::task::yield_now().await;
        let nav = f.router.navigate("slow", true).await;
        gate.notify_one();
        nav
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(second.unwrap(), Navigation::Unchanged);
    assert!(matches!(first.unwrap(), Navigation::Activated { .. }));
    assert_eq!(f.router.current_route().as_deref(), Some("slow"));
    assert_eq!(f.router.history_len(), 2);
}

#[tokio::test]
async fn test_pop_state_reloads_active_route() {
    let f = ready().await;

    let nav = f.router.handle_pop_state().await.unwrap();

    assert_eq!(
        nav,
        Navigation::Activated {
            from: Some("home".into()),
            to: "home".into()
        }
    );
    assert_eq!(f.router.state(), RouterState::Ready);
    assert_eq!(f.router.history_len(), 1);
    assert_eq!(f.document.lock().page_count(), 1);
    assert_eq!(f.transitions.lock().len(), 2);
}
