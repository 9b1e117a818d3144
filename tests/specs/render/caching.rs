//! Rendered-result caching as a hosting server sees it: warm hits,
//! bypasses, invalidation on publish.

use crate::prelude::*;
use std::sync::atomic::Ordering;
use tessera_cache::CacheDirectives;

#[tokio::test]
async fn a_warm_cache_serves_repeat_requests_without_rendering() {
    let (engine, calls) = counting_engine();

    let first = engine
        .render(PAGE, &page_directives(), &index_request())
        .unwrap();
    let second = engine
        .render(PAGE, &page_directives(), &index_request())
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn each_uri_is_its_own_cache_entry() {
    let (engine, calls) = counting_engine();

    engine
        .render(PAGE, &page_directives(), &index_request())
        .unwrap();
    engine
        .render(
            PAGE,
            &page_directives(),
            &tessera_template::RequestContext::for_uri("/about.html"),
        )
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(engine.results().len(), 2);
}

#[tokio::test]
async fn uncacheable_elements_render_every_request() {
    let (engine, calls) = counting_engine();
    let directives = CacheDirectives::uncacheable();

    engine.render(PAGE, &directives, &index_request()).unwrap();
    engine.render(PAGE, &directives, &index_request()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(engine.results().is_empty());
}

#[tokio::test]
async fn a_dynamic_parameter_forces_a_bypass() {
    let (engine, calls) = counting_engine();
    let directives = page_directives().dynamic_parameter("preview");

    let plain = index_request();
    let previewing = index_request().with_parameter("preview", "1");

    engine.render(PAGE, &directives, &plain).unwrap();
    engine.render(PAGE, &directives, &previewing).unwrap();
    engine.render(PAGE, &directives, &previewing).unwrap();

    // only the plain request was cached; both previews rendered fresh
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(engine.results().len(), 1);
}

#[tokio::test]
async fn a_sub_element_policy_only_narrows_cacheability() {
    let mut page = page_directives();
    let sub = CacheDirectives::uncacheable();
    page.merge(&sub);
    assert!(!page.is_internal_cacheable());

    let (engine, calls) = counting_engine();
    engine.render(PAGE, &page, &index_request()).unwrap();
    engine.render(PAGE, &page, &index_request()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn publishing_clears_results_so_the_next_request_re_renders() {
    let (engine, calls) = counting_engine();

    engine
        .render(PAGE, &page_directives(), &index_request())
        .unwrap();
    // a publish event clears the rendered-result cache
    engine.results().clear_all();
    engine
        .render(PAGE, &page_directives(), &index_request())
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn user_keyed_elements_separate_users_not_uris() {
    let (mut engine, _vfs) = engine_with(
        "<xmltemplate><template>Hello <method name=\"userName\"/></template></xmltemplate>",
    );
    engine.register_method("userName", |request, _| {
        Ok(tessera_template::HandlerValue::Text(request.user.clone()))
    });
    let directives = CacheDirectives::cacheable().key_user();

    let admin = index_request().with_user("Admin", "Administrators");
    let guest = index_request().with_user("Guest", "Guests");

    let a = engine.render(PAGE, &directives, &admin).unwrap();
    let g = engine.render(PAGE, &directives, &guest).unwrap();
    let a2 = engine.render(PAGE, &directives, &admin).unwrap();

    assert_eq!(String::from_utf8(a.clone()).unwrap(), "Hello Admin");
    assert_eq!(String::from_utf8(g).unwrap(), "Hello Guest");
    assert_eq!(a, a2);
    assert_eq!(engine.results().len(), 2);
}
