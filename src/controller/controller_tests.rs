use super::*;
use crate::render::{Layer, Scene};
use crate::test_harness::{sample_corpus, sample_controller};
use std::sync::Mutex;

fn plain_controller() -> Controller<Scene> {
    Controller::new(sample_corpus(), CanvasConfig::default(), Scene::new(), 800.0, 600.0)
}

fn match_bounds(c: &Controller<Scene>, match_index: usize) -> (f64, f64, f64) {
    let found = c.active_matches().and_then(|m| m.get(match_index)).cloned().unwrap();
    let (column, row) = c.layout().columns.locate(found.line_index).unwrap();
    let (x, y) = c.metrics().char_position(column, row, found.start_char);
    (x, x + found.char_len() as f64 * c.metrics().char_width, y)
}

// ===== Viewport =====

#[test]
fn starts_fitted_and_renders_once() {
    let mut c = plain_controller();
    assert_eq!(c.viewport().zoom, c.fit_zoom());
    assert!(c.render_frame());
    assert!(!c.render_frame());
    assert_eq!(c.last_frame_stats().visible_lines, 6);
    assert_eq!(c.surface().attached(Layer::Text).len(), 6);
}

#[test]
fn zoom_about_focal_point_keeps_world_point() {
    let mut c = plain_controller();
    let focal = (123.0, 456.0);
    let before = c.viewport().screen_to_world(focal.0, focal.1);
    c.set_zoom(2.5, Some(focal));
    let after = c.viewport().screen_to_world(focal.0, focal.1);
    assert!((before.0 - after.0).abs() < 1e-9);
    assert!((before.1 - after.1).abs() < 1e-9);
    assert_eq!(c.viewport().text_resolution, 3);
}

#[test]
fn zoom_without_focal_keeps_offset_and_is_clamped() {
    let mut c = plain_controller();
    let offset = (c.viewport().offset_x, c.viewport().offset_y);
    c.set_zoom(1000.0, None);
    assert_eq!(c.viewport().zoom, c.config().viewport.zoom_max);
    assert_eq!((c.viewport().offset_x, c.viewport().offset_y), offset);

    c.set_zoom(f64::NAN, None);
    assert_eq!(c.viewport().zoom, c.config().viewport.zoom_max);
}

#[test]
fn zoom_observers_see_every_change() {
    let mut c = plain_controller();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    c.on_zoom_changed(move |z| sink.lock().unwrap().push(z));

    c.set_zoom(2.0, None);
    c.set_zoom(2.0, None);
    c.zoom_by(1.5, None);
    assert_eq!(*seen.lock().unwrap(), vec![2.0, 3.0]);
}

#[test]
fn small_pans_are_coalesced() {
    let mut c = plain_controller();
    c.render_frame();
    c.pan(0.4, 0.0);
    assert!(!c.render_frame());
    c.pan(0.7, 0.0);
    assert!(c.render_frame());
    c.set_zoom(c.viewport().zoom * 1.0005, None);
    assert!(!c.render_frame());
}

#[test]
fn zoom_coalescing_is_relative_to_current_zoom() {
    let mut c = plain_controller();
    let zoom_min = c.config().viewport.zoom_min;
    c.set_zoom(zoom_min, None);
    c.render_frame();
    c.set_zoom(zoom_min * 1.05, None);
    assert!(c.render_frame());

    c.set_zoom(8.0, None);
    c.render_frame();
    c.set_zoom(8.004, None);
    assert!(!c.render_frame());
}

#[test]
fn surface_transform_follows_viewport_even_when_coalesced() {
    let mut c = plain_controller();
    c.render_frame();
    c.pan(0.25, 0.0);
    c.render_frame();
    assert_eq!(c.surface().offset().0, c.viewport().offset_x);
}

#[test]
fn reset_view_centers_current_zoom() {
    let mut c = plain_controller();
    c.set_zoom(0.5, None);
    c.pan(300.0, -200.0);
    c.reset_view();
    let (cx, cy) = c
        .viewport()
        .world_to_screen(c.metrics().total_width() / 2.0, c.metrics().total_height() / 2.0);
    assert!((cx - 400.0).abs() < 1e-9);
    assert!((cy - 300.0).abs() < 1e-9);
    assert_eq!(c.viewport().zoom, 0.5);
}

#[test]
fn resize_snaps_only_from_fit() {
    let mut c = plain_controller();
    c.handle_resize(400.0, 300.0);
    assert_eq!(c.viewport().zoom, c.fit_zoom());

    c.set_zoom(c.fit_zoom() * 2.0, None);
    let zoom = c.viewport().zoom;
    c.handle_resize(1000.0, 700.0);
    assert_eq!(c.viewport().zoom, zoom);
    assert_ne!(c.fit_zoom(), zoom);
}

// ===== Exact search =====

#[test]
fn exact_search_counts_and_highlights() {
    let mut c = plain_controller();
    assert_eq!(c.search("was"), 3);
    assert_eq!(c.search_mode(), SearchMode::Exact);
    c.render_frame();
    assert_eq!(c.last_frame_stats().highlights, 3);
    assert_eq!(c.surface().attached(Layer::Highlight).len(), 3);
}

#[test]
fn short_term_clears_search() {
    let mut c = plain_controller();
    c.search("temple");
    assert_eq!(c.search("te"), 0);
    assert_eq!(c.search_mode(), SearchMode::None);
    c.render_frame();
    assert_eq!(c.surface().attached(Layer::Highlight).len(), 0);
}

#[test]
fn next_match_wraps() {
    let mut c = plain_controller();
    c.search("temple");
    let visited: Vec<Option<usize>> = (0..3).map(|_| c.jump_to_next_match()).collect();
    assert_eq!(visited, vec![Some(0), Some(1), Some(0)]);
    assert_eq!(c.current_match_index(), Some(0));
}

#[test]
fn jump_zooms_in_and_centers_match() {
    let mut c = plain_controller();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    c.on_zoom_changed(move |z| sink.lock().unwrap().push(z));

    c.search("temple");
    c.jump_to_match_and_zoom(1).unwrap();

    assert_eq!(c.viewport().zoom, c.config().viewport.jump_zoom_max);
    assert_eq!(*seen.lock().unwrap(), vec![c.config().viewport.jump_zoom_max]);

    let (left, right, top) = match_bounds(&c, 1);
    let (wx, wy) = c.viewport().screen_to_world(400.0, 300.0);
    assert!(left <= wx && wx <= right);
    assert!(top <= wy && wy <= top + c.metrics().line_height);
}

#[test]
fn jump_to_unknown_match_fails() {
    let mut c = plain_controller();
    assert_eq!(c.jump_to_match_and_zoom(0), Err(ControllerError::UnknownMatch(0)));
    c.search("temple");
    assert_eq!(c.jump_to_match_and_zoom(7), Err(ControllerError::UnknownMatch(7)));
}

#[test]
fn clear_search_twice_is_a_no_op() {
    let mut c = plain_controller();
    c.search("was");
    c.render_frame();
    c.clear_search();
    c.clear_search();
    assert_eq!(c.search_result_count(), 0);
    assert_eq!(c.current_match_index(), None);
    c.render_frame();
    assert_eq!(c.surface().attached(Layer::Highlight).len(), 0);
}

#[test]
fn clicking_a_highlight_jumps_to_it() {
    let mut c = plain_controller();
    let clicked = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&clicked);
    c.on_highlight_click(move |i| sink.lock().unwrap().push(i));
    c.search("temple");
    c.render_frame();

    let id = c.surface().attached(Layer::Highlight)[0];
    let rect = c.surface().rect(id).map(|r| r.rect).unwrap();
    let (sx, sy) = c
        .surface()
        .to_screen(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);

    let hit = c.handle_click(sx, sy).unwrap();
    assert_eq!(*clicked.lock().unwrap(), vec![hit]);
    assert_eq!(c.current_match_index(), Some(hit));
    assert_eq!(c.viewport().zoom, c.config().viewport.jump_zoom_max);
    assert_eq!(c.handle_click(-1000.0, -1000.0), None);
}

// ===== Verses and view modes =====

#[test]
fn verse_info_and_jump() {
    let mut c = plain_controller();
    let info = c.get_verse_info(3).unwrap();
    assert_eq!(info.reference, "Alma 1:1");
    assert_eq!(info.book.as_deref(), Some("Alma"));
    assert_eq!(info.lines, 3..4);
    assert!(c.get_verse_info(6).is_none());

    c.jump_to_verse(3).unwrap();
    let (_, wy) = c.viewport().screen_to_world(400.0, 300.0);
    assert!((wy - (c.metrics().row_y(3) + c.metrics().line_height / 2.0)).abs() < 1e-9);
    assert_eq!(c.jump_to_verse(99), Err(ControllerError::UnknownVerse(99)));
}

#[test]
fn single_book_view_relayouts() {
    let mut c = plain_controller();
    c.search("temple");
    c.set_view_mode(ViewMode::SingleBook(1)).unwrap();
    assert_eq!(c.view_corpus().len(), 3);
    assert_eq!(c.layout().text.line_count(), 3);
    assert_eq!(c.search_mode(), SearchMode::None);
    assert_eq!(c.search("temple"), 2);

    assert_eq!(
        c.set_view_mode(ViewMode::SingleBook(9)),
        Err(ControllerError::UnknownBook(9))
    );
    assert_eq!(c.view_mode(), ViewMode::SingleBook(1));

    c.set_view_mode(ViewMode::AllBooks).unwrap();
    assert_eq!(c.layout().text.line_count(), 6);
}

#[test]
fn destroy_empties_the_surface() {
    let mut c = plain_controller();
    c.search("was");
    c.render_frame();
    c.destroy();
    assert_eq!(c.surface().live_count(), 0);
    assert_eq!(c.search_mode(), SearchMode::None);
}

// ===== Semantic search =====

#[tokio::test]
async fn semantic_search_applies_verse_matches() {
    let mut c = sample_controller(false);
    let count = c.search_semantic("the temple", None, Some(0.3)).await.unwrap();
    assert_eq!(count, 3);
    assert_eq!(c.search_mode(), SearchMode::Semantic);
    let order: Vec<usize> = c.semantic_results().iter().map(|v| v.verse_index).collect();
    assert_eq!(order, vec![5, 2, 4]);
    assert_eq!(c.semantic_query(), Some("the temple"));

    assert_eq!(c.jump_to_next_semantic_match(), Some(5));
    assert_eq!(c.jump_to_next_semantic_match(), Some(2));
    assert_eq!(c.current_semantic_verse(), Some(2));

    c.render_frame();
    assert_eq!(c.last_frame_stats().highlights, 3);
}

#[tokio::test]
async fn semantic_search_clears_exact_and_back() {
    let mut c = sample_controller(false);
    c.search("temple");
    c.search_semantic("peace", Some(2), None).await.unwrap();
    assert_eq!(c.search_result_count(), 0);
    assert_eq!(c.semantic_result_count(), 2);

    c.search("temple");
    assert_eq!(c.semantic_result_count(), 0);
    assert_eq!(c.search_mode(), SearchMode::Exact);
}

#[tokio::test]
async fn superseded_semantic_results_are_discarded() {
    let mut c = sample_controller(true);
    let first = c.begin_semantic_search("father", None, None).unwrap();
    let second = c.begin_semantic_search("temple", Some(1), None).unwrap();
    assert!(second.token() > first.token());

    let stale = first.run().await;
    assert_eq!(c.finish_semantic_search(stale).unwrap(), None);
    assert_eq!(c.search_mode(), SearchMode::None);

    let fresh = second.run().await;
    assert_eq!(c.finish_semantic_search(fresh).unwrap(), Some(1));
    assert_eq!(c.semantic_results()[0].verse_index, 5);
}

#[tokio::test]
async fn clear_discards_in_flight_search() {
    let mut c = sample_controller(false);
    let ticket = c.begin_semantic_search("temple", None, None).unwrap();
    c.clear_search();
    let outcome = ticket.run().await;
    assert_eq!(c.finish_semantic_search(outcome).unwrap(), None);
    assert_eq!(c.semantic_result_count(), 0);
}

#[tokio::test]
async fn spawned_ticket_applies_on_return() {
    let mut c = sample_controller(true);
    let ticket = c.begin_semantic_search("peace", Some(3), None).unwrap();
    let outcome = tokio::spawn(ticket.run()).await.unwrap();
    assert_eq!(c.finish_semantic_search(outcome).unwrap(), Some(3));
}

#[test]
fn semantic_search_requires_all_books_and_an_engine() {
    let mut c = sample_controller(false);
    c.set_view_mode(ViewMode::SingleBook(0)).unwrap();
    assert_eq!(
        c.begin_semantic_search("temple", None, None).err(),
        Some(ControllerError::SemanticNotInView)
    );

    let mut bare = plain_controller();
    assert_eq!(
        bare.begin_semantic_search("temple", None, None).err(),
        Some(ControllerError::NoSemanticEngine)
    );
}

#[tokio::test]
async fn cross_refs_for_exact_match() {
    let mut c = sample_controller(false);
    c.search("temple");
    // Match 0 sits in verse 4, "They built a great temple".
    let refs = c.get_auto_cross_refs_for_match(0, 0.5, 2).await.unwrap();
    let got: Vec<(usize, &str)> = refs.iter().map(|r| (r.verse_index, r.reference.as_str())).collect();
    assert_eq!(got, vec![(3, "Alma 1:1"), (5, "Alma 1:3")]);

    assert_eq!(
        c.get_auto_cross_refs_for_match(9, 0.5, 2).await,
        Err(ControllerError::UnknownMatch(9))
    );
}
