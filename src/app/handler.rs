//! Event handling and state transition logic.
//!
//! This module implements the engine's single transition function. Events come
//! from four places: the router (directory changes, history pops), the grid
//! (end reached, tile clicks), the viewer widget (slide changes, close) and the
//! worker thread (page and details responses). [`handle_event`] applies one
//! event to [`AppState`] and returns whether observers must re-render together
//! with the actions the runtime has to execute.
//!
//! # Synchronization rules
//!
//! - Opening from the grid pushes one history entry. Moving between slides and
//!   closing replace the current entry.
//! - Changes coming from history (`LocationPopped`, `DirectoryChanged`) are
//!   adopted without writing history.
//! - Widget events echoing a transition the engine already made (a close after a
//!   pop, a change to the slide already shown) are ignored.
//! - Worker responses for an earlier directory session are dropped.
//!
//! # Example
//!
//! ```rust
//! use galleria::app::{handle_event, Action, AppState, EngineOptions, Event};
//! use galleria::domain::DirectoryKey;
//! use galleria::storage::DisplaySettings;
//!
//! let mut state = AppState::new(DisplaySettings::default(), EngineOptions::default(), None);
//! let (render, actions) = handle_event(
//!     &mut state,
//!     &Event::DirectoryChanged { dir: DirectoryKey::new("2024/05"), src: None },
//! )?;
//! assert!(render);
//! assert!(matches!(actions.as_slice(), [Action::PostToWorker(_)]));
//! # Ok::<(), galleria::GalleryError>(())
//! ```

use super::navigation::HistoryMode;
use super::pagination::PageOutcome;
use super::state::DetailsView;
use super::viewer::{CloseReason, ViewerEffect, ViewerState};
use crate::app::{Action, AppState};
use crate::domain::error::Result;
use crate::domain::DirectoryKey;
use crate::storage::DisplaySettings;
use crate::worker::{WorkerMessage, WorkerResponse};

/// Events delivered to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The router entered a directory. Also sent once at mount, with the
    /// location's `src` as a possible deep link.
    DirectoryChanged {
        dir: DirectoryKey,
        src: Option<String>,
    },

    /// The grid scrolled to its end while showing `dir`.
    EndReached {
        dir: DirectoryKey,
    },

    /// Reload the current directory from the first page.
    Refresh,

    /// The user clicked the tile at this index.
    OpenAt(usize),

    /// The viewer widget moved to another slide.
    ViewerChanged(usize),

    /// The viewer widget closed itself.
    ViewerClosed,

    /// Back/forward moved to a location whose `src` is this value.
    LocationPopped {
        src: Option<String>,
    },

    /// The details button of the open viewer was pressed.
    ShowDetails,

    /// The user changed the display preferences.
    SettingsChanged(DisplaySettings),

    /// Wraps a response from the background worker thread.
    WorkerResponse(WorkerResponse),
}

/// Processes an event, mutates application state, and returns actions to execute.
///
/// # Returns
///
/// `(should_render, actions)`. `should_render` is `true` after every committed
/// transition observers can see; ignored and stale events return `false`.
///
/// # Errors
///
/// Reserved for runtime plumbing failures. No event is fatal: network errors
/// and stale responses are absorbed into the state.
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::DirectoryChanged { dir, src } => {
            state.location.on_navigate(src.clone());
            state.details = None;

            if state.session.is_active() && state.session.dir() == dir {
                tracing::debug!(dir = %dir, "same directory, reconciling location only");
                let mut actions = reconcile_viewer(state, src.as_deref());
                actions.extend(continue_pending_search(state));
                return Ok((true, actions));
            }

            let recursive = state.settings.files_recursive;
            let actions = start_session(state, dir.clone(), recursive);
            Ok((true, actions))
        }

        Event::EndReached { dir } => {
            let actions: Vec<Action> = request_next_page(state, dir).into_iter().collect();
            Ok((!actions.is_empty(), actions))
        }

        Event::Refresh => {
            let dir = state.session.dir().clone();
            let recursive = state.settings.files_recursive;
            tracing::debug!(dir = %dir, "refreshing directory");
            let actions = start_session(state, dir, recursive);
            Ok((true, actions))
        }

        Event::OpenAt(index) => {
            let Some(item) = state.session.store().get(*index) else {
                tracing::debug!(index, "open for an index that is not loaded");
                return Ok((false, vec![]));
            };
            let id = item.id.clone();

            let mode = if state.viewer.is_open() {
                HistoryMode::Replace
            } else {
                HistoryMode::Push
            };

            tracing::debug!(index, src = %id, "opening viewer");
            let mut actions: Vec<Action> = write_location(state, Some(id), mode).into_iter().collect();
            let effects = state.viewer.open(*index);
            apply_viewer_effects(state, effects, &mut actions);
            Ok((true, actions))
        }

        Event::ViewerChanged(index) => {
            let Some(id) = state.session.store().get(*index).map(|item| item.id.clone()) else {
                tracing::debug!(index, "viewer changed to an index that is not loaded");
                return Ok((false, vec![]));
            };

            if !state.viewer.change(*index) {
                tracing::trace!(index, "viewer change ignored");
                return Ok((false, vec![]));
            }

            let actions = write_location(state, Some(id), HistoryMode::Replace).into_iter().collect();
            Ok((true, actions))
        }

        Event::ViewerClosed => {
            if !state.viewer.is_open() {
                tracing::trace!("viewer already closed, ignoring widget close");
                return Ok((false, vec![]));
            }

            let mut actions: Vec<Action> = write_location(state, None, HistoryMode::Replace).into_iter().collect();
            let effects = state.viewer.close(CloseReason::Widget);
            apply_viewer_effects(state, effects, &mut actions);
            Ok((true, actions))
        }

        Event::LocationPopped { src } => {
            if !state.location.on_pop(src.clone()) && !matches!(state.viewer.state(), ViewerState::Pending { .. }) {
                tracing::trace!("popped location matches current, nothing to do");
                return Ok((false, vec![]));
            }

            let mut actions = reconcile_viewer(state, src.as_deref());
            actions.extend(continue_pending_search(state));
            Ok((true, actions))
        }

        Event::ShowDetails => {
            let Some(index) = state.viewer.open_index() else {
                tracing::debug!("details requested with no open viewer");
                return Ok((false, vec![]));
            };
            let Some(src) = state.session.store().get(index).map(|item| item.display_src.clone()) else {
                return Ok((false, vec![]));
            };

            let mut actions: Vec<Action> = write_location(state, None, HistoryMode::Replace).into_iter().collect();
            let effects = state.viewer.close(CloseReason::Location);
            apply_viewer_effects(state, effects, &mut actions);

            tracing::debug!(src = %src, index, "showing details");
            state.details = Some(DetailsView::Loading { path: src.clone() });
            actions.push(Action::NavigateToDetails {
                src: src.clone(),
                dir: state.session.dir().clone(),
                index,
            });
            actions.push(Action::PostToWorker(WorkerMessage::fetch_details(src)));
            Ok((true, actions))
        }

        Event::SettingsChanged(settings) => {
            if &state.settings == settings {
                return Ok((false, vec![]));
            }

            let previous = std::mem::replace(&mut state.settings, *settings);
            tracing::debug!(old = ?previous, new = ?settings, "display settings changed");

            let mut actions = vec![Action::SaveSettings(*settings)];
            if previous.files_recursive != settings.files_recursive && state.session.is_active() {
                let dir = state.session.dir().clone();
                actions.extend(start_session(state, dir, settings.files_recursive));
            }
            Ok((true, actions))
        }

        Event::WorkerResponse(response) => handle_worker_response(state, response),
    }
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> Result<(bool, Vec<Action>)> {
    match response {
        WorkerResponse::PageLoaded { request, page } => {
            let PageOutcome::Merged { added, has_more } = state.session.complete(request, page) else {
                return Ok((false, vec![]));
            };

            let mut actions = vec![];
            match state.viewer.state().clone() {
                ViewerState::Open { .. } if added > 0 => {
                    actions.push(Action::SyncViewerSlides {
                        slides: state.session.slides(),
                    });
                }
                ViewerState::Pending { src } => {
                    let effects = state.viewer.reconcile(Some(&src), state.session.store(), has_more);
                    apply_viewer_effects(state, effects, &mut actions);
                    actions.extend(continue_pending_search(state));
                }
                ViewerState::Open { .. } | ViewerState::Closed => {}
            }

            Ok((true, actions))
        }

        WorkerResponse::PageFailed { request, reason } => Ok((state.session.fail(request, reason), vec![])),

        WorkerResponse::DetailsLoaded { path, details } => {
            if state.details.as_ref().map(DetailsView::path) != Some(path.as_str()) {
                tracing::debug!(path = %path, "discarding details for a page no longer shown");
                return Ok((false, vec![]));
            }
            state.details = Some(DetailsView::Loaded {
                path: path.clone(),
                details: details.clone(),
            });
            Ok((true, vec![]))
        }

        WorkerResponse::DetailsFailed { path, reason } => {
            if state.details.as_ref().map(DetailsView::path) != Some(path.as_str()) {
                return Ok((false, vec![]));
            }
            tracing::warn!(path = %path, reason = %reason, "details fetch failed");
            state.details = Some(DetailsView::Failed {
                path: path.clone(),
                reason: reason.clone(),
            });
            Ok((true, vec![]))
        }
    }
}

/// Starts a new session for `dir`: closes the viewer, drops every item of the
/// previous session, requests page 0 and parks the location's `src` as a
/// pending open.
fn start_session(state: &mut AppState, dir: DirectoryKey, recursive: bool) -> Vec<Action> {
    let mut actions = vec![];
    let effects = state.viewer.reset();
    apply_viewer_effects(state, effects, &mut actions);

    state.session.begin(dir.clone(), recursive);
    actions.extend(request_next_page(state, &dir));

    let src = state.location.current_src().map(str::to_string);
    if let Some(src) = src {
        let effects = state.viewer.reconcile(Some(&src), state.session.store(), state.session.has_more());
        apply_viewer_effects(state, effects, &mut actions);
    }

    actions
}

fn request_next_page(state: &mut AppState, dir: &DirectoryKey) -> Option<Action> {
    state
        .session
        .load_next(dir)
        .map(|request| Action::PostToWorker(WorkerMessage::fetch_page(request)))
}

/// Keeps paging while a linked item is still missing, if enabled.
fn continue_pending_search(state: &mut AppState) -> Option<Action> {
    if !state.options.deep_link_autoload || !matches!(state.viewer.state(), ViewerState::Pending { .. }) {
        return None;
    }
    let dir = state.session.dir().clone();
    request_next_page(state, &dir)
}

fn reconcile_viewer(state: &mut AppState, src: Option<&str>) -> Vec<Action> {
    let mut actions = vec![];
    let effects = state.viewer.reconcile(src, state.session.store(), state.session.has_more());
    apply_viewer_effects(state, effects, &mut actions);
    actions
}

fn write_location(state: &mut AppState, src: Option<String>, mode: HistoryMode) -> Option<Action> {
    state.location.set_src(src, mode).map(|write| match write.mode {
        HistoryMode::Push => Action::PushLocation { src: write.src },
        HistoryMode::Replace => Action::ReplaceLocation { src: write.src },
    })
}

fn apply_viewer_effects(state: &AppState, effects: Vec<ViewerEffect>, actions: &mut Vec<Action>) {
    for effect in effects {
        actions.push(match effect {
            ViewerEffect::Open { index } => Action::OpenViewer {
                index,
                slides: state.session.slides(),
                fill_screen: state.settings.fill_screen,
            },
            ViewerEffect::GoTo { index } => Action::ViewerGoTo { index },
            ViewerEffect::Close => Action::CloseViewer,
            ViewerEffect::LockInput => Action::LockInput,
            ViewerEffect::UnlockInput => Action::UnlockInput,
            ViewerEffect::ScrollTo { index } => Action::ScrollToIndex(index),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pagination::PageRequest;
    use crate::app::state::EngineOptions;
    use crate::domain::{ListingPage, WireItem};

    fn state() -> AppState {
        AppState::new(DisplaySettings::default(), EngineOptions::default(), None)
    }

    fn posted_page(actions: &[Action]) -> PageRequest {
        actions
            .iter()
            .find_map(|action| match action {
                Action::PostToWorker(WorkerMessage::FetchPage { request, .. }) => Some(request.clone()),
                _ => None,
            })
            .expect("a page request")
    }

    fn loaded(request: PageRequest, ids: &[&str], total: Option<u64>) -> Event {
        Event::WorkerResponse(WorkerResponse::PageLoaded {
            request,
            page: ListingPage {
                files: Some(
                    ids.iter()
                        .map(|id| WireItem {
                            src: Some((*id).to_string()),
                            ..WireItem::default()
                        })
                        .collect(),
                ),
                total,
                ..ListingPage::default()
            },
        })
    }

    fn enter(state: &mut AppState, dir: &str, src: Option<&str>) -> PageRequest {
        let (_, actions) = handle_event(
            state,
            &Event::DirectoryChanged {
                dir: DirectoryKey::new(dir),
                src: src.map(str::to_string),
            },
        )
        .unwrap();
        posted_page(&actions)
    }

    #[test]
    fn open_pushes_then_opens_with_all_slides() {
        let mut state = state();
        let request = enter(&mut state, "ns", None);
        handle_event(&mut state, &loaded(request, &["a", "b"], Some(2))).unwrap();

        let (render, actions) = handle_event(&mut state, &Event::OpenAt(1)).unwrap();
        assert!(render);
        assert_eq!(actions[0], Action::PushLocation { src: Some("b".into()) });
        assert!(matches!(
            &actions[1],
            Action::OpenViewer { index: 1, slides, fill_screen: false } if slides.len() == 2
        ));
        assert_eq!(actions[2], Action::LockInput);
    }

    #[test]
    fn widget_close_replaces_location_and_scrolls_back() {
        let mut state = state();
        let request = enter(&mut state, "ns", None);
        handle_event(&mut state, &loaded(request, &["a", "b", "c"], Some(3))).unwrap();
        handle_event(&mut state, &Event::OpenAt(0)).unwrap();
        handle_event(&mut state, &Event::ViewerChanged(2)).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::ViewerClosed).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::ReplaceLocation { src: None },
                Action::UnlockInput,
                Action::ScrollToIndex(2),
            ]
        );

        let (render, echoed) = handle_event(&mut state, &Event::ViewerClosed).unwrap();
        assert!(!render);
        assert!(echoed.is_empty());
    }

    #[test]
    fn merges_while_open_grow_the_viewer() {
        let mut state = state();
        let request = enter(&mut state, "ns", None);
        handle_event(&mut state, &loaded(request, &["a"], None)).unwrap();
        handle_event(&mut state, &Event::OpenAt(0)).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::EndReached { dir: DirectoryKey::new("ns") }).unwrap();
        let (_, actions) = handle_event(&mut state, &loaded(posted_page(&actions), &["b"], None)).unwrap();

        assert!(matches!(&actions[..], [Action::SyncViewerSlides { slides }] if slides.len() == 2));
    }

    #[test]
    fn deep_link_keeps_loading_until_found() {
        let mut state = state();
        let first = enter(&mut state, "ns", Some("c"));
        assert_eq!(state.viewer.state(), &ViewerState::Pending { src: "c".into() });

        let (_, actions) = handle_event(&mut state, &loaded(first, &["a", "b"], Some(4))).unwrap();
        let second = posted_page(&actions);
        assert_eq!(second.offset, 2);

        let (_, actions) = handle_event(&mut state, &loaded(second, &["c", "d"], Some(4))).unwrap();
        assert!(matches!(actions[0], Action::OpenViewer { index: 2, .. }));
        assert_eq!(actions[1], Action::LockInput);
        assert_eq!(state.location.current_src(), Some("c"));
    }

    #[test]
    fn deep_link_without_autoload_waits_for_scrolling() {
        let mut state = AppState::new(
            DisplaySettings::default(),
            EngineOptions {
                deep_link_autoload: false,
                ..EngineOptions::default()
            },
            None,
        );
        let first = enter(&mut state, "ns", Some("z"));
        let (_, actions) = handle_event(&mut state, &loaded(first, &["a"], Some(3))).unwrap();
        assert!(actions.is_empty());
        assert!(matches!(state.viewer.state(), ViewerState::Pending { .. }));
    }

    #[test]
    fn failed_page_stops_the_deep_link_chain() {
        let mut state = state();
        let first = enter(&mut state, "ns", Some("z"));
        let (render, actions) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::PageFailed {
                request: first,
                reason: "HTTP 502".into(),
            }),
        )
        .unwrap();

        assert!(render);
        assert!(actions.is_empty());
        assert_eq!(
            state.compute_viewmodel().fetch_status,
            crate::ui::viewmodel::FetchStatus::Failed("HTTP 502".into())
        );
        assert!(matches!(state.viewer.state(), ViewerState::Pending { .. }));
    }

    #[test]
    fn details_close_the_viewer_and_fetch_metadata() {
        let mut state = state();
        let request = enter(&mut state, "ns", None);
        handle_event(&mut state, &loaded(request, &["/img/a.png"], Some(1))).unwrap();
        handle_event(&mut state, &Event::OpenAt(0)).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::ShowDetails).unwrap();
        assert_eq!(actions[0], Action::ReplaceLocation { src: None });
        assert_eq!(actions[1], Action::CloseViewer);
        assert!(actions.contains(&Action::NavigateToDetails {
            src: "/img/a.png".into(),
            dir: DirectoryKey::new("ns"),
            index: 0,
        }));
        assert!(matches!(
            actions.last(),
            Some(Action::PostToWorker(WorkerMessage::FetchDetails { path, .. })) if path == "/img/a.png"
        ));

        let (render, _) = handle_event(
            &mut state,
            &Event::WorkerResponse(WorkerResponse::DetailsLoaded {
                path: "/img/a.png".into(),
                details: serde_json::json!({ "w": 1 }),
            }),
        )
        .unwrap();
        assert!(render);
        assert!(matches!(state.details, Some(DetailsView::Loaded { .. })));
    }

    #[test]
    fn toggling_recursive_saves_and_reloads() {
        let mut state = state();
        let request = enter(&mut state, "ns", None);
        handle_event(&mut state, &loaded(request.clone(), &["a"], Some(1))).unwrap();

        let settings = DisplaySettings {
            files_recursive: true,
            ..DisplaySettings::default()
        };
        let (_, actions) = handle_event(&mut state, &Event::SettingsChanged(settings)).unwrap();

        assert_eq!(actions[0], Action::SaveSettings(settings));
        let reload = posted_page(&actions);
        assert!(reload.recursive);
        assert_eq!(reload.offset, 0);
        assert!(state.session.store().is_empty());

        let (render, actions) = handle_event(&mut state, &Event::SettingsChanged(settings)).unwrap();
        assert!(!render);
        assert!(actions.is_empty());
    }

    #[test]
    fn fill_screen_only_saves() {
        let mut state = state();
        enter(&mut state, "ns", None);
        let settings = DisplaySettings {
            fill_screen: true,
            ..DisplaySettings::default()
        };
        let (_, actions) = handle_event(&mut state, &Event::SettingsChanged(settings)).unwrap();
        assert_eq!(actions, vec![Action::SaveSettings(settings)]);
    }

    #[test]
    fn refresh_reopens_the_linked_item_after_reload() {
        let mut state = state();
        let request = enter(&mut state, "ns", None);
        handle_event(&mut state, &loaded(request, &["a", "b"], Some(2))).unwrap();
        handle_event(&mut state, &Event::OpenAt(1)).unwrap();

        let (_, actions) = handle_event(&mut state, &Event::Refresh).unwrap();
        assert_eq!(actions[0], Action::CloseViewer);
        assert_eq!(state.viewer.state(), &ViewerState::Pending { src: "b".into() });

        let (_, actions) = handle_event(&mut state, &loaded(posted_page(&actions), &["a", "b"], Some(2))).unwrap();
        assert!(matches!(actions[0], Action::OpenViewer { index: 1, .. }));
    }
}
