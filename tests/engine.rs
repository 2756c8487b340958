//! End-to-end behaviour of the engine driven the way the shell drives it: an
//! in-memory history executes location writes and page fetches are answered
//! by hand, in whatever order the test needs.

use galleria::app::pagination::PageRequest;
use galleria::domain::{DirectoryKey, ListingPage, WireItem};
use galleria::infrastructure::history::{self, MemoryHistory};
use galleria::storage::DisplaySettings;
use galleria::ui::ViewerInfo;
use galleria::worker::{WorkerMessage, WorkerResponse};
use galleria::{handle_event, Action, AppState, EngineOptions, Event};

/// Minimal runtime: executes actions against a history and records what the
/// engine asked of the worker and the viewer widget.
struct Harness {
    state: AppState,
    history: MemoryHistory,
    requests: Vec<PageRequest>,
    details_requests: Vec<String>,
    widget: Option<usize>,
    widget_slides: usize,
    scrolled_to: Option<usize>,
}

impl Harness {
    fn new(dir: &str, src: Option<&str>) -> Self {
        let mut location = format!("http://gallery.local/images/{dir}");
        if let Some(src) = src {
            location.push_str(&format!("?src={src}"));
        }
        let history = MemoryHistory::parse(&location).unwrap();
        let state = AppState::new(
            DisplaySettings::default(),
            EngineOptions::default(),
            history.current_src(),
        );

        let mut harness = Self {
            state,
            history,
            requests: vec![],
            details_requests: vec![],
            widget: None,
            widget_slides: 0,
            scrolled_to: None,
        };
        harness.send(&Event::DirectoryChanged {
            dir: DirectoryKey::new(dir),
            src: src.map(str::to_string),
        });
        harness
    }

    fn send(&mut self, event: &Event) -> (bool, Vec<Action>) {
        let (render, actions) = handle_event(&mut self.state, event).unwrap();
        for action in &actions {
            self.execute(action);
        }
        (render, actions)
    }

    fn execute(&mut self, action: &Action) {
        match action {
            Action::PostToWorker(WorkerMessage::FetchPage { request, .. }) => self.requests.push(request.clone()),
            Action::PostToWorker(WorkerMessage::FetchDetails { path, .. }) => self.details_requests.push(path.clone()),
            Action::PushLocation { src } => self.history.push_src(src.as_deref()),
            Action::ReplaceLocation { src } => self.history.replace_src(src.as_deref()),
            Action::OpenViewer { index, slides, .. } => {
                self.widget = Some(*index);
                self.widget_slides = slides.len();
            }
            Action::ViewerGoTo { index } => self.widget = Some(*index),
            Action::SyncViewerSlides { slides } => self.widget_slides = slides.len(),
            Action::CloseViewer => self.widget = None,
            Action::ScrollToIndex(index) => self.scrolled_to = Some(*index),
            Action::NavigateToDetails { src, dir, index } => self.history.push_details(src, dir, *index),
            Action::LockInput | Action::UnlockInput | Action::SaveSettings(_) => {}
        }
    }

    /// Answers the oldest outstanding page request.
    fn answer(&mut self, ids: &[&str], total: Option<u64>) -> (bool, Vec<Action>) {
        let request = self.requests.remove(0);
        self.answer_request(request, ids, total)
    }

    fn answer_request(&mut self, request: PageRequest, ids: &[&str], total: Option<u64>) -> (bool, Vec<Action>) {
        self.send(&Event::WorkerResponse(WorkerResponse::PageLoaded {
            request,
            page: page(ids, total),
        }))
    }

    /// Walks the history and reports the new location to the engine.
    fn pop(&mut self, forward: bool) -> (bool, Vec<Action>) {
        let previous_dir = self.history.current_dir();
        let location = if forward { self.history.forward() } else { self.history.back() }
            .cloned()
            .unwrap();

        let src = history::src_of(&location);
        let dir = history::dir_of(&location).unwrap();
        if previous_dir.as_ref() == Some(&dir) && self.state.details.is_none() {
            self.send(&Event::LocationPopped { src })
        } else {
            self.send(&Event::DirectoryChanged { dir, src })
        }
    }

    fn ids(&self) -> Vec<String> {
        self.state.session.store().items().iter().map(|item| item.id.clone()).collect()
    }
}

fn page(ids: &[&str], total: Option<u64>) -> ListingPage {
    ListingPage {
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
    }
}

#[test]
fn history_grows_by_one_entry_per_open() {
    let mut h = Harness::new("ns", None);
    h.answer(&["a", "b", "c", "d"], Some(4));
    assert_eq!(h.history.len(), 1);

    h.send(&Event::OpenAt(0));
    assert_eq!(h.history.len(), 2);

    h.send(&Event::ViewerChanged(1));
    h.send(&Event::ViewerChanged(2));
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.history.current_src().as_deref(), Some("c"));

    h.send(&Event::ViewerClosed);
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.history.current_src(), None);
    assert_eq!(h.scrolled_to, Some(2));

    h.send(&Event::OpenAt(1));
    assert_eq!(h.history.len(), 3);
    assert_eq!(h.history.current_src().as_deref(), Some("b"));
}

#[test]
fn back_closes_and_forward_reopens_without_writing_history() {
    let mut h = Harness::new("ns", None);
    h.answer(&["a", "b", "c", "d"], Some(4));
    h.send(&Event::OpenAt(2));
    h.send(&Event::ViewerChanged(3));
    assert_eq!(h.history.current_src().as_deref(), Some("d"));

    let (render, actions) = h.pop(false);
    assert!(render);
    assert_eq!(
        actions,
        vec![Action::CloseViewer, Action::UnlockInput, Action::ScrollToIndex(3)]
    );
    assert_eq!(h.widget, None);

    // The widget reports the close the engine just performed.
    assert_eq!(h.send(&Event::ViewerClosed), (false, vec![]));
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.history.position(), 0);

    let (_, actions) = h.pop(true);
    assert!(matches!(actions[0], Action::OpenViewer { index: 3, .. }));
    assert_eq!(h.widget, Some(3));
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.history.position(), 1);
}

#[test]
fn pages_accumulate_until_the_total_is_reached() {
    let mut h = Harness::new("2024/05", None);
    assert_eq!(h.requests[0].offset, 0);
    assert_eq!(h.requests[0].dir, DirectoryKey::new("2024/05"));

    h.answer(&["a", "b"], Some(3));
    assert!(h.state.session.has_more());

    h.send(&Event::EndReached {
        dir: DirectoryKey::new("2024/05"),
    });
    assert_eq!(h.requests[0].offset, 2);

    h.answer(&["c"], Some(3));
    assert_eq!(h.ids(), vec!["a", "b", "c"]);
    assert!(!h.state.session.has_more());

    let (render, actions) = h.send(&Event::EndReached {
        dir: DirectoryKey::new("2024/05"),
    });
    assert!(!render);
    assert!(actions.is_empty());
    assert!(!h.state.compute_viewmodel().has_more);
}

#[test]
fn late_page_of_a_left_directory_is_never_shown() {
    let mut h = Harness::new("x", None);
    let stale = h.requests.remove(0);

    h.send(&Event::DirectoryChanged {
        dir: DirectoryKey::new("y"),
        src: None,
    });

    let (render, actions) = h.answer_request(stale, &["x1", "x2"], Some(2));
    assert!(!render);
    assert!(actions.is_empty());
    assert!(h.ids().is_empty());

    h.answer(&["y1"], Some(1));
    assert_eq!(h.ids(), vec!["y1"]);
}

#[test]
fn deep_link_opens_once_its_page_arrives() {
    let mut h = Harness::new("ns", Some("c"));
    assert!(matches!(
        h.state.compute_viewmodel().viewer,
        Some(ViewerInfo::Pending { ref src }) if src == "c"
    ));

    h.answer(&["a", "b"], Some(4));
    assert_eq!(h.widget, None);
    assert_eq!(h.requests.len(), 1, "autoload asks for the next page");
    assert_eq!(h.requests[0].offset, 2);

    h.answer(&["c", "d"], Some(4));
    assert_eq!(h.widget, Some(2));
    assert_eq!(h.widget_slides, 4);
    assert_eq!(h.history.len(), 1, "following a link does not add history");
    assert_eq!(h.history.current_src().as_deref(), Some("c"));
}

#[test]
fn deep_link_to_a_missing_item_gives_up_quietly() {
    let mut h = Harness::new("ns", Some("zz"));
    h.answer(&["a"], Some(1));

    assert_eq!(h.widget, None);
    assert!(h.requests.is_empty());
    assert_eq!(h.state.compute_viewmodel().viewer, None);
    assert_eq!(h.history.current_src().as_deref(), Some("zz"));
}

#[test]
fn open_viewer_follows_newly_loaded_pages() {
    let mut h = Harness::new("ns", None);
    h.answer(&["a", "b"], None);
    h.send(&Event::OpenAt(1));
    assert_eq!(h.widget_slides, 2);

    h.send(&Event::EndReached { dir: DirectoryKey::new("ns") });
    h.answer(&["c", "d", "e"], None);
    assert_eq!(h.widget_slides, 5);
    assert_eq!(h.widget, Some(1));
}

#[test]
fn details_page_and_back_to_the_grid() {
    let mut h = Harness::new("ns", None);
    h.answer(&["/img/ns/a.png", "/img/ns/b.png"], Some(2));
    h.send(&Event::OpenAt(1));

    h.send(&Event::ShowDetails);
    assert_eq!(h.widget, None);
    assert_eq!(h.details_requests, vec!["/img/ns/b.png".to_string()]);
    assert_eq!(h.history.len(), 3);
    assert_eq!(h.history.current_dir(), None);

    h.send(&Event::WorkerResponse(WorkerResponse::DetailsLoaded {
        path: "/img/ns/b.png".to_string(),
        details: serde_json::json!({ "width": 4000, "height": 3000 }),
    }));
    let details = h.state.compute_viewmodel().details.unwrap();
    assert_eq!(details.path, "/img/ns/b.png");

    h.pop(false);
    assert!(h.state.details.is_none());
    assert_eq!(h.widget, None);
    assert_eq!(h.ids().len(), 2, "returning to the same directory keeps the list");
}
