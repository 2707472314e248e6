//! crates/linguaverse_core/src/stories.rs
//!
//! Live story list, the selected story's ordered pages, pagination and the
//! vocabulary popup.

use crate::app::App;
use crate::domain::{Page, Story, VocabularyToken};
use crate::events::{pages_event, stories_event, EventSink, ListenerId, Subscription};
use crate::ports::{CollectionQuery, Document, DocumentStore, PortResult};
use tracing::{debug, info};

pub const STORIES_COLLECTION: &str = "stories";
pub const PAGE_NUMBER_FIELD: &str = "pageNumber";

pub fn pages_collection(story_id: &str) -> String {
    format!("{}/{}/pages", STORIES_COLLECTION, story_id)
}

/// Placeholder until a translation backend exists.
pub fn placeholder_translation(word: &str) -> String {
    format!("Translation for \"{}\" coming soon.", word)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyPopup {
    pub token: VocabularyToken,
    pub translation: String,
}

#[derive(Debug)]
struct SelectedStory {
    story_id: String,
    subscription: Subscription,
}

#[derive(Debug, Default)]
pub struct StoryBrowser {
    stories_subscription: Option<Subscription>,
    stories: Vec<Story>,
    selected: Option<SelectedStory>,
    pages: Vec<Page>,
    page_index: usize,
    popup: Option<VocabularyPopup>,
}

impl StoryBrowser {
    pub fn attach_stories(&mut self, store: &dyn DocumentStore, sink: &EventSink) {
        self.detach_stories();
        let (id, listener) = sink.listener(stories_event);
        let query = CollectionQuery::new(STORIES_COLLECTION);
        let registration = store.listen_collection(query, listener);
        self.stories_subscription = Some(Subscription::new(id, registration));
    }

    fn detach_stories(&mut self) {
        if let Some(subscription) = self.stories_subscription.take() {
            subscription.detach();
        }
    }

    /// Detaches every listener this browser owns.
    pub fn detach_all(&mut self) {
        self.detach_stories();
        self.deselect();
    }

    /// Drops all derived state without touching listeners.
    pub fn clear(&mut self) {
        self.stories.clear();
        self.pages.clear();
        self.page_index = 0;
        self.popup = None;
    }

    pub fn is_stories_listener(&self, listener: ListenerId) -> bool {
        crate::events::is_current(&self.stories_subscription, listener)
    }

    pub fn is_pages_listener(&self, listener: ListenerId) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.subscription.id == listener)
    }

    pub fn apply_stories(&mut self, documents: Vec<Document>) -> PortResult<()> {
        self.stories = documents
            .into_iter()
            .map(|doc| -> PortResult<Story> {
                let mut story: Story = doc.decode()?;
                story.id = doc.id;
                Ok(story)
            })
            .collect::<PortResult<_>>()?;
        Ok(())
    }

    pub fn apply_pages(&mut self, documents: Vec<Document>) -> PortResult<()> {
        self.pages = documents
            .into_iter()
            .map(|doc| -> PortResult<Page> {
                let mut page: Page = doc.decode()?;
                page.id = doc.id;
                Ok(page)
            })
            .collect::<PortResult<_>>()?;
        if self.page_index >= self.pages.len() {
            self.page_index = self.pages.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Subscribes to a story's pages, ordered by page number.
    pub fn select(&mut self, store: &dyn DocumentStore, sink: &EventSink, story_id: &str) {
        self.deselect();
        let (id, listener) = sink.listener(pages_event);
        let query = CollectionQuery::new(pages_collection(story_id)).order_by(PAGE_NUMBER_FIELD);
        let registration = store.listen_collection(query, listener);
        self.selected = Some(SelectedStory {
            story_id: story_id.to_string(),
            subscription: Subscription::new(id, registration),
        });
        self.page_index = 0;
        self.popup = None;
    }

    /// Detaches the page listener and clears the pages.
    pub fn deselect(&mut self) {
        if let Some(selected) = self.selected.take() {
            debug!("Detaching page listener for story {}", selected.story_id);
            selected.subscription.detach();
        }
        self.pages.clear();
        self.page_index = 0;
        self.popup = None;
    }

    /// Moves forward one page. Returns false (and changes nothing) at the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page_index + 1 >= self.pages.len() {
            return false;
        }
        self.page_index += 1;
        self.popup = None;
        true
    }

    /// Moves back one page. Returns false (and changes nothing) at the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.page_index == 0 {
            return false;
        }
        self.page_index -= 1;
        self.popup = None;
        true
    }

    /// Opens the popup for a token on the current page. Unknown tokens are ignored.
    pub fn click_token(&mut self, token: &str) -> bool {
        let Some(found) = self
            .current_page()
            .and_then(|page| page.vocabulary_tokens.iter().find(|t| t.token == token))
            .cloned()
        else {
            return false;
        };
        self.popup = Some(VocabularyPopup {
            translation: placeholder_translation(&found.word),
            token: found,
        });
        true
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn selected_story_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.story_id.as_str())
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.pages.get(self.page_index)
    }

    pub fn popup(&self) -> Option<&VocabularyPopup> {
        self.popup.as_ref()
    }
}

//=========================================================================================
// Controller Operations
//=========================================================================================

impl App {
    pub fn select_story(&mut self, story_id: &str) {
        if self.view.session().is_none() {
            return;
        }
        info!("Selecting story {}", story_id);
        self.stories.select(self.store.as_ref(), &self.sink, story_id);
    }

    pub fn deselect_story(&mut self) {
        self.stories.deselect();
    }

    pub fn next_page(&mut self) -> bool {
        self.stories.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.stories.previous_page()
    }

    pub fn click_token(&mut self, token: &str) -> bool {
        self.stories.click_token(token)
    }

    pub fn close_popup(&mut self) {
        self.stories.close_popup();
    }
}
