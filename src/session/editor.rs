use std::sync::Arc;

use url::Url;

use crate::assets::fonts::FontBook;
use crate::assets::loader::AssetLoader;
use crate::assets::source::AssetRef;
use crate::audio::{VideoId, extract_video_id};
use crate::foundation::core::Point;
use crate::foundation::error::{LoveNotesError, LoveNotesResult};
use crate::render::export::{DEFAULT_SUPERSAMPLE, ExportMode, ExportOpts, ExportedPng, export_png};
use crate::scene::background::Background;
use crate::scene::card::{Card, CardId};
use crate::scene::catalog::{StickerEntry, Template};
use crate::scene::element::{DEFAULT_TEXT, ElementId, ElementKind, ElementPatch};
use crate::scene::gesture::DragGesture;
use crate::scene::model::SceneModel;
use crate::share::{EntryMode, share_url};
use crate::store::repository::CardRepository;

/// Presentation mode of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Full editing.
    #[default]
    Edit,
    /// Read-only presentation of a shared card.
    View,
}

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something worked and the user should know about it.
    Info,
    /// Something failed.
    Error,
}

/// A user-visible message produced by a session flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// One user's editing session over a single card.
///
/// The session owns the [`SceneModel`] and adds what the model deliberately leaves out:
/// selection, view mode, the audio link, and the open/save/export flows against the configured
/// collaborators. Failed flows leave a [`Notice`] and keep the session usable.
pub struct EditorSession {
    scene: SceneModel,
    mode: SessionMode,
    card_id: Option<CardId>,
    selection: Option<ElementId>,
    audio_url: Option<String>,
    notices: Vec<Notice>,

    repository: CardRepository,
    loader: Arc<dyn AssetLoader>,
    fonts: Arc<FontBook>,
    page_url: Url,
    supersample: u32,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("mode", &self.mode)
            .field("card_id", &self.card_id)
            .field("selection", &self.selection)
            .field("elements", &self.scene.len())
            .field("page_url", &self.page_url.as_str())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Fresh session in edit mode on an empty card.
    pub fn new(
        repository: CardRepository,
        loader: Arc<dyn AssetLoader>,
        fonts: Arc<FontBook>,
        page_url: Url,
    ) -> Self {
        Self {
            scene: SceneModel::new(),
            mode: SessionMode::Edit,
            card_id: None,
            selection: None,
            audio_url: None,
            notices: Vec::new(),
            repository,
            loader,
            fonts,
            page_url,
            supersample: DEFAULT_SUPERSAMPLE,
        }
    }

    /// Override the export pixel density.
    pub fn with_supersample(mut self, supersample: u32) -> Self {
        self.supersample = supersample;
        self
    }

    /// Current scene.
    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    /// Edit or read-only view.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Id of the stored card this session edits or views, once saved or loaded.
    pub fn card_id(&self) -> Option<&CardId> {
        self.card_id.as_ref()
    }

    /// Selected element, if any.
    pub fn selection(&self) -> Option<&ElementId> {
        self.selection.as_ref()
    }

    /// Pasted audio link, as stored.
    pub fn audio_url(&self) -> Option<&str> {
        self.audio_url.as_deref()
    }

    /// Notices not yet taken.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The storable card, including the audio link.
    pub fn card(&self) -> Card {
        Card {
            audio_url: self.audio_url.clone(),
            ..self.scene.to_card()
        }
    }

    /// Start from a page URL.
    ///
    /// A `card` parameter loads that card into view mode. A missing card or a failed load leaves
    /// an error notice and falls back to a fresh card in edit mode.
    pub async fn open_entry(&mut self, page: &Url) -> SessionMode {
        let EntryMode::View(id) = EntryMode::from_url(page) else {
            self.reset(SceneModel::new(), None, None, SessionMode::Edit);
            return self.mode;
        };
        match self.repository.load(&id).await {
            Ok(Some(card)) => {
                let audio = card.audio_url().map(str::to_string);
                self.reset(SceneModel::from_card(card), Some(id), audio, SessionMode::View);
            }
            Ok(None) => {
                tracing::warn!(card = %id, "shared card not found");
                self.notices
                    .push(Notice::error("Card not found. The link may be invalid."));
                self.reset(SceneModel::new(), None, None, SessionMode::Edit);
            }
            Err(e) => {
                tracing::warn!(card = %id, error = %e, "loading shared card failed");
                self.notices
                    .push(Notice::error("Failed to load card. The link may be invalid."));
                self.reset(SceneModel::new(), None, None, SessionMode::Edit);
            }
        }
        self.mode
    }

    /// Leave whatever is open and start an empty card in edit mode.
    pub fn start_new_card(&mut self) {
        self.reset(SceneModel::new(), None, None, SessionMode::Edit);
    }

    fn reset(
        &mut self,
        scene: SceneModel,
        card_id: Option<CardId>,
        audio_url: Option<String>,
        mode: SessionMode,
    ) {
        self.scene = scene;
        self.card_id = card_id;
        self.audio_url = audio_url;
        self.mode = mode;
        self.selection = None;
    }

    fn writable(&self) -> LoveNotesResult<()> {
        match self.mode {
            SessionMode::Edit => Ok(()),
            SessionMode::View => Err(LoveNotesError::ReadOnly),
        }
    }

    /// Select an element. Ids not on the card clear the selection. Returns whether something is
    /// selected afterwards.
    pub fn select(&mut self, id: &ElementId) -> bool {
        self.selection = self.scene.contains(id).then(|| id.clone());
        self.selection.is_some()
    }

    /// Clear the selection.
    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Add a default text element and select it.
    pub fn add_text(&mut self) -> LoveNotesResult<ElementId> {
        self.add_selected(ElementKind::text(DEFAULT_TEXT))
    }

    /// Add a catalog sticker.
    pub fn add_sticker(&mut self, sticker: &StickerEntry) -> LoveNotesResult<ElementId> {
        self.writable()?;
        Ok(self.scene.add_default(sticker.kind()))
    }

    /// Add a glyph decal such as an emoji.
    pub fn add_glyph(&mut self, glyph: &str) -> LoveNotesResult<ElementId> {
        self.writable()?;
        Ok(self.scene.add_default(ElementKind::glyph(glyph)))
    }

    /// Add an uploaded photo, usually a `data:` URL.
    pub fn add_photo(&mut self, source: impl Into<AssetRef>) -> LoveNotesResult<ElementId> {
        self.writable()?;
        Ok(self.scene.add_default(ElementKind::image(source)))
    }

    fn add_selected(&mut self, kind: ElementKind) -> LoveNotesResult<ElementId> {
        self.writable()?;
        let id = self.scene.add_default(kind);
        self.selection = Some(id.clone());
        Ok(id)
    }

    /// Patch an element. Returns whether anything changed.
    pub fn update(&mut self, id: &ElementId, patch: &ElementPatch) -> LoveNotesResult<bool> {
        self.writable()?;
        Ok(self.scene.update_element(id, patch))
    }

    /// Apply `patch` to the selected element, if any.
    pub fn update_selected(&mut self, patch: &ElementPatch) -> LoveNotesResult<bool> {
        self.writable()?;
        match self.selection.clone() {
            Some(id) => Ok(self.scene.update_element(&id, patch)),
            None => Ok(false),
        }
    }

    /// Remove an element; removing the selected one clears the selection.
    pub fn remove(&mut self, id: &ElementId) -> LoveNotesResult<bool> {
        self.writable()?;
        let removed = self.scene.remove_element(id);
        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        Ok(removed)
    }

    /// Duplicate an element and select the copy.
    pub fn duplicate(&mut self, id: &ElementId) -> LoveNotesResult<Option<ElementId>> {
        self.writable()?;
        let copy = self.scene.duplicate_element(id);
        if let Some(new_id) = &copy {
            self.selection = Some(new_id.clone());
        }
        Ok(copy)
    }

    /// Raise an element above all others.
    pub fn bring_to_front(&mut self, id: &ElementId) -> LoveNotesResult<bool> {
        self.writable()?;
        Ok(self.scene.bring_to_front(id))
    }

    /// Lower an element below all others.
    pub fn send_to_back(&mut self, id: &ElementId) -> LoveNotesResult<bool> {
        self.writable()?;
        Ok(self.scene.send_to_back(id))
    }

    /// Remove every element. Callers confirm with the user first.
    pub fn clear(&mut self) -> LoveNotesResult<()> {
        self.writable()?;
        self.scene.clear();
        self.selection = None;
        Ok(())
    }

    /// Replace the card background. Not undoable.
    pub fn set_background(&mut self, background: Background) -> LoveNotesResult<()> {
        self.writable()?;
        self.scene.set_background(background);
        Ok(())
    }

    /// Replace background and elements with a template's.
    pub fn apply_template(&mut self, template: &Template) -> LoveNotesResult<()> {
        self.writable()?;
        self.scene.apply_template(template);
        self.selection = None;
        Ok(())
    }

    /// Step back one history entry, dropping a selection that no longer exists.
    pub fn undo(&mut self) -> LoveNotesResult<bool> {
        self.writable()?;
        let moved = self.scene.undo();
        self.drop_stale_selection();
        Ok(moved)
    }

    /// Step forward one history entry, dropping a selection that no longer exists.
    pub fn redo(&mut self) -> LoveNotesResult<bool> {
        self.writable()?;
        let moved = self.scene.redo();
        self.drop_stale_selection();
        Ok(moved)
    }

    fn drop_stale_selection(&mut self) {
        if self
            .selection
            .as_ref()
            .is_some_and(|id| !self.scene.contains(id))
        {
            self.selection = None;
        }
    }

    /// Pointer-down on an element: selects it and starts a drag.
    ///
    /// `canvas_width` and `canvas_height` are the on-screen canvas size in pointer units.
    pub fn begin_drag(
        &mut self,
        id: &ElementId,
        pointer: Point,
        canvas_width: f64,
        canvas_height: f64,
    ) -> LoveNotesResult<Option<DragGesture>> {
        self.writable()?;
        let gesture = DragGesture::begin(&self.scene, id, pointer, canvas_width, canvas_height)?;
        if gesture.is_some() {
            self.selection = Some(id.clone());
        }
        Ok(gesture)
    }

    /// Pointer-move during a drag.
    pub fn drag_to(&mut self, gesture: &DragGesture, pointer: Point) -> LoveNotesResult<bool> {
        self.writable()?;
        Ok(gesture.apply_move(&mut self.scene, pointer))
    }

    /// Store the pasted audio link; blank input clears it.
    pub fn set_audio_url(&mut self, link: Option<&str>) -> LoveNotesResult<()> {
        self.writable()?;
        self.audio_url = link
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        if self.audio_url.is_some() && self.audio_video_id().is_none() {
            tracing::debug!("audio link has no recognizable video id");
        }
        Ok(())
    }

    /// Video id of the audio link, if it has a valid one.
    pub fn audio_video_id(&self) -> Option<VideoId> {
        self.audio_url.as_deref().and_then(extract_video_id)
    }

    /// Embed URL for the audio link.
    pub fn audio_embed_url(&self) -> Option<String> {
        self.audio_video_id().map(|id| id.embed_url())
    }

    /// Share link of the current card, once it has an id.
    pub fn share_link(&self) -> Option<Url> {
        self.card_id.as_ref().map(|id| share_url(&self.page_url, id))
    }

    /// Persist the card and return its share link.
    ///
    /// The first save allocates an id; later saves overwrite the same card.
    pub async fn save(&mut self) -> LoveNotesResult<Url> {
        self.writable()?;
        let card = self.card();
        match self.repository.save(self.card_id.as_ref(), &card).await {
            Ok(id) => {
                let link = share_url(&self.page_url, &id);
                self.card_id = Some(id);
                self.notices
                    .push(Notice::info(format!("Card saved. Share this link: {link}")));
                Ok(link)
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving card failed");
                self.notices
                    .push(Notice::error("Failed to save card. Please try again."));
                Err(e)
            }
        }
    }

    /// Render the card to PNG at the size of the current mode.
    pub async fn export(&mut self) -> LoveNotesResult<ExportedPng> {
        let opts = ExportOpts {
            mode: match self.mode {
                SessionMode::Edit => ExportMode::Editor,
                SessionMode::View => ExportMode::View,
            },
            supersample: self.supersample,
        };
        let card = self.card();
        match export_png(&card, opts, &*self.loader, &self.fonts).await {
            Ok(png) => Ok(png),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.notices
                    .push(Notice::error("Failed to download. Please try again."));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
