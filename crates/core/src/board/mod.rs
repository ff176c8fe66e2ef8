use std::{
    path::{Path, PathBuf},
    slice::Chunks,
    time::Duration,
};

use crossbeam::channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::{
    config::BoardConfig,
    import::{file_uri_to_path, spawn_import, DropData, ImportEvent},
    Result,
};

/// Stable handle for a clip on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(u64);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
}

/// Instruction for whatever plays the audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayCommand {
    Play { id: ClipId, uri: String },
    Stop { id: ClipId },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Activating a tile plays or pauses it.
    #[default]
    None,
    /// Tiles are being picked for removal; activation does nothing.
    Multiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub uri: String,
    pub path: PathBuf,
    /// File name without its extension.
    pub name: String,
    pub state: PlayState,
    pub selected: bool,
}

impl Clip {
    fn new(id: ClipId, uri: String, path: PathBuf) -> Self {
        let name = clip_name(&path);
        Self {
            id,
            uri,
            path,
            name,
            state: PlayState::Stopped,
            selected: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }
}

fn clip_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Tile {
    Placeholder,
    Clip(Clip),
}

/// The soundboard grid: placeholders until something is dropped, then one
/// tile per imported clip.
#[derive(Debug, Clone)]
pub struct Board {
    tiles: Vec<Tile>,
    next_id: u64,
    selection_mode: SelectionMode,
    min_per_line: usize,
    max_per_line: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

impl Board {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            tiles: vec![Tile::Placeholder; config.placeholder_count],
            next_id: 1,
            selection_mode: SelectionMode::None,
            min_per_line: config.min_per_line.max(1),
            max_per_line: config.max_per_line.max(config.min_per_line).max(1),
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tiles.iter().filter_map(|tile| match tile {
            Tile::Clip(clip) => Some(clip),
            Tile::Placeholder => None,
        })
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips().find(|clip| clip.id == id)
    }

    pub fn find_by_uri(&self, uri: &str) -> Option<&Clip> {
        self.clips().find(|clip| clip.uri == uri)
    }

    pub fn placeholder_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| matches!(tile, Tile::Placeholder))
            .count()
    }

    pub fn selection_mode(&self) -> SelectionMode {
        self.selection_mode
    }

    pub fn selected(&self) -> impl Iterator<Item = &Clip> {
        self.clips().filter(|clip| clip.selected)
    }

    /// Tiles per row when `fits` tiles would fit the available width.
    pub fn columns(&self, fits: usize) -> usize {
        fits.clamp(self.min_per_line, self.max_per_line)
    }

    /// Tiles split into rows, flowing left to right.
    pub fn rows(&self, fits: usize) -> Chunks<'_, Tile> {
        self.tiles.chunks(self.columns(fits))
    }

    /// Drops the placeholders. Called when files land on the board.
    pub fn clear_placeholders(&mut self) {
        self.tiles.retain(|tile| !matches!(tile, Tile::Placeholder));
    }

    /// Accepts a drop: the placeholders go away straight off, and the files
    /// are scanned on a worker whose events feed [`Board::drain_imports`].
    pub fn import_drop(&mut self, payload: DropData, throttle: Duration) -> Result<Receiver<ImportEvent>> {
        self.clear_placeholders();
        spawn_import(payload, throttle)
    }

    /// Adds a tile for `uri`, replacing any placeholders. Returns `Ok(None)`
    /// when the clip is already on the board.
    pub fn add_clip(&mut self, uri: &str) -> Result<Option<ClipId>> {
        if self.find_by_uri(uri).is_some() {
            tracing::debug!(uri, "clip already on board");
            return Ok(None);
        }

        let path = file_uri_to_path(uri)?;
        let id = ClipId(self.next_id);
        self.next_id += 1;

        let clip = Clip::new(id, uri.to_string(), path);
        self.clear_placeholders();
        tracing::info!(name = %clip.name, "added clip");
        self.tiles.push(Tile::Clip(clip));
        Ok(Some(id))
    }

    /// Handles one message from the import worker. Returns the new clip, if
    /// any.
    pub fn apply_import(&mut self, event: &ImportEvent) -> Option<ClipId> {
        let ImportEvent::Clip(uri) = event else {
            return None;
        };
        match self.add_clip(uri) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(%err, "could not add imported clip");
                None
            }
        }
    }

    /// Applies whatever the import worker has delivered so far without
    /// blocking. Returns the number of clips added.
    pub fn drain_imports(&mut self, events: &Receiver<ImportEvent>) -> usize {
        events
            .try_iter()
            .filter(|event| self.apply_import(event).is_some())
            .count()
    }

    /// Play/pause toggle for a tile. Ignored while selecting.
    pub fn activate(&mut self, id: ClipId) -> Option<PlayCommand> {
        if self.selection_mode == SelectionMode::Multiple {
            return None;
        }

        let clip = self.clip_mut(id)?;
        let command = match clip.state {
            PlayState::Stopped => {
                clip.state = PlayState::Playing;
                PlayCommand::Play {
                    id,
                    uri: clip.uri.clone(),
                }
            }
            PlayState::Playing => {
                clip.state = PlayState::Stopped;
                PlayCommand::Stop { id }
            }
        };
        Some(command)
    }

    /// The player reached the end of the clip.
    pub fn end_of_stream(&mut self, id: ClipId) {
        if let Some(clip) = self.clip_mut(id) {
            clip.state = PlayState::Stopped;
        }
    }

    /// The player failed; the tile goes back to its stopped look.
    pub fn playback_error(&mut self, id: ClipId, message: &str) {
        if let Some(clip) = self.clip_mut(id) {
            tracing::warn!(name = %clip.name, message, "playback failed");
            clip.state = PlayState::Stopped;
        }
    }

    /// Select-button handler. Selecting the first clip enters selection mode;
    /// unselecting the last one leaves it.
    pub fn toggle_select(&mut self, id: ClipId) {
        let Some(selected) = self.clip(id).map(|clip| clip.selected) else {
            return;
        };

        if selected {
            self.set_selected(id, false);
            self.sync_selection_mode();
        } else {
            self.sync_selection_mode();
            self.set_selected(id, true);
        }
    }

    /// Removes every selected clip, stopping the ones still playing, and
    /// leaves selection mode.
    pub fn remove_selected(&mut self) -> Vec<PlayCommand> {
        let mut commands = Vec::new();
        self.tiles.retain(|tile| match tile {
            Tile::Clip(clip) if clip.selected => {
                if clip.is_playing() {
                    commands.push(PlayCommand::Stop { id: clip.id });
                }
                tracing::info!(name = %clip.name, "removed clip");
                false
            }
            _ => true,
        });
        self.selection_mode = SelectionMode::None;
        commands
    }

    fn sync_selection_mode(&mut self) {
        if self.selected().next().is_some() {
            return;
        }
        self.selection_mode = match self.selection_mode {
            SelectionMode::None => SelectionMode::Multiple,
            SelectionMode::Multiple => {
                self.unselect_all();
                SelectionMode::None
            }
        };
    }

    fn unselect_all(&mut self) {
        for tile in &mut self.tiles {
            if let Tile::Clip(clip) = tile {
                clip.selected = false;
            }
        }
    }

    fn set_selected(&mut self, id: ClipId, selected: bool) {
        if let Some(clip) = self.clip_mut(id) {
            clip.selected = selected;
        }
    }

    fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.tiles.iter_mut().find_map(|tile| match tile {
            Tile::Clip(clip) if clip.id == id => Some(clip),
            _ => None,
        })
    }
}
