//! Facade surface tests: the prelude is enough to wire up a palette.

use std::sync::Arc;

use cmdpal::prelude::*;
use cmdpal::{Error, MemoryStorage, StorageBackend, StorageError};

fn configured(descriptors: &[&str]) -> Result<PaletteConfig> {
    let hotkeys = HotkeySet::parse(descriptors)?;
    Ok(PaletteConfig::default()
        .with_hotkeys(hotkeys)
        .with_platform(Platform::Other))
}

#[test]
fn prelude_wires_a_palette() -> Result<()> {
    let config = configured(&["ctrl+shift+p"])?;
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let mut palette = CommandPalette::new(vec![Command::new("open", "Open File")], |_| {})
        .with_config(config)
        .with_recents(Arc::clone(&storage));

    let chord =
        KeyEvent::new(KeyCode::Char('p')).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
    assert!(palette.handle_global_key(&chord));
    assert!(palette.is_open());

    palette.dispatch(PaletteMsg::InputKey(KeyEvent::new(KeyCode::Enter)));
    assert!(!palette.is_open());
    assert!(storage.load("cmdpal-recent")?.is_some());
    Ok(())
}

#[test]
fn bad_hotkey_surfaces_as_error() {
    let err = configured(&["hyper+x"]).unwrap_err();
    assert!(matches!(err, Error::Hotkey(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn io_errors_map_to_storage() {
    let err: Error = std::io::Error::other("boom").into();
    assert!(matches!(err, Error::Storage(StorageError::Io(_))));
    assert!(err.to_string().contains("boom"));
}

#[cfg(feature = "state-persistence")]
#[test]
fn file_storage_backs_recents() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("state.json");
    let mut palette = CommandPalette::new(vec![Command::new("save", "Save")], |_| {})
        .with_recents(Arc::new(cmdpal::FileStorage::new(&path)));
    palette.open();
    palette.dispatch(PaletteMsg::Activate {
        index: 0,
        id: "save".into(),
    });

    let reloaded = CommandPalette::new(Vec::new(), |_| {})
        .with_recents(Arc::new(cmdpal::FileStorage::new(&path)));
    assert_eq!(reloaded.recent_items()[0].id, "save");
    Ok(())
}

#[cfg(feature = "state-persistence")]
#[test]
fn corrupt_state_file_heals_on_next_selection() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json")?;

    let mut palette = CommandPalette::new(vec![Command::new("a", "A")], |_| {})
        .with_recents(Arc::new(cmdpal::FileStorage::new(&path)));
    assert!(palette.recent_items().is_empty());
    palette.open();
    palette.select(&Command::new("a", "A"));

    let reloaded = CommandPalette::new(Vec::new(), |_| {})
        .with_recents(Arc::new(cmdpal::FileStorage::new(&path)));
    let ids: Vec<_> = reloaded.recent_items().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
    Ok(())
}
