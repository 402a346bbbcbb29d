//! Optional app libraries pulled in with `#import`.

use serde_json::json;

use super::{ActionDefinition as A, AppIntent, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::ValueType::*;

const LIBRARIES: &[(&str, fn(&mut Catalog))] = &[("notes", notes), ("music", music)];

pub fn library_names() -> impl Iterator<Item = &'static str> {
    LIBRARIES.iter().map(|(name, _)| *name)
}

pub(super) fn import(catalog: &mut Catalog, library: &str) -> Result<(), String> {
    let Some((_, register)) = LIBRARIES.iter().find(|(name, _)| *name == library) else {
        let available: Vec<&str> = library_names().collect();
        return Err(format!(
            "Unknown library '{library}'. Available libraries: {}",
            available.join(", ")
        ));
    };
    register(catalog);
    Ok(())
}

fn notes(c: &mut Catalog) {
    c.insert(
        "createNote",
        A::app("com.apple.mobilenotes", "SharingExtension").params(vec![
            P::new("body", Text, "WFCreateNoteInput"),
            P::new("showCompose", Bool, "ShowWhenRun").default_value(false),
        ]),
    );
    c.insert(
        "openNote",
        A::app("com.apple.mobilenotes", "OpenNoteLinkAction")
            .params(vec![P::new("note", Variable, "target")])
            .intent(AppIntent {
                bundle_identifier: "com.apple.mobilenotes".into(),
                name: "Notes".into(),
                intent_identifier: "OpenNoteLinkAction".into(),
            })
            .min_version(16.0),
    );
    c.insert(
        "showNotesFolder",
        A::app("com.apple.mobilenotes", "ShowFolderLinkAction")
            .params(vec![P::new("folder", Variable, "folder")])
            .intent(AppIntent {
                bundle_identifier: "com.apple.mobilenotes".into(),
                name: "Notes".into(),
                intent_identifier: "ShowFolderLinkAction".into(),
            })
            .min_version(16.0),
    );
}

fn music(c: &mut Catalog) {
    c.insert(
        "playMusic",
        A::standard("playmusic").params(vec![
            P::new("music", Variable, "WFMediaItems"),
            P::new("shuffle", Bool, "WFPlayMusicActionShuffle").default_value(false),
        ]),
    );
    c.insert(
        "pauseMusic",
        A::standard("pausemusic")
            .add_params(|_, _| Ok(fixed(&[("WFPlayPauseBehavior", json!("Pause"))]))),
    );
    c.insert(
        "playPause",
        A::standard("pausemusic")
            .add_params(|_, _| Ok(fixed(&[("WFPlayPauseBehavior", json!("Play/Pause"))])))
            .default_action(),
    );
    c.insert("skipForward", A::standard("skipforward"));
    c.insert("skipBack", A::standard("skipback"));
    c.insert("getCurrentSong", A::standard("getcurrentsong"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_registers_library_actions() {
        let mut catalog = Catalog::standard();
        assert!(!catalog.contains("createNote"));
        catalog.import("notes").unwrap();
        let def = catalog.get("createNote").unwrap();
        assert_eq!(
            def.resolved_identifier("createNote"),
            "com.apple.mobilenotes.SharingExtension"
        );
    }

    #[test]
    fn unknown_library_lists_alternatives() {
        let mut catalog = Catalog::default();
        let err = catalog.import("photos").unwrap_err();
        assert!(err.contains("notes, music"));
    }
}
