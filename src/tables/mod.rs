//! Fixed lookup tables for workflow metadata.

mod glyphs;

pub use glyphs::{DEFAULT_GLYPH, GLYPHS};

pub const DEFAULT_COLOR: i64 = -1263359489;

pub const COLORS: &[(&str, i64)] = &[
    ("red", 4282601983),
    ("darkorange", 4251333119),
    ("orange", 4271458815),
    ("yellow", 4274264319),
    ("green", 4292093695),
    ("teal", 431817727),
    ("lightblue", 1440408063),
    ("blue", 463140863),
    ("darkblue", 946986751),
    ("violet", 2071128575),
    ("purple", 3679049983),
    ("pink", 3980825855),
    ("darkgray", 255),
    ("gray", 3031607807),
    ("taupe", 2846468607),
];

pub const CONTENT_ITEMS: &[(&str, &str)] = &[
    ("app", "WFAppStoreAppContentItem"),
    ("article", "WFArticleContentItem"),
    ("contact", "WFContactContentItem"),
    ("date", "WFDateContentItem"),
    ("email", "WFEmailAddressContentItem"),
    ("folder", "WFFolderContentItem"),
    ("file", "WFGenericFileContentItem"),
    ("image", "WFImageContentItem"),
    ("itunes", "WFiTunesProductContentItem"),
    ("location", "WFLocationContentItem"),
    ("maplink", "WFDCMapsLinkContentItem"),
    ("media", "WFAVAssetContentItem"),
    ("pdf", "WFPDFContentItem"),
    ("phonenumber", "WFPhoneNumberContentItem"),
    ("richtext", "WFRichTextContentItem"),
    ("webpage", "WFSafariWebPageContentItem"),
    ("text", "WFStringContentItem"),
    ("dictionary", "WFDictionaryContentItem"),
    ("number", "WFNumberContentItem"),
    ("url", "WFURLContentItem"),
];

pub const WORKFLOW_TYPES: &[(&str, &str)] = &[
    ("menubar", "MenuBar"),
    ("quickactions", "QuickActions"),
    ("sharesheet", "ActionExtension"),
    ("notifications", "NCWidget"),
    ("sleepmode", "Sleep"),
    ("watch", "Watch"),
    ("onscreen", "ReceivesOnScreenContent"),
];

pub const QUICK_ACTIONS: &[(&str, &str)] = &[("finder", "Finder"), ("services", "Services")];

/// Version selector → (client version, iOS version). Ordered newest first.
pub const VERSIONS: &[(&str, &str, f64)] = &[
    ("26", "4033.0.4.3", 26.0),
    ("18.4", "3218.0.4.100", 18.4),
    ("18", "3036.0.4.2", 18.0),
    ("17", "2106.0.3", 17.0),
    ("16.5", "900", 16.5),
    ("16.4", "900", 16.4),
    ("16.3", "900", 16.3),
    ("16.2", "900", 16.2),
    ("16", "900", 16.0),
    ("15.7.2", "800", 15.7),
    ("15", "800", 15.0),
    ("14", "700", 14.0),
    ("13", "600", 13.0),
    ("12", "500", 12.0),
];

pub const DEFAULT_VERSION: &str = "26";

pub const MINIMUM_CLIENT_VERSION: i64 = 900;

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table.iter().find(|(key, _)| *key == name).map(|(_, v)| *v)
}

fn reverse<'a, T: PartialEq<U>, U: ?Sized>(table: &'a [(&'a str, T)], value: &U) -> Option<&'a str> {
    table.iter().find(|(_, v)| v == value).map(|(key, _)| *key)
}

pub fn color(name: &str) -> Option<i64> {
    lookup(COLORS, name)
}

pub fn color_name(value: i64) -> Option<&'static str> {
    reverse(COLORS, &value)
}

pub fn glyph(name: &str) -> Option<i64> {
    lookup(GLYPHS, name)
}

pub fn glyph_name(value: i64) -> Option<&'static str> {
    reverse(GLYPHS, &value)
}

pub fn content_item(name: &str) -> Option<&'static str> {
    lookup(CONTENT_ITEMS, name)
}

pub fn content_item_name(class: &str) -> Option<&'static str> {
    reverse(CONTENT_ITEMS, &class)
}

pub fn all_content_item_classes() -> Vec<String> {
    CONTENT_ITEMS.iter().map(|(_, class)| class.to_string()).collect()
}

pub fn workflow_type(name: &str) -> Option<&'static str> {
    lookup(WORKFLOW_TYPES, name)
}

pub fn workflow_type_name(value: &str) -> Option<&'static str> {
    reverse(WORKFLOW_TYPES, &value)
}

pub fn quick_action(name: &str) -> Option<&'static str> {
    lookup(QUICK_ACTIONS, name)
}

pub fn quick_action_name(value: &str) -> Option<&'static str> {
    reverse(QUICK_ACTIONS, &value)
}

/// Client version and iOS version for a version selector.
pub fn version(selector: &str) -> Option<(&'static str, f64)> {
    VERSIONS
        .iter()
        .find(|(name, _, _)| *name == selector)
        .map(|(_, client, ios)| (*client, *ios))
}

/// The first selector whose client version matches, newest first.
pub fn version_name(client: &str) -> Option<&'static str> {
    VERSIONS
        .iter()
        .find(|(_, c, _)| *c == client)
        .map(|(name, _, _)| *name)
}

/// Format the keys of a table as a bulleted list for error messages.
pub fn key_list<T>(title: &str, table: &[(&str, T)]) -> String {
    let mut out = format!("{title}\n");
    for (key, _) in table {
        out.push_str(&format!("- {key}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_reversible() {
        let blue = color("blue").unwrap();
        assert_eq!(color_name(blue), Some("blue"));
        assert_eq!(content_item_name("WFURLContentItem"), Some("url"));
        assert_eq!(workflow_type("sharesheet"), Some("ActionExtension"));
    }

    #[test]
    fn reverse_lookups_take_borrowed_values() {
        let class = String::from("WFStringContentItem");
        assert_eq!(content_item_name(&class), Some("text"));
        let kind = String::from("ActionExtension");
        assert_eq!(workflow_type_name(&kind), Some("sharesheet"));
        let surface = String::from("Services");
        assert_eq!(quick_action_name(&surface), Some("services"));
        assert_eq!(quick_action_name("Dock"), None);
    }

    #[test]
    fn versions_resolve_to_client_and_ios() {
        assert_eq!(version("18.4"), Some(("3218.0.4.100", 18.4)));
        assert_eq!(version("16"), Some(("900", 16.0)));
        assert_eq!(version_name("900"), Some("16.5"));
        assert!(version("11").is_none());
    }

    #[test]
    fn glyph_table_has_defaults() {
        assert!(GLYPHS.len() > 300);
        assert_eq!(glyph("car"), Some(59452));
    }

    #[test]
    fn key_list_lists_every_key() {
        let list = key_list("Available:", QUICK_ACTIONS);
        assert_eq!(list, "Available:\n- finder\n- services\n");
    }
}
