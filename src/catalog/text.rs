use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::ValueType::*;
use crate::parse::types::{Template, Value};

const SEPARATORS: &[&str] = &["New Lines", "Spaces", "Every Character", "Custom"];

/// `text.replace` with the matching flags fixed.
macro_rules! replace_text {
    ($c:expr, $name:literal, $pattern:literal, $case_sensitive:literal, $regex:literal) => {
        $c.insert(
            $name,
            A::standard("text.replace")
                .params(vec![
                    P::new($pattern, Text, "WFReplaceTextFind"),
                    P::new("replacement", Text, "WFReplaceTextReplace"),
                    P::new("subject", Text, "WFInput"),
                ])
                .add_params(|_, _| {
                    Ok(fixed(&[
                        ("WFReplaceTextCaseSensitive", json!($case_sensitive)),
                        ("WFReplaceTextRegularExpression", json!($regex)),
                    ]))
                })
                .output(Text),
        );
    };
}

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "replaceText",
        A::standard("text.replace")
            .params(vec![
                P::new("find", Text, "WFReplaceTextFind"),
                P::new("replacement", Text, "WFReplaceTextReplace"),
                P::new("subject", Text, "WFInput"),
                P::new("caseSensitive", Bool, "WFReplaceTextCaseSensitive").default_value(true),
                P::new("regExp", Bool, "WFReplaceTextRegularExpression").default_value(false),
            ])
            .output(Text),
    );
    replace_text!(c, "iReplaceText", "find", false, false);
    replace_text!(c, "regReplaceText", "expression", true, true);
    replace_text!(c, "iRegReplaceText", "expression", false, true);

    c.insert(
        "uppercase",
        A::standard("text.changecase")
            .params(vec![P::new("text", Text, "text")])
            .add_params(|_, _| Ok(fixed(&[("WFCaseType", json!("UPPERCASE"))])))
            .output(Text)
            .default_action(),
    );
    c.insert(
        "lowercase",
        A::standard("text.changecase")
            .params(vec![P::new("text", Text, "text")])
            .add_params(|_, _| Ok(fixed(&[("WFCaseType", json!("lowercase"))])))
            .output(Text),
    );
    c.insert(
        "titleCase",
        A::standard("text.changecase")
            .params(vec![P::new("text", Text, "text")])
            .add_params(|_, _| Ok(fixed(&[("WFCaseType", json!("Capitalize Every Word"))])))
            .output(Text),
    );
    c.insert(
        "capitalize",
        A::standard("text.changecase")
            .params(vec![P::new("text", Text, "text")])
            .add_params(|_, _| {
                Ok(fixed(&[("WFCaseType", json!("Capitalize with Sentence case"))]))
            })
            .output(Text),
    );
    c.insert(
        "alternateCase",
        A::standard("text.changecase")
            .params(vec![P::new("text", Text, "text")])
            .add_params(|_, _| {
                Ok(fixed(&[("WFCaseType", json!("cApItAlIzE wItH aLtErNaTiNg cAsE"))]))
            })
            .output(Text),
    );
    c.alias("capitalizeAll", "titleCase");

    c.insert(
        "splitText",
        A::standard("text.split")
            .params(vec![
                P::new("text", Text, "text"),
                P::new("separator", Text, "WFTextSeparator")
                    .enumerate(SEPARATORS)
                    .default_value("New Lines"),
                P::new("custom", Text, "WFTextCustomSeparator").optional(),
            ])
            .check(custom_separator)
            .output(Array),
    );
    c.insert(
        "joinText",
        A::standard("text.combine")
            .params(vec![
                P::new("list", Variable, "text"),
                P::new("separator", Text, "WFTextSeparator")
                    .enumerate(SEPARATORS)
                    .default_value("New Lines"),
                P::new("custom", Text, "WFTextCustomSeparator").optional(),
            ])
            .check(custom_separator)
            .output(Text),
    );
    c.alias("combineText", "joinText");
    c.insert(
        "matchText",
        A::standard("text.match")
            .params(vec![
                P::new("regex", Text, "WFMatchTextPattern"),
                P::new("text", Text, "text"),
                P::new("caseSensitive", Bool, "WFMatchTextCaseSensitive").default_value(true),
            ])
            .output(Array)
            .default_action(),
    );
    c.insert(
        "textStartsWith",
        A::standard("text.match")
            .params(vec![
                P::new("text", Text, "text"),
                P::new("prefix", Text, "WFMatchTextPattern").literal(),
            ])
            .check(anchor_prefix)
            .output(Array),
    );
    c.insert(
        "matchedTextGroupIndex",
        A::standard("text.match.getgroup")
            .params(vec![
                P::new("matches", Variable, "matches"),
                P::new("index", Number, "WFGroupIndex"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFGetGroupType", json!("Group At Index"))])))
            .output(Text),
    );
    c.alias("getGroupAtIndex", "matchedTextGroupIndex");
    c.insert(
        "trimWhitespace",
        A::standard("text.trimwhitespace")
            .params(vec![P::new("text", Text, "WFInput")])
            .output(Text),
    );
    c.insert(
        "correctSpelling",
        A::standard("correctspelling")
            .params(vec![P::new("text", Text, "text")])
            .output(Text),
    );

    c.insert(
        "define",
        A::standard("showdefinition").params(vec![P::new("word", Text, "Word")]),
    );
    c.insert(
        "getEmojiName",
        A::standard("getnameofemoji")
            .params(vec![P::new("emoji", Text, "WFInput")])
            .output(Text),
    );
    c.insert(
        "makeVCard",
        A::standard("gettext")
            .params(vec![
                P::new("title", Text, "WFTextActionText"),
                P::new("subtitle", Text, ""),
                P::new("photo", Text, "").optional(),
            ])
            .check(vcard)
            .output(Text)
            .shorthand(),
    );

    // Translation

    c.insert(
        "translate",
        A::standard("translate")
            .params(vec![
                P::new("text", Text, "WFInputText"),
                P::new("to", Text, "WFSelectedLanguage"),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFSelectedFromLanguage", json!("Detect Language"))])))
            .output(Text)
            .default_action(),
    );
    c.insert(
        "translateFrom",
        A::standard("translate")
            .params(vec![
                P::new("text", Text, "WFInputText"),
                P::new("from", Text, "WFSelectedFromLanguage"),
                P::new("to", Text, "WFSelectedLanguage"),
            ])
            .output(Text),
    );
    c.insert(
        "detectLanguage",
        A::standard("detectlanguage")
            .params(vec![P::new("text", Text, "WFInput")])
            .output(Text),
    );

    // Encoding

    c.insert(
        "base64Encode",
        A::standard("base64encode")
            .params(vec![P::new("input", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFEncodeMode", json!("Encode"))])))
            .output(Text)
            .default_action(),
    );
    c.insert(
        "base64Decode",
        A::standard("base64encode")
            .params(vec![P::new("input", Variable, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFEncodeMode", json!("Decode"))]))),
    );
    c.insert(
        "urlEncode",
        A::standard("urlencode")
            .params(vec![P::new("text", Text, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFEncodeMode", json!("Encode"))])))
            .output(Text)
            .default_action(),
    );
    c.insert(
        "urlDecode",
        A::standard("urlencode")
            .params(vec![P::new("text", Text, "WFInput")])
            .add_params(|_, _| Ok(fixed(&[("WFEncodeMode", json!("Decode"))])))
            .output(Text),
    );
    c.insert(
        "hash",
        A::standard("hash")
            .params(vec![
                P::new("input", Variable, "WFInput"),
                P::new("type", Text, "WFHashType")
                    .enumerate(&["MD5", "SHA1", "SHA256", "SHA512"])
                    .default_value("MD5"),
            ])
            .output(Text),
    );
    c.insert(
        "getRichTextFromMarkdown",
        A::standard("getrichtextfrommarkdown").params(vec![P::new("markdown", Text, "WFInput")]),
    );
    c.insert(
        "getMarkdownFromRichText",
        A::standard("getmarkdownfromrichtext")
            .params(vec![P::new("richText", Variable, "WFInput")])
            .output(Text),
    );
    c.alias("makeMarkdown", "getMarkdownFromRichText");
    c.insert(
        "getRichTextFromHTML",
        A::standard("getrichtextfromhtml").params(vec![P::new("html", Text, "WFHTML")]),
    );
    c.insert(
        "makeHTML",
        A::standard("gethtmlfromrichtext")
            .params(vec![
                P::new("richText", Variable, "WFInput"),
                P::new("makeFullDocument", Bool, "WFMakeFullDocument").default_value(false),
            ])
            .output(Text),
    );
}

/// A custom separator implies the `Custom` separator mode.
fn custom_separator(args: &mut Vec<Value>, _: &A) -> Result<(), String> {
    if args.len() < 3 {
        return Ok(());
    }
    match args[1].literal_str() {
        Some("Custom") => Ok(()),
        Some(_) => Err("A custom separator requires the 'Custom' separator mode".into()),
        None => Ok(()),
    }
}

/// Folds the card fields into a single vCard text; the photo is base64
/// image data.
fn vcard(args: &mut Vec<Value>, _: &A) -> Result<(), String> {
    let mut card = Template::plain("BEGIN:VCARD\nVERSION:3.0\nN;CHARSET=utf-8:");
    let fields = ["\nORG:", "\nPHOTO;ENCODING=b:"];
    for (index, arg) in args.iter().enumerate() {
        if let Some(field) = index.checked_sub(1).and_then(|i| fields.get(i)) {
            card.push_str(field);
        }
        match arg {
            Value::Text(template) => card.append(template),
            Value::Variable(var) => card.append(&Template::reference(var)),
            Value::Nil => {}
            other => match other.literal() {
                Some(literal) => card.push_str(&literal.to_string()),
                None => return Err("vCard fields must be text".into()),
            },
        }
    }
    card.push_str("\nEND:VCARD");
    *args = vec![Value::Text(card)];
    Ok(())
}

/// Prefix matching is a regular expression match anchored at the start.
fn anchor_prefix(args: &mut Vec<Value>, _: &A) -> Result<(), String> {
    let Some(prefix) = args.get(1).and_then(Value::literal_str) else {
        return Err("Prefix must be a literal string".into());
    };
    if !prefix.starts_with('^') {
        let anchored = format!("^{prefix}");
        args[1] = Value::text(anchored);
    }
    Ok(())
}
