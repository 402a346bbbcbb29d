use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParamEmitter, Params, ParameterDefinition as P, fixed};
use crate::error::CompilerError;
use crate::parse::types::Value;
use crate::parse::types::ValueType::*;

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "url",
        A::standard("url")
            .params(vec![P::new("url", Text, "WFURLActionURL")])
            .output(Text),
    );
    c.insert(
        "getURLContents",
        A::standard("downloadurl")
            .params(vec![
                P::new("url", Text, "WFURL"),
                P::new("method", Text, "WFHTTPMethod")
                    .enumerate(&["GET", "POST", "PUT", "PATCH", "DELETE"])
                    .default_value("GET"),
                P::new("headers", Dictionary, "WFHTTPHeaders").optional(),
                P::new("body", Dictionary, "WFJSONValues").optional(),
            ])
            .add_params(request_options),
    );
    c.insert(
        "downloadURL",
        A::standard("downloadurl")
            .params(vec![
                P::new("url", Text, "WFURL"),
                P::new("headers", Dictionary, "WFHTTPHeaders").optional(),
            ])
            .add_params(|_, args| {
                let mut params = fixed(&[("WFHTTPMethod", json!("GET"))]);
                if args.get(1).is_some_and(|arg| !matches!(arg, Value::Nil)) {
                    params.insert("ShowHeaders".into(), json!(true));
                }
                Ok(params)
            }),
    );
    c.insert(
        "httpRequest",
        A::standard("downloadurl")
            .params(vec![
                P::new("url", Text, "WFURL"),
                P::new("method", Text, "WFHTTPMethod")
                    .enumerate(&["GET", "POST", "PUT", "PATCH", "DELETE"]),
                P::new("body", Dictionary, "WFFormValues").optional(),
                P::new("bodyType", Text, "WFHTTPBodyType")
                    .enumerate(&["JSON", "Form", "File"])
                    .optional(),
                P::new("headers", Dictionary, "WFHTTPHeaders").optional(),
            ])
            .add_params(|_, args| {
                let mut params = Params::new();
                if args.get(4).is_some_and(|arg| !matches!(arg, Value::Nil)) {
                    params.insert("ShowHeaders".into(), json!(true));
                }
                Ok(params)
            })
            .shorthand(),
    );
    c.insert(
        "getURLHeaders",
        A::standard("url.getheaders")
            .params(vec![P::new("url", Text, "WFInput")])
            .output(Dictionary),
    );
    c.insert(
        "openURL",
        A::standard("openurl").params(vec![P::new("url", Text, "WFInput")]),
    );
    c.insert(
        "getWebPageContents",
        A::standard("getwebpagecontents")
            .params(vec![P::new("url", Text, "WFInput")])
            .output(Text),
    );
    c.alias("getWebpageContents", "getWebPageContents");
    c.insert("getCurrentURL", A::standard("safari.geturl").output(Text));
    c.insert(
        "getWebPageDetail",
        A::standard("properties.safariwebpage")
            .params(vec![
                P::new("webpage", Variable, "WFInput"),
                P::new("detail", Text, "WFContentItemPropertyName")
                    .enumerate(&["Page Contents", "Page Selection", "Page URL", "Name"]),
            ])
            .output(Text),
    );
    c.insert(
        "getArticle",
        A::standard("getarticle").params(vec![P::new("webpage", Text, "WFWebPage")]),
    );
    c.insert(
        "getArticleDetail",
        A::standard("properties.articles")
            .params(vec![
                P::new("article", Variable, "WFInput"),
                P::new("detail", Text, "WFContentItemPropertyName").enumerate(&[
                    "Title",
                    "Published Date",
                    "Body",
                    "URL",
                    "Author",
                    "Main Image URL",
                    "Excerpt",
                    "Word Count",
                    "Number of Images",
                    "Name",
                ]),
            ])
            .output(Text),
    );
    c.insert(
        "showWebpage",
        A::standard("showwebpage").params(vec![
            P::new("url", Text, "WFURL"),
            P::new("useReader", Bool, "WFEnterSafariReader").optional(),
        ]),
    );
    c.insert(
        "runJavaScriptOnWebpage",
        A::standard("runjavascriptonwebpage")
            .params(vec![P::new("javascript", Text, "WFJavaScript")])
            .output(Text),
    );
    c.insert(
        "addToReadingList",
        A::standard("readinglist")
            .params(vec![P::new("url", Text, "WFURL")])
            .add_params(|_, _| Ok(fixed(&[("Show-WFURL", json!(true))]))),
    );
    c.insert(
        "getRSS",
        A::standard("rss")
            .params(vec![
                P::new("items", Number, "WFRSSItemQuantity"),
                P::new("url", Text, "WFRSSFeedURL"),
            ])
            .output(Array),
    );
    c.insert(
        "getRSSFeeds",
        A::standard("rss.extract")
            .params(vec![P::new("urls", Text, "WFURLs")])
            .output(Array),
    );
    c.insert(
        "searchGiphy",
        A::standard("giphy").params(vec![P::new("query", Text, "WFGiphyQuery")]),
    );
    c.insert(
        "getGifs",
        A::standard("giphy")
            .params(vec![
                P::new("query", Text, "WFGiphyQuery"),
                P::new("gifs", Number, "WFGiphyLimit").default_value(1),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFGiphyShowPicker", json!(false))]))),
    );
    c.insert(
        "searchWeb",
        A::standard("searchweb").params(vec![
            P::new("query", Text, "WFInputText"),
            P::new("engine", Text, "WFSearchWebDestination")
                .enumerate(&["Amazon", "Bing", "DuckDuckGo", "eBay", "Google", "Reddit", "Twitter", "Yahoo!", "YouTube"])
                .default_value("Google"),
        ]),
    );
    c.insert(
        "expandURL",
        A::standard("url.expand")
            .params(vec![P::new("url", Text, "URL")])
            .output(Text),
    );
    c.insert(
        "getURLDetail",
        A::standard("geturlcomponent")
            .params(vec![
                P::new("url", Text, "WFURL"),
                P::new("component", Text, "WFURLComponent")
                    .enumerate(&["Scheme", "User", "Password", "Host", "Port", "Path", "Query", "Fragment"]),
            ])
            .output(Text),
    );
}

/// Headers and a body switch on the matching request options.
fn request_options(_: &mut dyn ParamEmitter, args: &[Value]) -> Result<Params, CompilerError> {
    let mut params = Params::new();
    if args.get(2).is_some_and(|arg| !matches!(arg, Value::Nil)) {
        params.insert("ShowHeaders".into(), json!(true));
    }
    if args.get(3).is_some_and(|arg| !matches!(arg, Value::Nil)) {
        params.insert("WFHTTPBodyType".into(), json!("JSON"));
    }
    Ok(params)
}
