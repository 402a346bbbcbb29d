use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::ValueType::*;

pub(super) fn register(c: &mut Catalog) {
    c.insert("getBatteryLevel", A::standard("getbatterylevel").output(Number));
    c.insert(
        "getDeviceDetail",
        A::standard("getdevicedetails")
            .params(vec![P::new("detail", Text, "WFDeviceDetail").enumerate(&[
                "Device Name",
                "Device Hostname",
                "Device Model",
                "Device Is Watch",
                "System Version",
                "Screen Width",
                "Screen Height",
                "Current Volume",
                "Current Brightness",
                "Current Appearance",
            ])])
            .output(Text),
    );
    c.insert(
        "setBrightness",
        A::standard("setbrightness").params(vec![P::new("brightness", Number, "WFBrightness")]),
    );
    c.insert(
        "setVolume",
        A::standard("setvolume").params(vec![P::new("volume", Number, "WFVolume")]),
    );
    c.insert(
        "setWifi",
        A::standard("wifi.set").params(vec![P::new("status", Bool, "OnValue")]),
    );
    c.insert(
        "setBluetooth",
        A::standard("bluetooth.set").params(vec![P::new("status", Bool, "OnValue")]),
    );
    c.insert(
        "toggleBluetooth",
        A::standard("bluetooth.set").add_params(|_, _| {
            Ok(fixed(&[("OnValue", json!(false)), ("operation", json!("toggle"))]))
        }),
    );
    c.insert(
        "setCellularData",
        A::standard("cellulardata.set").params(vec![P::new("status", Bool, "OnValue")]),
    );
    c.insert(
        "setCellularVoice",
        A::standard("cellular.rat.set").params(vec![P::new("status", Bool, "OnValue")]),
    );
    c.insert(
        "setAppearance",
        A::standard("appearance")
            .params(vec![P::new("appearance", Text, "style").enumerate(&["light", "dark"])])
            .add_params(|_, _| Ok(fixed(&[("operation", json!("set"))])))
            .default_action(),
    );
    c.insert(
        "toggleAppearance",
        A::standard("appearance").add_params(|_, _| Ok(fixed(&[("operation", json!("toggle"))]))),
    );
    c.insert(
        "lightMode",
        A::standard("appearance")
            .add_params(|_, _| Ok(fixed(&[("operation", json!("set")), ("style", json!("light"))])))
            .shorthand(),
    );
    c.insert(
        "darkMode",
        A::standard("appearance")
            .add_params(|_, _| Ok(fixed(&[("operation", json!("set")), ("style", json!("dark"))])))
            .shorthand(),
    );
    c.insert(
        "setWallpaper",
        A::standard("wallpaper.set").params(vec![P::new("input", Variable, "WFInput")]),
    );
    c.insert("vibrate", A::implicit());
    c.insert("lockScreen", A::standard("lockscreen").min_version(17.0));
    c.insert("getClipboard", A::standard("getclipboard"));
    c.insert(
        "setClipboard",
        A::standard("setclipboard").params(vec![
            P::new("value", Variable, "WFInput"),
            P::new("local", Bool, "WFLocalOnly").default_value(false),
            P::new("expire", Text, "WFExpirationDate").optional(),
        ]),
    );
    c.alias("copyToClipboard", "setClipboard");

    // Sharing

    c.insert(
        "airdrop",
        A::standard("airdropdocument").params(vec![P::new("input", Variable, "WFInput")]),
    );
    c.insert("share", A::standard("share").params(vec![P::new("input", Variable, "WFInput")]));
    c.insert(
        "getOnScreenContent",
        A::standard("getonscreencontent").min_version(16.0),
    );
    c.insert("startScreensaver", A::standard("start-screensaver").mac_only());
    c.insert(
        "setFocusMode",
        A::standard("dnd.set")
            .params(vec![P::new("enabled", Bool, "Enabled")])
            .max_version(16.0),
    );
}
