use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::Value;
use crate::parse::types::ValueType::*;

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "notification",
        A::standard("notification").params(vec![
            P::new("body", Text, "WFNotificationActionBody"),
            P::new("title", Text, "WFNotificationActionTitle").optional(),
            P::new("playSound", Bool, "WFNotificationActionSound").default_value(true),
        ]),
    );
    c.insert(
        "speak",
        A::standard("speaktext").params(vec![
            P::new("text", Text, "WFText"),
            P::new("waitUntilFinished", Bool, "WFSpeakTextWait").default_value(true),
        ]),
    );
    c.insert(
        "playSound",
        A::standard("playsound").params(vec![P::new("sound", Variable, "WFInput")]),
    );
    c.insert(
        "takePhoto",
        A::standard("takephoto").params(vec![
            P::new("count", Number, "WFPhotoCount").default_value(1),
            P::new("showPreview", Bool, "WFCameraCaptureShowPreview").default_value(true),
        ]),
    );
    c.insert(
        "takePhotos",
        A::standard("takephoto")
            .params(vec![P::new("count", Number, "WFPhotoCount")])
            .add_params(|_, _| Ok(fixed(&[("WFCameraCaptureShowPreview", json!(true))])))
            .check(several_photos),
    );
    c.insert(
        "takeVideo",
        A::standard("takevideo").params(vec![
            P::new("camera", Text, "WFCameraCaptureDevice")
                .enumerate(&["Front", "Back"])
                .default_value("Front"),
            P::new("quality", Text, "WFCameraCaptureQuality")
                .enumerate(&["Low", "Medium", "High"])
                .default_value("Medium"),
            P::new("startImmediately", Bool, "WFRecordingStart").default_value(false),
        ]),
    );
    c.insert(
        "trimVideo",
        A::standard("trimvideo").params(vec![P::new("video", Variable, "WFInputMedia")]),
    );
    c.insert("latestPhotoImport", A::standard("getlatestphotoimport"));
    c.insert("clearUpNext", A::standard("clearupnext"));
    c.insert(
        "getTextFromImage",
        A::standard("extracttextfromimage")
            .params(vec![P::new("image", Variable, "WFImage")])
            .output(Text),
    );
    c.insert(
        "makeQRcode",
        A::standard("generatebarcode").params(vec![
            P::new("input", Text, "WFText"),
            P::new("errorCorrection", Text, "WFQRErrorCorrectionLevel")
                .enumerate(&["Low", "Medium", "Quartile", "High"])
                .optional(),
        ]),
    );
    c.insert(
        "quicklook",
        A::standard("previewdocument").params(vec![P::new("input", Variable, "WFInput")]),
    );
    c.insert(
        "resizeImage",
        A::standard("image.resize").params(vec![
            P::new("image", Variable, "WFImage"),
            P::new("width", Text, "WFImageResizeWidth"),
            P::new("height", Text, "WFImageResizeHeight").optional(),
        ]),
    );
    c.insert(
        "convertImage",
        A::standard("image.convert").params(vec![
            P::new("image", Variable, "WFInput"),
            P::new("format", Text, "WFImageFormat")
                .enumerate(&["TIFF", "GIF", "PNG", "BMP", "PDF", "HEIF", "JPEG"]),
        ]),
    );
}

/// A literal photo count must ask for more than one photo.
fn several_photos(args: &mut Vec<Value>, _: &A) -> Result<(), String> {
    match args.first() {
        Some(Value::Number(n)) if *n < 1 => Err("Number of photos to take must be greater than zero".into()),
        Some(Value::Number(1)) => Err("Use takePhoto() to take a single photo".into()),
        _ => Ok(()),
    }
}
