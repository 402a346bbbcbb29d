use serde_json::json;

use super::{ActionDefinition as A, Catalog, ParameterDefinition as P, fixed};
use crate::parse::types::ValueType::*;

pub(super) fn register(c: &mut Catalog) {
    c.insert(
        "getFile",
        A::standard("documentpicker.open")
            .params(vec![
                P::new("path", Text, "WFGetFilePath"),
                P::new("errorIfNotFound", Bool, "WFFileErrorIfNotFound").default_value(true),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFShowFilePicker", json!(false))]))),
    );
    c.alias("getFileFromShortcutsFolder", "getFile");
    c.insert(
        "getFileFromFolder",
        A::standard("documentpicker.open")
            .params(vec![
                P::new("folder", Variable, "WFFile"),
                P::new("path", Text, "WFGetFilePath"),
                P::new("errorIfNotFound", Bool, "WFFileErrorIfNotFound").default_value(true),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFShowFilePicker", json!(false))]))),
    );
    c.insert(
        "selectFile",
        A::standard("file.select")
            .params(vec![P::new("multiple", Bool, "SelectMultiple").default_value(false)]),
    );
    c.insert(
        "getSelectedFiles",
        A::standard("finder.getselectedfiles").output(Array).mac_only(),
    );
    c.insert(
        "saveFile",
        A::standard("documentpicker.save")
            .params(vec![
                P::new("file", Variable, "WFInput"),
                P::new("path", Text, "WFFileDestinationPath"),
                P::new("overwrite", Bool, "WFSaveFileOverwrite").default_value(false),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFAskWhereToSave", json!(false))]))),
    );
    c.insert(
        "saveFilePrompt",
        A::standard("documentpicker.save").params(vec![
            P::new("file", Variable, "WFInput"),
            P::new("overwrite", Bool, "WFSaveFileOverwrite").default_value(false),
        ]),
    );
    c.insert(
        "rename",
        A::standard("file.rename").params(vec![
            P::new("file", Variable, "WFFile"),
            P::new("newName", Text, "WFNewFilename"),
        ]),
    );
    c.insert(
        "reveal",
        A::standard("file.reveal").params(vec![P::new("files", Variable, "WFFile")]),
    );
    c.insert(
        "getFileLink",
        A::standard("file.getlink")
            .params(vec![P::new("file", Variable, "WFFile")])
            .output(Text),
    );
    c.insert(
        "getParentDirectory",
        A::standard("getparentdirectory").params(vec![P::new("input", Variable, "WFInput")]),
    );
    c.insert(
        "deleteFiles",
        A::standard("file.delete").params(vec![
            P::new("input", Variable, "WFInput"),
            P::new("immediately", Bool, "WFDeleteImmediatelyDelete").default_value(false),
        ]),
    );
    c.insert(
        "getFileDetail",
        A::standard("properties.files")
            .params(vec![
                P::new("file", Variable, "WFInput"),
                P::new("detail", Text, "WFContentItemPropertyName").enumerate(&[
                    "File Size",
                    "File Extension",
                    "Creation Date",
                    "File Path",
                    "Last Modified Date",
                    "Name",
                ]),
            ])
            .output(Text),
    );
    c.insert(
        "fileSize",
        A::standard("format.filesize")
            .params(vec![
                P::new("file", Variable, "WFFileSize"),
                P::new("format", Text, "WFFileSizeFormat").enumerate(&[
                    "Closest Unit",
                    "Bytes",
                    "Kilobytes",
                    "Megabytes",
                    "Gigabytes",
                    "Terabytes",
                    "Petabytes",
                    "Exabytes",
                    "Zettabytes",
                    "Yottabytes",
                ]),
            ])
            .add_params(|_, _| Ok(fixed(&[("WFFileSizeIncludeUnits", json!(false))])))
            .output(Text),
    );
    c.insert(
        "getFolderContents",
        A::standard("file.getfoldercontents").params(vec![
            P::new("folder", Variable, "WFFolder"),
            P::new("recursive", Bool, "Recursive").default_value(true),
        ]),
    );
    c.insert(
        "createFolder",
        A::standard("file.createfolder").params(vec![P::new("path", Text, "WFFilePath")]),
    );
    c.alias("createShortcutsFolder", "createFolder");
    c.insert(
        "appendToFile",
        A::standard("file.append").params(vec![
            P::new("path", Text, "WFFilePath"),
            P::new("text", Text, "WFInput"),
        ]),
    );
    c.insert(
        "makePDF",
        A::standard("makepdf").params(vec![P::new("input", Variable, "WFInput")]),
    );
    c.insert(
        "splitPDF",
        A::standard("splitpdf")
            .params(vec![P::new("pdf", Variable, "WFInput")])
            .output(Array),
    );
    c.insert("print", A::standard("print").params(vec![P::new("input", Variable, "WFInput")]));
    c.insert(
        "markup",
        A::standard("avairyeditphoto").params(vec![P::new("document", Variable, "WFDocument")]),
    );
    c.insert(
        "makeArchive",
        A::standard("makezip").params(vec![
            P::new("name", Text, "WFZIPName"),
            P::new("format", Text, "WFArchiveFormat").enumerate(&[
                ".zip", ".tar.gz", ".tar.bz2", ".tar.xz", ".tar", ".gz", ".cpio", ".iso",
            ]),
            P::new("files", Variable, "WFInput"),
        ]),
    );
    c.insert(
        "extractArchive",
        A::standard("unzip")
            .params(vec![P::new("file", Variable, "WFArchive")])
            .output(Array),
    );
    c.insert(
        "connectToServer",
        A::standard("connecttoserver").params(vec![P::new("url", Text, "WFInput")]),
    );

    // Notes and books

    c.insert(
        "showNote",
        A::standard("shownote").params(vec![P::new("note", Variable, "WFInput")]),
    );
    c.insert(
        "appendNote",
        A::standard("appendnote").params(vec![
            P::new("note", Text, "WFNote"),
            P::new("input", Text, "WFInput"),
        ]),
    );
    c.insert(
        "addToBooks",
        A::standard("addtobooks").params(vec![P::new("input", Variable, "BooksInput")]),
    );
}
