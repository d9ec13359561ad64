use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};

use crate::error::Error;

/// Merge the given PDF files into one document at `output`, pages in input
/// order. The write is all-or-nothing: the merged document is assembled in
/// memory, written to a sibling temp file and renamed into place, so a failed
/// merge never leaves a partial output behind.
pub fn merge_documents<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<(), Error> {
    if inputs.is_empty() {
        return Err(Error::Pdf("no input documents to merge".into()));
    }

    let mut max_id = 1;
    // Page objects in document-then-page order; everything else keyed by id.
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: Vec<(ObjectId, Object)> = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        let mut doc = Document::load(path)
            .map_err(|e| Error::Pdf(format!("{}: {e}", path.display())))?;
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, object_id) in doc.get_pages() {
            if let Ok(object) = doc.get_object(object_id) {
                pages.push((object_id, object.to_owned()));
            }
        }
        objects.extend(doc.objects);
    }

    if pages.is_empty() {
        return Err(Error::Pdf("no pages in input documents".into()));
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut pages_root: Option<(ObjectId, Object)> = None;

    for (object_id, object) in objects {
        match object.type_name().unwrap_or("") {
            "Catalog" => {
                // Keep the first catalog's id, always the latest body
                let id = catalog.map_or(object_id, |(id, _)| id);
                catalog = Some((id, object));
            }
            "Pages" => {
                if let Ok(dict) = object.as_dict() {
                    let mut dict = dict.clone();
                    if let Some((_, ref prev)) = pages_root {
                        if let Ok(prev_dict) = prev.as_dict() {
                            dict.extend(prev_dict);
                        }
                    }
                    let id = pages_root.map_or(object_id, |(id, _)| id);
                    pages_root = Some((id, Object::Dictionary(dict)));
                }
            }
            // Page objects are re-parented below; outlines are not carried
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                merged.objects.insert(object_id, object);
            }
        }
    }

    let (catalog_id, catalog_obj) =
        catalog.ok_or_else(|| Error::Pdf("catalog root not found".into()))?;
    let (pages_id, pages_obj) =
        pages_root.ok_or_else(|| Error::Pdf("pages root not found".into()))?;

    for (object_id, object) in &pages {
        if let Ok(dict) = object.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", pages_id);
            merged.objects.insert(*object_id, Object::Dictionary(dict));
        }
    }

    if let Ok(dict) = pages_obj.as_dict() {
        let mut dict = dict.clone();
        dict.set("Count", pages.len() as u32);
        dict.set(
            "Kids",
            pages
                .iter()
                .map(|(object_id, _)| Object::Reference(*object_id))
                .collect::<Vec<_>>(),
        );
        merged.objects.insert(pages_id, Object::Dictionary(dict));
    }

    if let Ok(dict) = catalog_obj.as_dict() {
        let mut dict = dict.clone();
        dict.set("Pages", pages_id);
        dict.remove(b"Outlines");
        merged.objects.insert(catalog_id, Object::Dictionary(dict));
    }

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.adjust_zero_pages();
    merged.compress();

    let tmp = temp_path(output);
    if let Err(e) = merged.save(&tmp) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    std::fs::rename(&tmp, output).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::Io(e)
    })?;
    Ok(())
}

fn temp_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    output.with_file_name(name)
}
