//! Integration tests for document loading and saved output.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use pagediff::error::Result;
use pagediff::source::{Manifest, ManifestSource};
use pagediff::{
    BBox, Bitmap, DocumentLoader, Error, LoaderRegistry, PageSource, Pagediff, Side, TextBlock,
    Workspace,
};

/// Mock loader reading one text block per line of a plain file.
struct MockLoader {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockLoader {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

struct LinesSource {
    lines: Vec<String>,
}

impl PageSource for LinesSource {
    fn page_count(&self) -> usize {
        1
    }

    fn rasterize(&self, _page: usize) -> Result<Bitmap> {
        Ok(RgbaImage::from_pixel(600, 800, Rgba([255, 255, 255, 255])))
    }

    fn extract_blocks(&self, page: usize) -> Result<Vec<TextBlock>> {
        Ok(self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let y = 20.0 + i as f32 * 16.0;
                TextBlock::new(line.as_str(), BBox::new(20.0, y, 200.0, y + 12.0), page)
            })
            .collect())
    }
}

impl DocumentLoader for MockLoader {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn load(&self, path: &Path, workspace: &Workspace, _dpi: f32) -> Result<Box<dyn PageSource>> {
        let text = fs::read_to_string(path)?;
        // Scratch copy, removed with the workspace
        fs::write(workspace.file("last_loaded.txt"), &text)?;
        Ok(Box::new(LinesSource {
            lines: text.lines().map(str::to_string).collect(),
        }))
    }
}

fn write_manifest(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
    let image = format!("{}.png", name);
    RgbaImage::from_pixel(200, 250, Rgba([255, 255, 255, 255]))
        .save(dir.join(&image))
        .unwrap();
    let blocks: Vec<serde_json::Value> = lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let y = 10.0 + i as f64 * 14.0;
            serde_json::json!({
                "text": text,
                "bbox": { "x0": 10.0, "y0": y, "x1": 80.0, "y1": y + 10.0 }
            })
        })
        .collect();
    let manifest = serde_json::json!({
        "dpi": 150,
        "pages": [ { "image": image, "blocks": blocks } ]
    });
    let path = dir.join(format!("{}.json", name));
    fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    path
}

#[test]
fn test_loader_registry_new() {
    let registry = LoaderRegistry::new();
    assert!(!registry.supports("json"));
    assert!(registry.supported_extensions().is_empty());
}

#[test]
fn test_loader_registry_register() {
    let mut registry = LoaderRegistry::new();
    registry.register(Arc::new(MockLoader::new(vec!["txt", "text"], "lines")));

    assert!(registry.supports("txt"));
    assert!(registry.supports("TEXT"));
    assert!(registry.get_by_name("LINES").is_some());
    assert_eq!(registry.supported_extensions(), vec!["text", "txt"]);
}

#[test]
fn test_mock_loader_supports_extension() {
    let loader = MockLoader::new(vec!["txt"], "lines");
    assert!(loader.supports_extension("txt"));
    assert!(loader.supports_extension("TXT"));
    assert!(!loader.supports_extension("json"));
}

#[test]
fn test_compare_with_custom_loader() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "Title\nThe fee is 10 dollars\nSigned").unwrap();
    fs::write(&b, "Title\nThe fee is 12 dollars\nSigned\nAppendix").unwrap();

    let result = Pagediff::new()
        .with_loader(Arc::new(MockLoader::new(vec!["txt"], "lines")))
        .compare_files(&a, &b)
        .unwrap();

    assert_eq!(result.changes.modifications, 1);
    assert_eq!(result.changes.insertions, 1);
    assert_eq!(result.changes.deletions, 0);
    assert_eq!(result.page_count(), 1);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.docx");
    fs::write(&a, "binary").unwrap();

    let result = Pagediff::new().compare_files(&a, &a);
    assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_missing_modified_file() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_manifest(dir.path(), "a", &["text"]);
    let result = Pagediff::new().compare_files(&a, dir.path().join("b.json"));
    assert!(matches!(
        result,
        Err(Error::MissingDocument {
            side: Side::Modified
        })
    ));
}

#[test]
fn test_manifest_comparison_saved() {
    let input = tempfile::tempdir().unwrap();
    let a = write_manifest(input.path(), "v1", &["Invoice 2041", "Amount 300", "Thank you"]);
    let b = write_manifest(
        input.path(),
        "v2",
        &["Invoice 2041", "Amount 320", "Thank you", "Terms apply"],
    );

    let result = Pagediff::new().compare_files(&a, &b).unwrap();
    assert_eq!(result.changes.modifications, 1);
    assert_eq!(result.changes.insertions, 1);

    let output = tempfile::tempdir().unwrap();
    let paths = result.save(output.path()).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(output.path().join("original_page_1.png").exists());
    assert!(output.path().join("modified_page_1.png").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["page_count"], 1);
    assert_eq!(summary["changes"]["deletions"], 0);
    assert_eq!(summary["changes"]["insertions"], 1);
    assert_eq!(summary["changes"]["modifications"], 1);
    assert_eq!(summary["regions"].as_array().unwrap().len(), 3);
    assert!(summary["generated_at"].is_string());

    // Annotated output differs from the blank input where regions were painted
    let painted = image::open(output.path().join("original_page_1.png"))
        .unwrap()
        .to_rgba8();
    assert_ne!(painted, RgbaImage::from_pixel(200, 250, Rgba([255, 255, 255, 255])));
}

#[test]
fn test_manifest_source_direct() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(dir.path(), "doc", &["one", "two"]);
    let manifest = Manifest::from_path(&path).unwrap();
    let source = ManifestSource::new(manifest, dir.path(), 150.0);

    assert_eq!(source.page_count(), 1);
    assert_eq!(source.extract_blocks(0).unwrap().len(), 2);
    assert_eq!(source.rasterize(0).unwrap().dimensions(), (200, 250));
}
